//! Build options and configuration.

/// Options for building a structured document and its package.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// How the markup tree is walked
    pub traversal: TraversalMode,

    /// Highest heading level mapped to a heading block (1-6)
    pub max_heading_level: u8,

    /// Default font family of the package
    pub font_family: String,

    /// Default font size in points
    pub font_size_pt: u8,
}

impl BuildOptions {
    /// Create new build options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the traversal mode.
    pub fn with_traversal(mut self, mode: TraversalMode) -> Self {
        self.traversal = mode;
        self
    }

    /// Visit only top-level blocks, so nested lists and tables are not
    /// repeated.
    pub fn top_level_only(mut self) -> Self {
        self.traversal = TraversalMode::TopLevel;
        self
    }

    /// Set the highest heading level that is kept.
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set the default font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the default font size in points.
    pub fn with_font_size(mut self, size_pt: u8) -> Self {
        self.font_size_pt = size_pt.max(1);
        self
    }

    /// Default font size in half-points, the unit used by the package format.
    pub fn font_size_half_points(&self) -> usize {
        usize::from(self.font_size_pt) * 2
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            traversal: TraversalMode::Flattened,
            max_heading_level: 2,
            font_family: "Arial".to_string(),
            font_size_pt: 11,
        }
    }
}

/// How the builder walks the markup tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// Visit every element in document order, at any depth. Lists and
    /// tables nested in other lists and tables are emitted once for each
    /// enclosing list or table.
    #[default]
    Flattened,
    /// Stop descending at the first recognized block. Nested lists and
    /// tables are only reached through their outermost ancestor.
    TopLevel,
}
