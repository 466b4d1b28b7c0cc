//! Explicit per-caller conversion context.
//!
//! A [`ConversionContext`] is built once by the caller and passed to every
//! core operation. It carries the log target, the root for scratch storage
//! and the option structs, and holds no mutable state, so one context can
//! serve concurrent calls.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

use crate::builder::BuildOptions;
use crate::error::Result;
use crate::markup::ParseOptions;
use crate::render::ExportOptions;

/// Default log target for every core operation.
pub const DEFAULT_LOG_TARGET: &str = "docweave";

/// Configuration shared by the conversion operations.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    /// Target passed to every `log` macro
    pub log_target: String,

    /// Directory under which scratch directories are created
    pub temp_root: PathBuf,

    /// Markup parsing options
    pub parse: ParseOptions,

    /// Markup to package options
    pub build: BuildOptions,

    /// Text export options
    pub export: ExportOptions,
}

impl ConversionContext {
    /// Create a context with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log target.
    pub fn with_log_target(mut self, target: impl Into<String>) -> Self {
        self.log_target = target.into();
        self
    }

    /// Set the scratch storage root.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = root.into();
        self
    }

    /// Set the markup parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set the build options.
    pub fn with_build_options(mut self, options: BuildOptions) -> Self {
        self.build = options;
        self
    }

    /// Set the export options.
    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export = options;
        self
    }

    /// Log target as a string slice.
    pub fn target(&self) -> &str {
        &self.log_target
    }

    /// Allocate a scratch directory for one call.
    ///
    /// The directory is removed by [`ScratchDir::release`] or, failing
    /// that, when the value is dropped.
    pub fn scratch(&self) -> Result<ScratchDir> {
        let id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("docweave-{}-", id))
            .tempdir_in(&self.temp_root)?;

        log::debug!(target: self.target(), "allocated scratch directory {}", dir.path().display());

        Ok(ScratchDir {
            id,
            dir: Some(dir),
            log_target: self.log_target.clone(),
        })
    }
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self {
            log_target: DEFAULT_LOG_TARGET.to_string(),
            temp_root: std::env::temp_dir(),
            parse: ParseOptions::default(),
            build: BuildOptions::default(),
            export: ExportOptions::default(),
        }
    }
}

/// A uniquely named temporary directory owned by a single call.
#[derive(Debug)]
pub struct ScratchDir {
    id: Uuid,
    dir: Option<TempDir>,
    log_target: String,
}

impl ScratchDir {
    /// Per-call identifier embedded in the directory name.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Directory path. Empty after release.
    pub fn path(&self) -> &Path {
        self.dir.as_ref().map(TempDir::path).unwrap_or(Path::new(""))
    }

    /// Write `bytes` to `name` inside the directory and return the full path.
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path().join(name);
        let mut file = fs::File::create(&path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(path)
    }

    /// Move a file out of the directory to `dest`.
    ///
    /// When a rename is not possible (different filesystems) the file is
    /// copied next to `dest` first and renamed into place, so `dest` never
    /// holds a partial file.
    pub fn persist(&self, file: &Path, dest: &Path) -> Result<()> {
        if fs::rename(file, dest).is_ok() {
            return Ok(());
        }
        copy_into_place(file, dest)
    }

    /// Remove the directory now. Failures are logged and never returned,
    /// so cleanup cannot mask the result of the operation it served.
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => log::debug!(target: self.log_target.as_str(), "released scratch directory {}", path.display()),
                Err(e) => log::warn!(
                    target: self.log_target.as_str(),
                    "failed to release scratch directory {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}

fn copy_into_place(file: &Path, dest: &Path) -> Result<()> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".docweave-")
        .tempfile_in(parent)?;
    let mut source = fs::File::open(file)?;
    io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}
