//! Word package to raw markup.
//!
//! [`DocxMarkupBackend`] reads `word/document.xml` with quick-xml and emits
//! an HTML fragment: headings, paragraphs with bold/italic runs and links,
//! native lists grouped and nested by level, and tables. The fragment is
//! unstyled; default presentation is added later by the style injector.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::container::{attr_val, local_name, OoxmlPackage, Relationships, StyleNames};
use super::numbering::NumberingDefinitions;
use crate::error::Result;
use crate::markup::{ParseOptions, ParsedNode};

/// A structural converter from package bytes to raw markup.
pub trait MarkupBackend {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Convert package bytes to an unstyled markup fragment, reading no
    /// more than `options` allows.
    fn to_markup(&self, bytes: &[u8], options: &ParseOptions) -> Result<String>;
}

/// Built-in backend for modern Word packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxMarkupBackend;

impl DocxMarkupBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }

    /// Convert package bytes to a markup tree rooted at a document node.
    pub fn to_tree(&self, bytes: &[u8], options: &ParseOptions) -> Result<ParsedNode> {
        let mut package = OoxmlPackage::open(bytes)?.with_max_part_bytes(options.max_part_bytes);
        let document = package.main_document()?;
        let numbering = match package.read_optional_part(super::container::NUMBERING_PART)? {
            Some(xml) => NumberingDefinitions::parse(&xml)?,
            None => NumberingDefinitions::default(),
        };
        let styles = package.style_names()?;
        let rels = package.relationships()?;

        let items = BodyReader::new(&numbering, &styles, &rels).read(&document)?;
        Ok(render_body(&items))
    }
}

impl MarkupBackend for DocxMarkupBackend {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn to_markup(&self, bytes: &[u8], options: &ParseOptions) -> Result<String> {
        self.to_tree(bytes, options)?.to_html()
    }
}

/// Paragraph role resolved from its properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphKind {
    Plain,
    Heading(u8),
    ListItem { ordered: bool, level: u32 },
}

#[derive(Debug, Clone)]
struct Paragraph {
    kind: ParagraphKind,
    inlines: Vec<ParsedNode>,
}

#[derive(Debug, Clone)]
enum BodyItem {
    Paragraph(Paragraph),
    Table(ParsedNode),
}

#[derive(Debug, Default)]
struct ParagraphState {
    style: Option<String>,
    outline_level: Option<u8>,
    num_id: Option<String>,
    ilvl: u32,
    inlines: Vec<ParsedNode>,
}

#[derive(Debug, Default)]
struct RunState {
    bold: bool,
    italic: bool,
    content: Vec<ParsedNode>,
}

#[derive(Debug, Default)]
struct TableState {
    rows: Vec<ParsedNode>,
    row: Option<ParsedNode>,
    cell: Option<ParsedNode>,
}

/// Streaming reader over the main document body.
struct BodyReader<'a> {
    numbering: &'a NumberingDefinitions,
    styles: &'a StyleNames,
    rels: &'a Relationships,
    items: Vec<BodyItem>,
    tables: Vec<TableState>,
    paragraph: Option<ParagraphState>,
    run: Option<RunState>,
    link: Option<ParsedNode>,
    // Paragraphs opened inside the current one (text boxes).
    nested: usize,
    in_paragraph_props: bool,
    in_run_props: bool,
    in_text: bool,
}

impl<'a> BodyReader<'a> {
    fn new(
        numbering: &'a NumberingDefinitions,
        styles: &'a StyleNames,
        rels: &'a Relationships,
    ) -> Self {
        Self {
            numbering,
            styles,
            rels,
            items: Vec::new(),
            tables: Vec::new(),
            paragraph: None,
            run: None,
            link: None,
            nested: 0,
            in_paragraph_props: false,
            in_run_props: false,
            in_text: false,
        }
    }

    fn read(mut self, xml: &str) -> Result<Vec<BodyItem>> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => self.open(&e, false),
                Event::Empty(e) => self.open(&e, true),
                Event::End(e) => self.close(local_name(e.name().as_ref())),
                Event::Text(t) if self.in_text => {
                    let text = t.unescape()?;
                    if let Some(run) = self.run.as_mut() {
                        run.content.push(ParsedNode::text(text.into_owned()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(self.items)
    }

    fn open(&mut self, e: &BytesStart<'_>, empty: bool) {
        let name = e.name();
        let local = local_name(name.as_ref());
        if self.nested > 0 {
            if local == b"p" && !empty {
                self.nested += 1;
            }
            return;
        }

        match local {
            b"p" if !empty && self.paragraph.is_some() => self.nested = 1,
            b"p" if !empty => self.paragraph = Some(ParagraphState::default()),
            b"pPr" => self.in_paragraph_props = !empty,
            b"pStyle" if self.in_paragraph_props => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.style = attr_val(e, b"val");
                }
            }
            b"outlineLvl" if self.in_paragraph_props => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.outline_level = attr_val(e, b"val").and_then(|v| v.parse().ok());
                }
            }
            b"numId" if self.in_paragraph_props => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.num_id = attr_val(e, b"val");
                }
            }
            b"ilvl" if self.in_paragraph_props => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.ilvl = attr_val(e, b"val").and_then(|v| v.parse().ok()).unwrap_or(0);
                }
            }
            b"r" if !empty => self.run = Some(RunState::default()),
            b"rPr" if self.run.is_some() && !self.in_paragraph_props => {
                self.in_run_props = !empty;
            }
            b"b" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.bold = toggle_on(e);
                }
            }
            b"i" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.italic = toggle_on(e);
                }
            }
            b"t" => self.in_text = !empty && self.run.is_some(),
            b"br" | b"cr" if !self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.content.push(ParsedNode::element("br"));
                }
            }
            b"tab" if !self.in_run_props && !self.in_paragraph_props => {
                if let Some(run) = self.run.as_mut() {
                    run.content.push(ParsedNode::text("\t"));
                }
            }
            b"hyperlink" if !empty => {
                let href = attr_val(e, b"id")
                    .and_then(|id| self.rels.target(&id).map(str::to_string))
                    .or_else(|| attr_val(e, b"anchor").map(|a| format!("#{}", a)));
                let mut link = ParsedNode::element("a");
                if let Some(href) = href {
                    link.set_attr("href", href);
                }
                self.link = Some(link);
            }
            b"tbl" if !empty => self.tables.push(TableState::default()),
            b"tr" if !empty => {
                if let Some(table) = self.tables.last_mut() {
                    table.row = Some(ParsedNode::element("tr"));
                }
            }
            b"tc" if !empty => {
                if let Some(table) = self.tables.last_mut() {
                    table.cell = Some(ParsedNode::element("td"));
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, local: &[u8]) {
        if self.nested > 0 {
            if local == b"p" {
                self.nested -= 1;
            }
            return;
        }

        match local {
            b"pPr" => self.in_paragraph_props = false,
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            b"r" => self.finish_run(),
            b"hyperlink" => {
                if let Some(link) = self.link.take() {
                    if !link.children().is_empty() {
                        if let Some(p) = self.paragraph.as_mut() {
                            p.inlines.push(link);
                        }
                    }
                }
            }
            b"p" => self.finish_paragraph(),
            b"tc" => {
                if let Some(table) = self.tables.last_mut() {
                    if let (Some(cell), Some(row)) = (table.cell.take(), table.row.as_mut()) {
                        row.push_child(cell);
                    }
                }
            }
            b"tr" => {
                if let Some(table) = self.tables.last_mut() {
                    if let Some(row) = table.row.take() {
                        table.rows.push(row);
                    }
                }
            }
            b"tbl" => self.finish_table(),
            _ => {}
        }
    }

    fn finish_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        if run.content.is_empty() {
            return;
        }

        let mut nodes = run.content;
        if run.italic {
            nodes = vec![wrap("em", nodes)];
        }
        if run.bold {
            nodes = vec![wrap("strong", nodes)];
        }

        if let Some(link) = self.link.as_mut() {
            link.children_mut().extend(nodes);
        } else if let Some(p) = self.paragraph.as_mut() {
            p.inlines.extend(nodes);
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(state) = self.paragraph.take() else {
            return;
        };
        let text: String = state.inlines.iter().map(|n| n.full_text()).collect();
        if text.trim().is_empty() {
            return;
        }

        if let Some(cell) = self.tables.last_mut().and_then(|t| t.cell.as_mut()) {
            if !cell.children().is_empty() {
                cell.push_child(ParsedNode::element("br"));
            }
            cell.children_mut().extend(state.inlines);
            return;
        }

        let kind = self.classify(&state);
        self.items.push(BodyItem::Paragraph(Paragraph {
            kind,
            inlines: state.inlines,
        }));
    }

    fn finish_table(&mut self) {
        let Some(table) = self.tables.pop() else {
            return;
        };
        if table.rows.is_empty() {
            return;
        }
        let mut node = ParsedNode::element("table");
        node.children_mut().extend(table.rows);

        match self.tables.last_mut().and_then(|t| t.cell.as_mut()) {
            Some(cell) => cell.push_child(node),
            None => self.items.push(BodyItem::Table(node)),
        }
    }

    fn classify(&self, p: &ParagraphState) -> ParagraphKind {
        let style_id = p.style.as_deref();
        let style_name = style_id.and_then(|id| self.styles.name_of(id));

        if let Some(level) = style_id
            .and_then(heading_level)
            .or_else(|| style_name.and_then(heading_level))
            .or_else(|| p.outline_level.filter(|l| *l < 6).map(|l| l + 1))
        {
            return ParagraphKind::Heading(level);
        }

        if let Some(num_id) = p.num_id.as_deref().filter(|id| *id != "0") {
            return ParagraphKind::ListItem {
                ordered: self.numbering.is_ordered(num_id, p.ilvl),
                level: p.ilvl,
            };
        }

        let normalized = style_id.map(normalize_style);
        match normalized.as_deref() {
            Some("listbullet") => ParagraphKind::ListItem {
                ordered: false,
                level: 0,
            },
            Some("listnumber") => ParagraphKind::ListItem {
                ordered: true,
                level: 0,
            },
            _ => ParagraphKind::Plain,
        }
    }
}

/// `w:b`, `w:i` and friends are on unless `w:val` says otherwise.
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(
        attr_val(e, b"val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

fn normalize_style(style: &str) -> String {
    style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Heading level named by a style id or display name.
fn heading_level(style: &str) -> Option<u8> {
    let normalized = normalize_style(style);
    if normalized == "title" {
        return Some(1);
    }
    let level: u8 = normalized.strip_prefix("heading")?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn wrap(tag: &str, children: Vec<ParsedNode>) -> ParsedNode {
    let mut node = ParsedNode::element(tag);
    node.children_mut().extend(children);
    node
}

fn render_body(items: &[BodyItem]) -> ParsedNode {
    let mut root = ParsedNode::document();
    let mut i = 0;

    while i < items.len() {
        match &items[i] {
            BodyItem::Paragraph(Paragraph {
                kind: ParagraphKind::ListItem { level, .. },
                ..
            }) => {
                let (list, next) = build_list(items, i, *level);
                root.push_child(list);
                i = next;
            }
            BodyItem::Paragraph(p) => {
                let tag = match p.kind {
                    ParagraphKind::Heading(level) => format!("h{}", level),
                    _ => "p".to_string(),
                };
                root.push_child(wrap(&tag, p.inlines.clone()));
                i += 1;
            }
            BodyItem::Table(table) => {
                root.push_child(table.clone());
                i += 1;
            }
        }
    }

    root
}

fn list_info(item: &BodyItem) -> Option<(bool, u32)> {
    match item {
        BodyItem::Paragraph(Paragraph {
            kind: ParagraphKind::ListItem { ordered, level },
            ..
        }) => Some((*ordered, *level)),
        _ => None,
    }
}

/// Build one list starting at `start`, whose first item sits at `level`.
/// Deeper items nest inside the preceding item. Returns the list and the
/// index of the first item not consumed.
fn build_list(items: &[BodyItem], start: usize, level: u32) -> (ParsedNode, usize) {
    let ordered = list_info(&items[start]).map(|(o, _)| o).unwrap_or(false);
    let mut list = ParsedNode::element(if ordered { "ol" } else { "ul" });
    let mut i = start;

    while i < items.len() {
        match list_info(&items[i]) {
            Some((o, l)) if l == level && o == ordered => {
                if let BodyItem::Paragraph(p) = &items[i] {
                    list.push_child(wrap("li", p.inlines.clone()));
                }
                i += 1;
            }
            Some((_, l)) if l > level => {
                let (nested, next) = build_list(items, i, l);
                match list.children_mut().last_mut() {
                    Some(last) => last.push_child(nested),
                    None => list.push_child(wrap("li", vec![nested])),
                }
                i = next;
            }
            _ => break,
        }
    }

    (list, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(inner: &str) -> String {
        format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
            inner
        )
    }

    fn read(inner: &str, numbering: &NumberingDefinitions) -> String {
        let styles = StyleNames::default();
        let rels = Relationships::parse(
            r#"<Relationships><Relationship Id="rId9" Target="https://example.com"/></Relationships>"#,
        )
        .unwrap();
        let items = BodyReader::new(numbering, &styles, &rels)
            .read(&body(inner))
            .unwrap();
        render_body(&items).to_html().unwrap()
    }

    fn para(props: &str, text: &str) -> String {
        format!(
            r#"<w:p><w:pPr>{}</w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            props, text
        )
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let xml = format!(
            "{}{}{}",
            para(r#"<w:pStyle w:val="Heading1"/>"#, "Title"),
            para("", "Body"),
            para(r#"<w:outlineLvl w:val="2"/>"#, "Deep"),
        );
        assert_eq!(
            read(&xml, &NumberingDefinitions::default()),
            "<h1>Title</h1><p>Body</p><h3>Deep</h3>"
        );
    }

    #[test]
    fn test_empty_paragraphs_dropped() {
        let xml = format!("{}<w:p/>{}", para("", "a"), para("", "   "));
        assert_eq!(read(&xml, &NumberingDefinitions::default()), "<p>a</p>");
    }

    #[test]
    fn test_run_formatting_and_breaks() {
        let xml = r#"<w:p>
            <w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r>
            <w:r><w:rPr><w:i/><w:b w:val="0"/></w:rPr><w:t>it</w:t><w:br/><w:t>next</w:t></w:r>
        </w:p>"#;
        assert_eq!(
            read(xml, &NumberingDefinitions::default()),
            "<p><strong>bold</strong><em>it<br>next</em></p>"
        );
    }

    #[test]
    fn test_hyperlink() {
        let xml = r#"<w:p><w:hyperlink r:id="rId9"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>"#;
        assert_eq!(
            read(xml, &NumberingDefinitions::default()),
            r#"<p><a href="https://example.com">site</a></p>"#
        );
    }

    #[test]
    fn test_lists_grouped_and_nested() {
        let numbering = NumberingDefinitions::parse(
            r#"<w:numbering xmlns:w="w">
              <w:abstractNum w:abstractNumId="0">
                <w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/></w:lvl>
                <w:lvl w:ilvl="1"><w:numFmt w:val="decimal"/></w:lvl>
              </w:abstractNum>
              <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
            </w:numbering>"#,
        )
        .unwrap();
        let item = |lvl: u32, text: &str| {
            para(
                &format!(
                    r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="1"/></w:numPr>"#,
                    lvl
                ),
                text,
            )
        };
        let xml = format!(
            "{}{}{}{}",
            item(0, "a"),
            item(1, "a.1"),
            item(0, "b"),
            para("", "after")
        );
        assert_eq!(
            read(&xml, &numbering),
            "<ul><li>a<ol><li>a.1</li></ol></li><li>b</li></ul><p>after</p>"
        );
    }

    #[test]
    fn test_list_styles_without_numbering() {
        let xml = format!(
            "{}{}",
            para(r#"<w:pStyle w:val="ListNumber"/>"#, "one"),
            para(r#"<w:pStyle w:val="ListNumber"/>"#, "two"),
        );
        assert_eq!(
            read(&xml, &NumberingDefinitions::default()),
            "<ol><li>one</li><li>two</li></ol>"
        );
    }

    #[test]
    fn test_table_cells_join_paragraphs() {
        let xml = format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc><w:tc>{}</w:tc></w:tr><w:tr><w:tc><w:p/></w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            para("", "A"),
            para("", "A2"),
            para("", "B"),
            para("", "y"),
        );
        assert_eq!(
            read(&xml, &NumberingDefinitions::default()),
            "<table><tr><td>A<br>A2</td><td>B</td></tr><tr><td></td><td>y</td></tr></table>"
        );
    }

    #[test]
    fn test_text_box_keeps_surrounding_text() {
        let xml = r#"<w:p>
            <w:r><w:t>Before </w:t></w:r>
            <w:r><w:pict><v:shape><v:textbox><w:txbxContent>
                <w:p><w:r><w:t>Box</w:t></w:r></w:p>
                <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Inner</w:t></w:r></w:p>
            </w:txbxContent></v:textbox></v:shape></w:pict></w:r>
            <w:r><w:rPr><w:b/></w:rPr><w:t>After</w:t></w:r>
        </w:p>"#;
        assert_eq!(
            read(xml, &NumberingDefinitions::default()),
            "<p>Before <strong>After</strong></p>"
        );
    }

    #[test]
    fn test_alternate_content_inside_table_cell() {
        let xml = format!(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r><w:r><mc:AlternateContent><mc:Choice><w:drawing><w:txbxContent><w:p><w:r><w:t>Choice</w:t></w:r></w:p></w:txbxContent></w:drawing></mc:Choice><mc:Fallback><w:pict><w:txbxContent><w:p><w:r><w:t>Fallback</w:t></w:r></w:p></w:txbxContent></w:pict></mc:Fallback></mc:AlternateContent></w:r></w:p></w:tc></w:tr></w:tbl>{}"#,
            para("", "after")
        );
        assert_eq!(
            read(&xml, &NumberingDefinitions::default()),
            "<table><tr><td>Cell</td></tr></table><p>after</p>"
        );
    }

    #[test]
    fn test_heading_level_from_style_name() {
        assert_eq!(heading_level("Heading2"), Some(2));
        assert_eq!(heading_level("heading 3"), Some(3));
        assert_eq!(heading_level("Title"), Some(1));
        assert_eq!(heading_level("Heading9"), None);
        assert_eq!(heading_level("Normal"), None);
    }
}
