//! Inline content of a paragraph: runs, fields, links and drawings.
//!
//! Runs can sit at any depth below the paragraph (hyperlinks, content
//! controls, smart tags, tracked insertions). They are reached with an
//! explicit worklist so document order is kept without recursion.

use super::field::{simple_field, FieldTracker};
use super::field_lookup::{FieldLookup, FormulaScope};
use super::part::PartParser;
use super::properties::{apply_run_properties, child_val, run_properties};
use crate::error::Error;
use crate::model::{Field, NoteKind, NoteReference, TextRun, TextStyle};
use crate::relationships::kind;
use crate::xml::{ns, Node};

/// What a paragraph's inline walk produced.
#[derive(Debug, Default)]
pub struct InlineContent {
    pub runs: Vec<TextRun>,
    pub fields: Vec<Field>,
    /// A `w:br w:type="page"` was met
    pub page_break: bool,
}

/// Containers whose children are walked as if they sat in the paragraph.
const TRANSPARENT: &[&str] = &["smartTag", "ins", "customXml", "moveTo", "dir", "bdo"];

/// Run-level state of one paragraph walk.
struct RunCollector<'c> {
    content: InlineContent,
    tracker: FieldTracker,
    lookup: &'c FieldLookup,
    /// Neighbour cells, when the paragraph sits in a table cell
    scope: Option<&'c FormulaScope>,
}

impl RunCollector<'_> {
    /// Emit text as a run, unless an open field absorbs it.
    fn text(&mut self, text: String, style: &TextStyle, hyperlink: Option<&str>) {
        if text.is_empty() || self.tracker.text(&text, style) {
            return;
        }
        self.content.runs.push(TextRun {
            text,
            style: style.clone(),
            hyperlink: hyperlink.map(str::to_string),
            ..Default::default()
        });
    }

    /// Record a completed field. A field with no (or an empty) cached
    /// result displays its stand-in text, if the lookup has one; the
    /// field's own `result` is left as decoded.
    fn push_field(&mut self, field: Field, mut run: TextRun) {
        let stand_in = self.lookup.stand_in(&field, self.scope);
        if field.result.as_deref().is_none_or(str::is_empty) {
            if let Some(text) = stand_in {
                run.text = text;
            }
        }
        self.content.fields.push(field);
        self.content.runs.push(run);
    }

    fn field_end(&mut self) {
        if let Some((field, run)) = self.tracker.end() {
            self.push_field(field, run);
        }
    }

    fn finish(mut self) -> InlineContent {
        if let Some((field, run)) = self.tracker.finish() {
            self.push_field(field, run);
        }
        self.content
    }
}

impl PartParser<'_> {
    /// Walk a paragraph's inline content in document order.
    ///
    /// Every run starts from the paragraph style's formatting, then its
    /// character style (`w:rStyle`), then its own `w:rPr`.
    pub fn parse_inline(&self, paragraph: Node<'_>) -> InlineContent {
        let mut collector = RunCollector {
            content: InlineContent::default(),
            tracker: FieldTracker::new(),
            lookup: &self.ctx.fields,
            scope: self.formula_scopes.last(),
        };
        let style_id = paragraph
            .child(ns::W, "pPr")
            .and_then(|pr| child_val(pr, "pStyle"));
        let base = self.ctx.styles.paragraph_run_style(style_id);

        let mut stack: Vec<(Node<'_>, Option<String>)> = paragraph
            .children()
            .map(|n| (n, None))
            .collect();
        stack.reverse();

        while let Some((node, link)) = stack.pop() {
            if node.namespace().is_some_and(|n| n != ns::W) {
                continue;
            }
            match node.local_name() {
                "r" => self.parse_run(node, link.as_deref(), &base, &mut collector),
                "hyperlink" => {
                    let target = self.hyperlink_target(node).or(link);
                    push_children(&mut stack, node, target);
                }
                "fldSimple" => {
                    self.parse_simple_field(node, link.as_deref(), &base, &mut collector)
                }
                "sdt" => {
                    if let Some(content) = node.child(ns::W, "sdtContent") {
                        push_children(&mut stack, content, link);
                    }
                }
                name if TRANSPARENT.contains(&name) => push_children(&mut stack, node, link),
                // Deleted text is not part of the current document.
                _ => {}
            }
        }

        collector.finish()
    }

    /// Target of a `w:hyperlink`: the relationship target, or `#anchor` for
    /// an internal link.
    fn hyperlink_target(&self, node: Node<'_>) -> Option<String> {
        let anchor = node.attr(ns::W, "anchor").filter(|a| !a.is_empty());
        if let Some(id) = node.attr(ns::R, "id") {
            match self.rels.get_of_kind(id, kind::HYPERLINK) {
                Some(rel) => {
                    return Some(match anchor {
                        Some(anchor) => format!("{}#{}", rel.target, anchor),
                        None => rel.target.clone(),
                    })
                }
                None => log::warn!(
                    "{}: hyperlink kept without target: {}",
                    self.part_path,
                    Error::ReferenceNotFound(id.to_string())
                ),
            }
        }
        anchor.map(|a| format!("#{}", a))
    }

    /// Layer a run's character style and direct formatting over `base`.
    fn run_style(&self, rpr: Option<Node<'_>>, base: &TextStyle) -> TextStyle {
        let mut style = base.clone();
        if let Some(rpr) = rpr {
            if let Some(id) = child_val(rpr, "rStyle") {
                apply_run_properties(&mut style, self.ctx.styles.character_properties(id));
            }
            apply_run_properties(&mut style, &run_properties(rpr, self.ctx.theme));
        }
        style
    }

    fn parse_run(
        &self,
        run: Node<'_>,
        link: Option<&str>,
        base: &TextStyle,
        out: &mut RunCollector<'_>,
    ) {
        let style = self.run_style(run.child(ns::W, "rPr"), base);
        let mut pending = String::new();

        for child in run.children() {
            match child.local_name() {
                "t" => pending.push_str(&child.text()),
                "tab" | "ptab" => pending.push('\t'),
                "br" => match child.attr(ns::W, "type") {
                    Some("page") => out.content.page_break = true,
                    _ => pending.push('\n'),
                },
                "cr" => pending.push('\n'),
                "noBreakHyphen" => pending.push('-'),
                "sym" => {
                    if let Some(c) = child.attr(ns::W, "char").and_then(symbol_char) {
                        pending.push(c);
                    }
                }
                "fldChar" => {
                    out.text(std::mem::take(&mut pending), &style, link);
                    match child.attr(ns::W, "fldCharType") {
                        Some("begin") => out.tracker.begin(&style, link),
                        Some("separate") => out.tracker.separate(),
                        Some("end") => out.field_end(),
                        _ => {}
                    }
                }
                "instrText" => out.tracker.instruction(&child.text()),
                "drawing" => {
                    out.text(std::mem::take(&mut pending), &style, link);
                    if let Some(image) = self.images().from_drawing(child) {
                        out.content.runs.push(image_run(image, &style, link));
                    }
                }
                "pict" | "object" => {
                    out.text(std::mem::take(&mut pending), &style, link);
                    if let Some(image) = child
                        .descendant(ns::VML, "imagedata")
                        .and_then(|data| self.images().from_vml(data))
                    {
                        out.content.runs.push(image_run(image, &style, link));
                    }
                }
                "footnoteReference" | "endnoteReference" => {
                    out.text(std::mem::take(&mut pending), &style, link);
                    let kind = if child.local_name() == "footnoteReference" {
                        NoteKind::Footnote
                    } else {
                        NoteKind::Endnote
                    };
                    if let Some(id) = child.attr(ns::W, "id") {
                        out.content.runs.push(note_run(kind, id, &style));
                    }
                }
                _ => {}
            }
        }

        out.text(pending, &style, link);
    }

    /// `w:fldSimple`: its runs' text is the cached result.
    fn parse_simple_field(
        &self,
        node: Node<'_>,
        link: Option<&str>,
        base: &TextStyle,
        out: &mut RunCollector<'_>,
    ) {
        let style = self.run_style(node.descendant(ns::W, "rPr"), base);
        let result: String = node
            .descendants_named(ns::W, "t")
            .iter()
            .map(|t| t.text())
            .collect();

        if out.tracker.is_active() {
            out.text(result, &style, link);
            return;
        }

        let instruction = node.attr(ns::W, "instr").unwrap_or_default();
        let (field, mut run) = simple_field(instruction, result, style);
        if run.hyperlink.is_none() {
            run.hyperlink = link.map(str::to_string);
        }
        out.push_field(field, run);
    }
}

fn push_children<'a>(
    stack: &mut Vec<(Node<'a>, Option<String>)>,
    node: Node<'a>,
    link: Option<String>,
) {
    let start = stack.len();
    stack.extend(node.children().map(|n| (n, link.clone())));
    stack[start..].reverse();
}

fn image_run(image: crate::model::Image, style: &TextStyle, link: Option<&str>) -> TextRun {
    let mut run = TextRun::with_image(image, style.clone());
    run.hyperlink = link.map(str::to_string);
    run
}

fn note_run(kind: NoteKind, id: &str, style: &TextStyle) -> TextRun {
    let mut style = style.clone();
    style.superscript = true;
    style.subscript = false;
    TextRun {
        text: id.to_string(),
        style,
        note_reference: Some(NoteReference {
            kind,
            id: id.to_string(),
        }),
        ..Default::default()
    }
}

/// `w:sym` code point. Symbol fonts map glyphs into the private-use range
/// F000-F0FF; the low byte is the actual character.
fn symbol_char(hex: &str) -> Option<char> {
    let code = u32::from_str_radix(hex, 16).ok()?;
    let code = if (0xF000..=0xF0FF).contains(&code) {
        code - 0xF000
    } else {
        code
    };
    char::from_u32(code).filter(|c| !c.is_control())
}

#[cfg(test)]
mod tests {
    use super::super::part::test_support::*;
    use super::super::part::DecodeContext;
    use super::super::styles::StyleMap;
    use super::*;
    use crate::model::{Bookmark, FieldType, Metadata};
    use crate::options::DecodeOptions;
    use crate::xml::parse_xml;

    const DOC_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
        <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
    </Relationships>"#;

    fn inline(paragraph: &str) -> InlineContent {
        inline_with(paragraph, FieldLookup::default())
    }

    fn inline_with(paragraph: &str, fields: FieldLookup) -> InlineContent {
        let container = container(&[
            ("word/document.xml", "<x/>"),
            ("word/_rels/document.xml.rels", DOC_RELS),
        ]);
        let options = DecodeOptions::default();
        let styles = StyleMap::default();
        let ctx = DecodeContext {
            fields,
            ..DecodeContext::new(&container, &options, &styles)
        };
        let parser = PartParser::for_part(&ctx, "word/document.xml");
        let xml = format!("<w:p {}>{}</w:p>", W_NS, paragraph);
        let doc = parse_xml(&xml).unwrap();
        parser.parse_inline(doc.root())
    }

    fn texts(content: &InlineContent) -> Vec<&str> {
        content.runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_formtext_field() {
        let content = inline(
            r#"<w:r><w:t xml:space="preserve">Name: </w:t></w:r>
               <w:r><w:fldChar w:fldCharType="begin"/></w:r>
               <w:r><w:instrText xml:space="preserve"> FORMTEXT "Enter your name" </w:instrText></w:r>
               <w:r><w:fldChar w:fldCharType="separate"/></w:r>
               <w:r><w:rPr><w:b/></w:rPr><w:t>John Doe</w:t></w:r>
               <w:r><w:fldChar w:fldCharType="end"/></w:r>"#,
        );
        assert_eq!(texts(&content), vec!["Name: ", "John Doe"]);
        assert_eq!(content.fields.len(), 1);
        let field = &content.fields[0];
        assert_eq!(field.field_type, FieldType::FormText);
        assert_eq!(field.result.as_deref(), Some("John Doe"));
        assert_eq!(field.property("defaultText"), Some("Enter your name"));
        assert!(content.runs[1].style.bold);
        assert_eq!(content.runs[1].field_code, Some(FieldType::FormText));
    }

    #[test]
    fn test_consecutive_fields_and_text_around() {
        let content = inline(
            r#"<w:r><w:t>Page </w:t></w:r>
               <w:r><w:fldChar w:fldCharType="begin"/><w:instrText>PAGE</w:instrText><w:fldChar w:fldCharType="separate"/><w:t>3</w:t><w:fldChar w:fldCharType="end"/></w:r>
               <w:r><w:t> of </w:t></w:r>
               <w:r><w:fldChar w:fldCharType="begin"/><w:instrText>NUMPAGES</w:instrText><w:fldChar w:fldCharType="end"/></w:r>
               <w:r><w:t>.</w:t></w:r>"#,
        );
        assert_eq!(texts(&content), vec!["Page ", "3", " of ", "", "."]);
        assert_eq!(content.fields[0].field_type, FieldType::Page);
        assert_eq!(content.fields[1].field_type, FieldType::NumPages);
        assert!(content.fields[1].result.is_none());
    }

    #[test]
    fn test_hyperlinks() {
        let content = inline(
            r##"<w:r><w:t>See </w:t></w:r>
               <w:hyperlink r:id="rId5"><w:r><w:t>site</w:t></w:r></w:hyperlink>
               <w:hyperlink w:anchor="_Toc1"><w:smartTag><w:r><w:t>intro</w:t></w:r></w:smartTag></w:hyperlink>
               <w:hyperlink r:id="rId404"><w:r><w:t>broken</w:t></w:r></w:hyperlink>"##,
        );
        assert_eq!(texts(&content), vec!["See ", "site", "intro", "broken"]);
        assert_eq!(content.runs[0].hyperlink, None);
        assert_eq!(content.runs[1].hyperlink.as_deref(), Some("https://example.com"));
        assert_eq!(content.runs[2].hyperlink.as_deref(), Some("#_Toc1"));
        assert_eq!(content.runs[3].hyperlink, None);
    }

    #[test]
    fn test_containers_and_deletions() {
        let content = inline(
            r#"<w:sdt><w:sdtPr/><w:sdtContent><w:r><w:t>a</w:t></w:r></w:sdtContent></w:sdt>
               <w:ins><w:r><w:t>b</w:t></w:r></w:ins>
               <w:del><w:r><w:delText>gone</w:delText></w:r></w:del>
               <w:customXml><w:r><w:t>c</w:t></w:r></w:customXml>"#,
        );
        assert_eq!(texts(&content), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_simple_field() {
        let content = inline(
            r#"<w:fldSimple w:instr=" AUTHOR \* MERGEFORMAT "><w:r><w:t>Jane</w:t></w:r></w:fldSimple>"#,
        );
        assert_eq!(texts(&content), vec!["Jane"]);
        assert_eq!(content.fields[0].field_type, FieldType::Author);
        assert_eq!(content.fields[0].property("*"), Some("MERGEFORMAT"));
    }

    #[test]
    fn test_breaks_tabs_and_symbols() {
        let content = inline(
            r#"<w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t><w:br w:type="page"/><w:sym w:font="Symbol" w:char="F041"/></w:r>"#,
        );
        assert_eq!(texts(&content), vec!["a\tb\ncA"]);
        assert!(content.page_break);
    }

    #[test]
    fn test_note_references() {
        let content = inline(
            r#"<w:r><w:t>Claim</w:t></w:r><w:r><w:rPr><w:rStyle w:val="FootnoteReference"/></w:rPr><w:footnoteReference w:id="2"/></w:r>
               <w:r><w:endnoteReference w:id="1"/></w:r>"#,
        );
        assert_eq!(texts(&content), vec!["Claim", "2", "1"]);
        let note = content.runs[1].note_reference.as_ref().unwrap();
        assert_eq!(note.kind, NoteKind::Footnote);
        assert!(content.runs[1].style.superscript);
        assert_eq!(
            content.runs[2].note_reference.as_ref().unwrap().kind,
            NoteKind::Endnote
        );
    }

    #[test]
    fn test_unclosed_field_is_flushed() {
        let content = inline(
            r#"<w:r><w:fldChar w:fldCharType="begin"/><w:instrText>DATE \@ "yyyy"</w:instrText><w:fldChar w:fldCharType="separate"/><w:t>2024</w:t></w:r>"#,
        );
        assert_eq!(texts(&content), vec!["2024"]);
        assert_eq!(content.fields[0].property("@"), Some("yyyy"));
    }

    #[test]
    fn test_uncached_fields_show_stand_in_text() {
        let bookmarks = vec![Bookmark {
            id: "0".into(),
            name: "_Ref7".into(),
            text: Some("Table 2".into()),
        }];
        let metadata = Metadata {
            title: Some("Quarterly".into()),
            ..Default::default()
        };
        let content = inline_with(
            r#"<w:r><w:t>See </w:t></w:r>
               <w:r><w:fldChar w:fldCharType="begin"/><w:instrText>REF _Ref7 \h</w:instrText><w:fldChar w:fldCharType="end"/></w:r>
               <w:r><w:fldChar w:fldCharType="begin"/><w:instrText>SEQ Figure</w:instrText><w:fldChar w:fldCharType="separate"/><w:t>1</w:t><w:fldChar w:fldCharType="end"/></w:r>
               <w:r><w:fldChar w:fldCharType="begin"/><w:instrText>SEQ Figure</w:instrText><w:fldChar w:fldCharType="end"/></w:r>
               <w:fldSimple w:instr=" TITLE "/>
               <w:r><w:fldChar w:fldCharType="begin"/><w:instrText>PAGE</w:instrText><w:fldChar w:fldCharType="end"/></w:r>"#,
            FieldLookup::new(&bookmarks, &metadata),
        );
        assert_eq!(texts(&content), vec!["See ", "Table 2", "1", "2", "Quarterly", ""]);
        assert!(content.fields[0].result.is_none());
        assert_eq!(content.fields[1].result.as_deref(), Some("1"));
        assert!(content.fields[2].result.is_none());
    }
}
