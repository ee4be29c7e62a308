//! DOCX styles parsing.
//!
//! Besides names, the `basedOn` chain and outline levels (used to classify
//! headings), the map resolves formatting inheritance once per decode:
//! `w:docDefaults`, then each style's chain from its root down. Paragraph
//! decoding later layers the character style and direct formatting on top.

use super::properties::{
    apply_paragraph_properties, apply_run_properties, list_reference, run_properties,
    RunProperty,
};
use super::theme::Theme;
use crate::model::{ParagraphProperties, TextStyle};
use crate::xml::{ns, Node, XmlDocument};
use std::collections::HashMap;

/// Longest `basedOn` chain followed; deeper (or cyclic) chains are cut.
const MAX_CHAIN: usize = 10;

/// Style type (paragraph, character, table, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "paragraph" => Some(StyleType::Paragraph),
            "character" => Some(StyleType::Character),
            "table" => Some(StyleType::Table),
            "numbering" => Some(StyleType::Numbering),
            _ => None,
        }
    }
}

/// A parsed style definition.
#[derive(Debug, Clone, Default)]
pub struct Style {
    /// Style ID (e.g., "Heading1")
    pub id: String,
    /// Style name (e.g., "heading 1")
    pub name: String,
    /// Style type
    pub style_type: Option<StyleType>,
    /// Based on another style
    pub based_on: Option<String>,
    /// Outline level (0-based, 9 = body text)
    pub outline_level: Option<u8>,
    /// Character properties of the whole `basedOn` chain, root first
    pub run_properties: Vec<RunProperty>,
    /// Paragraph properties over the document defaults, chain applied
    pub paragraph_properties: ParagraphProperties,
    /// List membership declared by the style or one it is based on
    pub numbering: Option<(String, u8)>,
}

/// Collection of styles from styles.xml.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    /// Styles by ID
    pub styles: HashMap<String, Style>,
    /// `w:rPrDefault`
    pub default_run: Vec<RunProperty>,
    /// `w:pPrDefault`
    pub default_paragraph: ParagraphProperties,
    /// Paragraph style marked `w:default="1"`
    pub default_paragraph_style: Option<String>,
}

/// Lowercase and drop whitespace: "Heading 1" and "heading1" compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Heading level implied by a normalised style id or name.
fn level_from_name(normalized: &str) -> Option<u8> {
    if normalized == "title" {
        return Some(1);
    }
    let digits = normalized
        .strip_prefix("heading")
        .or_else(|| normalized.strip_prefix('h'))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let level: u8 = digits.parse().ok()?;
    (level >= 1).then(|| level.min(6))
}

/// Ids of a style's `basedOn` chain, root first, ending with `id` itself.
fn chain<'s>(styles: &'s HashMap<String, Style>, id: &'s str) -> Vec<&'s str> {
    let mut ids = vec![id];
    let mut current = styles.get(id).and_then(|s| s.based_on.as_deref());
    while let Some(base) = current {
        if ids.len() > MAX_CHAIN || ids.contains(&base) {
            log::debug!("style {}: basedOn chain cut at {}", id, base);
            break;
        }
        ids.push(base);
        current = styles.get(base).and_then(|s| s.based_on.as_deref());
    }
    ids.reverse();
    ids
}

impl StyleMap {
    /// Build from a parsed styles part, without theme references.
    pub fn parse(doc: &XmlDocument) -> Self {
        Self::parse_with_theme(doc, None)
    }

    /// Build from a parsed styles part. Theme colors and fonts referenced by
    /// style run properties resolve against `theme`.
    pub fn parse_with_theme(doc: &XmlDocument, theme: Option<&Theme>) -> Self {
        let mut map = StyleMap::default();
        let root = doc.root();

        if let Some(defaults) = root.child(ns::W, "docDefaults") {
            if let Some(rpr) = defaults
                .child(ns::W, "rPrDefault")
                .and_then(|d| d.child(ns::W, "rPr"))
            {
                map.default_run = run_properties(rpr, theme);
            }
            if let Some(ppr) = defaults
                .child(ns::W, "pPrDefault")
                .and_then(|d| d.child(ns::W, "pPr"))
            {
                apply_paragraph_properties(&mut map.default_paragraph, ppr);
            }
        }

        let mut nodes: HashMap<String, Node<'_>> = HashMap::new();
        for node in root.children_named(ns::W, "style") {
            let Some(id) = node.attr(ns::W, "styleId") else {
                continue;
            };
            let name = node
                .child(ns::W, "name")
                .and_then(|n| n.attr(ns::W, "val"))
                .unwrap_or(id);
            let outline_level = node
                .child(ns::W, "pPr")
                .and_then(|p| p.child(ns::W, "outlineLvl"))
                .and_then(|o| o.attr(ns::W, "val"))
                .and_then(|v| v.parse().ok());
            let style_type = node.attr(ns::W, "type").and_then(StyleType::parse);

            if style_type == Some(StyleType::Paragraph)
                && matches!(node.attr(ns::W, "default"), Some("1" | "true" | "on"))
            {
                map.default_paragraph_style = Some(id.to_string());
            }

            nodes.insert(id.to_string(), node);
            map.styles.insert(
                id.to_string(),
                Style {
                    id: id.to_string(),
                    name: name.to_string(),
                    style_type,
                    based_on: node
                        .child(ns::W, "basedOn")
                        .and_then(|b| b.attr(ns::W, "val"))
                        .map(str::to_string),
                    outline_level,
                    ..Default::default()
                },
            );
        }

        let mut resolved = Vec::with_capacity(map.styles.len());
        for id in map.styles.keys() {
            let mut runs = Vec::new();
            let mut paragraph = map.default_paragraph.clone();
            let mut numbering = None;
            for link in chain(&map.styles, id) {
                let Some(node) = nodes.get(link) else {
                    continue;
                };
                if let Some(rpr) = node.child(ns::W, "rPr") {
                    runs.extend(run_properties(rpr, theme));
                }
                if let Some(ppr) = node.child(ns::W, "pPr") {
                    apply_paragraph_properties(&mut paragraph, ppr);
                    if ppr.child(ns::W, "numPr").is_some() {
                        numbering = list_reference(ppr);
                    }
                }
            }
            paragraph.style_id = None;
            resolved.push((id.clone(), runs, paragraph, numbering));
        }
        for (id, runs, paragraph, numbering) in resolved {
            if let Some(style) = map.styles.get_mut(&id) {
                style.run_properties = runs;
                style.paragraph_properties = paragraph;
                style.numbering = numbering;
            }
        }

        map
    }

    /// The paragraph style a paragraph uses: the named one, or the default
    /// paragraph style when the name is absent or unknown.
    fn paragraph_style(&self, style_id: Option<&str>) -> Option<&Style> {
        style_id
            .and_then(|id| self.styles.get(id))
            .or_else(|| {
                self.default_paragraph_style
                    .as_deref()
                    .and_then(|id| self.styles.get(id))
            })
    }

    /// Paragraph properties inherited from the defaults and the paragraph
    /// style chain. `style_id` is left unset.
    pub fn paragraph_properties(&self, style_id: Option<&str>) -> ParagraphProperties {
        self.paragraph_style(style_id)
            .map(|s| s.paragraph_properties.clone())
            .unwrap_or_else(|| self.default_paragraph.clone())
    }

    /// Run formatting every run of a paragraph starts from: the document
    /// defaults with the paragraph style chain's character properties on top.
    pub fn paragraph_run_style(&self, style_id: Option<&str>) -> TextStyle {
        let mut style = TextStyle::default();
        apply_run_properties(&mut style, &self.default_run);
        if let Some(paragraph_style) = self.paragraph_style(style_id) {
            apply_run_properties(&mut style, &paragraph_style.run_properties);
        }
        style
    }

    /// Character properties of a character style (`w:rStyle`), chain
    /// included. Unknown ids have none.
    pub fn character_properties(&self, style_id: &str) -> &[RunProperty] {
        self.styles
            .get(style_id)
            .map(|s| s.run_properties.as_slice())
            .unwrap_or_default()
    }

    /// List membership a paragraph inherits from its style.
    pub fn style_numbering(&self, style_id: Option<&str>) -> Option<(String, u8)> {
        self.paragraph_style(style_id)?.numbering.clone()
    }

    /// Get a style by ID, inheriting the outline level through `basedOn`.
    pub fn get_resolved(&self, id: &str) -> Option<Style> {
        let mut style = self.styles.get(id)?.clone();

        let mut depth = 0;
        let mut current_based_on = style.based_on.clone();
        while let Some(ref base_id) = current_based_on {
            if depth > MAX_CHAIN || style.outline_level.is_some() {
                break;
            }
            match self.styles.get(base_id) {
                Some(base) => {
                    style.outline_level = base.outline_level;
                    current_based_on = base.based_on.clone();
                }
                None => break,
            }
            depth += 1;
        }

        Some(style)
    }

    /// Heading level (1-6) implied by a paragraph style, if any.
    ///
    /// The style id or name decides first (`title`, `headingN`, `hN`);
    /// otherwise an inherited outline level below 9 maps to level + 1.
    pub fn heading_level(&self, style_id: &str) -> Option<u8> {
        let style = self.get_resolved(style_id);
        let name = style.as_ref().map(|s| s.name.as_str());

        for candidate in std::iter::once(style_id).chain(name) {
            let normalized = normalize(candidate);
            if normalized == "subtitle" || normalized == "header" {
                return None;
            }
            if let Some(level) = level_from_name(&normalized) {
                return Some(level);
            }
        }

        style
            .and_then(|s| s.outline_level)
            .and_then(outline_to_heading)
    }

    /// Outline level of a style after inheritance.
    pub fn outline_level(&self, style_id: &str) -> Option<u8> {
        self.get_resolved(style_id)?.outline_level
    }
}

/// Map a 0-based outline level to a heading level; 9 means body text.
pub fn outline_to_heading(level: u8) -> Option<u8> {
    (level < 9).then(|| (level + 1).min(6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_xml;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:style w:type="paragraph" w:styleId="Normal">
        <w:name w:val="Normal"/>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Title">
        <w:name w:val="Title"/>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Subtitle">
        <w:name w:val="Subtitle"/>
        <w:pPr><w:outlineLvl w:val="1"/></w:pPr>
    </w:style>
    <w:style w:type="paragraph" w:styleId="1">
        <w:name w:val="heading 1"/>
        <w:basedOn w:val="Normal"/>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Chapter">
        <w:name w:val="Chapter"/>
        <w:pPr><w:outlineLvl w:val="2"/></w:pPr>
    </w:style>
    <w:style w:type="paragraph" w:styleId="ChapterLead">
        <w:name w:val="Chapter Lead"/>
        <w:basedOn w:val="Chapter"/>
    </w:style>
    <w:style w:type="paragraph" w:styleId="BodyOutline">
        <w:name w:val="Body Outline"/>
        <w:pPr><w:outlineLvl w:val="9"/></w:pPr>
    </w:style>
</w:styles>"#;

    #[test]
    fn test_parse_styles() {
        let map = StyleMap::parse(&parse_xml(STYLES).unwrap());
        let style = map.styles.get("1").unwrap();
        assert_eq!(style.name, "heading 1");
        assert_eq!(style.based_on.as_deref(), Some("Normal"));
        assert_eq!(style.style_type, Some(StyleType::Paragraph));
    }

    #[test]
    fn test_heading_level_from_names() {
        let map = StyleMap::parse(&parse_xml(STYLES).unwrap());
        assert_eq!(map.heading_level("Title"), Some(1));
        assert_eq!(map.heading_level("1"), Some(1));
        assert_eq!(map.heading_level("Heading3"), Some(3));
        assert_eq!(map.heading_level("H2"), Some(2));
        assert_eq!(map.heading_level("Heading9"), Some(6));
        assert_eq!(map.heading_level("Normal"), None);
        assert_eq!(map.heading_level("Header"), None);
        assert_eq!(map.heading_level("Subtitle"), None);
    }

    #[test]
    fn test_heading_level_from_outline() {
        let map = StyleMap::parse(&parse_xml(STYLES).unwrap());
        assert_eq!(map.heading_level("Chapter"), Some(3));
        assert_eq!(map.heading_level("ChapterLead"), Some(3));
        assert_eq!(map.heading_level("BodyOutline"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Heading 1"), "heading1");
        assert_eq!(level_from_name("hx"), None);
        assert_eq!(level_from_name("heading"), None);
        assert_eq!(level_from_name("h0"), None);
    }

    const CASCADE: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:docDefaults>
        <w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault>
        <w:pPrDefault><w:pPr><w:spacing w:after="160"/></w:pPr></w:pPrDefault>
    </w:docDefaults>
    <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
        <w:name w:val="Normal"/>
        <w:pPr><w:jc w:val="both"/></w:pPr>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Big">
        <w:name w:val="Big"/>
        <w:basedOn w:val="Normal"/>
        <w:pPr><w:spacing w:before="240"/><w:numPr><w:numId w:val="3"/></w:numPr></w:pPr>
        <w:rPr><w:sz w:val="48"/><w:i/></w:rPr>
    </w:style>
    <w:style w:type="paragraph" w:styleId="Bigger">
        <w:name w:val="Bigger"/>
        <w:basedOn w:val="Big"/>
        <w:rPr><w:i w:val="0"/></w:rPr>
    </w:style>
    <w:style w:type="character" w:styleId="Strong">
        <w:name w:val="Strong"/>
        <w:rPr><w:b/></w:rPr>
    </w:style>
    <w:style w:type="paragraph" w:styleId="LoopA"><w:basedOn w:val="LoopB"/><w:rPr><w:b/></w:rPr></w:style>
    <w:style w:type="paragraph" w:styleId="LoopB"><w:basedOn w:val="LoopA"/></w:style>
</w:styles>"#;

    #[test]
    fn test_defaults_and_paragraph_style_chain() {
        let map = StyleMap::parse(&parse_xml(CASCADE).unwrap());
        assert_eq!(map.default_paragraph_style.as_deref(), Some("Normal"));

        let style = map.paragraph_run_style(Some("Bigger"));
        assert_eq!(style.font_family.as_deref(), Some("Calibri"));
        assert_eq!(style.font_size, Some(24.0));
        assert!(!style.italic);
        assert!(map.paragraph_run_style(Some("Big")).italic);

        let props = map.paragraph_properties(Some("Bigger"));
        let spacing = props.spacing.unwrap();
        assert_eq!((spacing.before, spacing.after), (Some(240), Some(160)));
        assert_eq!(props.alignment, Some(crate::model::TextAlignment::Justify));
        assert!(props.style_id.is_none());
    }

    #[test]
    fn test_default_paragraph_style_fallback() {
        let map = StyleMap::parse(&parse_xml(CASCADE).unwrap());
        let unstyled = map.paragraph_properties(None);
        assert_eq!(unstyled.alignment, Some(crate::model::TextAlignment::Justify));
        let unknown = map.paragraph_properties(Some("Missing"));
        assert_eq!(unknown.alignment, Some(crate::model::TextAlignment::Justify));
        assert_eq!(map.paragraph_run_style(None).font_size, Some(11.0));

        let bare = StyleMap::default();
        assert_eq!(bare.paragraph_properties(None), ParagraphProperties::default());
        assert_eq!(bare.paragraph_run_style(None), TextStyle::default());
    }

    #[test]
    fn test_character_style_over_paragraph_style() {
        let map = StyleMap::parse(&parse_xml(CASCADE).unwrap());
        let mut style = map.paragraph_run_style(Some("Big"));
        apply_run_properties(&mut style, map.character_properties("Strong"));
        assert!(style.bold);
        assert_eq!(style.font_size, Some(24.0));
        assert!(map.character_properties("Nope").is_empty());
    }

    #[test]
    fn test_style_numbering_inherited() {
        let map = StyleMap::parse(&parse_xml(CASCADE).unwrap());
        assert_eq!(map.style_numbering(Some("Bigger")), Some(("3".to_string(), 0)));
        assert_eq!(map.style_numbering(Some("Normal")), None);
    }

    #[test]
    fn test_cyclic_chain_is_cut() {
        let map = StyleMap::parse(&parse_xml(CASCADE).unwrap());
        assert!(map.paragraph_run_style(Some("LoopB")).bold);
        assert_eq!(chain(&map.styles, "LoopA"), vec!["LoopB", "LoopA"]);
    }
}
