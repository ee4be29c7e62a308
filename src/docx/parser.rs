//! DOCX parser implementation.

use std::path::Path;

use super::bookmark::parse_bookmarks;
use super::field_lookup::FieldLookup;
use super::header_footer::{parse_side, Side};
use super::metadata::{apply_app, apply_core, APP_PART, CORE_PART};
use super::notes::{default_part, parse_notes};
use super::numbering::parse_numbering;
use super::part::{DecodeContext, PartParser};
use super::styles::StyleMap;
use super::theme::Theme;
use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use crate::model::{Document, Element, Metadata, NoteKind, NumberingDefinition};
use crate::options::DecodeOptions;
use crate::relationships::{kind, Relationships};
use crate::xml::{ns, parse_xml, XmlDocument};

/// Path of the main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Parser for DOCX (Word) documents.
pub struct DocxParser {
    container: OoxmlContainer,
    options: DecodeOptions,
    relationships: Relationships,
    theme: Option<Theme>,
    styles: StyleMap,
    numbering: Option<NumberingDefinition>,
}

impl DocxParser {
    /// Open a DOCX file for parsing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Create a parser from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    /// Replace the decode options.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Create a parser from a container.
    ///
    /// Only the main document part is required; the theme, styles, numbering
    /// and the document relationships degrade to empty when missing or
    /// malformed. The theme is read first so styles can refer to it.
    fn from_container(container: OoxmlContainer) -> Result<Self> {
        if !container.exists(DOCUMENT_PART) {
            return Err(Error::MissingComponent(DOCUMENT_PART.to_string()));
        }

        let relationships = Relationships::load(&container, DOCUMENT_PART).unwrap_or_else(|e| {
            log::warn!("{}: ignoring relationships: {}", DOCUMENT_PART, e);
            Relationships::new()
        });

        let theme_path = related_part(&relationships, kind::THEME, "word/theme/theme1.xml");
        let theme = with_optional_part(&container, &theme_path, Theme::parse);

        let styles_path = related_part(&relationships, kind::STYLES, "word/styles.xml");
        let styles = with_optional_part(&container, &styles_path, |doc| {
            StyleMap::parse_with_theme(doc, theme.as_ref())
        })
        .unwrap_or_default();

        let numbering_path = related_part(&relationships, kind::NUMBERING, "word/numbering.xml");
        let numbering = with_optional_part(&container, &numbering_path, parse_numbering);

        Ok(Self {
            container,
            options: DecodeOptions::default(),
            relationships,
            theme,
            styles,
            numbering,
        })
    }

    /// Parse the document and return a Document model.
    ///
    /// Metadata and bookmarks are read before the body so fields without a
    /// cached result can display them.
    pub fn parse(&self) -> Result<Document> {
        let xml = self.container.read_xml(DOCUMENT_PART)?;
        let main = parse_xml(&xml).map_err(|e| e.in_part(DOCUMENT_PART))?;
        let body = main
            .root()
            .child(ns::W, "body")
            .ok_or_else(|| Error::PartParse {
                part: DOCUMENT_PART.to_string(),
                message: "no w:body element".to_string(),
            })?;

        let metadata = self.parse_metadata();
        let bookmarks = parse_bookmarks(body);

        let ctx = DecodeContext {
            numbering: self.numbering.as_ref(),
            theme: self.theme.as_ref(),
            fields: FieldLookup::new(&bookmarks, &metadata),
            ..DecodeContext::new(&self.container, &self.options, &self.styles)
        };

        log::debug!("{}: decoding body", DOCUMENT_PART);
        let mut parser = PartParser::new(&ctx, DOCUMENT_PART, self.relationships.clone());
        let content = parser.parse_blocks(body);

        let (headers, footers) = match body.children_named(ns::W, "sectPr").last() {
            Some(sect_pr) if self.options.include_headers_footers => (
                parse_side(&ctx, *sect_pr, &self.relationships, DOCUMENT_PART, Side::Header),
                parse_side(&ctx, *sect_pr, &self.relationships, DOCUMENT_PART, Side::Footer),
            ),
            _ => (Vec::new(), Vec::new()),
        };

        let mut doc = Document::new();
        let stats = Stats::of(&content);
        doc.word_count = stats.words;
        doc.character_count = stats.characters;
        doc.paragraph_count = stats.paragraphs;

        doc.elements.extend(headers);
        if self.options.include_bookmarks {
            doc.elements
                .extend(bookmarks.into_iter().map(Element::Bookmark));
        }
        doc.elements.extend(content);
        doc.elements.extend(footers);

        if self.options.include_notes {
            doc.elements.extend(
                self.notes(&ctx, NoteKind::Footnote)
                    .into_iter()
                    .map(Element::Footnote),
            );
            doc.elements.extend(
                self.notes(&ctx, NoteKind::Endnote)
                    .into_iter()
                    .map(Element::Endnote),
            );
        }

        doc.numbering = self.numbering.clone();
        doc.metadata = metadata;

        log::info!(
            "decoded {} elements ({} paragraphs, {} words)",
            doc.elements.len(),
            doc.paragraph_count,
            doc.word_count
        );
        Ok(doc)
    }

    fn notes(&self, ctx: &DecodeContext<'_>, note_kind: NoteKind) -> Vec<crate::model::Note> {
        let rel_kind = match note_kind {
            NoteKind::Footnote => kind::FOOTNOTES,
            NoteKind::Endnote => kind::ENDNOTES,
        };
        let path = related_part(&self.relationships, rel_kind, default_part(note_kind));
        with_optional_part(&self.container, &path, |doc| {
            log::debug!("{}: decoding notes", path);
            parse_notes(ctx, &path, doc, note_kind)
        })
        .unwrap_or_default()
    }

    /// Core and application properties. Either part may be absent or
    /// malformed; whatever could be read is kept.
    fn parse_metadata(&self) -> Metadata {
        let mut meta = Metadata::default();
        with_optional_part(&self.container, CORE_PART, |doc| apply_core(&mut meta, doc));
        with_optional_part(&self.container, APP_PART, |doc| apply_app(&mut meta, doc));
        meta
    }
}

/// Target of the first internal relationship of `rel_kind`, or `default`.
fn related_part(rels: &Relationships, rel_kind: &str, default: &str) -> String {
    rels.of_kind(rel_kind)
        .find(|rel| !rel.is_external())
        .map(|rel| OoxmlContainer::resolve_path(DOCUMENT_PART, &rel.target))
        .unwrap_or_else(|| default.to_string())
}

/// Read and parse an optional part, then hand the tree to `f`. Absent
/// parts are silent; unreadable or malformed ones are logged and treated as
/// absent.
fn with_optional_part<T>(
    container: &OoxmlContainer,
    path: &str,
    f: impl FnOnce(&XmlDocument<'_>) -> T,
) -> Option<T> {
    let xml = match container.read_xml_optional(path) {
        Ok(xml) => xml?,
        Err(e) => {
            log::warn!("{}: {}", path, e);
            return None;
        }
    };
    match parse_xml(&xml) {
        Ok(doc) => Some(f(&doc)),
        Err(e) => {
            log::warn!("{}", e.in_part(path));
            None
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct Stats {
    words: usize,
    characters: usize,
    paragraphs: usize,
}

impl Stats {
    /// Counts over top-level paragraphs and the cells of top-level tables.
    fn of(elements: &[Element]) -> Self {
        let mut stats = Stats::default();
        for element in elements {
            if element.as_paragraph().is_some() {
                stats.paragraphs += 1;
            }
        }
        stats.count_text(elements);
        stats
    }

    fn count_text(&mut self, elements: &[Element]) {
        for element in elements {
            match element {
                Element::Table(table) => {
                    for cell in table.rows.iter().flat_map(|row| &row.cells) {
                        self.count_text(&cell.content);
                    }
                }
                _ => {
                    if let Some(para) = element.as_paragraph() {
                        let text = para.plain_text();
                        self.characters += text.chars().count();
                        self.words += text.split_whitespace().count();
                    }
                }
            }
        }
    }
}
