//! Document model structures.

use super::{Heading, Image, NumberingDefinition, Paragraph, Table};
use serde::{Deserialize, Serialize};

/// Document metadata extracted from docProps/core.xml and docProps/app.xml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Document author/creator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    /// Document subject
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Document description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keywords/tags
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub keywords: Vec<String>,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last modification date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    /// Last modified by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Application that created the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    /// Number of pages as last saved by the producing application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// A footnote or endnote body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,

    /// Paragraphs and tables of the note
    #[serde(default)]
    pub content: Vec<Element>,
}

/// A named range in the main body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub name: String,

    /// Run text between the start and end markers; absent when the end
    /// marker is missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Which pages a header or footer applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFooterKind {
    #[default]
    Default,
    First,
    Even,
}

impl HeaderFooterKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "first" => HeaderFooterKind::First,
            "even" => HeaderFooterKind::Even,
            _ => HeaderFooterKind::Default,
        }
    }
}

/// Content of one header or footer part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooter {
    pub kind: HeaderFooterKind,

    #[serde(default)]
    pub content: Vec<Element>,
}

/// A structural element of the document, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Element {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// A paragraph with a heading level
    Heading(Heading),
    /// A table
    Table(Table),
    /// An image (standalone, not inline)
    Image(Image),
    Footnote(Note),
    Endnote(Note),
    Bookmark(Bookmark),
    Header(HeaderFooter),
    Footer(HeaderFooter),
    /// A page or section break
    PageBreak,
}

fn join_text(elements: &[Element]) -> String {
    elements
        .iter()
        .map(Element::plain_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl Element {
    /// Plain text of this element (empty for images, bookmarks and breaks).
    pub fn plain_text(&self) -> String {
        match self {
            Element::Paragraph(para) => para.plain_text(),
            Element::Heading(heading) => heading.plain_text(),
            Element::Table(table) => table.plain_text().trim_end().to_string(),
            Element::Footnote(note) | Element::Endnote(note) => join_text(&note.content),
            Element::Header(part) | Element::Footer(part) => join_text(&part.content),
            Element::Image(_) | Element::Bookmark(_) | Element::PageBreak => String::new(),
        }
    }

    /// The paragraph behind a `Paragraph` or `Heading` element.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Element::Paragraph(para) => Some(para),
            Element::Heading(heading) => Some(&heading.paragraph),
            _ => None,
        }
    }
}

/// A decoded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Elements in reading order
    #[serde(default)]
    pub elements: Vec<Element>,

    /// Resolved list numbering; absent when the package has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbering: Option<NumberingDefinition>,

    /// Document metadata
    pub metadata: Metadata,

    /// Words in top-level paragraphs and tables
    pub word_count: usize,

    /// Characters in top-level paragraphs and tables
    pub character_count: usize,

    /// Top-level paragraphs and headings
    pub paragraph_count: usize,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Page count from the application properties, if recorded.
    pub fn page_count(&self) -> Option<u32> {
        self.metadata.page_count
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Top-level paragraphs and headings.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.elements.iter().filter_map(Element::as_paragraph)
    }

    /// Top-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.elements.iter().filter_map(|e| match e {
            Element::Table(table) => Some(table),
            _ => None,
        })
    }

    pub fn headings(&self) -> impl Iterator<Item = &Heading> {
        self.elements.iter().filter_map(|e| match e {
            Element::Heading(heading) => Some(heading),
            _ => None,
        })
    }

    pub fn bookmarks(&self) -> impl Iterator<Item = &Bookmark> {
        self.elements.iter().filter_map(|e| match e {
            Element::Bookmark(bookmark) => Some(bookmark),
            _ => None,
        })
    }

    /// Footnotes, in part order.
    pub fn footnotes(&self) -> impl Iterator<Item = &Note> {
        self.elements.iter().filter_map(|e| match e {
            Element::Footnote(note) => Some(note),
            _ => None,
        })
    }

    /// Endnotes, in part order.
    pub fn endnotes(&self) -> impl Iterator<Item = &Note> {
        self.elements.iter().filter_map(|e| match e {
            Element::Endnote(note) => Some(note),
            _ => None,
        })
    }

    /// Extract body and note text as a single string, one block per line.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for element in &self.elements {
            match element {
                Element::Paragraph(_)
                | Element::Heading(_)
                | Element::Table(_)
                | Element::Footnote(_)
                | Element::Endnote(_) => {
                    text.push_str(&element.plain_text());
                    text.push('\n');
                }
                _ => {}
            }
        }
        text.trim().to_string()
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to JSON string (compact).
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
