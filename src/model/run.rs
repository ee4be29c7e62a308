//! Text runs, character formatting and field codes.

use super::Image;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Character formatting of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,

    /// Underline variant (`single`, `double`, `wave`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub double_strikethrough: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub superscript: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub subscript: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub caps: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub small_caps: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub outline: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shadow: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub emboss: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub imprint: bool,

    /// Text color (hex, e.g., "FF0000")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Highlight color name (e.g., "yellow")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,

    /// Run shading fill (hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// Complex-script font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size_cs: Option<f64>,

    /// Extra spacing between characters, in twips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_spacing: Option<i32>,

    /// Baseline offset in half-points (positive raises)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,

    /// Kerning threshold in half-points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kerning: Option<u32>,

    /// Horizontal scale in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,

    /// Emphasis mark (`dot`, `comma`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<String>,

    /// Language tag (e.g., "en-US")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TextStyle {
    /// Create a new default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bold style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Create an italic style.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// Check if style has any emphasis formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold
            || self.italic
            || self.underline.is_some()
            || self.strikethrough
            || self.double_strikethrough
            || self.superscript
            || self.subscript
    }
}

/// Which notes part a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Footnote,
    Endnote,
}

/// A footnote or endnote reference mark inside a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteReference {
    pub kind: NoteKind,
    pub id: String,
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    #[serde(default, skip_serializing_if = "is_default_style")]
    pub style: TextStyle,

    /// Hyperlink target (URL, or `#anchor` for internal links)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,

    /// Drawing carried by a text-less run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,

    /// Type of the field whose result this run displays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_code: Option<FieldType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_reference: Option<NoteReference>,
}

fn is_default_style(style: &TextStyle) -> bool {
    *style == TextStyle::default()
}

impl TextRun {
    /// Create a plain text run with no styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a styled text run.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            ..Default::default()
        }
    }

    /// Create a hyperlink text run.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hyperlink: Some(url.into()),
            ..Default::default()
        }
    }

    /// Create a text-less run carrying an image.
    pub fn with_image(image: Image, style: TextStyle) -> Self {
        Self {
            style,
            image: Some(image),
            ..Default::default()
        }
    }

    /// Check if this run is a hyperlink.
    pub fn is_link(&self) -> bool {
        self.hyperlink.is_some()
    }

    /// Check if this run carries an image.
    pub fn is_image(&self) -> bool {
        self.image.is_some()
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.image.is_none()
    }
}

/// Kind of a field, taken from the first keyword of its instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum FieldType {
    FormText,
    FormCheckbox,
    FormDropdown,
    Date,
    Time,
    Page,
    NumPages,
    Title,
    Author,
    Hyperlink,
    Ref,
    PageRef,
    Toc,
    Seq,
    MergeField,
    /// Table formula (`= SUM(ABOVE)`); the instruction has no keyword
    Formula,
    /// Any other keyword, upper-cased
    Other(String),
}

impl FieldType {
    /// Classify a field keyword (case-insensitive).
    pub fn from_keyword(keyword: &str) -> Self {
        let upper = keyword.to_ascii_uppercase();
        match upper.as_str() {
            "FORMTEXT" => FieldType::FormText,
            "FORMCHECKBOX" => FieldType::FormCheckbox,
            "FORMDROPDOWN" => FieldType::FormDropdown,
            "DATE" => FieldType::Date,
            "TIME" => FieldType::Time,
            "PAGE" => FieldType::Page,
            "NUMPAGES" => FieldType::NumPages,
            "TITLE" => FieldType::Title,
            "AUTHOR" => FieldType::Author,
            "HYPERLINK" => FieldType::Hyperlink,
            "REF" => FieldType::Ref,
            "PAGEREF" => FieldType::PageRef,
            "TOC" => FieldType::Toc,
            "SEQ" => FieldType::Seq,
            "MERGEFIELD" => FieldType::MergeField,
            "FORMULA" => FieldType::Formula,
            _ => FieldType::Other(upper),
        }
    }

    /// The keyword as it appears in an instruction.
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::FormText => "FORMTEXT",
            FieldType::FormCheckbox => "FORMCHECKBOX",
            FieldType::FormDropdown => "FORMDROPDOWN",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Page => "PAGE",
            FieldType::NumPages => "NUMPAGES",
            FieldType::Title => "TITLE",
            FieldType::Author => "AUTHOR",
            FieldType::Hyperlink => "HYPERLINK",
            FieldType::Ref => "REF",
            FieldType::PageRef => "PAGEREF",
            FieldType::Toc => "TOC",
            FieldType::Seq => "SEQ",
            FieldType::MergeField => "MERGEFIELD",
            FieldType::Formula => "FORMULA",
            FieldType::Other(name) => name,
        }
    }

    /// Legacy form fields (text input, checkbox, dropdown).
    pub fn is_form_field(&self) -> bool {
        matches!(
            self,
            FieldType::FormText | FieldType::FormCheckbox | FieldType::FormDropdown
        )
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        FieldType::from_keyword(&value)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field assembled from a begin/separate/end bracket (or a simple field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Full instruction text, trimmed
    pub instruction: String,

    /// Cached result text; absent when the field had no separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Switches (`@`, `*`, ...) and derived values (`defaultText`, `url`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Field {
    /// Look up a property by key.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}
