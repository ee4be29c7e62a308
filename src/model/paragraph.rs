//! Paragraph, heading and list models.

use super::{Borders, Field, Shading, TextRun};
use serde::{Deserialize, Serialize};

/// Text alignment within a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
    Distribute,
}

impl TextAlignment {
    /// Map a `w:jc` value. Kashida and Thai justification count as justify.
    pub fn from_jc(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(TextAlignment::Left),
            "center" => Some(TextAlignment::Center),
            "right" | "end" => Some(TextAlignment::Right),
            "both" | "justify" | "lowKashida" | "mediumKashida" | "highKashida"
            | "thaiDistribute" => Some(TextAlignment::Justify),
            "distribute" => Some(TextAlignment::Distribute),
            _ => None,
        }
    }
}

/// How the `line` spacing value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineRule {
    /// Value is in 240ths of a line
    Auto,
    /// Value is an exact height in twips
    Exact,
    /// Value is a minimum height in twips
    AtLeast,
}

impl LineRule {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(LineRule::Auto),
            "exact" => Some(LineRule::Exact),
            "atLeast" => Some(LineRule::AtLeast),
            _ => None,
        }
    }
}

/// Paragraph spacing, raw twips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spacing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_rule: Option<LineRule>,
}

/// Paragraph indentation, raw twips.
///
/// `first_line` and `hanging` are mutually exclusive; only the one present
/// in the source is set (hanging wins if both appear).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_line: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hanging: Option<i32>,
}

/// Writing direction of a paragraph or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl TextDirection {
    /// Map a `w:textDirection` / `w:textFlow` value (transitional or strict
    /// spelling).
    pub fn from_flow(value: &str) -> Option<Self> {
        match value {
            "lrTb" | "lrTbV" | "tb" | "tbV" => Some(TextDirection::LeftToRight),
            "tbRl" | "tbRlV" | "tbLrV" | "rl" | "rlV" | "lrV" => Some(TextDirection::TopToBottom),
            "btLr" | "lr" => Some(TextDirection::BottomToTop),
            _ => None,
        }
    }
}

/// Vertical alignment of text in a line, or of content in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    Baseline,
    Auto,
}

impl VerticalAlignment {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top" => Some(VerticalAlignment::Top),
            "center" | "both" => Some(VerticalAlignment::Center),
            "bottom" => Some(VerticalAlignment::Bottom),
            "baseline" => Some(VerticalAlignment::Baseline),
            "auto" => Some(VerticalAlignment::Auto),
            _ => None,
        }
    }
}

/// Drop-cap style of a text frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropCap {
    #[default]
    None,
    Drop,
    Margin,
}

/// Number of lines a drop cap spans when `w:lines` is omitted.
pub const DEFAULT_DROP_CAP_LINES: u32 = 3;

fn default_drop_cap_lines() -> u32 {
    DEFAULT_DROP_CAP_LINES
}

/// Text frame (`w:framePr`), used mostly for drop caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameProperties {
    #[serde(default)]
    pub drop_cap: DropCap,
    #[serde(default = "default_drop_cap_lines")]
    pub lines: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_anchor: Option<String>,
    /// Position and size in twips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_space: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_space: Option<i32>,
}

impl Default for FrameProperties {
    fn default() -> Self {
        Self {
            drop_cap: DropCap::None,
            lines: DEFAULT_DROP_CAP_LINES,
            wrap: None,
            horizontal_anchor: None,
            vertical_anchor: None,
            x: None,
            y: None,
            width: None,
            height: None,
            horizontal_space: None,
            vertical_space: None,
        }
    }
}

/// Table-style conditions that apply to a paragraph, row or cell
/// (`w:cnfStyle`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalFormatting {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub first_row: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub last_row: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub first_column: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub last_column: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub banded_rows: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub banded_columns: bool,
}

impl ConditionalFormatting {
    /// Width of the bit pattern.
    pub const PATTERN_LEN: usize = 12;

    /// Decode a positional bit pattern. Shorter patterns are left-padded
    /// with zeros; positions other than 0-3, 6 and 7 are ignored.
    pub fn from_pattern(pattern: &str) -> Self {
        let padded = format!("{:0>width$}", pattern, width = Self::PATTERN_LEN);
        let bit = |i: usize| padded.as_bytes().get(i) == Some(&b'1');
        Self {
            first_row: bit(0),
            last_row: bit(1),
            first_column: bit(2),
            last_column: bit(3),
            banded_rows: bit(6),
            banded_columns: bit(7),
        }
    }
}

/// Bullet or numbered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// Unordered (bulleted) list
    Bullet,
    /// Ordered (numbered) list
    Numbered,
}

impl ListType {
    /// Only the exact `bullet` format is a bullet list.
    pub fn from_format(num_fmt: &str) -> Self {
        if num_fmt == "bullet" {
            ListType::Bullet
        } else {
            ListType::Numbered
        }
    }
}

/// List membership of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    /// List instance (`w:numId`)
    pub num_id: String,
    /// Nesting level (0 = top level)
    pub level: u8,
    pub list_type: ListType,
    /// Level text pattern (e.g., "%1.", "•")
    pub level_text: String,
    /// Number format kind (e.g., "decimal", "bullet")
    pub number_format: String,
    /// Running item number within this list and level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

/// Paragraph-level properties (`w:pPr`), stored raw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    /// Style ID reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indentation: Option<Indentation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_direction: Option<TextDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VerticalAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borders: Option<Borders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading: Option<Shading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_formatting: Option<ConditionalFormatting>,
    /// Outline level as written (0-based)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_level: Option<u8>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub keep_next: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub keep_lines: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub page_break_before: bool,
}

fn is_default_properties(props: &ParagraphProperties) -> bool {
    *props == ParagraphProperties::default()
}

/// A paragraph of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in this paragraph
    #[serde(default)]
    pub runs: Vec<TextRun>,

    /// Fields closed in this paragraph, in order of their `end` markers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,

    #[serde(default, skip_serializing_if = "is_default_properties")]
    pub properties: ParagraphProperties,

    /// List information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_info: Option<ListInfo>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
            ..Default::default()
        }
    }

    /// Add a text run to this paragraph.
    pub fn add_run(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Get the plain text content.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if this paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.is_empty())
    }

    /// Check if this paragraph is a list item.
    pub fn is_list_item(&self) -> bool {
        self.list_info.is_some()
    }

    /// True when every run carries an image and there is at least one.
    pub fn is_image_only(&self) -> bool {
        !self.runs.is_empty()
            && self
                .runs
                .iter()
                .all(|r| r.image.is_some() && r.text.trim().is_empty())
    }
}

/// A paragraph promoted to a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1-6
    pub level: u8,

    #[serde(flatten)]
    pub paragraph: Paragraph,
}

impl Heading {
    /// Create a heading, clamping the level into 1-6.
    pub fn new(level: u8, paragraph: Paragraph) -> Self {
        Self {
            level: level.clamp(1, 6),
            paragraph,
        }
    }

    pub fn plain_text(&self) -> String {
        self.paragraph.plain_text()
    }
}
