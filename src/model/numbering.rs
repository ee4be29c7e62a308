//! List numbering definitions.

use super::ListType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format of one list level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelFormat {
    /// Number format kind (`bullet`, `decimal`, `lowerRoman`, ...)
    pub number_format: String,
    /// Level text pattern (`%1.`, `•`, ...)
    pub level_text: String,
    /// First number of the level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
}

impl LevelFormat {
    /// Number format used when a level omits `w:numFmt`.
    pub const DEFAULT_FORMAT: &'static str = "bullet";
    /// Level text used when a level omits `w:lvlText`.
    pub const DEFAULT_TEXT: &'static str = "•";

    pub fn list_type(&self) -> ListType {
        ListType::from_format(&self.number_format)
    }
}

impl Default for LevelFormat {
    fn default() -> Self {
        Self {
            number_format: Self::DEFAULT_FORMAT.to_string(),
            level_text: Self::DEFAULT_TEXT.to_string(),
            start: None,
        }
    }
}

/// An abstract list format (`w:abstractNum`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractFormat {
    /// Levels keyed by level index
    #[serde(default)]
    pub levels: BTreeMap<u8, LevelFormat>,

    /// Name this format publishes as a list style (`w:styleLink`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_link: Option<String>,

    /// Name of the list style whose levels this format borrows
    /// (`w:numStyleLink`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_style_link: Option<String>,
}

/// Resolved numbering of a document.
///
/// Built once per decode; style links are already resolved, so an abstract
/// format used by an instance carries its levels by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingDefinition {
    /// List instance id to abstract format id
    #[serde(default)]
    pub instances: BTreeMap<String, String>,

    /// Abstract format id to format
    #[serde(default)]
    pub abstract_formats: BTreeMap<String, AbstractFormat>,
}

impl NumberingDefinition {
    /// The abstract format behind a list instance.
    pub fn abstract_for(&self, num_id: &str) -> Option<&AbstractFormat> {
        let abstract_id = self.instances.get(num_id)?;
        self.abstract_formats.get(abstract_id)
    }

    /// Format of one level of a list instance.
    pub fn level(&self, num_id: &str, level: u8) -> Option<&LevelFormat> {
        self.abstract_for(num_id)?.levels.get(&level)
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.abstract_formats.is_empty()
    }
}
