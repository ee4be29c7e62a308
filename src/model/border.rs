//! Borders and shading shared by paragraphs, tables and cells.

use serde::{Deserialize, Serialize};

/// One border edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// Line style as written (`single`, `double`, `none`, `nil`, ...)
    pub style: String,

    /// Line width in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Line color (hex or `auto`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Gap between border and content, in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<u32>,
}

impl Border {
    /// Whether this edge draws nothing (`none` or `nil`).
    pub fn is_none(&self) -> bool {
        matches!(self.style.as_str(), "none" | "nil")
    }
}

/// A set of border edges. Tables use `inside_h`/`inside_v`, paragraphs use
/// `between`/`bar`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_h: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_v: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub between: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar: Option<Border>,
}

impl Borders {
    /// No edge is set.
    pub fn is_empty(&self) -> bool {
        *self == Borders::default()
    }
}

/// Background shading: a fill color, a pattern and the pattern color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shading {
    /// Background fill (hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,

    /// Pattern (`clear`, `solid`, `pct25`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Pattern color (hex)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_and_nil_are_kept_as_styles() {
        let none = Border {
            style: "none".into(),
            ..Default::default()
        };
        let nil = Border {
            style: "nil".into(),
            ..Default::default()
        };
        assert!(none.is_none());
        assert!(nil.is_none());
        assert_ne!(none, nil);

        let single = Border {
            style: "single".into(),
            width: Some(1.0),
            ..Default::default()
        };
        assert!(!single.is_none());
    }

    #[test]
    fn test_borders_empty() {
        assert!(Borders::default().is_empty());
        let borders = Borders {
            top: Some(Border::default()),
            ..Default::default()
        };
        assert!(!borders.is_empty());
    }
}
