//! Document theme (`word/theme/theme1.xml`): the color scheme and the
//! major/minor font scheme that `w:themeColor` and `w:*Theme` font
//! attributes refer to.

use crate::xml::{ns, Node, XmlDocument};
use std::collections::HashMap;

/// Typefaces of one font collection (`a:majorFont` or `a:minorFont`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontCollection {
    pub latin: Option<String>,
    pub east_asian: Option<String>,
    pub complex_script: Option<String>,
}

impl FontCollection {
    fn parse(node: Node<'_>) -> Self {
        let typeface = |local: &str| {
            node.child(ns::A, local)
                .and_then(|n| n.plain_attr("typeface"))
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        };
        Self {
            latin: typeface("latin"),
            east_asian: typeface("ea"),
            complex_script: typeface("cs"),
        }
    }

    fn script(&self, script: &str) -> Option<&str> {
        match script {
            "latin" => self.latin.as_deref(),
            "ea" => self.east_asian.as_deref(),
            "cs" => self.complex_script.as_deref(),
            _ => None,
        }
    }
}

/// Scheme colors and fonts of a theme part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    /// Scheme slot (`dk1`, `accent1`, `hlink`, ...) to hex RGB
    pub colors: HashMap<String, String>,
    pub major: FontCollection,
    pub minor: FontCollection,
}

const COLOR_SLOTS: &[&str] = &[
    "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5", "accent6",
    "hlink", "folHlink",
];

impl Theme {
    /// Build from a parsed theme part. Missing schemes leave the theme empty.
    pub fn parse(doc: &XmlDocument) -> Self {
        let mut theme = Theme::default();
        let Some(elements) = doc.root().child(ns::A, "themeElements") else {
            return theme;
        };

        if let Some(scheme) = elements.child(ns::A, "clrScheme") {
            for slot in COLOR_SLOTS {
                let Some(color) = scheme.child(ns::A, slot) else {
                    continue;
                };
                let value = color
                    .child(ns::A, "srgbClr")
                    .and_then(|c| c.plain_attr("val"))
                    .or_else(|| {
                        color
                            .child(ns::A, "sysClr")
                            .and_then(|c| c.plain_attr("lastClr"))
                    });
                if let Some(value) = value {
                    theme.colors.insert(slot.to_string(), value.to_ascii_uppercase());
                }
            }
        }

        if let Some(fonts) = elements.child(ns::A, "fontScheme") {
            if let Some(major) = fonts.child(ns::A, "majorFont") {
                theme.major = FontCollection::parse(major);
            }
            if let Some(minor) = fonts.child(ns::A, "minorFont") {
                theme.minor = FontCollection::parse(minor);
            }
        }

        theme
    }

    /// Hex RGB of a `w:themeColor` value (`accent1`, `text1`, `background2`,
    /// `hyperlink`, ...).
    pub fn color(&self, theme_color: &str) -> Option<&str> {
        let slot = match theme_color {
            "text1" | "dark1" | "tx1" => "dk1",
            "background1" | "light1" | "bg1" => "lt1",
            "text2" | "dark2" | "tx2" => "dk2",
            "background2" | "light2" | "bg2" => "lt2",
            "hyperlink" => "hlink",
            "followedHyperlink" => "folHlink",
            other => other,
        };
        self.colors.get(slot).map(String::as_str)
    }

    /// Typeface for a theme font reference: the `w:rFonts` theme attribute
    /// form (`majorHAnsi`, `minorEastAsia`, `majorBidi`, ...) or the
    /// DrawingML form (`+mj-lt`, `+mn-ea`).
    pub fn font(&self, reference: &str) -> Option<&str> {
        if let Some(short) = reference.strip_prefix('+') {
            let (collection, script) = short.split_once('-')?;
            let script = if script == "lt" { "latin" } else { script };
            return match collection {
                "mj" => self.major.script(script),
                "mn" => self.minor.script(script),
                _ => None,
            };
        }

        let (collection, slot) = if let Some(slot) = reference.strip_prefix("major") {
            (&self.major, slot)
        } else if let Some(slot) = reference.strip_prefix("minor") {
            (&self.minor, slot)
        } else {
            return None;
        };
        match slot {
            "Ascii" | "HAnsi" => collection.latin.as_deref(),
            "EastAsia" => collection.east_asian.as_deref(),
            "Bidi" => collection.complex_script.as_deref(),
            _ => None,
        }
    }
}

/// Apply `w:themeTint` / `w:themeShade` (hex byte) to a hex RGB color.
///
/// A tint moves each channel toward white, a shade toward black.
pub fn adjust_color(hex: &str, tint: Option<&str>, shade: Option<&str>) -> String {
    let factor = |value: Option<&str>| {
        value
            .and_then(|v| u8::from_str_radix(v, 16).ok())
            .map(|v| f64::from(v) / 255.0)
    };
    let (tint, shade) = (factor(tint), factor(shade));
    if tint.is_none() && shade.is_none() {
        return hex.to_string();
    }
    let Ok(rgb) = u32::from_str_radix(hex, 16) else {
        return hex.to_string();
    };
    if hex.len() != 6 {
        return hex.to_string();
    }

    let channel = |shift: u32| {
        let mut c = f64::from((rgb >> shift) & 0xFF);
        if let Some(t) = tint {
            c += (255.0 - c) * (1.0 - t);
        }
        if let Some(s) = shade {
            c *= s;
        }
        c.round().clamp(0.0, 255.0) as u8
    };
    format!("{:02X}{:02X}{:02X}", channel(16), channel(8), channel(0))
}
