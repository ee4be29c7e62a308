//! Field code assembly.
//!
//! A complex field spans several runs of one paragraph:
//! `begin`, instruction text, optional `separate`, result runs, `end`.
//! [`FieldTracker`] follows those markers and yields a [`Field`] plus the run
//! that stands in for it when the `end` marker arrives.

use crate::model::{Field, FieldType, TextRun, TextStyle};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

static SWITCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\([*@#\w]+)\s*(?:"([^"]+)"|([^\s\\]+))?"#).unwrap());

static FORMTEXT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"FORMTEXT\s+"([^"]+)""#).unwrap());

static ARGUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*(?:"([^"]*)"|([^\s\\"]+))"#).unwrap());

/// Split an instruction into its type and property map.
///
/// An instruction starting with `=` is a table formula; its expression is
/// kept as `formula`.
///
/// Switches become `key → value` (`"true"` when the switch has no value).
/// FORMTEXT's quoted default becomes `defaultText`; the first positional
/// argument is kept as `url` (HYPERLINK), `bookmark` (REF, PAGEREF, NOTEREF),
/// `identifier` (SEQ) or `name` (MERGEFIELD).
pub fn parse_instruction(instruction: &str) -> (FieldType, BTreeMap<String, String>) {
    let mut properties = BTreeMap::new();

    if let Some(expression) = instruction.trim_start().strip_prefix('=') {
        let formula = expression.split('\\').next().unwrap_or_default().trim();
        properties.insert("formula".to_string(), formula.to_string());
        read_switches(expression, &mut properties);
        return (FieldType::Formula, properties);
    }

    let Some(keyword) = KEYWORD.find(instruction) else {
        return (FieldType::Other(String::new()), properties);
    };
    let field_type = FieldType::from_keyword(keyword.as_str());
    let rest = &instruction[keyword.end()..];

    read_switches(rest, &mut properties);

    if field_type == FieldType::FormText {
        if let Some(caps) = FORMTEXT_DEFAULT.captures(instruction) {
            properties.insert("defaultText".to_string(), caps[1].to_string());
        }
    }

    let positional_key = match field_type {
        FieldType::Hyperlink => Some("url"),
        FieldType::Ref | FieldType::PageRef => Some("bookmark"),
        FieldType::Other(ref name) if name == "NOTEREF" => Some("bookmark"),
        FieldType::Seq => Some("identifier"),
        FieldType::MergeField => Some("name"),
        _ => None,
    };
    if let Some(key) = positional_key {
        if let Some(caps) = ARGUMENT.captures(rest) {
            if let Some(arg) = caps.get(1).or_else(|| caps.get(2)) {
                properties.insert(key.to_string(), arg.as_str().to_string());
            }
        }
    }

    (field_type, properties)
}

fn read_switches(text: &str, properties: &mut BTreeMap<String, String>) {
    for caps in SWITCH.captures_iter(text) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map_or("true", |m| m.as_str());
        properties.insert(caps[1].to_string(), value.to_string());
    }
}

/// Position in the begin/separate/end bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Idle,
    Begin,
    Instruction,
    Result,
}

/// State machine over one paragraph's field markers.
#[derive(Debug)]
pub struct FieldTracker {
    state: FieldState,
    /// `begin` markers of nested fields not yet closed
    nested: usize,
    instruction: String,
    result: Option<String>,
    begin_style: TextStyle,
    result_style: Option<TextStyle>,
    hyperlink: Option<String>,
}

impl Default for FieldTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldTracker {
    pub fn new() -> Self {
        Self {
            state: FieldState::Idle,
            nested: 0,
            instruction: String::new(),
            result: None,
            begin_style: TextStyle::default(),
            result_style: None,
            hyperlink: None,
        }
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    /// Whether runs are currently inside a field bracket.
    pub fn is_active(&self) -> bool {
        self.state != FieldState::Idle
    }

    /// A `begin` marker.
    pub fn begin(&mut self, style: &TextStyle, hyperlink: Option<&str>) {
        if self.is_active() {
            self.nested += 1;
            return;
        }
        self.state = FieldState::Begin;
        self.instruction.clear();
        self.result = None;
        self.begin_style = style.clone();
        self.result_style = None;
        self.hyperlink = hyperlink.map(str::to_string);
    }

    /// Instruction text (`w:instrText`). Only collected before `separate`.
    pub fn instruction(&mut self, text: &str) {
        if matches!(self.state, FieldState::Begin | FieldState::Instruction) {
            self.instruction.push_str(text);
            self.state = FieldState::Instruction;
        }
    }

    /// A `separate` marker. Nested fields' separators are ignored.
    pub fn separate(&mut self) {
        if self.nested == 0 && self.is_active() {
            self.state = FieldState::Result;
            self.result = Some(String::new());
        }
    }

    /// Text met while a field is open. Returns true when the text was
    /// absorbed by the field rather than being an ordinary run.
    pub fn text(&mut self, text: &str, style: &TextStyle) -> bool {
        match self.state {
            FieldState::Idle => false,
            FieldState::Result => {
                if let Some(result) = self.result.as_mut() {
                    result.push_str(text);
                }
                if self.result_style.is_none() {
                    self.result_style = Some(style.clone());
                }
                true
            }
            FieldState::Begin | FieldState::Instruction => true,
        }
    }

    /// An `end` marker. Closing the outermost field yields the field and
    /// the run displayed in its place.
    pub fn end(&mut self) -> Option<(Field, TextRun)> {
        if !self.is_active() {
            return None;
        }
        if self.nested > 0 {
            self.nested -= 1;
            return None;
        }

        let instruction = self.instruction.trim().to_string();
        let (field_type, properties) = parse_instruction(&instruction);
        let result = self.result.take();

        let style = self
            .result_style
            .take()
            .unwrap_or_else(|| std::mem::take(&mut self.begin_style));
        let hyperlink = self.hyperlink.take().or_else(|| {
            (field_type == FieldType::Hyperlink)
                .then(|| properties.get("url").cloned())
                .flatten()
        });
        let run = TextRun {
            text: result.clone().unwrap_or_default(),
            style,
            hyperlink,
            field_code: Some(field_type.clone()),
            ..Default::default()
        };

        self.state = FieldState::Idle;
        self.instruction.clear();

        Some((
            Field {
                field_type,
                instruction,
                result,
                properties,
            },
            run,
        ))
    }

    /// Close a bracket left open at the end of a paragraph, as if its `end`
    /// marker had been present.
    pub fn finish(&mut self) -> Option<(Field, TextRun)> {
        self.nested = 0;
        self.end()
    }
}

/// A simple field (`w:fldSimple`) with its displayed text.
pub fn simple_field(instruction: &str, result: String, style: TextStyle) -> (Field, TextRun) {
    let instruction = instruction.trim().to_string();
    let (field_type, properties) = parse_instruction(&instruction);
    let hyperlink = (field_type == FieldType::Hyperlink)
        .then(|| properties.get("url").cloned())
        .flatten();
    let run = TextRun {
        text: result.clone(),
        style,
        hyperlink,
        field_code: Some(field_type.clone()),
        ..Default::default()
    };
    (
        Field {
            field_type,
            instruction,
            result: Some(result),
            properties,
        },
        run,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formtext() {
        let (kind, props) = parse_instruction(r#" FORMTEXT "Enter your name" "#);
        assert_eq!(kind, FieldType::FormText);
        assert_eq!(props["defaultText"], "Enter your name");
    }

    #[test]
    fn test_parse_switches() {
        let (kind, props) = parse_instruction(r#"DATE \@ "M/d/yyyy" \* MERGEFORMAT"#);
        assert_eq!(kind, FieldType::Date);
        assert_eq!(props["@"], "M/d/yyyy");
        assert_eq!(props["*"], "MERGEFORMAT");

        let (kind, props) = parse_instruction(r"TOC \o 1-3 \h \z");
        assert_eq!(kind, FieldType::Toc);
        assert_eq!(props["o"], "1-3");
        assert_eq!(props["h"], "true");
        assert_eq!(props["z"], "true");
    }

    #[test]
    fn test_parse_positional_arguments() {
        let (kind, props) = parse_instruction(r#"HYPERLINK "https://example.com" \o "tip""#);
        assert_eq!(kind, FieldType::Hyperlink);
        assert_eq!(props["url"], "https://example.com");
        assert_eq!(props["o"], "tip");

        let (kind, props) = parse_instruction(r"REF _Ref123 \h");
        assert_eq!(kind, FieldType::Ref);
        assert_eq!(props["bookmark"], "_Ref123");

        let (_, props) = parse_instruction(r"SEQ Figure \* ARABIC");
        assert_eq!(props["identifier"], "Figure");
    }

    #[test]
    fn test_parse_formula() {
        let (kind, props) = parse_instruction(r#" =SUM(ABOVE) \# "0.00" "#);
        assert_eq!(kind, FieldType::Formula);
        assert_eq!(props["formula"], "SUM(ABOVE)");
        assert_eq!(props["#"], "0.00");
    }

    #[test]
    fn test_parse_unknown_and_empty() {
        let (kind, _) = parse_instruction("docproperty Company");
        assert_eq!(kind, FieldType::Other("DOCPROPERTY".into()));
        let (kind, props) = parse_instruction("   ");
        assert_eq!(kind, FieldType::Other(String::new()));
        assert!(props.is_empty());
    }

    #[test]
    fn test_tracker_full_bracket() {
        let mut tracker = FieldTracker::new();
        let bold = TextStyle::bold();

        tracker.begin(&TextStyle::default(), None);
        assert_eq!(tracker.state(), FieldState::Begin);
        tracker.instruction(" PAGE ");
        assert_eq!(tracker.state(), FieldState::Instruction);
        tracker.separate();
        assert_eq!(tracker.state(), FieldState::Result);
        assert!(tracker.text("1", &bold));
        assert!(tracker.text("2", &TextStyle::default()));

        let (field, run) = tracker.end().unwrap();
        assert_eq!(field.field_type, FieldType::Page);
        assert_eq!(field.instruction, "PAGE");
        assert_eq!(field.result.as_deref(), Some("12"));
        assert_eq!(run.text, "12");
        assert!(run.style.bold);
        assert_eq!(run.field_code, Some(FieldType::Page));
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_tracker_without_separate() {
        let mut tracker = FieldTracker::new();
        tracker.begin(&TextStyle::italic(), None);
        tracker.instruction("NUMPAGES");
        let (field, run) = tracker.end().unwrap();
        assert_eq!(field.field_type, FieldType::NumPages);
        assert!(field.result.is_none());
        assert!(run.text.is_empty());
        assert!(run.style.italic);
    }

    #[test]
    fn test_tracker_nested_fields() {
        let mut tracker = FieldTracker::new();
        tracker.begin(&TextStyle::default(), None);
        tracker.instruction("IF ");
        tracker.begin(&TextStyle::default(), None);
        tracker.instruction("PAGE");
        tracker.separate();
        assert!(tracker.end().is_none());
        tracker.instruction(" = 1 \"first\"");
        tracker.separate();
        tracker.text("first", &TextStyle::default());

        let (field, _) = tracker.end().unwrap();
        assert_eq!(field.field_type, FieldType::Other("IF".into()));
        assert_eq!(field.instruction, "IF PAGE = 1 \"first\"");
        assert_eq!(field.result.as_deref(), Some("first"));
    }

    #[test]
    fn test_idle_text_is_ordinary() {
        let mut tracker = FieldTracker::new();
        assert!(!tracker.text("plain", &TextStyle::default()));
        assert!(tracker.end().is_none());
    }

    #[test]
    fn test_simple_field() {
        let (field, run) = simple_field(
            r#" HYPERLINK "https://example.com" "#,
            "site".into(),
            TextStyle::default(),
        );
        assert_eq!(field.field_type, FieldType::Hyperlink);
        assert_eq!(field.result.as_deref(), Some("site"));
        assert_eq!(run.hyperlink.as_deref(), Some("https://example.com"));
    }
}
