//! Stand-in text for fields that carry no cached result.
//!
//! A field without a `separate` marker has nothing to display. Some of them
//! can still be given a value from what the decoder already knows: bookmark
//! text for cross-references, core properties for document-info fields,
//! running counters for `SEQ`, and the neighbouring table cells for
//! formulas. The lookup is built once per decode, before the body is walked.

use crate::model::{Bookmark, Field, FieldType, Metadata};
use std::cell::RefCell;
use std::collections::HashMap;

/// Numeric neighbours of the table cell a formula sits in, nearest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormulaScope {
    pub above: Vec<f64>,
    pub left: Vec<f64>,
}

/// Values fields can be resolved against.
#[derive(Debug, Default)]
pub struct FieldLookup {
    bookmarks: HashMap<String, String>,
    metadata: Metadata,
    /// `SEQ` identifier to its last value
    sequences: RefCell<HashMap<String, u32>>,
}

impl FieldLookup {
    /// Bookmarks map to their captured text, or to their own name when
    /// they enclose none.
    pub fn new(bookmarks: &[Bookmark], metadata: &Metadata) -> Self {
        let bookmarks = bookmarks
            .iter()
            .map(|b| {
                let text = b.text.clone().unwrap_or_else(|| b.name.clone());
                (b.name.clone(), text)
            })
            .collect();
        Self {
            bookmarks,
            metadata: metadata.clone(),
            sequences: RefCell::new(HashMap::new()),
        }
    }

    /// What a field would display, where that can be known without a
    /// layout engine.
    ///
    /// Every `SEQ` field moves its counter, cached result or not, so the
    /// numbering of later uncached fields stays right.
    pub fn stand_in(&self, field: &Field, scope: Option<&FormulaScope>) -> Option<String> {
        let meta = &self.metadata;
        match &field.field_type {
            FieldType::Ref | FieldType::PageRef => {
                self.bookmarks.get(field.property("bookmark")?).cloned()
            }
            FieldType::Title => meta.title.clone(),
            FieldType::Author => meta.creator.clone(),
            FieldType::Seq => self.sequence(field),
            FieldType::Formula => {
                let value = evaluate(field.property("formula")?, scope)?;
                Some(format_number(value, field.property("#")))
            }
            FieldType::Other(name) => match name.as_str() {
                "SUBJECT" => meta.subject.clone(),
                "KEYWORDS" => (!meta.keywords.is_empty()).then(|| meta.keywords.join(", ")),
                "COMMENTS" => meta.description.clone(),
                "LASTSAVEDBY" => meta.last_modified_by.clone(),
                _ => None,
            },
            _ => None,
        }
    }

    /// `SEQ id`: next value; `\r n` resets to n; `\c` repeats the current
    /// value; `\h` counts but displays nothing.
    fn sequence(&self, field: &Field) -> Option<String> {
        let id = field.property("identifier")?;
        let mut sequences = self.sequences.borrow_mut();
        let counter = sequences.entry(id.to_string()).or_insert(0);

        if let Some(reset) = field.property("r").and_then(|r| r.parse().ok()) {
            *counter = reset;
        } else if field.property("c").is_none() {
            *counter += 1;
        }

        if field.property("h").is_some() {
            return Some(String::new());
        }
        Some(counter.to_string())
    }
}

/// Format a formula result: whole numbers without decimals, others with
/// two, unless a `\#` picture asks for a number of decimals.
fn format_number(value: f64, picture: Option<&str>) -> String {
    let decimals = picture
        .and_then(|p| p.split_once('.'))
        .map(|(_, fraction)| fraction.chars().take_while(|c| *c == '0' || *c == '#').count());
    match decimals {
        Some(places) => format!("{:.*}", places, value),
        None if value.fract() == 0.0 => format!("{:.0}", value),
        None => format!("{:.2}", value),
    }
}

/// Evaluate a table formula (`SUM(ABOVE)`, `2*(3+4)`, `AVERAGE(LEFT)`...).
/// Cell references (`A1`) and unknown functions make it unresolvable.
pub fn evaluate(formula: &str, scope: Option<&FormulaScope>) -> Option<f64> {
    let mut parser = FormulaParser {
        text: formula.trim().trim_start_matches('=').as_bytes(),
        pos: 0,
        scope,
    };
    let value = parser.expression()?;
    parser.skip_whitespace();
    (parser.pos == parser.text.len() && value.is_finite()).then_some(value)
}

struct FormulaParser<'a> {
    text: &'a [u8],
    pos: usize,
    scope: Option<&'a FormulaScope>,
}

impl FormulaParser<'_> {
    fn skip_whitespace(&mut self) {
        while self.text.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.text.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat(b'+') {
                value += self.term()?;
            } else if self.eat(b'-') {
                value -= self.term()?;
            } else {
                return Some(value);
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        loop {
            if self.eat(b'*') {
                value *= self.factor()?;
            } else if self.eat(b'/') {
                let divisor = self.factor()?;
                if divisor == 0.0 {
                    return None;
                }
                value /= divisor;
            } else {
                return Some(value);
            }
        }
    }

    fn factor(&mut self) -> Option<f64> {
        match self.peek()? {
            b'-' => {
                self.pos += 1;
                Some(-self.factor()?)
            }
            b'+' => {
                self.pos += 1;
                self.factor()
            }
            b'(' => {
                self.pos += 1;
                let value = self.expression()?;
                self.eat(b')').then_some(value)
            }
            b'0'..=b'9' | b'.' => self.number(),
            c if c.is_ascii_alphabetic() => {
                let name = self.identifier();
                if self.eat(b'(') {
                    self.call(&name)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        while self
            .text
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_digit() || *c == b'.')
        {
            self.pos += 1;
        }
        std::str::from_utf8(&self.text[start..self.pos])
            .ok()?
            .parse()
            .ok()
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self.text.get(self.pos).is_some_and(u8::is_ascii_alphanumeric) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.text[start..self.pos]).to_ascii_uppercase()
    }

    /// Neighbour values named by a direction argument. Cells below and to
    /// the right are not decoded yet, so they contribute nothing.
    fn direction(&self, name: &str) -> Option<Vec<f64>> {
        let scope = self.scope.cloned().unwrap_or_default();
        match name {
            "ABOVE" => Some(scope.above),
            "LEFT" => Some(scope.left),
            "BELOW" | "RIGHT" => Some(Vec::new()),
            _ => None,
        }
    }

    /// Arguments up to the closing parenthesis, then the function applied.
    fn call(&mut self, name: &str) -> Option<f64> {
        let mut args = Vec::new();
        if !self.eat(b')') {
            loop {
                let start = self.pos;
                let word = if self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                    Some(self.identifier())
                } else {
                    None
                };
                let values = word.as_deref().and_then(|w| self.direction(w));
                let is_call = self.peek() == Some(b'(');
                match values {
                    Some(values) if !is_call => args.extend(values),
                    _ => {
                        self.pos = start;
                        args.push(self.expression()?);
                    }
                }
                if self.eat(b')') {
                    break;
                }
                if !(self.eat(b',') || self.eat(b';')) {
                    return None;
                }
            }
        }

        let count = args.len() as f64;
        let value = match name {
            "SUM" => args.iter().sum(),
            "AVERAGE" if args.is_empty() => 0.0,
            "AVERAGE" => args.iter().sum::<f64>() / count,
            "COUNT" => count,
            "MIN" => args.iter().copied().reduce(f64::min).unwrap_or(0.0),
            "MAX" => args.iter().copied().reduce(f64::max).unwrap_or(0.0),
            "PRODUCT" if args.is_empty() => 0.0,
            "PRODUCT" => args.iter().product(),
            "ABS" => args.first()?.abs(),
            _ => return None,
        };
        Some(value)
    }
}
