//! Run and paragraph property blocks (`w:rPr`, `w:pPr`), plus the border and
//! shading elements shared with tables.
//!
//! Values are kept in their stored units except where the model says
//! otherwise (font sizes and border widths are points).
//!
//! Formatting is layered: document defaults, the paragraph style chain, the
//! character style chain, then direct formatting. A run property block is
//! therefore decoded into the list of [`RunProperty`] values it declares,
//! and each layer is applied over the one below it. Paragraph blocks merge
//! the same way through [`apply_paragraph_properties`].

use super::theme::{adjust_color, Theme};
use crate::model::{
    Border, Borders, ConditionalFormatting, DropCap, FrameProperties, Indentation, LineRule,
    ParagraphProperties, Shading, Spacing, TextAlignment, TextDirection, TextStyle,
    VerticalAlignment,
};
use crate::units::{eighth_points_to_points, half_points_to_points};
use crate::xml::{ns, Node};
use std::str::FromStr;

/// `w:val` of the named child element.
pub(crate) fn child_val<'a>(node: Node<'a>, local: &str) -> Option<&'a str> {
    node.child(ns::W, local).and_then(|n| n.attr(ns::W, "val"))
}

/// Parse a numeric attribute value, ignoring malformed numbers.
pub(crate) fn num<T: FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// An on/off property element: present without `w:val` means on;
/// `0`, `false` and `off` switch it off.
pub(crate) fn toggle(node: Option<Node<'_>>) -> bool {
    match node {
        Some(n) => !matches!(n.attr(ns::W, "val"), Some("0" | "false" | "off")),
        None => false,
    }
}

/// On/off character properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunToggle {
    Bold,
    Italic,
    Strike,
    DoubleStrike,
    Caps,
    SmallCaps,
    Hidden,
    Outline,
    Shadow,
    Emboss,
    Imprint,
}

/// Element names of each toggle. Bold and italic have a complex-script
/// twin; either one switched on turns the property on.
const TOGGLES: &[(RunToggle, &[&str])] = &[
    (RunToggle::Bold, &["b", "bCs"]),
    (RunToggle::Italic, &["i", "iCs"]),
    (RunToggle::Strike, &["strike"]),
    (RunToggle::DoubleStrike, &["dstrike"]),
    (RunToggle::Caps, &["caps"]),
    (RunToggle::SmallCaps, &["smallCaps"]),
    (RunToggle::Hidden, &["vanish"]),
    (RunToggle::Outline, &["outline"]),
    (RunToggle::Shadow, &["shadow"]),
    (RunToggle::Emboss, &["emboss"]),
    (RunToggle::Imprint, &["imprint"]),
];

/// `w:rFonts` slots in lookup order, each with its theme reference twin.
const FONT_SLOTS: &[(&str, &str)] = &[
    ("ascii", "asciiTheme"),
    ("hAnsi", "hAnsiTheme"),
    ("eastAsia", "eastAsiaTheme"),
    ("cs", "cstheme"),
];

/// One character property declared by a `w:rPr` block.
///
/// `None` payloads are explicit "off" values (`w:u w:val="none"`,
/// `w:color w:val="auto"`, ...) that clear what a lower layer set.
#[derive(Debug, Clone, PartialEq)]
pub enum RunProperty {
    Toggle(RunToggle, bool),
    Underline(Option<String>),
    VerticalAlign(String),
    Color(Option<String>),
    Highlight(Option<String>),
    Background(Option<String>),
    FontFamily(String),
    FontSize(f64),
    FontSizeCs(f64),
    CharacterSpacing(i32),
    Position(i32),
    Kerning(u32),
    Scale(u32),
    Emphasis(Option<String>),
    Language(String),
}

impl RunProperty {
    pub fn apply(&self, style: &mut TextStyle) {
        match self {
            RunProperty::Toggle(which, on) => *toggle_slot(style, *which) = *on,
            RunProperty::Underline(v) => style.underline = v.clone(),
            RunProperty::VerticalAlign(v) => {
                style.superscript = v == "superscript";
                style.subscript = v == "subscript";
            }
            RunProperty::Color(v) => style.color = v.clone(),
            RunProperty::Highlight(v) => style.highlight = v.clone(),
            RunProperty::Background(v) => style.background = v.clone(),
            RunProperty::FontFamily(v) => style.font_family = Some(v.clone()),
            RunProperty::FontSize(v) => style.font_size = Some(*v),
            RunProperty::FontSizeCs(v) => style.font_size_cs = Some(*v),
            RunProperty::CharacterSpacing(v) => style.character_spacing = Some(*v),
            RunProperty::Position(v) => style.position = Some(*v),
            RunProperty::Kerning(v) => style.kerning = Some(*v),
            RunProperty::Scale(v) => style.scale = Some(*v),
            RunProperty::Emphasis(v) => style.emphasis = v.clone(),
            RunProperty::Language(v) => style.language = Some(v.clone()),
        }
    }
}

fn toggle_slot(style: &mut TextStyle, which: RunToggle) -> &mut bool {
    match which {
        RunToggle::Bold => &mut style.bold,
        RunToggle::Italic => &mut style.italic,
        RunToggle::Strike => &mut style.strikethrough,
        RunToggle::DoubleStrike => &mut style.double_strikethrough,
        RunToggle::Caps => &mut style.caps,
        RunToggle::SmallCaps => &mut style.small_caps,
        RunToggle::Hidden => &mut style.hidden,
        RunToggle::Outline => &mut style.outline,
        RunToggle::Shadow => &mut style.shadow,
        RunToggle::Emboss => &mut style.emboss,
        RunToggle::Imprint => &mut style.imprint,
    }
}

/// Apply one layer of run properties over a style.
pub fn apply_run_properties(style: &mut TextStyle, layer: &[RunProperty]) {
    for property in layer {
        property.apply(style);
    }
}

/// `w:color`: a theme color (with its tint or shade) when the theme knows
/// it, otherwise the literal value. `auto` is no color.
fn run_color(color: Node<'_>, theme: Option<&Theme>) -> Option<String> {
    color
        .attr(ns::W, "themeColor")
        .and_then(|name| theme?.color(name))
        .map(|hex| {
            adjust_color(
                hex,
                color.attr(ns::W, "themeTint"),
                color.attr(ns::W, "themeShade"),
            )
        })
        .or_else(|| {
            color
                .attr(ns::W, "val")
                .filter(|c| *c != "auto")
                .map(str::to_string)
        })
}

/// First named font of `w:rFonts`. A theme reference beats the literal
/// name of the same slot; `+mj-lt` style names are resolved too.
fn run_font(fonts: Node<'_>, theme: Option<&Theme>) -> Option<String> {
    FONT_SLOTS.iter().find_map(|(slot, theme_slot)| {
        let themed = fonts
            .attr(ns::W, theme_slot)
            .and_then(|reference| theme?.font(reference));
        let literal = fonts.attr(ns::W, slot).map(|name| {
            match theme.filter(|_| name.starts_with('+')) {
                Some(theme) => theme.font(name).unwrap_or(name).to_string(),
                None => name.to_string(),
            }
        });
        themed.map(str::to_string).or(literal)
    })
}

/// The character properties a `w:rPr` block declares, in a fixed order.
pub fn run_properties(rpr: Node<'_>, theme: Option<&Theme>) -> Vec<RunProperty> {
    let mut props = Vec::new();

    for (which, names) in TOGGLES {
        let states: Vec<bool> = names
            .iter()
            .filter_map(|name| rpr.child(ns::W, name))
            .map(|n| toggle(Some(n)))
            .collect();
        if !states.is_empty() {
            props.push(RunProperty::Toggle(*which, states.contains(&true)));
        }
    }

    if let Some(u) = rpr.child(ns::W, "u") {
        props.push(RunProperty::Underline(match u.attr(ns::W, "val") {
            Some("none") => None,
            Some(kind) => Some(kind.to_string()),
            None => Some("single".to_string()),
        }));
    }
    if let Some(align) = child_val(rpr, "vertAlign") {
        props.push(RunProperty::VerticalAlign(align.to_string()));
    }
    if let Some(color) = rpr.child(ns::W, "color") {
        props.push(RunProperty::Color(run_color(color, theme)));
    }
    if let Some(highlight) = child_val(rpr, "highlight") {
        props.push(RunProperty::Highlight(
            (highlight != "none").then(|| highlight.to_string()),
        ));
    }
    if let Some(shd) = rpr.child(ns::W, "shd") {
        props.push(RunProperty::Background(
            shd.attr(ns::W, "fill")
                .filter(|f| !f.is_empty() && *f != "auto")
                .map(str::to_string),
        ));
    }
    if let Some(font) = rpr.child(ns::W, "rFonts").and_then(|f| run_font(f, theme)) {
        props.push(RunProperty::FontFamily(font));
    }
    if let Some(size) = num::<u32>(child_val(rpr, "sz")) {
        props.push(RunProperty::FontSize(half_points_to_points(size)));
    }
    if let Some(size) = num::<u32>(child_val(rpr, "szCs")) {
        props.push(RunProperty::FontSizeCs(half_points_to_points(size)));
    }
    if let Some(spacing) = num(child_val(rpr, "spacing")) {
        props.push(RunProperty::CharacterSpacing(spacing));
    }
    if let Some(position) = num(child_val(rpr, "position")) {
        props.push(RunProperty::Position(position));
    }
    if let Some(kern) = num(child_val(rpr, "kern")) {
        props.push(RunProperty::Kerning(kern));
    }
    if let Some(scale) = num(child_val(rpr, "w")) {
        props.push(RunProperty::Scale(scale));
    }
    if let Some(em) = child_val(rpr, "em") {
        props.push(RunProperty::Emphasis((em != "none").then(|| em.to_string())));
    }
    if let Some(lang) = child_val(rpr, "lang") {
        props.push(RunProperty::Language(lang.to_string()));
    }

    props
}

/// Run formatting declared directly by a `w:rPr` element.
pub fn parse_text_style(rpr: Node<'_>, theme: Option<&Theme>) -> TextStyle {
    let mut style = TextStyle::default();
    apply_run_properties(&mut style, &run_properties(rpr, theme));
    style
}

/// A single border edge (`w:top`, `w:insideH`, ...).
///
/// `none`/`nil` styles are kept as written; widths are converted from
/// eighths of a point.
pub fn parse_border(node: Node<'_>) -> Border {
    Border {
        style: node.attr(ns::W, "val").unwrap_or("none").to_string(),
        width: num::<u32>(node.attr(ns::W, "sz")).map(eighth_points_to_points),
        color: node.attr(ns::W, "color").map(str::to_string),
        space: num(node.attr(ns::W, "space")),
    }
}

/// A border container (`w:pBdr`, `w:tblBorders`, `w:tcBorders`).
///
/// Logical `start`/`end` edges are read as left/right.
pub fn parse_borders(node: Node<'_>) -> Option<Borders> {
    let edge = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| node.child(ns::W, name))
            .map(parse_border)
    };
    let borders = Borders {
        top: edge(&["top"]),
        bottom: edge(&["bottom"]),
        left: edge(&["left", "start"]),
        right: edge(&["right", "end"]),
        inside_h: edge(&["insideH"]),
        inside_v: edge(&["insideV"]),
        between: edge(&["between"]),
        bar: edge(&["bar"]),
    };
    (!borders.is_empty()).then_some(borders)
}

/// `w:shd` as a fill/pattern/color triple.
pub fn parse_shading(node: Node<'_>) -> Option<Shading> {
    let get = |local: &str| node.attr(ns::W, local).map(str::to_string);
    let shading = Shading {
        fill: get("fill"),
        pattern: get("val"),
        color: get("color"),
    };
    (shading != Shading::default()).then_some(shading)
}

/// `w:cnfStyle`, from its bit pattern or, failing that, the transitional
/// attribute form.
pub fn parse_conditional_formatting(node: Node<'_>) -> ConditionalFormatting {
    if let Some(pattern) = node.attr(ns::W, "val") {
        return ConditionalFormatting::from_pattern(pattern);
    }
    let on = |local: &str| matches!(node.attr(ns::W, local), Some("1" | "true" | "on"));
    ConditionalFormatting {
        first_row: on("firstRow"),
        last_row: on("lastRow"),
        first_column: on("firstColumn"),
        last_column: on("lastColumn"),
        banded_rows: on("oddHBand") || on("evenHBand"),
        banded_columns: on("oddVBand") || on("evenVBand"),
    }
}

fn parse_spacing(node: Node<'_>) -> Option<Spacing> {
    let spacing = Spacing {
        before: num(node.attr(ns::W, "before")),
        after: num(node.attr(ns::W, "after")),
        line: num(node.attr(ns::W, "line")),
        line_rule: node.attr(ns::W, "lineRule").and_then(LineRule::parse),
    };
    (spacing != Spacing::default()).then_some(spacing)
}

fn parse_indentation(node: Node<'_>) -> Option<Indentation> {
    let twips = |names: &[&str]| names.iter().find_map(|n| num(node.attr(ns::W, n)));
    let hanging = twips(&["hanging"]);
    let indentation = Indentation {
        left: twips(&["left", "start"]),
        right: twips(&["right", "end"]),
        first_line: if hanging.is_some() {
            None
        } else {
            twips(&["firstLine"])
        },
        hanging,
    };
    (indentation != Indentation::default()).then_some(indentation)
}

fn parse_frame(node: Node<'_>) -> FrameProperties {
    let get = |local: &str| node.attr(ns::W, local);
    FrameProperties {
        drop_cap: match get("dropCap") {
            Some("drop") => DropCap::Drop,
            Some("margin") => DropCap::Margin,
            _ => DropCap::None,
        },
        lines: num(get("lines")).unwrap_or(crate::model::DEFAULT_DROP_CAP_LINES),
        wrap: get("wrap").map(str::to_string),
        horizontal_anchor: get("hAnchor").map(str::to_string),
        vertical_anchor: get("vAnchor").map(str::to_string),
        x: num(get("x")),
        y: num(get("y")),
        width: num(get("w")),
        height: num(get("h")),
        horizontal_space: num(get("hSpace")),
        vertical_space: num(get("vSpace")),
    }
}

fn merge_spacing(base: Option<Spacing>, over: Spacing) -> Spacing {
    let base = base.unwrap_or_default();
    Spacing {
        before: over.before.or(base.before),
        after: over.after.or(base.after),
        line: over.line.or(base.line),
        line_rule: over.line_rule.or(base.line_rule),
    }
}

/// First-line and hanging indents replace each other as a pair.
fn merge_indentation(base: Option<Indentation>, over: Indentation) -> Indentation {
    let base = base.unwrap_or_default();
    let (first_line, hanging) = if over.first_line.is_some() || over.hanging.is_some() {
        (over.first_line, over.hanging)
    } else {
        (base.first_line, base.hanging)
    };
    Indentation {
        left: over.left.or(base.left),
        right: over.right.or(base.right),
        first_line,
        hanging,
    }
}

fn merge_borders(base: Option<Borders>, over: Borders) -> Borders {
    let base = base.unwrap_or_default();
    Borders {
        top: over.top.or(base.top),
        bottom: over.bottom.or(base.bottom),
        left: over.left.or(base.left),
        right: over.right.or(base.right),
        inside_h: over.inside_h.or(base.inside_h),
        inside_v: over.inside_v.or(base.inside_v),
        between: over.between.or(base.between),
        bar: over.bar.or(base.bar),
    }
}

fn merge_shading(base: Option<Shading>, over: Shading) -> Shading {
    let base = base.unwrap_or_default();
    Shading {
        fill: over.fill.or(base.fill),
        pattern: over.pattern.or(base.pattern),
        color: over.color.or(base.color),
    }
}

/// Overlay a `w:pPr` block on properties inherited from lower layers.
///
/// Only what the block declares changes. Spacing, indentation, shading and
/// borders merge attribute by attribute (borders edge by edge); everything
/// else is replaced when present.
pub fn apply_paragraph_properties(props: &mut ParagraphProperties, ppr: Node<'_>) {
    if let Some(id) = child_val(ppr, "pStyle") {
        props.style_id = Some(id.to_string());
    }
    if let Some(alignment) = child_val(ppr, "jc").and_then(TextAlignment::from_jc) {
        props.alignment = Some(alignment);
    }
    if let Some(spacing) = ppr.child(ns::W, "spacing").and_then(parse_spacing) {
        props.spacing = Some(merge_spacing(props.spacing.take(), spacing));
    }
    if let Some(ind) = ppr.child(ns::W, "ind").and_then(parse_indentation) {
        props.indentation = Some(merge_indentation(props.indentation.take(), ind));
    }

    if let Some(direction) = child_val(ppr, "textDirection")
        .or_else(|| child_val(ppr, "textFlow"))
        .and_then(TextDirection::from_flow)
    {
        props.text_direction = Some(direction);
    }
    if let Some(bidi) = ppr.child(ns::W, "bidi") {
        if toggle(Some(bidi)) {
            props.text_direction = Some(TextDirection::RightToLeft);
        } else if props.text_direction == Some(TextDirection::RightToLeft) {
            props.text_direction = None;
        }
    }

    if let Some(align) = child_val(ppr, "textAlignment").and_then(VerticalAlignment::parse) {
        props.vertical_alignment = Some(align);
    }
    if let Some(borders) = ppr.child(ns::W, "pBdr").and_then(parse_borders) {
        props.borders = Some(merge_borders(props.borders.take(), borders));
    }
    if let Some(shading) = ppr.child(ns::W, "shd").and_then(parse_shading) {
        props.shading = Some(merge_shading(props.shading.take(), shading));
    }
    if let Some(frame) = ppr.child(ns::W, "framePr") {
        props.frame = Some(parse_frame(frame));
    }
    if let Some(cnf) = ppr.child(ns::W, "cnfStyle") {
        props.conditional_formatting = Some(parse_conditional_formatting(cnf));
    }
    if let Some(level) = num(child_val(ppr, "outlineLvl")) {
        props.outline_level = Some(level);
    }

    for (local, slot) in [
        ("keepNext", &mut props.keep_next),
        ("keepLines", &mut props.keep_lines),
        ("pageBreakBefore", &mut props.page_break_before),
    ] {
        if let Some(node) = ppr.child(ns::W, local) {
            *slot = toggle(Some(node));
        }
    }
}

/// Paragraph properties declared directly by a `w:pPr` element. List
/// membership (`w:numPr`) is read separately by [`list_reference`].
pub fn parse_paragraph_properties(ppr: Node<'_>) -> ParagraphProperties {
    let mut props = ParagraphProperties::default();
    apply_paragraph_properties(&mut props, ppr);
    props
}

/// List instance id and level from `w:numPr`. A `numId` of 0 removes list
/// membership, so it yields nothing.
pub fn list_reference(ppr: Node<'_>) -> Option<(String, u8)> {
    let num_pr = ppr.child(ns::W, "numPr")?;
    let num_id = child_val(num_pr, "numId").filter(|id| *id != "0")?;
    let level = num(child_val(num_pr, "ilvl")).unwrap_or(0);
    Some((num_id.to_string(), level))
}
