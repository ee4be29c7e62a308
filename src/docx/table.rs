//! Tables: properties at table, row and cell level, and merge geometry.

use super::field_lookup::FormulaScope;
use super::part::PartParser;
use super::properties::{
    child_val, num, parse_borders, parse_conditional_formatting, parse_shading, toggle,
};
use crate::model::{
    Cell, CellMargins, Row, RowHeight, Table, TableLook, TextAlignment, TextDirection,
    VerticalAlignment, VerticalMerge, Width, WidthUnit,
};
use crate::xml::{ns, Node};
use std::collections::HashMap;

/// `w:tblW` / `w:tcW`. A `%`-suffixed value (strict documents) is converted
/// to fiftieths of a percent.
pub fn parse_width(node: Node<'_>) -> Option<Width> {
    let raw = node.attr(ns::W, "w").unwrap_or("0").trim();
    if let Some(percent) = raw.strip_suffix('%') {
        let value: f64 = percent.trim().parse().ok()?;
        return Some(Width {
            value: (value * 50.0).round() as i64,
            unit: WidthUnit::Pct,
        });
    }
    let unit = match node.attr(ns::W, "type") {
        Some("pct") => WidthUnit::Pct,
        Some("auto") => WidthUnit::Auto,
        Some("nil") => WidthUnit::Nil,
        _ => WidthUnit::Dxa,
    };
    Some(Width {
        value: raw.parse().unwrap_or(0),
        unit,
    })
}

/// `w:tblCellMar` / `w:tcMar`, with logical `start`/`end` as left/right.
pub fn parse_margins(node: Node<'_>) -> Option<CellMargins> {
    let side = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| node.child(ns::W, name))
            .and_then(|n| num(n.attr(ns::W, "w")))
    };
    let margins = CellMargins {
        top: side(&["top"]),
        bottom: side(&["bottom"]),
        left: side(&["left", "start"]),
        right: side(&["right", "end"]),
    };
    (margins != CellMargins::default()).then_some(margins)
}

/// `w:tblLook`, either the attribute form or the legacy hex bitmask.
pub fn parse_look(node: Node<'_>) -> TableLook {
    let has_attributes = ["firstRow", "lastRow", "firstColumn", "lastColumn", "noHBand", "noVBand"]
        .iter()
        .any(|a| node.attr(ns::W, a).is_some());

    if !has_attributes {
        if let Some(mask) = node
            .attr(ns::W, "val")
            .and_then(|v| u32::from_str_radix(v, 16).ok())
        {
            return TableLook {
                first_row: mask & 0x0020 != 0,
                last_row: mask & 0x0040 != 0,
                first_column: mask & 0x0080 != 0,
                last_column: mask & 0x0100 != 0,
                banded_rows: mask & 0x0200 == 0,
                banded_columns: mask & 0x0400 == 0,
            };
        }
    }

    let on = |local: &str| matches!(node.attr(ns::W, local), Some("1" | "true" | "on"));
    TableLook {
        first_row: on("firstRow"),
        last_row: on("lastRow"),
        first_column: on("firstColumn"),
        last_column: on("lastColumn"),
        banded_rows: !on("noHBand"),
        banded_columns: !on("noVBand"),
    }
}

/// Children of a table-like container, looking through `w:sdt` and
/// `w:customXml` wrappers.
fn wrapped_children<'a>(node: Node<'a>, local: &'static str) -> Vec<Node<'a>> {
    let mut found = Vec::new();
    for child in node.children() {
        if child.is(ns::W, local) {
            found.push(child);
        } else if child.is(ns::W, "sdt") {
            if let Some(content) = child.child(ns::W, "sdtContent") {
                found.extend(wrapped_children(content, local));
            }
        } else if child.is(ns::W, "customXml") {
            found.extend(wrapped_children(child, local));
        }
    }
    found
}

impl PartParser<'_> {
    /// Decode a `w:tbl` element, nested tables included.
    pub fn parse_table(&mut self, tbl: Node<'_>) -> Table {
        let mut table = Table::new();

        if let Some(tbl_pr) = tbl.child(ns::W, "tblPr") {
            table.style_id = child_val(tbl_pr, "tblStyle").map(str::to_string);
            table.width = tbl_pr.child(ns::W, "tblW").and_then(parse_width);
            table.alignment = child_val(tbl_pr, "jc").and_then(TextAlignment::from_jc);
            table.borders = tbl_pr.child(ns::W, "tblBorders").and_then(parse_borders);
            table.shading = tbl_pr.child(ns::W, "shd").and_then(parse_shading);
            table.cell_margins = tbl_pr.child(ns::W, "tblCellMar").and_then(parse_margins);
            table.look = tbl_pr.child(ns::W, "tblLook").map(parse_look);
        }

        if let Some(grid) = tbl.child(ns::W, "tblGrid") {
            table.column_widths = grid
                .children_named(ns::W, "gridCol")
                .iter()
                .map(|col| num(col.attr(ns::W, "w")).unwrap_or(0))
                .collect();
        }

        let mut grid_offsets = Vec::new();
        for tr in wrapped_children(tbl, "tr") {
            let (row, offset) = self.parse_row(tr, &table, &grid_offsets);
            table.add_row(row);
            grid_offsets.push(offset);
        }

        apply_vertical_merges(&mut table.rows, &grid_offsets, self.part_path);
        table
    }

    /// A row and the number of grid columns skipped before its first cell.
    /// `table` holds the rows decoded so far, `grid_offsets` their offsets.
    fn parse_row(
        &mut self,
        tr: Node<'_>,
        table: &Table,
        grid_offsets: &[usize],
    ) -> (Row, usize) {
        let mut row = Row::new();
        let mut grid_before = 0;

        if let Some(tr_pr) = tr.child(ns::W, "trPr") {
            row.is_header = tr_pr
                .child(ns::W, "tblHeader")
                .map(|h| toggle(Some(h)));
            row.height = tr_pr.child(ns::W, "trHeight").and_then(|h| {
                Some(RowHeight {
                    value: num(h.attr(ns::W, "val"))?,
                    rule: h.attr(ns::W, "hRule").map(str::to_string),
                })
            });
            row.cant_split = toggle(tr_pr.child(ns::W, "cantSplit"));
            row.conditional_formatting = tr_pr
                .child(ns::W, "cnfStyle")
                .map(parse_conditional_formatting);
            grid_before = num(child_val(tr_pr, "gridBefore")).unwrap_or(0);
        }

        let mut column = grid_before;
        for tc in wrapped_children(tr, "tc") {
            self.formula_scopes.push(FormulaScope {
                above: numbers_above(table, grid_offsets, column),
                left: row.cells.iter().rev().map_while(cell_number).collect(),
            });
            let cell = self.parse_cell(tc);
            self.formula_scopes.pop();
            column += cell.col_span.max(1) as usize;
            row.add_cell(cell);
        }

        (row, grid_before)
    }

    /// A cell, with only the properties its own `w:tcPr` declares. The
    /// table-level fallbacks are applied by [`Table::effective_borders`] and
    /// its siblings.
    fn parse_cell(&mut self, tc: Node<'_>) -> Cell {
        let mut cell = Cell::new();

        if let Some(tc_pr) = tc.child(ns::W, "tcPr") {
            cell.col_span = num::<u32>(child_val(tc_pr, "gridSpan")).unwrap_or(1).max(1);
            cell.vertical_merge = tc_pr.child(ns::W, "vMerge").map(|v| {
                match v.attr(ns::W, "val") {
                    Some("restart") => VerticalMerge::Restart,
                    _ => VerticalMerge::Continue,
                }
            });
            cell.width = tc_pr.child(ns::W, "tcW").and_then(parse_width);
            cell.borders = tc_pr.child(ns::W, "tcBorders").and_then(parse_borders);
            cell.shading = tc_pr.child(ns::W, "shd").and_then(parse_shading);
            cell.margins = tc_pr.child(ns::W, "tcMar").and_then(parse_margins);
            cell.vertical_alignment = child_val(tc_pr, "vAlign").and_then(VerticalAlignment::parse);
            cell.text_direction = child_val(tc_pr, "textDirection").and_then(TextDirection::from_flow);
            cell.conditional_formatting = tc_pr
                .child(ns::W, "cnfStyle")
                .map(parse_conditional_formatting);
        }

        cell.content = self.parse_blocks(tc);
        cell
    }
}

/// Numeric value of a cell's text (`1,250`, `$40`, `12.5%`), if it has one.
fn cell_number(cell: &Cell) -> Option<f64> {
    let text: String = cell
        .plain_text()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | '%') && !c.is_whitespace())
        .collect();
    text.parse().ok()
}

/// The cell of `row` covering grid `column`.
fn cell_at(row: &Row, offset: usize, column: usize) -> Option<&Cell> {
    let mut start = offset;
    for cell in &row.cells {
        let end = start + cell.col_span.max(1) as usize;
        if (start..end).contains(&column) {
            return Some(cell);
        }
        start = end;
    }
    None
}

/// Numbers in the grid column above, nearest first, up to the first cell
/// that is not a number (usually the header).
fn numbers_above(table: &Table, grid_offsets: &[usize], column: usize) -> Vec<f64> {
    table
        .rows
        .iter()
        .zip(grid_offsets)
        .rev()
        .map_while(|(row, offset)| cell_at(row, *offset, column).and_then(cell_number))
        .collect()
}

/// Derive `row_span` from vertical merge markers over the virtual grid.
///
/// A `restart` opens a run at its grid column; each `continue` below it
/// extends the run and is marked absorbed (`row_span == 0`). The first cell
/// at that column without a merge marker, or the end of the table, closes
/// the run and writes its length onto the starting cell.
fn apply_vertical_merges(rows: &mut [Row], grid_offsets: &[usize], part: &str) {
    // column -> (row index, cell index, rows covered)
    let mut open: HashMap<usize, (usize, usize, u32)> = HashMap::new();
    let mut finished: Vec<(usize, usize, u32)> = Vec::new();

    for (r, row) in rows.iter_mut().enumerate() {
        let mut column = grid_offsets.get(r).copied().unwrap_or(0);
        for (c, cell) in row.cells.iter_mut().enumerate() {
            match cell.vertical_merge {
                Some(VerticalMerge::Restart) => {
                    finished.extend(open.insert(column, (r, c, 1)));
                }
                Some(VerticalMerge::Continue) => {
                    match open.get_mut(&column) {
                        Some(run) => run.2 += 1,
                        None => log::warn!(
                            "{}: vertical merge continues at row {}, column {} with nothing above",
                            part,
                            r,
                            column
                        ),
                    }
                    cell.row_span = 0;
                }
                None => finished.extend(open.remove(&column)),
            }
            column += cell.col_span.max(1) as usize;
        }
    }
    finished.extend(open.into_values());

    for (r, c, count) in finished {
        if let Some(cell) = rows.get_mut(r).and_then(|row| row.cells.get_mut(c)) {
            cell.row_span = count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::part::test_support::*;
    use super::super::part::DecodeContext;
    use super::super::styles::StyleMap;
    use super::*;
    use crate::model::Element;
    use crate::options::DecodeOptions;
    use crate::xml::{parse_xml, with_ns};

    fn table(inner: &str) -> Table {
        let container = container(&[("word/document.xml", "<x/>")]);
        let options = DecodeOptions::default();
        let styles = StyleMap::default();
        let ctx = DecodeContext::new(&container, &options, &styles);
        let mut parser = PartParser::for_part(&ctx, "word/document.xml");
        let xml = format!("<w:tbl {}>{}</w:tbl>", W_NS, inner);
        let doc = parse_xml(&xml).unwrap();
        parser.parse_table(doc.root())
    }

    fn cell(props: &str, text: &str) -> String {
        format!(
            "<w:tc><w:tcPr>{}</w:tcPr><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>",
            props, text
        )
    }

    #[test]
    fn test_gridspan_with_vertical_merge() {
        let t = table(&format!(
            "<w:tr>{}{}</w:tr><w:tr>{}{}</w:tr>",
            cell(r#"<w:gridSpan w:val="2"/><w:vMerge w:val="restart"/>"#, "merged"),
            cell("", "right"),
            cell(r#"<w:gridSpan w:val="2"/><w:vMerge/>"#, ""),
            cell("", "right2"),
        ));
        let first = &t.rows[0].cells[0];
        assert_eq!(first.row_span, 2);
        assert_eq!(first.col_span, 2);
        assert!(t.rows[1].cells[0].is_absorbed());
        assert_eq!(t.rows[0].cells[1].row_span, 1);
        assert!(t.has_merged_cells());
        assert_eq!(t.column_count(), 3);
    }

    #[test]
    fn test_merge_closed_by_plain_cell() {
        let restart = cell(r#"<w:vMerge w:val="restart"/>"#, "a");
        let cont = cell(r#"<w:vMerge w:val="continue"/>"#, "");
        let plain = cell("", "d");
        let t = table(&format!(
            "<w:tr>{}</w:tr><w:tr>{}</w:tr><w:tr>{}</w:tr><w:tr>{}</w:tr><w:tr>{}</w:tr>",
            restart, cont, cont, plain, restart
        ));
        let spans: Vec<u32> = t.rows.iter().map(|r| r.cells[0].row_span).collect();
        assert_eq!(spans, vec![3, 0, 0, 1, 1]);
    }

    #[test]
    fn test_orphan_continue_is_tolerated() {
        let t = table(&format!(
            "<w:tr>{}{}</w:tr>",
            cell("", "a"),
            cell(r#"<w:vMerge/>"#, "b")
        ));
        assert_eq!(t.rows[0].cells[1].row_span, 0);
        assert_eq!(t.rows[0].cells[0].row_span, 1);
    }

    #[test]
    fn test_grid_before_shifts_columns() {
        let t = table(&format!(
            r#"<w:tr>{}{}</w:tr><w:tr><w:trPr><w:gridBefore w:val="1"/></w:trPr>{}</w:tr>"#,
            cell("", "a"),
            cell(r#"<w:vMerge w:val="restart"/>"#, "b"),
            cell(r#"<w:vMerge/>"#, ""),
        ));
        assert_eq!(t.rows[0].cells[1].row_span, 2);
        assert_eq!(t.rows[1].cells[0].row_span, 0);
    }

    #[test]
    fn test_table_properties() {
        let t = table(
            r#"<w:tblPr>
                <w:tblStyle w:val="TableGrid"/><w:tblW w:w="5000" w:type="pct"/><w:jc w:val="center"/>
                <w:tblBorders><w:top w:val="single" w:sz="8"/><w:insideH w:val="none"/></w:tblBorders>
                <w:shd w:val="clear" w:fill="EEEEEE"/>
                <w:tblCellMar><w:start w:w="108" w:type="dxa"/><w:end w:w="108" w:type="dxa"/></w:tblCellMar>
                <w:tblLook w:firstRow="1" w:lastRow="0" w:noVBand="1"/>
               </w:tblPr>
               <w:tblGrid><w:gridCol w:w="4680"/><w:gridCol w:w="4680"/></w:tblGrid>
               <w:tr><w:trPr><w:tblHeader/><w:trHeight w:val="400" w:hRule="exact"/><w:cantSplit/></w:trPr>
                 <w:tc><w:tcPr><w:tcW w:w="2400" w:type="dxa"/><w:shd w:fill="FF0000"/><w:vAlign w:val="center"/><w:textDirection w:val="btLr"/></w:tcPr><w:p/></w:tc>
                 <w:tc><w:p/></w:tc>
               </w:tr>"#,
        );
        assert_eq!(t.style_id.as_deref(), Some("TableGrid"));
        assert_eq!(t.width.unwrap().percent(), Some(100.0));
        assert_eq!(t.alignment, Some(TextAlignment::Center));
        assert_eq!(t.column_widths, vec![4680, 4680]);
        let borders = t.borders.clone().unwrap();
        assert_eq!(borders.top.unwrap().width, Some(1.0));
        assert_eq!(borders.inside_h.unwrap().style, "none");
        assert_eq!(t.cell_margins.clone().unwrap().left, Some(108));
        let look = t.look.unwrap();
        assert!(look.first_row && !look.last_row);
        assert!(look.banded_rows && !look.banded_columns);

        let row = &t.rows[0];
        assert_eq!(row.is_header, Some(true));
        assert_eq!(row.height.as_ref().unwrap().value, 400);
        assert!(row.cant_split);

        let own = &row.cells[0];
        assert_eq!(own.width, Some(Width::dxa(2400)));
        assert_eq!(own.shading.as_ref().unwrap().fill.as_deref(), Some("FF0000"));
        assert_eq!(own.vertical_alignment, Some(VerticalAlignment::Center));
        assert_eq!(own.text_direction, Some(TextDirection::BottomToTop));

        let bare = &row.cells[1];
        assert!(bare.shading.is_none());
        assert!(bare.borders.is_none());
        assert!(bare.margins.is_none());
        assert!(bare.is_empty());
        assert_eq!(
            t.effective_shading(bare).and_then(|s| s.fill.as_deref()),
            Some("EEEEEE")
        );
        assert_eq!(
            t.effective_shading(own).and_then(|s| s.fill.as_deref()),
            Some("FF0000")
        );
        assert_eq!(t.effective_margins(bare).and_then(|m| m.left), Some(108));
    }

    #[test]
    fn test_cells_keep_only_declared_borders() {
        let t = table(
            r#"<w:tblPr><w:tblBorders>
                 <w:top w:val="single" w:sz="8"/><w:bottom w:val="double" w:sz="16"/>
               </w:tblBorders></w:tblPr>
               <w:tr>
                 <w:tc><w:p/></w:tc>
                 <w:tc><w:tcPr><w:tcBorders><w:left w:val="dotted" w:sz="4"/></w:tcBorders></w:tcPr><w:p/></w:tc>
               </w:tr>"#,
        );
        let plain = &t.rows[0].cells[0];
        assert_eq!(plain.borders, None);
        let inherited = t.effective_borders(plain).unwrap();
        assert_eq!(inherited.top.as_ref().unwrap().width, Some(1.0));
        assert_eq!(inherited.bottom.as_ref().unwrap().style, "double");
        assert_eq!(inherited.bottom.as_ref().unwrap().width, Some(2.0));

        let own = &t.rows[0].cells[1];
        let borders = t.effective_borders(own).unwrap();
        assert_eq!(borders.left.as_ref().unwrap().style, "dotted");
        assert!(borders.top.is_none());
    }

    #[test]
    fn test_formula_fields_sum_neighbour_cells() {
        let formula = |instr: &str| {
            format!(
                r#"<w:tc><w:p><w:r><w:fldChar w:fldCharType="begin"/><w:instrText>{}</w:instrText><w:fldChar w:fldCharType="end"/></w:r></w:p></w:tc>"#,
                instr
            )
        };
        let t = table(&format!(
            "<w:tr>{}{}</w:tr><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr>",
            cell("", "Item"),
            cell("", "Cost"),
            cell("", "Paper"),
            cell("", "1,200"),
            cell("", "Ink"),
            cell("", "300.5"),
            cell("", "12"),
            formula("=SUM(ABOVE)"),
        ));
        assert_eq!(t.rows[3].cells[1].plain_text(), "1500.50");

        let t = table(&format!(
            "<w:tr>{}{}{}</w:tr>",
            cell("", "2"),
            cell("", "3"),
            formula(r#"=PRODUCT(LEFT) \# "0""#),
        ));
        assert_eq!(t.rows[0].cells[2].plain_text(), "6");
    }

    #[test]
    fn test_width_forms() {
        let xml = with_ns(r#"<w:tblW w:w="50%" w:type="pct"/>"#);
        let doc = parse_xml(&xml).unwrap();
        assert_eq!(parse_width(doc.root()).unwrap().value, 2500);
        let xml = with_ns(r#"<w:tblW w:w="0" w:type="auto"/>"#);
        let doc = parse_xml(&xml).unwrap();
        assert_eq!(parse_width(doc.root()).unwrap().unit, WidthUnit::Auto);
        let xml = with_ns(r#"<w:tblLook w:val="04A0"/>"#);
        let doc = parse_xml(&xml).unwrap();
        let look = parse_look(doc.root());
        assert!(look.first_row && look.first_column && !look.last_row);
        assert!(look.banded_rows && !look.banded_columns);
    }

    #[test]
    fn test_nested_table_and_header_flag_absent() {
        let t = table(
            r#"<w:tr><w:tc>
                 <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
                 <w:p/>
               </w:tc></w:tr>"#,
        );
        assert_eq!(t.rows[0].is_header, None);
        let content = &t.rows[0].cells[0].content;
        match &content[0] {
            Element::Table(inner) => assert_eq!(inner.rows[0].cells[0].plain_text(), "inner"),
            other => panic!("expected nested table, got {:?}", other),
        }
    }
}
