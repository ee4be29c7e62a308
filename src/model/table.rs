//! Table model structures.

use super::{
    Borders, ConditionalFormatting, Element, Shading, TextAlignment, TextDirection,
    VerticalAlignment,
};
use serde::{Deserialize, Serialize};

/// Unit of a table or cell width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthUnit {
    /// Twips
    Dxa,
    /// Fiftieths of a percent
    Pct,
    Auto,
    Nil,
}

/// A width as written: absolute, percentage or automatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Width {
    pub value: i64,
    pub unit: WidthUnit,
}

impl Width {
    pub fn dxa(value: i64) -> Self {
        Self {
            value,
            unit: WidthUnit::Dxa,
        }
    }

    /// Percentage for `pct` widths.
    pub fn percent(&self) -> Option<f64> {
        match self.unit {
            WidthUnit::Pct => Some(crate::units::fiftieths_to_percent(self.value)),
            _ => None,
        }
    }

    /// Points for `dxa` widths.
    pub fn points(&self) -> Option<f64> {
        match self.unit {
            WidthUnit::Dxa => Some(crate::units::twips_to_points(self.value)),
            _ => None,
        }
    }
}

/// Cell padding in twips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMargins {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<i32>,
}

/// Vertical merge marker of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalMerge {
    /// Starts a merged region
    Restart,
    /// Continues the region from the cell above
    Continue,
}

/// Which table-style conditional formats are enabled (`w:tblLook`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLook {
    pub first_row: bool,
    pub last_row: bool,
    pub first_column: bool,
    pub last_column: bool,
    pub banded_rows: bool,
    pub banded_columns: bool,
}

impl Default for TableLook {
    fn default() -> Self {
        Self {
            first_row: false,
            last_row: false,
            first_column: false,
            last_column: false,
            banded_rows: true,
            banded_columns: true,
        }
    }
}

/// A cell in a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Block content: paragraphs and nested tables
    #[serde(default)]
    pub content: Vec<Element>,

    /// Horizontal span (`w:gridSpan`)
    #[serde(default = "default_span", skip_serializing_if = "is_default_span")]
    pub col_span: u32,

    /// Derived vertical span: 0 when absorbed by a cell above
    #[serde(default = "default_span", skip_serializing_if = "is_default_span")]
    pub row_span: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_merge: Option<VerticalMerge>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Width>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub borders: Option<Borders>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading: Option<Shading>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<CellMargins>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VerticalAlignment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_direction: Option<TextDirection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_formatting: Option<ConditionalFormatting>,
}

fn default_span() -> u32 {
    1
}

fn is_default_span(n: &u32) -> bool {
    *n == 1
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    /// Create a new empty cell.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            col_span: 1,
            row_span: 1,
            vertical_merge: None,
            width: None,
            borders: None,
            shading: None,
            margins: None,
            vertical_alignment: None,
            text_direction: None,
            conditional_formatting: None,
        }
    }

    /// Create a cell with one paragraph of text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut cell = Self::new();
        cell.content
            .push(Element::Paragraph(super::Paragraph::with_text(text)));
        cell
    }

    /// Get the plain text content, one line per block.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|e| e.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if this cell is empty.
    pub fn is_empty(&self) -> bool {
        self.content.iter().all(|e| e.plain_text().is_empty())
    }

    /// Whether this cell was absorbed by a vertical merge above it.
    pub fn is_absorbed(&self) -> bool {
        self.row_span == 0
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn has_spans(&self) -> bool {
        self.col_span > 1 || self.row_span > 1
    }
}

/// Row height and how it is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowHeight {
    /// Twips
    pub value: u32,
    /// `atLeast`, `exact` or `auto`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

/// A row in a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Cells in this row
    #[serde(default)]
    pub cells: Vec<Cell>,

    /// Explicit header-row flag (`w:tblHeader`); absent when not written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_header: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<RowHeight>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cant_split: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_formatting: Option<ConditionalFormatting>,
}

impl Row {
    /// Create a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell to this row.
    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Get the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Grid columns occupied by this row (sum of `col_span`).
    pub fn effective_columns(&self) -> usize {
        self.cells.iter().map(|c| c.col_span as usize).sum()
    }
}

/// A table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in this table
    #[serde(default)]
    pub rows: Vec<Row>,

    /// Grid column widths in twips (`w:tblGrid`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_widths: Vec<u32>,

    /// Table style ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Width>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub borders: Option<Borders>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading: Option<Shading>,

    /// Default cell margins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_margins: Option<CellMargins>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub look: Option<TableLook>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to this table.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (from the first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.effective_columns()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .any(|r| r.cells.iter().any(|c| c.has_spans() || c.is_absorbed()))
    }

    /// Borders drawn around `cell`: its own `tcBorders`, or the table's
    /// when it declares none.
    pub fn effective_borders<'a>(&'a self, cell: &'a Cell) -> Option<&'a Borders> {
        cell.borders.as_ref().or(self.borders.as_ref())
    }

    /// Shading of `cell`, falling back to the table's.
    pub fn effective_shading<'a>(&'a self, cell: &'a Cell) -> Option<&'a Shading> {
        cell.shading.as_ref().or(self.shading.as_ref())
    }

    /// Margins of `cell`, falling back to the table's default cell margins.
    pub fn effective_margins<'a>(&'a self, cell: &'a Cell) -> Option<&'a CellMargins> {
        cell.margins.as_ref().or(self.cell_margins.as_ref())
    }

    /// Get plain text representation, tab-separated cells.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for row in &self.rows {
            let cells: Vec<String> = row.cells.iter().map(|c| c.plain_text()).collect();
            text.push_str(&cells.join("\t"));
            text.push('\n');
        }
        text
    }
}
