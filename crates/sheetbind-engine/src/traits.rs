use crate::{EngineError, SheetFormat};
use chrono::NaiveDateTime;
use sheetbind_common::{CellCoord, CellKind, CellValue, DateSystem, ErrorCode};
use std::io::Write;

pub type StyleId = u32;

/// Zero-based address of a cell inside a workbook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub sheet: usize,
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(sheet: usize, row: u32, col: u32) -> Self {
        Self { sheet, row, col }
    }

    pub fn coord(self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }
}

/// Snapshot of a single cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    /// Adapter-local style handle; `None` when the adapter tracks styles
    /// natively and only copies them through [`Workbook::copy_cell_format`].
    pub style: Option<StyleId>,
    pub comment: Option<String>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            style: None,
            comment: None,
        }
    }

    pub fn with_style(mut self, style: StyleId) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn kind(&self) -> CellKind {
        self.value.kind()
    }
}

/// A typed write into a single cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellWrite {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Stored as a serial number in the workbook's date system; display
    /// comes from the cell's (copied) number format.
    Date(NaiveDateTime),
    /// Expression text, with or without a leading `=`.
    Formula(String),
    Error(ErrorCode),
}

#[derive(Clone, Debug, Default)]
pub struct BackendCaps {
    pub read: bool,
    pub write: bool,
    pub styles: bool,
    pub comments: bool,
    pub column_widths: bool,
    pub formulas: bool,
}

/// Value seeded into a freshly formatted cell so it carries the example
/// cell's declared type before (or without) a value being written.
pub fn seed_value(kind: CellKind) -> CellValue {
    match kind {
        CellKind::Numeric => CellValue::Number(0.0),
        CellKind::String => CellValue::Text(String::new()),
        CellKind::Boolean => CellValue::Boolean(false),
        CellKind::Formula | CellKind::Blank | CellKind::Error | CellKind::Unsupported => {
            CellValue::Blank
        }
    }
}

/// Zero-based workbook access used by the binder.
///
/// A row "exists" when the file carries a record for it, even if every cell
/// in it is blank; absent rows are skipped by readers.
pub trait Workbook {
    fn format(&self) -> SheetFormat;

    fn capabilities(&self) -> BackendCaps;

    fn date_system(&self) -> DateSystem {
        DateSystem::Excel1900
    }

    fn sheet_count(&self) -> usize;

    fn sheet_name(&self, sheet: usize) -> Option<String>;

    /// First and last present row of `sheet`.
    fn row_bounds(&self, sheet: usize) -> Option<(u32, u32)>;

    fn row_exists(&self, sheet: usize, row: u32) -> bool;

    /// First and last present cell of `row`.
    fn cell_bounds(&self, sheet: usize, row: u32) -> Option<(u32, u32)>;

    fn cell(&self, at: CellRef) -> Option<Cell>;

    fn column_width(&self, sheet: usize, col: u32) -> Option<f64>;

    /// Append a sheet and return its index.
    fn create_sheet(&mut self, name: &str) -> Result<usize, EngineError>;

    fn remove_sheet(&mut self, sheet: usize) -> Result<(), EngineError>;

    fn rename_sheet(&mut self, sheet: usize, name: &str) -> Result<(), EngineError>;

    /// Replace `row` with an empty, present row.
    fn clear_row(&mut self, sheet: usize, row: u32) -> Result<(), EngineError>;

    /// Clone style, declared type and comment of `from` onto `to`, creating
    /// `to` if needed. `to` is seeded with [`seed_value`] of the source kind.
    fn copy_cell_format(&mut self, from: CellRef, to: CellRef) -> Result<(), EngineError>;

    fn write_cell(&mut self, at: CellRef, value: CellWrite) -> Result<(), EngineError>;

    fn set_column_width(&mut self, sheet: usize, col: u32, width: f64) -> Result<(), EngineError>;

    fn save(&mut self, out: &mut dyn Write) -> Result<(), EngineError>;

    fn save_to_bytes(&mut self) -> Result<Vec<u8>, EngineError> {
        let mut buf = Vec::new();
        self.save(&mut buf)?;
        Ok(buf)
    }
}
