#![cfg(feature = "calamine")]

use crate::memory::MemoryWorkbook;
use crate::traits::{BackendCaps, Cell, CellRef, CellWrite, Workbook};
use crate::{EngineError, SheetFormat};
use sheetbind_common::{CellValue, DateSystem, ErrorCode, Formula, FormulaResult};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use calamine::{Data, Range, Reader, Xls};

/// `.xls` workbook read through `calamine`.
///
/// calamine has no BIFF writer, so the workbook is materialized into a
/// read-only [`MemoryWorkbook`] at open time and every mutation fails with
/// [`EngineError::ReadOnly`]. Styles and comments are not surfaced.
pub struct CalamineWorkbook {
    inner: MemoryWorkbook,
}

impl CalamineWorkbook {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, EngineError> {
        let mut xls: Xls<_> = Xls::new(Cursor::new(bytes))?;
        let mut inner = MemoryWorkbook::new(SheetFormat::Xls);
        for name in xls.sheet_names().to_vec() {
            let sheet = inner.add_sheet(&name);
            let values = xls.worksheet_range(&name)?;
            let formulas = xls.worksheet_formula(&name).ok();
            for ((row, col), value) in Self::range_to_cells(&values, formulas.as_ref()) {
                inner.put(CellRef::new(sheet, row, col), Cell::new(value));
            }
        }
        Ok(Self {
            inner: inner.into_read_only(),
        })
    }

    fn convert_value(data: &Data) -> CellValue {
        match data {
            Data::Empty => CellValue::Blank,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::Error(e) => CellValue::Error(match e {
                calamine::CellErrorType::Div0 => ErrorCode::Div,
                calamine::CellErrorType::NA => ErrorCode::Na,
                calamine::CellErrorType::Name => ErrorCode::Name,
                calamine::CellErrorType::Null => ErrorCode::Null,
                calamine::CellErrorType::Num => ErrorCode::Num,
                calamine::CellErrorType::Ref => ErrorCode::Ref,
                calamine::CellErrorType::GettingData => ErrorCode::GettingData,
                _ => ErrorCode::Value,
            }),
            // Dates come back as serial numbers so coercion sees the same
            // numeric cell the file stores.
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ndt) => CellValue::Number(DateSystem::Excel1900.to_serial(&ndt)),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Unsupported(format!("duration {s}")),
        }
    }

    fn range_to_cells(
        range: &Range<Data>,
        formulas: Option<&Range<String>>,
    ) -> BTreeMap<(u32, u32), CellValue> {
        let mut cells = BTreeMap::new();

        let (start_row, start_col) = range.start().unwrap_or_default();
        for (row, col, val) in range.used_cells() {
            if matches!(val, Data::Empty) {
                continue;
            }
            cells.insert(
                (start_row + row as u32, start_col + col as u32),
                Self::convert_value(val),
            );
        }

        if let Some(frm_range) = formulas {
            let (start_row, start_col) = frm_range.start().unwrap_or_default();
            for (row, col, formula) in frm_range.used_cells() {
                if formula.is_empty() {
                    continue;
                }
                let key = (start_row + row as u32, start_col + col as u32);
                let cached = match cells.remove(&key) {
                    Some(CellValue::Number(n)) => FormulaResult::Number(n),
                    Some(CellValue::Text(s)) => FormulaResult::Text(s),
                    Some(CellValue::Boolean(b)) => FormulaResult::Boolean(b),
                    Some(CellValue::Error(e)) => FormulaResult::Error(e),
                    _ => FormulaResult::None,
                };
                cells.insert(key, CellValue::Formula(Formula::new(formula.as_str(), cached)));
            }
        }

        cells
    }
}

impl Workbook for CalamineWorkbook {
    fn format(&self) -> SheetFormat {
        SheetFormat::Xls
    }

    fn capabilities(&self) -> BackendCaps {
        BackendCaps {
            read: true,
            formulas: true,
            ..BackendCaps::default()
        }
    }

    fn date_system(&self) -> DateSystem {
        self.inner.date_system()
    }

    fn sheet_count(&self) -> usize {
        self.inner.sheet_count()
    }

    fn sheet_name(&self, sheet: usize) -> Option<String> {
        self.inner.sheet_name(sheet)
    }

    fn row_bounds(&self, sheet: usize) -> Option<(u32, u32)> {
        self.inner.row_bounds(sheet)
    }

    fn row_exists(&self, sheet: usize, row: u32) -> bool {
        self.inner.row_exists(sheet, row)
    }

    fn cell_bounds(&self, sheet: usize, row: u32) -> Option<(u32, u32)> {
        self.inner.cell_bounds(sheet, row)
    }

    fn cell(&self, at: CellRef) -> Option<Cell> {
        self.inner.cell(at)
    }

    fn column_width(&self, _sheet: usize, _col: u32) -> Option<f64> {
        None
    }

    fn create_sheet(&mut self, _name: &str) -> Result<usize, EngineError> {
        Err(EngineError::ReadOnly(SheetFormat::Xls))
    }

    fn remove_sheet(&mut self, _sheet: usize) -> Result<(), EngineError> {
        Err(EngineError::ReadOnly(SheetFormat::Xls))
    }

    fn rename_sheet(&mut self, _sheet: usize, _name: &str) -> Result<(), EngineError> {
        Err(EngineError::ReadOnly(SheetFormat::Xls))
    }

    fn clear_row(&mut self, _sheet: usize, _row: u32) -> Result<(), EngineError> {
        Err(EngineError::ReadOnly(SheetFormat::Xls))
    }

    fn copy_cell_format(&mut self, _from: CellRef, _to: CellRef) -> Result<(), EngineError> {
        Err(EngineError::ReadOnly(SheetFormat::Xls))
    }

    fn write_cell(&mut self, _at: CellRef, _value: CellWrite) -> Result<(), EngineError> {
        Err(EngineError::ReadOnly(SheetFormat::Xls))
    }

    fn set_column_width(&mut self, _sheet: usize, _col: u32, _width: f64) -> Result<(), EngineError> {
        Err(EngineError::ReadOnly(SheetFormat::Xls))
    }

    fn save(&mut self, _out: &mut dyn Write) -> Result<(), EngineError> {
        Err(EngineError::ReadOnly(SheetFormat::Xls))
    }
}
