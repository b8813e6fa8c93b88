#![cfg(feature = "umya")]

use crate::traits::{BackendCaps, Cell, CellRef, CellWrite, Workbook};
use crate::{EngineError, SheetFormat};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use sheetbind_common::{CellKind, CellValue, DateSystem, ErrorCode, Formula, FormulaResult};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::sync::Arc;
use umya_spreadsheet::{CellRawValue, Spreadsheet, Worksheet};

/// Per-sheet row → (first col, last col), zero-based.
type RowIndex = BTreeMap<u32, (u32, u32)>;

/// `.xlsx` workbook backed by `umya-spreadsheet`.
///
/// umya addresses cells as 1-based `(col, row)`; every method here converts
/// from the zero-based [`CellRef`].
pub struct UmyaWorkbook {
    workbook: Spreadsheet,
    rows: RwLock<FxHashMap<usize, Arc<RowIndex>>>,
}

impl UmyaWorkbook {
    pub fn new(workbook: Spreadsheet) -> Self {
        Self {
            workbook,
            rows: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, EngineError> {
        let book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true)?;
        Ok(Self::new(book))
    }

    pub fn spreadsheet(&self) -> &Spreadsheet {
        &self.workbook
    }

    pub fn into_spreadsheet(self) -> Spreadsheet {
        self.workbook
    }

    fn worksheet(&self, sheet: usize) -> Option<&Worksheet> {
        self.workbook.get_sheet(&sheet)
    }

    fn worksheet_mut(&mut self, sheet: usize) -> Result<&mut Worksheet, EngineError> {
        self.rows.write().remove(&sheet);
        self.workbook
            .get_sheet_mut(&sheet)
            .ok_or(EngineError::SheetNotFound(sheet))
    }

    fn row_index(&self, sheet: usize) -> Option<Arc<RowIndex>> {
        if let Some(index) = self.rows.read().get(&sheet) {
            return Some(index.clone());
        }
        let ws = self.worksheet(sheet)?;
        let mut index = RowIndex::new();
        for cell in ws.get_cell_collection() {
            let coord = cell.get_coordinate();
            let row = coord.get_row_num().saturating_sub(1);
            let col = coord.get_col_num().saturating_sub(1);
            index
                .entry(row)
                .and_modify(|(lo, hi)| {
                    *lo = (*lo).min(col);
                    *hi = (*hi).max(col);
                })
                .or_insert((col, col));
        }
        let index = Arc::new(index);
        self.rows.write().insert(sheet, index.clone());
        Some(index)
    }

    fn convert_raw(raw: &CellRawValue, display: impl FnOnce() -> String) -> CellValue {
        match raw {
            CellRawValue::Numeric(n) => CellValue::Number(*n),
            CellRawValue::Bool(b) => CellValue::Boolean(*b),
            CellRawValue::String(s) => CellValue::Text(s.to_string()),
            CellRawValue::RichText(rt) => CellValue::Text(rt.get_text().to_string()),
            CellRawValue::Lazy(s) => {
                let txt = s.as_ref();
                if let Ok(n) = txt.parse::<f64>() {
                    CellValue::Number(n)
                } else if txt.eq_ignore_ascii_case("TRUE") {
                    CellValue::Boolean(true)
                } else if txt.eq_ignore_ascii_case("FALSE") {
                    CellValue::Boolean(false)
                } else {
                    CellValue::Text(txt.to_string())
                }
            }
            CellRawValue::Error(_) => {
                CellValue::Error(ErrorCode::parse(&display()).unwrap_or(ErrorCode::Value))
            }
            CellRawValue::Empty => CellValue::Blank,
        }
    }

    fn convert_cell(cell: &umya_spreadsheet::Cell) -> CellValue {
        let cv = cell.get_cell_value();
        let raw = cv.get_raw_value();
        let value = Self::convert_raw(raw, || cv.get_value().to_string());
        if !cv.is_formula() {
            return value;
        }
        let cached = match value {
            CellValue::Number(n) => FormulaResult::Number(n),
            CellValue::Text(s) => FormulaResult::Text(s),
            CellValue::Boolean(b) => FormulaResult::Boolean(b),
            CellValue::Error(e) => FormulaResult::Error(e),
            _ => FormulaResult::None,
        };
        CellValue::Formula(Formula::new(cv.get_formula(), cached))
    }

    fn comment_at(ws: &Worksheet, col: u32, row: u32) -> Option<&umya_spreadsheet::Comment> {
        ws.get_comments().iter().find(|c| {
            let coord = c.get_coordinate();
            *coord.get_col_num() == col && *coord.get_row_num() == row
        })
    }
}

impl Workbook for UmyaWorkbook {
    fn format(&self) -> SheetFormat {
        SheetFormat::Xlsx
    }

    fn capabilities(&self) -> BackendCaps {
        BackendCaps {
            read: true,
            write: true,
            styles: true,
            comments: true,
            column_widths: true,
            formulas: true,
        }
    }

    // umya does not surface the workbook's date1904 flag; xlsx files written
    // by current applications use the 1900 system.
    fn date_system(&self) -> DateSystem {
        DateSystem::Excel1900
    }

    fn sheet_count(&self) -> usize {
        self.workbook.get_sheet_count()
    }

    fn sheet_name(&self, sheet: usize) -> Option<String> {
        self.worksheet(sheet).map(|ws| ws.get_name().to_string())
    }

    fn row_bounds(&self, sheet: usize) -> Option<(u32, u32)> {
        let index = self.row_index(sheet)?;
        let first = *index.keys().next()?;
        let last = *index.keys().next_back()?;
        Some((first, last))
    }

    fn row_exists(&self, sheet: usize, row: u32) -> bool {
        self.row_index(sheet)
            .is_some_and(|index| index.contains_key(&row))
    }

    fn cell_bounds(&self, sheet: usize, row: u32) -> Option<(u32, u32)> {
        self.row_index(sheet)?.get(&row).copied()
    }

    fn cell(&self, at: CellRef) -> Option<Cell> {
        let ws = self.worksheet(at.sheet)?;
        let (col, row) = (at.col + 1, at.row + 1);
        let cell = ws.get_cell((col, row))?;
        let comment = Self::comment_at(ws, col, row).map(|c| c.get_text().get_text().to_string());
        Some(Cell {
            value: Self::convert_cell(cell),
            style: None,
            comment,
        })
    }

    fn column_width(&self, sheet: usize, col: u32) -> Option<f64> {
        self.worksheet(sheet)?
            .get_column_dimension_by_number(&(col + 1))
            .map(|c| *c.get_width())
    }

    fn create_sheet(&mut self, name: &str) -> Result<usize, EngineError> {
        self.workbook
            .new_sheet(name)
            .map_err(|e| EngineError::Sheet(e.to_string()))?;
        Ok(self.workbook.get_sheet_count() - 1)
    }

    fn remove_sheet(&mut self, sheet: usize) -> Result<(), EngineError> {
        if sheet >= self.workbook.get_sheet_count() {
            return Err(EngineError::SheetNotFound(sheet));
        }
        self.workbook
            .remove_sheet(sheet)
            .map_err(|e| EngineError::Sheet(e.to_string()))?;
        // indices after `sheet` shift down
        self.rows.write().clear();
        Ok(())
    }

    fn rename_sheet(&mut self, sheet: usize, name: &str) -> Result<(), EngineError> {
        self.worksheet_mut(sheet)?.set_name(name);
        Ok(())
    }

    fn clear_row(&mut self, sheet: usize, row: u32) -> Result<(), EngineError> {
        let Some((first, last)) = self.cell_bounds(sheet, row) else {
            return Ok(());
        };
        let ws = self.worksheet_mut(sheet)?;
        let row = row + 1;
        for col in first + 1..=last + 1 {
            let cell = ws.get_cell_mut((col, row));
            cell.set_blank();
            cell.set_style(umya_spreadsheet::Style::default());
        }
        ws.get_comments_mut()
            .retain(|c| *c.get_coordinate().get_row_num() != row);
        Ok(())
    }

    fn copy_cell_format(&mut self, from: CellRef, to: CellRef) -> Result<(), EngineError> {
        let (style, comment, kind) = {
            let ws = self
                .worksheet(from.sheet)
                .ok_or(EngineError::SheetNotFound(from.sheet))?;
            let source = ws.get_cell((from.col + 1, from.row + 1));
            (
                source.map(|c| c.get_style().clone()),
                Self::comment_at(ws, from.col + 1, from.row + 1).cloned(),
                source.map_or(CellKind::Blank, |c| Self::convert_cell(c).kind()),
            )
        };

        let ws = self.worksheet_mut(to.sheet)?;
        let (col, row) = (to.col + 1, to.row + 1);
        {
            let cell = ws.get_cell_mut((col, row));
            if let Some(style) = style {
                cell.set_style(style);
            }
            match kind {
                CellKind::Numeric => {
                    cell.set_value_number(0.0);
                }
                CellKind::String => {
                    cell.set_value_string("");
                }
                CellKind::Boolean => {
                    cell.set_value_bool(false);
                }
                _ => {
                    cell.set_blank();
                }
            }
        }
        if let Some(mut comment) = comment {
            let coord = comment.get_coordinate_mut();
            coord.set_col_num(col);
            coord.set_row_num(row);
            ws.add_comments(comment);
        }
        Ok(())
    }

    fn write_cell(&mut self, at: CellRef, value: CellWrite) -> Result<(), EngineError> {
        let ws = self.worksheet_mut(at.sheet)?;
        let cell = ws.get_cell_mut((at.col + 1, at.row + 1));
        match value {
            CellWrite::Number(n) => {
                cell.set_value_number(n);
            }
            CellWrite::Text(s) => {
                cell.set_value_string(s);
            }
            CellWrite::Boolean(b) => {
                cell.set_value_bool(b);
            }
            CellWrite::Date(dt) => {
                cell.set_value_number(DateSystem::Excel1900.to_serial(&dt));
            }
            CellWrite::Formula(f) => {
                // umya stores formula without leading '='
                cell.set_formula(f.strip_prefix('=').unwrap_or(&f));
            }
            CellWrite::Error(code) => {
                cell.set_value(code.to_string());
            }
        }
        Ok(())
    }

    fn set_column_width(&mut self, sheet: usize, col: u32, width: f64) -> Result<(), EngineError> {
        self.worksheet_mut(sheet)?
            .get_column_dimension_by_number_mut(&(col + 1))
            .set_width(width);
        Ok(())
    }

    fn save(&mut self, out: &mut dyn Write) -> Result<(), EngineError> {
        let mut buf = Cursor::new(Vec::new());
        umya_spreadsheet::writer::xlsx::write_writer(&self.workbook, &mut buf)?;
        out.write_all(buf.get_ref())?;
        Ok(())
    }
}
