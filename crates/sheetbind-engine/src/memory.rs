use crate::traits::{BackendCaps, Cell, CellRef, CellWrite, Workbook, seed_value};
use crate::{EngineError, SheetFormat};
use sheetbind_common::{CellValue, DateSystem, Formula, FormulaResult};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Clone, Debug, Default)]
pub struct MemorySheet {
    name: String,
    rows: BTreeMap<u32, BTreeMap<u32, Cell>>,
    column_widths: BTreeMap<u32, f64>,
}

impl MemorySheet {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Workbook held entirely in memory.
///
/// Backs the read-only `.xls` adapter and doubles as a fixture for tests. It
/// has no file representation of its own, so [`Workbook::save`] fails.
#[derive(Clone, Debug)]
pub struct MemoryWorkbook {
    format: SheetFormat,
    date_system: DateSystem,
    sheets: Vec<MemorySheet>,
    read_only: bool,
}

impl MemoryWorkbook {
    pub fn new(format: SheetFormat) -> Self {
        Self {
            format,
            date_system: DateSystem::Excel1900,
            sheets: Vec::new(),
            read_only: false,
        }
    }

    pub fn with_date_system(mut self, date_system: DateSystem) -> Self {
        self.date_system = date_system;
        self
    }

    #[cfg(feature = "calamine")]
    pub(crate) fn into_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn add_sheet(&mut self, name: &str) -> usize {
        self.sheets.push(MemorySheet {
            name: name.to_string(),
            ..MemorySheet::default()
        });
        self.sheets.len() - 1
    }

    /// Insert or replace a cell. Ignored for unknown sheets.
    pub fn put(&mut self, at: CellRef, cell: Cell) {
        if let Some(sheet) = self.sheets.get_mut(at.sheet) {
            sheet.rows.entry(at.row).or_default().insert(at.col, cell);
        }
    }

    pub fn put_value(&mut self, at: CellRef, value: impl Into<CellValue>) {
        self.put(at, Cell::new(value));
    }

    /// Fill `row` from column 0 onward; `None` entries leave a gap.
    pub fn put_row<V: Into<CellValue>>(
        &mut self,
        sheet: usize,
        row: u32,
        values: impl IntoIterator<Item = Option<V>>,
    ) {
        for (col, value) in values.into_iter().enumerate() {
            if let Some(value) = value {
                self.put_value(CellRef::new(sheet, row, col as u32), value);
            }
        }
    }

    /// Mark `row` present without giving it any cells.
    pub fn touch_row(&mut self, sheet: usize, row: u32) {
        if let Some(sheet) = self.sheets.get_mut(sheet) {
            sheet.rows.entry(row).or_default();
        }
    }

    pub fn sheets(&self) -> &[MemorySheet] {
        &self.sheets
    }

    fn sheet(&self, sheet: usize) -> Option<&MemorySheet> {
        self.sheets.get(sheet)
    }

    fn sheet_mut(&mut self, sheet: usize) -> Result<&mut MemorySheet, EngineError> {
        if self.read_only {
            return Err(EngineError::ReadOnly(self.format));
        }
        self.sheets
            .get_mut(sheet)
            .ok_or(EngineError::SheetNotFound(sheet))
    }

    fn cell_mut(&mut self, at: CellRef) -> Result<&mut Cell, EngineError> {
        let sheet = self.sheet_mut(at.sheet)?;
        Ok(sheet
            .rows
            .entry(at.row)
            .or_default()
            .entry(at.col)
            .or_default())
    }
}

impl Workbook for MemoryWorkbook {
    fn format(&self) -> SheetFormat {
        self.format
    }

    fn capabilities(&self) -> BackendCaps {
        BackendCaps {
            read: true,
            write: !self.read_only,
            styles: true,
            comments: true,
            column_widths: true,
            formulas: true,
        }
    }

    fn date_system(&self) -> DateSystem {
        self.date_system
    }

    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn sheet_name(&self, sheet: usize) -> Option<String> {
        self.sheet(sheet).map(|s| s.name.clone())
    }

    fn row_bounds(&self, sheet: usize) -> Option<(u32, u32)> {
        let rows = &self.sheet(sheet)?.rows;
        let first = *rows.keys().next()?;
        let last = *rows.keys().next_back()?;
        Some((first, last))
    }

    fn row_exists(&self, sheet: usize, row: u32) -> bool {
        self.sheet(sheet)
            .is_some_and(|s| s.rows.contains_key(&row))
    }

    fn cell_bounds(&self, sheet: usize, row: u32) -> Option<(u32, u32)> {
        let cells = self.sheet(sheet)?.rows.get(&row)?;
        let first = *cells.keys().next()?;
        let last = *cells.keys().next_back()?;
        Some((first, last))
    }

    fn cell(&self, at: CellRef) -> Option<Cell> {
        self.sheet(at.sheet)?
            .rows
            .get(&at.row)?
            .get(&at.col)
            .cloned()
    }

    fn column_width(&self, sheet: usize, col: u32) -> Option<f64> {
        self.sheet(sheet)?.column_widths.get(&col).copied()
    }

    fn create_sheet(&mut self, name: &str) -> Result<usize, EngineError> {
        if self.read_only {
            return Err(EngineError::ReadOnly(self.format));
        }
        if self.sheets.iter().any(|s| s.name == name) {
            return Err(EngineError::Sheet(format!("sheet `{name}` already exists")));
        }
        Ok(self.add_sheet(name))
    }

    fn remove_sheet(&mut self, sheet: usize) -> Result<(), EngineError> {
        self.sheet_mut(sheet)?;
        self.sheets.remove(sheet);
        Ok(())
    }

    fn rename_sheet(&mut self, sheet: usize, name: &str) -> Result<(), EngineError> {
        self.sheet_mut(sheet)?.name = name.to_string();
        Ok(())
    }

    fn clear_row(&mut self, sheet: usize, row: u32) -> Result<(), EngineError> {
        self.sheet_mut(sheet)?.rows.insert(row, BTreeMap::new());
        Ok(())
    }

    fn copy_cell_format(&mut self, from: CellRef, to: CellRef) -> Result<(), EngineError> {
        let source = self.cell(from).unwrap_or_default();
        let target = self.cell_mut(to)?;
        target.value = seed_value(source.kind());
        target.style = source.style;
        target.comment = source.comment;
        Ok(())
    }

    fn write_cell(&mut self, at: CellRef, value: CellWrite) -> Result<(), EngineError> {
        let date_system = self.date_system;
        let cell = self.cell_mut(at)?;
        cell.value = match value {
            CellWrite::Number(n) => CellValue::Number(n),
            CellWrite::Text(s) => CellValue::Text(s),
            CellWrite::Boolean(b) => CellValue::Boolean(b),
            CellWrite::Date(dt) => CellValue::Number(date_system.to_serial(&dt)),
            CellWrite::Formula(expr) => CellValue::Formula(Formula::new(expr, FormulaResult::None)),
            CellWrite::Error(code) => CellValue::Error(code),
        };
        Ok(())
    }

    fn set_column_width(&mut self, sheet: usize, col: u32, width: f64) -> Result<(), EngineError> {
        self.sheet_mut(sheet)?.column_widths.insert(col, width);
        Ok(())
    }

    fn save(&mut self, _out: &mut dyn Write) -> Result<(), EngineError> {
        Err(EngineError::Unsupported(
            "in-memory workbooks have no file representation",
        ))
    }
}
