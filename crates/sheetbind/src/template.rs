//! Positional and column-oriented template filling.
//!
//! Both layouts build a fresh sheet: the template region that precedes the
//! data is copied cell by cell (value, declared type, style), data cells
//! take their format from the template's example cells, and the fresh sheet
//! finally replaces the template sheet under the template's name.

use crate::config::WriteOptions;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TRACING_SINK, report_failure};
use crate::error::SheetError;
use crate::source::{TemplateStreams, emit, format_of, path_format, render};
use crate::value::Value;
use crate::writer::write_value;
use sheetbind_common::{CellKind, CellValue};
use sheetbind_engine::{CellRef, CellWrite, EngineError, Workbook};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// One row (or column) of template data; `None` cells are left as the
/// example cell's placeholder.
pub type DataLine = Vec<Option<Value>>;

/// Where the data goes relative to the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout<'h> {
    /// Data row `i` lands on `example_row + i`; cell `c` takes its format
    /// from `(example_row, c)`. `headers` replaces the trailing cells of the
    /// row above the example row.
    Rows {
        example_row: u32,
        headers: Option<&'h [String]>,
    },
    /// Data column `i` lands on `example_col + i`; entry `j` takes its format
    /// from `(start_row + j, example_col)`. Empty columns are skipped.
    Columns { start_row: u32, example_col: u32 },
}

pub struct TemplateWriter<'a> {
    options: WriteOptions,
    sink: &'a dyn DiagnosticSink,
}

impl Default for TemplateWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateWriter<'a> {
    pub fn new() -> Self {
        Self {
            options: WriteOptions::default(),
            sink: &TRACING_SINK,
        }
    }

    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }

    /// Fill the template at `template` and save it to `output`, whose
    /// extension picks the format.
    pub fn write_path(
        &self,
        template: impl AsRef<Path>,
        output: impl AsRef<Path>,
        layout: Layout<'_>,
        data: &[DataLine],
    ) -> Result<(), SheetError> {
        let (template, output) = (template.as_ref(), output.as_ref());
        let file_name = output.to_string_lossy();
        let _span = tracing::debug_span!("sheetbind.template", file = %file_name).entered();
        let result = path_format(output).and_then(|format| {
            let template = BufReader::new(File::open(template)?);
            let bytes = render(format, template, |wb| self.fill(wb, layout, data).map(drop))?;
            std::fs::write(output, bytes)?;
            Ok(())
        });
        result.inspect_err(|e| report_failure(self.sink, "template write", &file_name, e))
    }

    pub fn write_to<R: Read, W: Write>(
        &self,
        file_name: &str,
        streams: TemplateStreams<R, W>,
        layout: Layout<'_>,
        data: &[DataLine],
    ) -> Result<(), SheetError> {
        let _span = tracing::debug_span!("sheetbind.template", file = %file_name).entered();
        let result = streams.into_parts().and_then(|(template, output)| {
            let format = format_of(file_name)?;
            let bytes = render(format, template, |wb| self.fill(wb, layout, data).map(drop))?;
            emit(output, &bytes)
        });
        result.inspect_err(|e| report_failure(self.sink, "template write", file_name, e))
    }

    /// Fill an open workbook; returns the number of data lines written.
    pub fn fill(&self, wb: &mut dyn Workbook, layout: Layout<'_>, data: &[DataLine]) -> Result<usize, SheetError> {
        match layout {
            Layout::Rows {
                example_row,
                headers,
            } => self.fill_rows(wb, example_row, headers, data),
            Layout::Columns {
                start_row,
                example_col,
            } => self.fill_columns(wb, start_row, example_col, data),
        }
    }

    pub fn fill_rows(
        &self,
        wb: &mut dyn Workbook,
        example_row: u32,
        headers: Option<&[String]>,
        rows: &[DataLine],
    ) -> Result<usize, SheetError> {
        let (sheet, name) = self.template_sheet(wb)?;
        let scratch = scratch_name(wb, &name);
        let target = wb.create_sheet(&scratch)?;

        let mut last_col = None;
        for row in 0..example_row {
            if let Some((first, last)) = wb.cell_bounds(sheet, row) {
                self.copy_span(wb, sheet, target, row, first..=last)?;
                last_col = last_col.max(Some(last));
            }
        }
        if let Some(last) = last_col {
            self.copy_widths(wb, sheet, target, 0..=last)?;
        }

        if let (Some(headers), Some(row)) = (headers, example_row.checked_sub(1)) {
            let end = wb.cell_bounds(sheet, row).map_or(0, |(_, last)| last + 1);
            let offset = end.saturating_sub(headers.len() as u32);
            for (i, header) in headers.iter().enumerate() {
                wb.write_cell(
                    CellRef::new(target, row, offset + i as u32),
                    CellWrite::Text(header.clone()),
                )?;
            }
        }

        for (i, line) in rows.iter().enumerate() {
            let row = example_row + i as u32;
            for (col, value) in line.iter().enumerate() {
                let example = CellRef::new(sheet, example_row, col as u32);
                self.fill_cell(wb, example, CellRef::new(target, row, col as u32), value.as_ref())?;
            }
        }

        swap_in(wb, sheet, target, &name)?;
        tracing::debug!(rows = rows.len(), example_row, "filled template rows");
        Ok(rows.len())
    }

    pub fn fill_columns(
        &self,
        wb: &mut dyn Workbook,
        start_row: u32,
        example_col: u32,
        columns: &[DataLine],
    ) -> Result<usize, SheetError> {
        let (sheet, name) = self.template_sheet(wb)?;
        let scratch = scratch_name(wb, &name);
        let target = wb.create_sheet(&scratch)?;

        let last_row = wb.row_bounds(sheet).map(|(_, last)| last);
        let mut last_col = None;
        for row in 0..=last_row.unwrap_or(0) {
            let Some((first, last)) = wb.cell_bounds(sheet, row) else {
                continue;
            };
            // only the region left of the example column is copied below start_row
            let last = if row < start_row {
                last
            } else if first < example_col {
                last.min(example_col - 1)
            } else {
                continue;
            };
            self.copy_span(wb, sheet, target, row, first..=last)?;
            last_col = last_col.max(Some(last));
        }
        if let Some(last) = last_col {
            self.copy_widths(wb, sheet, target, 0..=last)?;
        }

        let mut written = 0;
        for (i, column) in columns.iter().enumerate() {
            if column.is_empty() {
                continue;
            }
            let col = example_col + i as u32;
            for (j, value) in column.iter().enumerate() {
                let row = start_row + j as u32;
                let example = CellRef::new(sheet, row, example_col);
                self.fill_cell(wb, example, CellRef::new(target, row, col), value.as_ref())?;
            }
            if self.options.copy_column_widths {
                if let Some(width) = wb.column_width(sheet, example_col) {
                    wb.set_column_width(target, col, width)?;
                }
            }
            written += 1;
        }

        swap_in(wb, sheet, target, &name)?;
        tracing::debug!(columns = written, start_row, example_col, "filled template columns");
        Ok(written)
    }

    fn template_sheet(&self, wb: &dyn Workbook) -> Result<(usize, String), SheetError> {
        if !wb.capabilities().write {
            return Err(EngineError::ReadOnly(wb.format()).into());
        }
        let sheet = self.options.sheet;
        let name = wb.sheet_name(sheet).ok_or(SheetError::SheetNotFound(sheet))?;
        Ok((sheet, name))
    }

    /// Format `to` after `example` and write `value`. Cells without an
    /// example cell are skipped.
    fn fill_cell(
        &self,
        wb: &mut dyn Workbook,
        example: CellRef,
        to: CellRef,
        value: Option<&Value>,
    ) -> Result<(), SheetError> {
        let Some(kind) = wb.cell(example).map(|cell| cell.kind()) else {
            return Ok(());
        };
        wb.copy_cell_format(example, to)?;
        match value {
            Some(value) => write_value(wb, self.sink, to, kind, value),
            None => Ok(()),
        }
    }

    fn copy_span(
        &self,
        wb: &mut dyn Workbook,
        sheet: usize,
        target: usize,
        row: u32,
        cols: std::ops::RangeInclusive<u32>,
    ) -> Result<(), SheetError> {
        for col in cols {
            copy_cell(wb, self.sink, CellRef::new(sheet, row, col), CellRef::new(target, row, col))?;
        }
        Ok(())
    }

    fn copy_widths(
        &self,
        wb: &mut dyn Workbook,
        sheet: usize,
        target: usize,
        cols: std::ops::RangeInclusive<u32>,
    ) -> Result<(), SheetError> {
        if !self.options.copy_column_widths {
            return Ok(());
        }
        for col in cols {
            if let Some(width) = wb.column_width(sheet, col) {
                wb.set_column_width(target, col, width)?;
            }
        }
        Ok(())
    }
}

/// Reproduce a template cell: style, declared type and value. Blank cells
/// carry their style only; missing cells are left missing.
fn copy_cell(wb: &mut dyn Workbook, sink: &dyn DiagnosticSink, from: CellRef, to: CellRef) -> Result<(), SheetError> {
    let Some(cell) = wb.cell(from) else {
        return Ok(());
    };
    let write = match cell.value {
        CellValue::Number(n) => CellWrite::Number(n),
        CellValue::Text(s) => CellWrite::Text(s),
        CellValue::Boolean(b) => CellWrite::Boolean(b),
        CellValue::Formula(f) => CellWrite::Formula(f.expression),
        CellValue::Error(code) => CellWrite::Error(code),
        CellValue::Blank => {
            wb.copy_cell_format(from, to)?;
            return Ok(());
        }
        CellValue::Unsupported(_) => {
            sink.report(Diagnostic::UncopiedCell {
                coord: from.coord(),
                kind: CellKind::Unsupported,
            });
            return Ok(());
        }
    };
    wb.copy_cell_format(from, to)?;
    wb.write_cell(to, write)?;
    Ok(())
}

fn scratch_name(wb: &dyn Workbook, base: &str) -> String {
    let taken = |name: &str| (0..wb.sheet_count()).any(|i| wb.sheet_name(i).as_deref() == Some(name));
    let mut name = format!("{base}~");
    while taken(&name) {
        name.push('~');
    }
    name
}

/// Drop the template sheet and give its name to the filled one.
fn swap_in(wb: &mut dyn Workbook, template: usize, filled: usize, name: &str) -> Result<(), SheetError> {
    wb.remove_sheet(template)?;
    let filled = if filled > template { filled - 1 } else { filled };
    wb.rename_sheet(filled, name)?;
    Ok(())
}
