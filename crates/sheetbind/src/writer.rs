use crate::alias::AliasTable;
use crate::binder::{HeaderRow, bind};
use crate::coerce::coerce_out;
use crate::config::WriteOptions;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TRACING_SINK, report_failure};
use crate::error::SheetError;
use crate::record::SheetRecord;
use crate::resolver::resolve;
use crate::source::{TemplateStreams, emit, format_of, path_format, render};
use crate::value::Value;
use sheetbind_common::CellKind;
use sheetbind_engine::{CellRef, EngineError, Workbook};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Writes records into a template sheet.
///
/// The template's first present row is the header and the row below it is
/// the example row. The first record overwrites the example row; each later
/// record gets a fresh row below it carrying the example cells' style,
/// declared type and comment. Headers are matched exactly as stored.
pub struct RecordWriter<'a> {
    alias: Option<&'a AliasTable>,
    options: WriteOptions,
    sink: &'a dyn DiagnosticSink,
}

impl Default for RecordWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RecordWriter<'a> {
    pub fn new() -> Self {
        Self {
            alias: None,
            options: WriteOptions::default(),
            sink: &TRACING_SINK,
        }
    }

    pub fn with_alias(mut self, alias: &'a AliasTable) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }

    /// Fill the template at `template` and save the result to `output`.
    ///
    /// The output path picks the format. `output` is only created once the
    /// workbook has been filled and serialized.
    pub fn write_path<T: SheetRecord>(
        &self,
        records: &[T],
        template: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<(), SheetError> {
        let (template, output) = (template.as_ref(), output.as_ref());
        let file_name = output.to_string_lossy();
        let _span = self.span::<T>(&file_name).entered();
        let result = path_format(output).and_then(|format| {
            let template = BufReader::new(File::open(template)?);
            let bytes = render(format, template, |wb| self.fill_workbook(wb, records))?;
            std::fs::write(output, bytes)?;
            Ok(())
        });
        result.inspect_err(|e| report_failure(self.sink, "write", &file_name, e))
    }

    /// Fill the template stream and write the result to the output stream.
    /// `file_name` only selects the format.
    pub fn write_to<T: SheetRecord, R: Read, W: Write>(
        &self,
        records: &[T],
        file_name: &str,
        streams: TemplateStreams<R, W>,
    ) -> Result<(), SheetError> {
        let _span = self.span::<T>(file_name).entered();
        let result = streams.into_parts().and_then(|(template, output)| {
            let format = format_of(file_name)?;
            let bytes = render(format, template, |wb| self.fill_workbook(wb, records))?;
            emit(output, &bytes)
        });
        result.inspect_err(|e| report_failure(self.sink, "write", file_name, e))
    }

    /// Write `records` into a workbook that is already open.
    pub fn fill_workbook<T: SheetRecord>(&self, wb: &mut dyn Workbook, records: &[T]) -> Result<(), SheetError> {
        if !wb.capabilities().write {
            return Err(EngineError::ReadOnly(wb.format()).into());
        }
        let sheet = self.options.sheet;
        if sheet >= wb.sheet_count() {
            return Err(SheetError::SheetNotFound(sheet));
        }
        let Some((header_row, _)) = wb.row_bounds(sheet) else {
            return Err(SheetError::EmptySheet(sheet));
        };

        let headers = HeaderRow::collect(wb, sheet, header_row, false);
        let fields = resolve::<T>(self.alias);
        let binding = bind(&headers, &fields, self.alias);
        let example_row = header_row + 1;

        // declared types are taken before the first record overwrites them;
        // a column without an example cell is left untouched
        let columns: Vec<_> = binding
            .iter()
            .filter_map(|(field, col)| {
                let example = wb.cell(CellRef::new(sheet, example_row, col))?;
                Some((field, col, example.kind()))
            })
            .collect();
        tracing::debug!(columns = columns.len(), records = records.len(), "writing records");

        for i in 1..records.len() {
            let row = example_row + i as u32;
            wb.clear_row(sheet, row)?;
            for &(_, col, _) in &columns {
                wb.copy_cell_format(
                    CellRef::new(sheet, example_row, col),
                    CellRef::new(sheet, row, col),
                )?;
            }
        }

        for (i, record) in records.iter().enumerate() {
            let row = example_row + i as u32;
            for &(field, col, kind) in &columns {
                let Some(value) = field.get(record) else {
                    continue;
                };
                write_value(wb, self.sink, CellRef::new(sheet, row, col), kind, &value)?;
            }
        }
        Ok(())
    }

    fn span<T>(&self, file_name: &str) -> tracing::Span {
        tracing::debug_span!(
            "sheetbind.write",
            file = %file_name,
            record = std::any::type_name::<T>()
        )
    }
}

/// Write `value` into `at` the way an example cell of kind `declared` asks
/// for; declared types without a write path are reported and skipped.
pub(crate) fn write_value(
    wb: &mut dyn Workbook,
    sink: &dyn DiagnosticSink,
    at: CellRef,
    declared: CellKind,
    value: &Value,
) -> Result<(), SheetError> {
    match coerce_out(declared, value) {
        Some(write) => wb.write_cell(at, write)?,
        None => sink.report(Diagnostic::UnsupportedDeclaredType {
            coord: at.coord(),
            kind: declared,
        }),
    }
    Ok(())
}

/// Write `records` through the template at `template` into `output` with
/// default options.
pub fn write_path<T: SheetRecord>(
    records: &[T],
    alias: Option<&AliasTable>,
    template: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<(), SheetError> {
    let writer = RecordWriter::new();
    match alias {
        Some(alias) => writer.with_alias(alias).write_path(records, template, output),
        None => writer.write_path(records, template, output),
    }
}
