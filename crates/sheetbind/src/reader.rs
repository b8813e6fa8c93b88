use crate::alias::AliasTable;
use crate::binder::{HeaderRow, bind};
use crate::coerce::{CoercionContext, coerce_in};
use crate::config::ReadOptions;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TRACING_SINK, report_failure};
use crate::error::{PartialRead, SheetError};
use crate::record::SheetRecord;
use crate::resolver::resolve;
use crate::source::{format_of, path_format};
use sheetbind_common::CellValue;
use sheetbind_engine::{CellRef, Workbook};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Records read, or the error that stopped the read with every record
/// completed before it.
pub type ReadResult<T> = Result<Vec<T>, PartialRead<T>>;

/// Reads the rows of one sheet into records.
///
/// The first present row is the header. Every later present row yields one
/// record, even when none of its bound cells hold data; absent rows are
/// skipped.
pub struct SheetReader<'a> {
    alias: Option<&'a AliasTable>,
    options: ReadOptions,
    sink: &'a dyn DiagnosticSink,
}

impl Default for SheetReader<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SheetReader<'a> {
    pub fn new() -> Self {
        Self {
            alias: None,
            options: ReadOptions::default(),
            sink: &TRACING_SINK,
        }
    }

    pub fn with_alias(mut self, alias: &'a AliasTable) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn read_path<T: SheetRecord>(&self, path: impl AsRef<Path>) -> ReadResult<T> {
        let path = path.as_ref();
        let file_name = path.to_string_lossy();
        let result = path_format(path).and_then(|format| {
            let file = File::open(path)?;
            Ok(sheetbind_engine::open_reader(format, BufReader::new(file))?)
        });
        match result {
            Ok(wb) => self.read_opened(wb.as_ref(), &file_name),
            Err(e) => Err(self.fail(&file_name, e.into())),
        }
    }

    /// Read from an open stream; `file_name` only selects the format.
    pub fn read_from<T: SheetRecord, R: Read>(&self, reader: R, file_name: &str) -> ReadResult<T> {
        let result = format_of(file_name)
            .and_then(|format| Ok(sheetbind_engine::open_reader(format, reader)?));
        match result {
            Ok(wb) => self.read_opened(wb.as_ref(), file_name),
            Err(e) => Err(self.fail(file_name, e.into())),
        }
    }

    fn read_opened<T: SheetRecord>(&self, wb: &dyn Workbook, file_name: &str) -> ReadResult<T> {
        let _span = tracing::debug_span!(
            "sheetbind.read",
            file = %file_name,
            record = std::any::type_name::<T>()
        )
        .entered();
        self.read_workbook(wb).map_err(|e| self.fail(file_name, e))
    }

    /// Read from a workbook that is already open.
    pub fn read_workbook<T: SheetRecord>(&self, wb: &dyn Workbook) -> ReadResult<T> {
        let sheet = self.options.sheet;
        if sheet >= wb.sheet_count() {
            return Err(SheetError::SheetNotFound(sheet).into());
        }
        let Some((header_row, last_row)) = wb.row_bounds(sheet) else {
            return Ok(Vec::new());
        };

        let headers = HeaderRow::collect(wb, sheet, header_row, self.options.trim_whitespace);
        let fields = resolve::<T>(self.alias);
        let binding = bind(&headers, &fields, self.alias);
        let ctx = CoercionContext {
            date_system: wb.date_system(),
            trim: self.options.trim_whitespace,
        };
        tracing::debug!(columns = binding.len(), rows = last_row - header_row, "bound header row");

        let mut records = Vec::new();
        for row in header_row + 1..=last_row {
            if !wb.row_exists(sheet, row) {
                continue;
            }
            let mut record = T::default();
            for (field, col) in binding.iter() {
                let at = CellRef::new(sheet, row, col);
                let Some(cell) = wb.cell(at) else {
                    continue;
                };
                if let CellValue::Unsupported(label) = &cell.value {
                    self.sink.report(Diagnostic::UnsupportedCell {
                        coord: at.coord(),
                        label: label.clone(),
                    });
                    continue;
                }
                let coerced = coerce_in(&cell.value, field.field_type(), &ctx)
                    .and_then(|value| match value {
                        Some(value) => field.set(&mut record, value),
                        None => Ok(()),
                    });
                if let Err(source) = coerced {
                    let error = SheetError::Coercion {
                        coord: at.coord(),
                        field: field.name().to_string(),
                        source,
                    };
                    return Err(PartialRead::new(records, error));
                }
            }
            records.push(record);
        }
        Ok(records)
    }

    fn fail<T>(&self, file_name: &str, failure: PartialRead<T>) -> PartialRead<T> {
        report_failure(self.sink, "read", file_name, &failure.error);
        failure
    }
}

/// Read `path` into records with default options.
pub fn read_path<T: SheetRecord>(path: impl AsRef<Path>, alias: Option<&AliasTable>) -> ReadResult<T> {
    let reader = SheetReader::new();
    match alias {
        Some(alias) => reader.with_alias(alias).read_path(path),
        None => reader.read_path(path),
    }
}
