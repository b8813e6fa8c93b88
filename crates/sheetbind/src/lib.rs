//! Bind spreadsheet columns to typed record fields.
//!
//! A record type lists its fields through [`SheetRecord`], usually derived:
//!
//! ```no_run
//! use sheetbind::{AliasTable, SheetReader, SheetRecord};
//!
//! #[derive(Debug, Default, SheetRecord)]
//! struct UserInfo {
//!     name: Option<String>,
//!     salary: Option<rust_decimal::Decimal>,
//! }
//!
//! let alias = AliasTable::new().with("姓名", "name").with("薪水", "salary");
//! let users: Vec<UserInfo> = SheetReader::new()
//!     .with_alias(&alias)
//!     .read_path("users.xlsx")
//!     .map_err(|partial| partial.into_error())?;
//! # Ok::<(), sheetbind::SheetError>(())
//! ```
//!
//! The first present row of a sheet is its header. Reading turns every later
//! present row into a record; writing fills a template whose second row holds
//! example cells that decide each column's style and declared type.
//! [`TemplateWriter`] fills templates from untyped rows or columns instead.

extern crate self as sheetbind;

mod alias;
mod binder;
mod coerce;
mod config;
mod diagnostics;
mod error;
mod reader;
mod record;
mod resolver;
mod source;
mod template;
mod value;
mod writer;

pub use alias::AliasTable;
pub use binder::{ColumnBinding, HeaderRow, bind};
pub use coerce::{CoercionContext, coerce_in, coerce_out, parse_number, str_to_base_type};
pub use config::{ReadOptions, WriteOptions};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use error::{CoercionError, PartialRead, SheetError, StreamRole};
pub use reader::{ReadResult, SheetReader, read_path};
pub use record::{FieldDescriptor, SheetRecord};
pub use resolver::{FieldMap, resolve};
pub use source::{TemplateStreams, format_of};
pub use template::{DataLine, Layout, TemplateWriter};
pub use value::{CellField, FieldType, Value};
pub use writer::{RecordWriter, write_path};

pub use sheetbind_macros::SheetRecord;

pub use sheetbind_common::{CellCoord, CellKind, CellValue, DateSystem, ErrorCode, Formula, FormulaResult};
pub use sheetbind_engine::{CellRef, CellWrite, EngineError, MemoryWorkbook, SheetFormat, Workbook};
