//! Spreadsheet engine collaborator for sheetbind.
//!
//! [`Workbook`] is the narrow, zero-based view of a workbook the binder needs:
//! row and cell enumeration, typed cell snapshots, example-cell format cloning,
//! typed writes and serialization. Adapters:
//!
//! - [`UmyaWorkbook`] (`umya` feature): `.xlsx`, read and write, styles and comments.
//! - [`CalamineWorkbook`] (`calamine` feature): `.xls`, read-only.
//! - [`MemoryWorkbook`]: pure in-memory grid, read and write.

pub mod backends;
pub mod error;
pub mod format;
pub mod loader;
pub mod memory;
pub mod traits;

#[cfg(feature = "calamine")]
pub use backends::CalamineWorkbook;
#[cfg(feature = "umya")]
pub use backends::UmyaWorkbook;
pub use error::EngineError;
pub use format::SheetFormat;
pub use loader::{open_reader, open_workbook};
pub use memory::MemoryWorkbook;
pub use traits::{BackendCaps, Cell, CellRef, CellWrite, StyleId, Workbook};

// Re-export for convenience
pub use sheetbind_common::{CellKind, CellValue, DateSystem, ErrorCode, Formula, FormulaResult};
