use crate::SheetFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "umya")]
    #[error("xlsx error: {0}")]
    Xlsx(#[from] umya_spreadsheet::XlsxError),

    #[cfg(feature = "calamine")]
    #[error("xls error: {0}")]
    Xls(#[from] calamine::XlsError),

    #[error("{0} workbooks are read-only")]
    ReadOnly(SheetFormat),

    #[error("no backend compiled in for {0} workbooks")]
    BackendUnavailable(SheetFormat),

    #[error("sheet index {0} out of range")]
    SheetNotFound(usize),

    #[error("sheet operation failed: {0}")]
    Sheet(String),

    #[error("{0}")]
    Unsupported(&'static str),
}
