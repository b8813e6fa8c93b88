use crate::value::{FieldType, Value};
use sheetbind_common::CellCoord;
use sheetbind_engine::EngineError;
use std::fmt;
use thiserror::Error;

/// Failure converting between a cell value and a field value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("cannot parse {text:?} as {target}")]
    Parse { target: FieldType, text: String },

    #[error("{found} value does not fit a {target} field")]
    Incompatible {
        target: FieldType,
        found: &'static str,
    },

    #[error("{value} is out of range for {target}")]
    OutOfRange { target: FieldType, value: String },
}

impl CoercionError {
    pub fn incompatible(target: FieldType, found: &Value) -> Self {
        CoercionError::Incompatible {
            target,
            found: found.kind_name(),
        }
    }

    pub(crate) fn parse(target: FieldType, text: &str) -> Self {
        CoercionError::Parse {
            target,
            text: text.to_string(),
        }
    }
}

/// Which caller-supplied stream a write was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    Template,
    Output,
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamRole::Template => "template",
            StreamRole::Output => "output",
        })
    }
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unsupported spreadsheet file `{0}` (expected .xls or .xlsx)")]
    UnsupportedFormat(String),

    #[error("a {0} stream is required")]
    MissingStream(StreamRole),

    #[error("sheet {0} does not exist")]
    SheetNotFound(usize),

    #[error("sheet {0} has no header row")]
    EmptySheet(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("cell {coord}, field `{field}`: {source}")]
    Coercion {
        coord: CellCoord,
        field: String,
        #[source]
        source: CoercionError,
    },
}

/// A read that stopped early, with the records completed before the failure.
pub struct PartialRead<T> {
    pub records: Vec<T>,
    pub error: SheetError,
}

impl<T> PartialRead<T> {
    pub fn new(records: Vec<T>, error: SheetError) -> Self {
        Self { records, error }
    }

    pub fn into_error(self) -> SheetError {
        self.error
    }

    pub fn into_parts(self) -> (Vec<T>, SheetError) {
        (self.records, self.error)
    }
}

impl<T> From<SheetError> for PartialRead<T> {
    fn from(error: SheetError) -> Self {
        Self::new(Vec::new(), error)
    }
}

impl<T> fmt::Debug for PartialRead<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialRead")
            .field("records", &self.records.len())
            .field("error", &self.error)
            .finish()
    }
}

impl<T> fmt::Display for PartialRead<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} records)", self.error, self.records.len())
    }
}

impl<T> std::error::Error for PartialRead<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
