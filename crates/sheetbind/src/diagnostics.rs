//! Non-fatal conditions raised while reading or writing, routed through an
//! injected sink instead of a global logger.

use parking_lot::Mutex;
use sheetbind_common::{CellCoord, CellKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A cell whose physical type has no coercion; the field was left unset.
    UnsupportedCell { coord: CellCoord, label: String },
    /// An example cell whose declared type has no write path; nothing was
    /// written.
    UnsupportedDeclaredType { coord: CellCoord, kind: CellKind },
    /// A template cell the copier does not know how to reproduce.
    UncopiedCell { coord: CellCoord, kind: CellKind },
    /// A public operation failed; `message` is the rendered error.
    Failed {
        operation: &'static str,
        file: String,
        message: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedCell { coord, label } => {
                write!(f, "unsupported cell type `{label}` at {coord}")
            }
            Diagnostic::UnsupportedDeclaredType { coord, kind } => {
                write!(f, "cannot write into {kind} example cell at {coord}")
            }
            Diagnostic::UncopiedCell { coord, kind } => {
                write!(f, "{kind} template cell at {coord} not copied")
            }
            Diagnostic::Failed {
                operation,
                file,
                message,
            } => write!(f, "{operation} `{file}` failed: {message}"),
        }
    }
}

pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

pub(crate) static TRACING_SINK: TracingSink = TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnsupportedCell { coord, label } => {
                tracing::info!(cell = %coord.to_a1(), label = %label, "unsupported cell type, skipped");
            }
            Diagnostic::UnsupportedDeclaredType { coord, kind } => {
                tracing::info!(cell = %coord.to_a1(), kind = %kind, "example cell type has no write path, skipped");
            }
            Diagnostic::UncopiedCell { coord, kind } => {
                tracing::debug!(cell = %coord.to_a1(), kind = %kind, "template cell not copied");
            }
            Diagnostic::Failed { operation, file, message } => {
                tracing::error!(operation = %operation, file = %file, error = %message, "spreadsheet operation failed");
            }
        }
    }
}

/// Report a public operation that failed on `file`.
pub(crate) fn report_failure(
    sink: &dyn DiagnosticSink,
    operation: &'static str,
    file: &str,
    error: &dyn fmt::Display,
) {
    sink.report(Diagnostic::Failed {
        operation,
        file: file.to_string(),
        message: error.to_string(),
    });
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}
