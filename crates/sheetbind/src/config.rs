#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for [`SheetReader`](crate::SheetReader).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Trim header text and string cells before binding and parsing.
    pub trim_whitespace: bool,
    /// Zero-based index of the sheet to read.
    pub sheet: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            trim_whitespace: true,
            sheet: 0,
        }
    }
}

impl ReadOptions {
    /// Keep header and string cell text exactly as stored.
    pub fn verbatim() -> Self {
        Self {
            trim_whitespace: false,
            ..Self::default()
        }
    }

    pub fn with_sheet(mut self, sheet: usize) -> Self {
        self.sheet = sheet;
        self
    }
}

/// Options for [`RecordWriter`](crate::RecordWriter) and
/// [`TemplateWriter`](crate::TemplateWriter).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Zero-based index of the template sheet.
    pub sheet: usize,
    /// Carry template column widths into sheets built by the template copier.
    pub copy_column_widths: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sheet: 0,
            copy_column_widths: true,
        }
    }
}

impl WriteOptions {
    pub fn with_sheet(mut self, sheet: usize) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn without_column_widths(mut self) -> Self {
        self.copy_column_widths = false;
        self
    }
}
