use std::fmt;
use std::path::Path;

/// Container format, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetFormat {
    /// Legacy binary workbook (BIFF8).
    Xls,
    /// Office Open XML workbook.
    Xlsx,
}

impl SheetFormat {
    /// Dispatch on the extension of `name`; `None` for anything but `.xls`
    /// and `.xlsx`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        if ext.eq_ignore_ascii_case("xlsx") {
            Some(SheetFormat::Xlsx)
        } else if ext.eq_ignore_ascii_case("xls") {
            Some(SheetFormat::Xls)
        } else {
            None
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref().file_name()?.to_str().and_then(Self::from_file_name)
    }

    pub fn extension(self) -> &'static str {
        match self {
            SheetFormat::Xls => "xls",
            SheetFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}
