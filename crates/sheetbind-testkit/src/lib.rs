//! Fixture helpers: umya-built workbooks written to a temporary directory.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use umya_spreadsheet::{NumberingFormat, Spreadsheet, Worksheet};

/// A workbook file on disk; the directory is removed on drop.
pub struct Fixture {
    dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path next to the fixture that does not exist yet.
    pub fn sibling(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Build a fresh workbook (one sheet named `Sheet1`), let `f` populate it and
/// write it as `fixture.xlsx` in a new temporary directory.
pub fn build_workbook<F: FnOnce(&mut Spreadsheet)>(f: F) -> Fixture {
    build_named_workbook("fixture.xlsx", f)
}

pub fn build_named_workbook<F: FnOnce(&mut Spreadsheet)>(file_name: &str, f: F) -> Fixture {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(file_name);
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write fixture workbook");
    Fixture { dir, path }
}

/// Serialize a workbook populated by `f` to xlsx bytes.
pub fn workbook_bytes<F: FnOnce(&mut Spreadsheet)>(f: F) -> Vec<u8> {
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    let mut buf = std::io::Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buf).expect("serialize workbook");
    buf.into_inner()
}

pub fn open(path: &Path) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read(path).expect("read workbook")
}

pub fn sheet1(book: &mut Spreadsheet) -> &mut Worksheet {
    book.get_sheet_by_name_mut("Sheet1").expect("Sheet1 present")
}

/// Apply a `yyyy-mm-dd`-style date format to `coord` (e.g. `"B2"`).
pub fn date_format(sheet: &mut Worksheet, coord: &str) {
    sheet
        .get_style_mut(coord)
        .get_number_format_mut()
        .set_format_code(NumberingFormat::FORMAT_DATE_YYYYMMDD);
}

/// Text value of a 1-based `(col, row)` cell, empty when absent.
pub fn text_at(sheet: &Worksheet, col: u32, row: u32) -> String {
    sheet
        .get_cell((col, row))
        .map(|c| c.get_value().to_string())
        .unwrap_or_default()
}
