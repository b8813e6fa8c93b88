use crate::alias::AliasTable;
use crate::record::FieldDescriptor;
use crate::resolver::FieldMap;
use rustc_hash::FxHashMap;
use sheetbind_engine::{CellRef, Workbook};

/// Non-empty header cells of one row, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderRow {
    row: u32,
    columns: Vec<(u32, String)>,
}

impl HeaderRow {
    /// Collect header text from `row`. Non-text cells contribute their
    /// display text; blank cells and (after optional trimming) empty text are
    /// skipped.
    pub fn collect(wb: &dyn Workbook, sheet: usize, row: u32, trim: bool) -> Self {
        let mut columns = Vec::new();
        if let Some((first, last)) = wb.cell_bounds(sheet, row) {
            for col in first..=last {
                let Some(text) = wb
                    .cell(CellRef::new(sheet, row, col))
                    .and_then(|cell| cell.value.display_text())
                else {
                    continue;
                };
                let text = if trim { text.trim().to_string() } else { text };
                if !text.is_empty() {
                    columns.push((col, text));
                }
            }
        }
        Self { row, columns }
    }

    pub fn from_texts<S: Into<String>>(row: u32, texts: impl IntoIterator<Item = (u32, S)>) -> Self {
        let mut columns: Vec<(u32, String)> = texts.into_iter().map(|(c, s)| (c, s.into())).collect();
        columns.sort_by_key(|(c, _)| *c);
        Self { row, columns }
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn columns(&self) -> &[(u32, String)] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Descriptor ↔ column pairs for one call, ordered by column.
pub struct ColumnBinding<T> {
    entries: Vec<(FieldDescriptor<T>, u32)>,
}

impl<T> ColumnBinding<T> {
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor<T>, u32)> {
        self.entries.iter().map(|(field, col)| (field, *col))
    }

    pub fn column_of(&self, field: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(f, _)| f.name() == field)
            .map(|(_, col)| *col)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bind header columns to fields.
///
/// Each header resolves through the alias table (falling back to the header
/// text itself) to a field name. Unresolvable headers and unmatched fields
/// are ignored. When two headers repeat the same text, or two headers
/// resolve to the same field, the rightmost column wins.
pub fn bind<T>(headers: &HeaderRow, fields: &FieldMap<T>, alias: Option<&AliasTable>) -> ColumnBinding<T> {
    let mut by_text: FxHashMap<&str, u32> = FxHashMap::default();
    for (col, text) in headers.columns() {
        by_text.insert(text.as_str(), *col);
    }

    let mut by_field: FxHashMap<&'static str, (u32, &FieldDescriptor<T>)> = FxHashMap::default();
    let mut ordered: Vec<_> = by_text.into_iter().collect();
    ordered.sort_by_key(|(_, col)| *col);
    for (text, col) in ordered {
        let name = alias.map_or(text, |a| a.resolve(text));
        if let Some(field) = fields.get(name) {
            by_field.insert(field.name(), (col, field));
        }
    }

    let mut entries: Vec<_> = by_field
        .into_values()
        .map(|(col, field)| (field.clone(), col))
        .collect();
    entries.sort_by_key(|(_, col)| *col);
    ColumnBinding { entries }
}
