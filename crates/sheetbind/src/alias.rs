use rustc_hash::{FxHashMap, FxHashSet};

/// Header text → field name.
///
/// When an alias table is supplied, only fields named as one of its values
/// are bindable; a header missing from the table is looked up as a field
/// name directly.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    by_header: FxHashMap<String, String>,
    fields: FxHashSet<String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `header` to `field`, replacing any previous mapping for `header`.
    pub fn insert(&mut self, header: impl Into<String>, field: impl Into<String>) {
        let field = field.into();
        if let Some(previous) = self.by_header.insert(header.into(), field.clone()) {
            if !self.by_header.values().any(|f| *f == previous) {
                self.fields.remove(&previous);
            }
        }
        self.fields.insert(field);
    }

    pub fn with(mut self, header: impl Into<String>, field: impl Into<String>) -> Self {
        self.insert(header, field);
        self
    }

    pub fn field_for(&self, header: &str) -> Option<&str> {
        self.by_header.get(header).map(String::as_str)
    }

    /// Field name a header resolves to: its alias, or the header itself.
    pub fn resolve<'a>(&'a self, header: &'a str) -> &'a str {
        self.field_for(header).unwrap_or(header)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn len(&self) -> usize {
        self.by_header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_header.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = AliasTable::new();
        for (header, field) in iter {
            table.insert(header, field);
        }
        table
    }
}
