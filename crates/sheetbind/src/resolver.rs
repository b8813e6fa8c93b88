use crate::alias::AliasTable;
use crate::record::{FieldDescriptor, SheetRecord};
use rustc_hash::FxHashMap;

/// Field name → descriptor for one record type, at most one per name.
pub struct FieldMap<T> {
    by_name: FxHashMap<&'static str, FieldDescriptor<T>>,
}

impl<T> FieldMap<T> {
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }
}

/// Resolve the bindable fields of `T`.
///
/// Descriptors are visited own-fields-first, so a field declared on `T`
/// shadows an embedded field of the same name. With an alias table only
/// fields named as one of its values are kept.
pub fn resolve<T: SheetRecord>(alias: Option<&AliasTable>) -> FieldMap<T> {
    let mut by_name = FxHashMap::default();
    for field in T::fields() {
        if alias.is_some_and(|a| !a.contains_field(field.name())) {
            continue;
        }
        by_name.entry(field.name()).or_insert(field);
    }
    FieldMap { by_name }
}
