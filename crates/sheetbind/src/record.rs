use crate::error::CoercionError;
use crate::value::{CellField, FieldType, Value};
use std::fmt;
use std::sync::Arc;

type Getter<T> = Arc<dyn Fn(&T) -> Option<Value> + Send + Sync>;
type Setter<T> = Arc<dyn Fn(&mut T, Value) -> Result<(), CoercionError> + Send + Sync>;

/// A named, typed, settable slot on record type `T`.
pub struct FieldDescriptor<T> {
    name: &'static str,
    field_type: FieldType,
    getter: Getter<T>,
    setter: Setter<T>,
}

impl<T: 'static> FieldDescriptor<T> {
    pub fn new(
        name: &'static str,
        field_type: FieldType,
        get: impl Fn(&T) -> Option<Value> + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) -> Result<(), CoercionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            field_type,
            getter: Arc::new(get),
            setter: Arc::new(set),
        }
    }

    /// Descriptor for a plain struct field of a [`CellField`] type.
    pub fn of<F: CellField + 'static>(
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        Self::new(
            name,
            F::FIELD_TYPE,
            move |record| get(record).to_value(),
            move |record, value| {
                *get_mut(record) = F::from_value(value)?;
                Ok(())
            },
        )
    }

    /// Re-target this descriptor at an outer record that embeds `T`.
    pub fn project<U: 'static>(
        self,
        outer: fn(&U) -> &T,
        outer_mut: fn(&mut U) -> &mut T,
    ) -> FieldDescriptor<U> {
        let getter = self.getter;
        let setter = self.setter;
        FieldDescriptor {
            name: self.name,
            field_type: self.field_type,
            getter: Arc::new(move |record: &U| getter(outer(record))),
            setter: Arc::new(move |record: &mut U, value| setter(outer_mut(record), value)),
        }
    }
}

impl<T> FieldDescriptor<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn get(&self, record: &T) -> Option<Value> {
        (self.getter)(record)
    }

    pub fn set(&self, record: &mut T, value: Value) -> Result<(), CoercionError> {
        (self.setter)(record, value)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            field_type: self.field_type,
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish_non_exhaustive()
    }
}

/// A record type whose fields can be bound to sheet columns.
///
/// `fields` lists the type's own fields first, then the fields of embedded
/// records. Usually generated with `#[derive(SheetRecord)]`.
pub trait SheetRecord: Default + 'static {
    fn fields() -> Vec<FieldDescriptor<Self>>;
}
