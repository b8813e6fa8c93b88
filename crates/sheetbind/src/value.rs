//! Strongly typed field values and the `CellField` conversion trait.

use crate::error::CoercionError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt::{self, Display};

/// Declared type of a record field; selects the read-side coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Text,
    Bool,
    Date,
    DateTime,
    /// A type coercion knows nothing about; most rules yield no value.
    Other,
}

impl FieldType {
    pub fn is_string_like(self) -> bool {
        matches!(self, FieldType::Text)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, FieldType::Date | FieldType::DateTime)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::Int8 => "i8",
            FieldType::Int16 => "i16",
            FieldType::Int32 => "i32",
            FieldType::Int64 => "i64",
            FieldType::Float32 => "f32",
            FieldType::Float64 => "f64",
            FieldType::Decimal => "decimal",
            FieldType::Text => "text",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Other => "other",
        })
    }
}

/// A field value on its way into or out of a record.
///
/// Integers of every width travel as `Int`, floats of both widths as `Float`;
/// the field's [`CellField`] impl narrows them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Bool(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    /// The value as a timestamp when it is date-valued.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident $(as $wide:ty)?),* $(,)?) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v $(as $wide)?)
            }
        }
    )*};
}

value_from!(
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int,
    f32 => Float as f64,
    f64 => Float,
    Decimal => Decimal,
    String => Text,
    bool => Bool,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/* ─────────────────────────── CellField ─────────────────────────── */

/// A Rust type that can sit in a record field bound to a column.
pub trait CellField: Sized {
    const FIELD_TYPE: FieldType;

    /// `None` means "no value": the write skips the cell.
    fn to_value(&self) -> Option<Value>;

    fn from_value(value: Value) -> Result<Self, CoercionError>;
}

macro_rules! int_field {
    ($($t:ty => $ft:ident),* $(,)?) => {$(
        impl CellField for $t {
            const FIELD_TYPE: FieldType = FieldType::$ft;

            fn to_value(&self) -> Option<Value> {
                Some(Value::Int(i64::from(*self)))
            }

            fn from_value(value: Value) -> Result<Self, CoercionError> {
                match value {
                    Value::Int(i) => <$t>::try_from(i).map_err(|_| CoercionError::OutOfRange {
                        target: Self::FIELD_TYPE,
                        value: i.to_string(),
                    }),
                    other => Err(CoercionError::incompatible(Self::FIELD_TYPE, &other)),
                }
            }
        }
    )*};
}

int_field!(i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64);

impl CellField for f32 {
    const FIELD_TYPE: FieldType = FieldType::Float32;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Float(f64::from(*self)))
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Float(n) => Ok(n as f32),
            other => Err(CoercionError::incompatible(Self::FIELD_TYPE, &other)),
        }
    }
}

impl CellField for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float64;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Float(*self))
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Float(n) => Ok(n),
            other => Err(CoercionError::incompatible(Self::FIELD_TYPE, &other)),
        }
    }
}

impl CellField for Decimal {
    const FIELD_TYPE: FieldType = FieldType::Decimal;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Decimal(*self))
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Decimal(d) => Ok(d),
            other => Err(CoercionError::incompatible(Self::FIELD_TYPE, &other)),
        }
    }
}

impl CellField for String {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Text(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(CoercionError::incompatible(Self::FIELD_TYPE, &other)),
        }
    }
}

impl CellField for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(CoercionError::incompatible(Self::FIELD_TYPE, &other)),
        }
    }
}

impl CellField for NaiveDate {
    const FIELD_TYPE: FieldType = FieldType::Date;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Date(*self))
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            other => Err(CoercionError::incompatible(Self::FIELD_TYPE, &other)),
        }
    }
}

impl CellField for NaiveDateTime {
    const FIELD_TYPE: FieldType = FieldType::DateTime;

    fn to_value(&self) -> Option<Value> {
        Some(Value::DateTime(*self))
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            other => Err(CoercionError::incompatible(Self::FIELD_TYPE, &other)),
        }
    }
}

impl<T: CellField> CellField for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(T::to_value)
    }

    fn from_value(value: Value) -> Result<Self, CoercionError> {
        T::from_value(value).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_integers_check_range() {
        assert_eq!(i16::from_value(Value::Int(-12)), Ok(-12));
        assert_eq!(
            i16::from_value(Value::Int(40_000)),
            Err(CoercionError::OutOfRange {
                target: FieldType::Int16,
                value: "40000".into()
            })
        );
        assert!(matches!(
            i32::from_value(Value::Text("1".into())),
            Err(CoercionError::Incompatible { target: FieldType::Int32, found: "text" })
        ));
    }

    #[test]
    fn option_delegates() {
        assert_eq!(<Option<i64>>::FIELD_TYPE, FieldType::Int64);
        assert_eq!(None::<String>.to_value(), None);
        assert_eq!(
            Some("a".to_string()).to_value(),
            Some(Value::Text("a".into()))
        );
        assert_eq!(<Option<bool>>::from_value(Value::Bool(true)), Ok(Some(true)));
    }

    #[test]
    fn temporal_fields_accept_either_precision() {
        let d = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(NaiveDateTime::from_value(Value::Date(d)).unwrap(), d.and_time(NaiveTime::MIN));
        assert_eq!(
            NaiveDate::from_value(Value::DateTime(d.and_hms_opt(8, 0, 0).unwrap())).unwrap(),
            d
        );
    }

    #[test]
    fn display_is_default_text() {
        assert_eq!(Value::Float(5000.0).to_string(), "5000");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Decimal(Decimal::new(15000, 0)).to_string(), "15000");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()).to_string(),
            "2024-03-09"
        );
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}
