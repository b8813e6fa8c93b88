use crate::value::Value;
use sheetbind_common::CellKind;
use sheetbind_engine::CellWrite;

/// Pick the write for `value` next to an example cell of kind `declared`.
///
/// `None` means the declared type has no write path (error and unsupported
/// cells) and the cell is left alone.
pub fn coerce_out(declared: CellKind, value: &Value) -> Option<CellWrite> {
    match declared {
        CellKind::Numeric => Some(match value.as_datetime() {
            Some(dt) => CellWrite::Date(dt),
            None => numeric_or_text(value),
        }),
        CellKind::String => Some(CellWrite::Text(value.to_string())),
        CellKind::Boolean => Some(CellWrite::Boolean(value.to_string().eq_ignore_ascii_case("true"))),
        CellKind::Formula => Some(CellWrite::Formula(value.to_string())),
        CellKind::Blank => Some(match value {
            Value::Text(s) => CellWrite::Text(s.clone()),
            Value::Bool(b) => CellWrite::Boolean(*b),
            Value::Date(_) | Value::DateTime(_) => CellWrite::Date(value.as_datetime()?),
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) => numeric_or_text(value),
        }),
        CellKind::Error | CellKind::Unsupported => None,
    }
}

/// The value's text read back as a number; text that is not a number is
/// written as text.
fn numeric_or_text(value: &Value) -> CellWrite {
    let text = value.to_string();
    match text.trim().parse::<f64>() {
        Ok(n) => CellWrite::Number(n),
        Err(_) => CellWrite::Text(text),
    }
}
