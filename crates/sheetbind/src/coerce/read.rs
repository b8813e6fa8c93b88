use super::{CoercionContext, has_fraction};
use crate::error::CoercionError;
use crate::value::{FieldType, Value};
use rust_decimal::Decimal;
use sheetbind_common::{CellValue, FormulaResult};
use std::str::FromStr;

/// Convert one cell into a value for a field of type `target`.
///
/// `Ok(None)` leaves the field unset. Blank, error and unsupported cells
/// always yield `Ok(None)`; reporting unsupported cells is up to the caller.
pub fn coerce_in(
    value: &CellValue,
    target: FieldType,
    ctx: &CoercionContext,
) -> Result<Option<Value>, CoercionError> {
    match value {
        CellValue::Number(n) => from_number(*n, target, ctx),
        CellValue::Text(s) => from_text(s, target, ctx),
        CellValue::Boolean(b) => from_boolean(*b, target),
        CellValue::Formula(f) => Ok(from_formula(&f.cached, target, ctx)),
        CellValue::Blank | CellValue::Error(_) | CellValue::Unsupported(_) => Ok(None),
    }
}

fn from_number(n: f64, target: FieldType, ctx: &CoercionContext) -> Result<Option<Value>, CoercionError> {
    match target {
        FieldType::Date => Ok(ctx.date_system.to_datetime(n).map(|dt| Value::Date(dt.date()))),
        FieldType::DateTime => Ok(ctx.date_system.to_datetime(n).map(Value::DateTime)),
        // A fractional number headed for an i64 is a timestamp: the serial
        // becomes epoch milliseconds (timestamp read as UTC).
        FieldType::Int64 if has_fraction(n) => Ok(ctx
            .date_system
            .to_datetime(n)
            .map(|dt| Value::Int(dt.and_utc().timestamp_millis()))),
        _ => parse_number(n, target),
    }
}

fn from_text(text: &str, target: FieldType, ctx: &CoercionContext) -> Result<Option<Value>, CoercionError> {
    let text = if ctx.trim { text.trim() } else { text };
    str_to_base_type(target, Some(text))
}

fn from_boolean(b: bool, target: FieldType) -> Result<Option<Value>, CoercionError> {
    match target {
        FieldType::Bool | FieldType::Other => Ok(Some(Value::Bool(b))),
        _ => Err(CoercionError::Incompatible {
            target,
            found: "boolean",
        }),
    }
}

/// Formula cells: first try the accessor the target type calls for, then
/// sniff the cached result as numeric, string, boolean in that order. A
/// formula none of the rules accept leaves the field unset.
fn from_formula(cached: &FormulaResult, target: FieldType, ctx: &CoercionContext) -> Option<Value> {
    if let Ok(value) = directed(cached, target, ctx) {
        return value;
    }
    if let Some(Ok(value)) = cached.numeric().map(|n| from_number(n, target, ctx)) {
        return value;
    }
    if let Some(Ok(value)) = cached.text().map(|s| from_text(s, target, ctx)) {
        return value;
    }
    if let Some(Ok(value)) = cached.boolean().map(|b| from_boolean(b, target)) {
        return value;
    }
    None
}

fn directed(cached: &FormulaResult, target: FieldType, ctx: &CoercionContext) -> Result<Option<Value>, CoercionError> {
    let missing = || CoercionError::Incompatible {
        target,
        found: cached.kind_name(),
    };
    match target {
        FieldType::Text | FieldType::Other => from_text(cached.text().ok_or_else(missing)?, target, ctx),
        FieldType::Bool => from_boolean(cached.boolean().ok_or_else(missing)?, target),
        _ => from_number(cached.numeric().ok_or_else(missing)?, target, ctx),
    }
}

/// Narrow a number to `target`.
///
/// Integer targets truncate toward zero with the usual saturating cast
/// (`i8` wraps through `i32`); `Text` renders integral numbers without a
/// fractional part. Booleans, dates and unknown targets yield no value.
pub fn parse_number(n: f64, target: FieldType) -> Result<Option<Value>, CoercionError> {
    Ok(Some(match target {
        FieldType::Int64 | FieldType::Int16 => Value::Int(n as i64),
        FieldType::Int32 => Value::Int(i64::from(n as i32)),
        FieldType::Int8 => Value::Int(i64::from(n as i32 as i8)),
        FieldType::Float64 => Value::Float(n),
        FieldType::Float32 => Value::Float(f64::from(n as f32)),
        FieldType::Decimal => Value::Decimal(decimal_from_number(n, target)?),
        FieldType::Text if has_fraction(n) || n.abs() >= i64::MAX as f64 => Value::Text(n.to_string()),
        FieldType::Text => Value::Text((n as i64).to_string()),
        FieldType::Bool | FieldType::Date | FieldType::DateTime | FieldType::Other => return Ok(None),
    }))
}

/// Parse cell text into `target`.
///
/// Text targets keep the string as is, including an empty one. For every
/// other target blank text yields no value and malformed text is an error.
pub fn str_to_base_type(target: FieldType, text: Option<&str>) -> Result<Option<Value>, CoercionError> {
    let Some(text) = text else {
        return Ok(None);
    };
    if target.is_string_like() {
        return Ok(Some(Value::Text(text.to_string())));
    }
    if text.trim().is_empty() {
        return Ok(None);
    }

    let malformed = || CoercionError::parse(target, text);
    Ok(Some(match target {
        FieldType::Int32 => Value::Int(text.parse::<i32>().map_err(|_| malformed())?.into()),
        FieldType::Int64 => Value::Int(text.parse::<i64>().map_err(|_| malformed())?),
        FieldType::Bool => Value::Bool(parse_bool(text).ok_or_else(malformed)?),
        FieldType::Int8 => Value::Int(text.parse::<i8>().map_err(|_| malformed())?.into()),
        FieldType::Int16 => Value::Int(text.parse::<i16>().map_err(|_| malformed())?.into()),
        FieldType::Float64 => Value::Float(text.trim().parse::<f64>().map_err(|_| malformed())?),
        FieldType::Float32 => Value::Float(text.trim().parse::<f32>().map_err(|_| malformed())?.into()),
        FieldType::Decimal => {
            let n = text.trim().parse::<f64>().map_err(|_| malformed())?;
            Value::Decimal(decimal_from_number(n, target)?)
        }
        FieldType::Text | FieldType::Date | FieldType::DateTime | FieldType::Other => return Ok(None),
    }))
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Magnitudes past `Decimal::MAX` (about 7.9e28) have no representation and
/// fail as out of range.
fn decimal_from_number(n: f64, target: FieldType) -> Result<Decimal, CoercionError> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .ok()
        .or_else(|| Decimal::from_f64_retain(n))
        .ok_or(CoercionError::OutOfRange { target, value: text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use sheetbind_common::{DateSystem, ErrorCode, Formula};

    fn ctx() -> CoercionContext {
        CoercionContext::default()
    }

    fn untrimmed() -> CoercionContext {
        CoercionContext {
            trim: false,
            ..CoercionContext::default()
        }
    }

    fn formula(cached: FormulaResult) -> CellValue {
        CellValue::Formula(Formula::new("X1", cached))
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn numeric_into_integers_truncates() {
        let n = CellValue::Number(42.0);
        assert_eq!(coerce_in(&n, FieldType::Int64, &ctx()), Ok(Some(Value::Int(42))));
        assert_eq!(coerce_in(&n, FieldType::Int32, &ctx()), Ok(Some(Value::Int(42))));
        assert_eq!(
            coerce_in(&CellValue::Number(-3.7), FieldType::Int32, &ctx()),
            Ok(Some(Value::Int(-3)))
        );
        assert_eq!(
            coerce_in(&CellValue::Number(300.0), FieldType::Int8, &ctx()),
            Ok(Some(Value::Int(44)))
        );
        assert_eq!(
            coerce_in(&CellValue::Number(40_000.0), FieldType::Int16, &ctx()),
            Ok(Some(Value::Int(40_000)))
        );
    }

    #[test]
    fn fractional_numeric_into_i64_is_epoch_millis() {
        // 45292.5 = 2024-01-01 12:00
        let got = coerce_in(&CellValue::Number(45292.5), FieldType::Int64, &ctx()).unwrap();
        let expected = datetime(2024, 1, 1, 12, 0).and_utc().timestamp_millis();
        assert_eq!(got, Some(Value::Int(expected)));
        assert_eq!(expected, 1_704_110_400_000);
    }

    #[test]
    fn numeric_into_dates_uses_date_system() {
        let n = CellValue::Number(45292.25);
        assert_eq!(
            coerce_in(&n, FieldType::DateTime, &ctx()),
            Ok(Some(Value::DateTime(datetime(2024, 1, 1, 6, 0))))
        );
        assert_eq!(
            coerce_in(&n, FieldType::Date, &ctx()),
            Ok(Some(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())))
        );
        let ctx1904 = CoercionContext {
            date_system: DateSystem::Excel1904,
            ..ctx()
        };
        assert_eq!(
            coerce_in(&CellValue::Number(0.0), FieldType::Date, &ctx1904),
            Ok(Some(Value::Date(NaiveDate::from_ymd_opt(1904, 1, 1).unwrap())))
        );
        assert_eq!(coerce_in(&CellValue::Number(-5.0), FieldType::Date, &ctx()), Ok(None));
    }

    #[test]
    fn numeric_into_text_and_decimal() {
        assert_eq!(
            coerce_in(&CellValue::Number(5000.0), FieldType::Text, &ctx()),
            Ok(Some(Value::Text("5000".into())))
        );
        assert_eq!(
            coerce_in(&CellValue::Number(12.5), FieldType::Text, &ctx()),
            Ok(Some(Value::Text("12.5".into())))
        );
        assert_eq!(
            coerce_in(&CellValue::Number(0.1), FieldType::Decimal, &ctx()),
            Ok(Some(Value::Decimal(Decimal::new(1, 1))))
        );
        assert_eq!(coerce_in(&CellValue::Number(1.0), FieldType::Bool, &ctx()), Ok(None));
    }

    #[test]
    fn decimal_range_stops_at_decimal_max() {
        assert_eq!(
            coerce_in(&CellValue::Number(7.5e28), FieldType::Decimal, &ctx()),
            Ok(Some(Value::Decimal(Decimal::from_str("75000000000000000000000000000").unwrap())))
        );
        assert!(matches!(
            coerce_in(&CellValue::Number(1e30), FieldType::Decimal, &ctx()),
            Err(CoercionError::OutOfRange {
                target: FieldType::Decimal,
                ..
            })
        ));
        assert!(matches!(
            str_to_base_type(FieldType::Decimal, Some("-1e30")),
            Err(CoercionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn integral_numbers_past_i64_stay_on_the_number_path() {
        assert_eq!(
            coerce_in(&CellValue::Number(1e19), FieldType::Int64, &ctx()),
            Ok(Some(Value::Int(i64::MAX)))
        );
        assert_eq!(
            coerce_in(&CellValue::Number(-1e19), FieldType::Int64, &ctx()),
            Ok(Some(Value::Int(i64::MIN)))
        );
        assert_eq!(
            coerce_in(&CellValue::Number(1e19), FieldType::Text, &ctx()),
            Ok(Some(Value::Text("10000000000000000000".into())))
        );
    }

    #[test]
    fn strings_keep_text_and_parse_others() {
        let padded = CellValue::Text("  7 ".into());
        assert_eq!(
            coerce_in(&padded, FieldType::Text, &ctx()),
            Ok(Some(Value::Text("7".into())))
        );
        assert_eq!(
            coerce_in(&padded, FieldType::Text, &untrimmed()),
            Ok(Some(Value::Text("  7 ".into())))
        );
        assert_eq!(coerce_in(&padded, FieldType::Int32, &ctx()), Ok(Some(Value::Int(7))));
        assert_eq!(
            coerce_in(&padded, FieldType::Int32, &untrimmed()),
            Err(CoercionError::Parse {
                target: FieldType::Int32,
                text: "  7 ".into()
            })
        );
        assert_eq!(
            coerce_in(&CellValue::Text("TRUE".into()), FieldType::Bool, &ctx()),
            Ok(Some(Value::Bool(true)))
        );
    }

    #[test]
    fn blank_text_is_absent_except_for_strings() {
        for text in ["", "   ", "\t"] {
            let cell = CellValue::Text(text.into());
            assert_eq!(coerce_in(&cell, FieldType::Int64, &ctx()), Ok(None));
            assert_eq!(coerce_in(&cell, FieldType::Decimal, &untrimmed()), Ok(None));
            assert_eq!(coerce_in(&cell, FieldType::Bool, &ctx()), Ok(None));
        }
        assert_eq!(
            coerce_in(&CellValue::Text("   ".into()), FieldType::Text, &ctx()),
            Ok(Some(Value::Text(String::new())))
        );
    }

    #[test]
    fn malformed_text_fails() {
        assert!(matches!(
            coerce_in(&CellValue::Text("abc".into()), FieldType::Int64, &ctx()),
            Err(CoercionError::Parse { target: FieldType::Int64, .. })
        ));
        assert!(matches!(
            coerce_in(&CellValue::Text("yes".into()), FieldType::Bool, &ctx()),
            Err(CoercionError::Parse { target: FieldType::Bool, .. })
        ));
        assert!(matches!(
            coerce_in(&CellValue::Text("1.5".into()), FieldType::Int32, &ctx()),
            Err(CoercionError::Parse { .. })
        ));
    }

    #[test]
    fn booleans_need_boolean_target() {
        assert_eq!(
            coerce_in(&CellValue::Boolean(true), FieldType::Bool, &ctx()),
            Ok(Some(Value::Bool(true)))
        );
        assert_eq!(
            coerce_in(&CellValue::Boolean(true), FieldType::Text, &ctx()),
            Err(CoercionError::Incompatible {
                target: FieldType::Text,
                found: "boolean"
            })
        );
    }

    #[test]
    fn blank_and_error_are_noops() {
        for cell in [
            CellValue::Blank,
            CellValue::Error(ErrorCode::Div),
            CellValue::Unsupported("duration".into()),
        ] {
            assert_eq!(coerce_in(&cell, FieldType::Text, &ctx()), Ok(None));
        }
    }

    #[test]
    fn formula_numeric_result_into_text_field() {
        let cell = formula(FormulaResult::Number(3.0));
        assert_eq!(
            coerce_in(&cell, FieldType::Text, &ctx()),
            Ok(Some(Value::Text("3".into())))
        );
    }

    #[test]
    fn formula_directed_paths() {
        assert_eq!(
            coerce_in(&formula(FormulaResult::Number(45292.0)), FieldType::Date, &ctx()),
            Ok(Some(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())))
        );
        assert_eq!(
            coerce_in(&formula(FormulaResult::Number(1.5)), FieldType::Int64, &ctx()),
            Ok(Some(Value::Int(datetime(1900, 1, 1, 12, 0).and_utc().timestamp_millis())))
        );
        assert_eq!(
            coerce_in(&formula(FormulaResult::Boolean(false)), FieldType::Bool, &ctx()),
            Ok(Some(Value::Bool(false)))
        );
        assert_eq!(
            coerce_in(&formula(FormulaResult::Text(" ok ".into())), FieldType::Text, &ctx()),
            Ok(Some(Value::Text("ok".into())))
        );
    }

    #[test]
    fn formula_sniffing_falls_through_in_order() {
        // text result into a number field: numeric accessor misses, string rule parses
        assert_eq!(
            coerce_in(&formula(FormulaResult::Text("12".into())), FieldType::Int32, &ctx()),
            Ok(Some(Value::Int(12)))
        );
        // unparseable text and no other kind: unset, not an error
        assert_eq!(
            coerce_in(&formula(FormulaResult::Text("n/a".into())), FieldType::Int32, &ctx()),
            Ok(None)
        );
        // boolean result into a text field: every rule rejects it
        assert_eq!(
            coerce_in(&formula(FormulaResult::Boolean(true)), FieldType::Text, &ctx()),
            Ok(None)
        );
        assert_eq!(
            coerce_in(&formula(FormulaResult::Error(ErrorCode::Ref)), FieldType::Int64, &ctx()),
            Ok(None)
        );
        assert_eq!(coerce_in(&formula(FormulaResult::None), FieldType::Text, &ctx()), Ok(None));
    }

    #[test]
    fn parse_number_unknown_target() {
        assert_eq!(parse_number(1.0, FieldType::Other), Ok(None));
        assert_eq!(parse_number(2.75, FieldType::Float32), Ok(Some(Value::Float(2.75))));
        assert!(matches!(
            parse_number(f64::NAN, FieldType::Decimal),
            Err(CoercionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn str_to_base_type_edges() {
        assert_eq!(str_to_base_type(FieldType::Int32, None), Ok(None));
        assert_eq!(
            str_to_base_type(FieldType::Text, Some("")),
            Ok(Some(Value::Text(String::new())))
        );
        assert_eq!(str_to_base_type(FieldType::Date, Some("2024-01-01")), Ok(None));
        assert_eq!(
            str_to_base_type(FieldType::Decimal, Some("10.25")),
            Ok(Some(Value::Decimal(Decimal::new(1025, 2))))
        );
        assert_eq!(
            str_to_base_type(FieldType::Float64, Some(" 2.5 ")),
            Ok(Some(Value::Float(2.5)))
        );
    }
}
