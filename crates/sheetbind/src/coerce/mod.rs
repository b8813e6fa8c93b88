//! Conversions between untyped cell values and typed field values.
//!
//! Read direction ([`coerce_in`]) is driven by the physical tag of the cell
//! and the declared [`FieldType`](crate::FieldType) of the target field.
//! Write direction ([`coerce_out`]) is driven by the declared type of the
//! template's example cell.

mod read;
mod write;

pub use read::{coerce_in, parse_number, str_to_base_type};
pub use write::coerce_out;

use sheetbind_common::DateSystem;

/// Per-call settings the read rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionContext {
    pub date_system: DateSystem,
    pub trim: bool,
}

impl Default for CoercionContext {
    fn default() -> Self {
        Self {
            date_system: DateSystem::Excel1900,
            trim: true,
        }
    }
}

/// True when `n` is not an integer after truncation toward zero (NaN and
/// infinities included).
pub(crate) fn has_fraction(n: f64) -> bool {
    if n.abs() >= i64::MAX as f64 {
        // past 2^63 the cast saturates; every finite f64 there is integral
        return n.fract() != 0.0;
    }
    n - (n as i64) as f64 != 0.0
}
