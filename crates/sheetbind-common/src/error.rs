//! Spreadsheet error codes as stored in error-typed cells.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// All recognised cell error codes.
///
/// **Note:** names are CamelCase while `Display` renders them exactly as
/// spreadsheet applications show them (`#DIV/0!`, …).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Null,
    Div,
    Value,
    Ref,
    Name,
    Num,
    Na,
    GettingData,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "#NULL!",
            Self::Div => "#DIV/0!",
            Self::Value => "#VALUE!",
            Self::Ref => "#REF!",
            Self::Name => "#NAME?",
            Self::Num => "#NUM!",
            Self::Na => "#N/A",
            Self::GettingData => "#GETTING_DATA",
        })
    }
}

impl ErrorCode {
    /// Parse the display form of an error code; unknown text yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_uppercase().as_str() {
            "#NULL!" => Self::Null,
            "#DIV/0!" => Self::Div,
            "#VALUE!" => Self::Value,
            "#REF!" => Self::Ref,
            "#NAME?" => Self::Name,
            "#NUM!" => Self::Num,
            "#N/A" => Self::Na,
            "#GETTING_DATA" => Self::GettingData,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_inverse_of_display() {
        for code in [
            ErrorCode::Null,
            ErrorCode::Div,
            ErrorCode::Value,
            ErrorCode::Ref,
            ErrorCode::Name,
            ErrorCode::Num,
            ErrorCode::Na,
            ErrorCode::GettingData,
        ] {
            assert_eq!(ErrorCode::parse(&code.to_string()), Some(code));
        }
        assert_eq!(ErrorCode::parse(" #n/a "), Some(ErrorCode::Na));
        assert_eq!(ErrorCode::parse("#BOGUS!"), None);
    }
}
