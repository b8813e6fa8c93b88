use std::fmt::{self, Display};

use crate::ErrorCode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical tag of a cell as the file format stores it.
///
/// On the write side the tag of an example cell (its "declared type") picks
/// the coercion path for the value written next to it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Numeric,
    String,
    Boolean,
    Formula,
    Blank,
    Error,
    Unsupported,
}

impl Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellKind::Numeric => "numeric",
            CellKind::String => "string",
            CellKind::Boolean => "boolean",
            CellKind::Formula => "formula",
            CellKind::Blank => "blank",
            CellKind::Error => "error",
            CellKind::Unsupported => "unsupported",
        })
    }
}

/// Cached result of a formula cell, as last computed by the authoring
/// application.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormulaResult {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ErrorCode),
    #[default]
    None,
}

impl FormulaResult {
    pub fn numeric(&self) -> Option<f64> {
        match self {
            FormulaResult::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FormulaResult::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn boolean(&self) -> Option<bool> {
        match self {
            FormulaResult::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FormulaResult::Number(_) => "numeric formula result",
            FormulaResult::Text(_) => "string formula result",
            FormulaResult::Boolean(_) => "boolean formula result",
            FormulaResult::Error(_) => "error formula result",
            FormulaResult::None => "formula without cached result",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    /// Expression text without the leading `=`.
    pub expression: String,
    pub cached: FormulaResult,
}

impl Formula {
    pub fn new(expression: impl Into<String>, cached: FormulaResult) -> Self {
        let expression = expression.into();
        let expression = match expression.strip_prefix('=') {
            Some(rest) => rest.to_string(),
            None => expression,
        };
        Self { expression, cached }
    }
}

/// Untyped value of a single cell as produced by an engine adapter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Formula(Formula),
    #[default]
    Blank,
    Error(ErrorCode),
    /// A value the engine produced that this model has no tag for; carries a
    /// short description for diagnostics.
    Unsupported(String),
}

impl CellValue {
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Number(_) => CellKind::Numeric,
            CellValue::Text(_) => CellKind::String,
            CellValue::Boolean(_) => CellKind::Boolean,
            CellValue::Formula(_) => CellKind::Formula,
            CellValue::Blank => CellKind::Blank,
            CellValue::Error(_) => CellKind::Error,
            CellValue::Unsupported(_) => CellKind::Unsupported,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Text shown for the cell: strings verbatim, numbers and booleans in
    /// their display form, formulas by their cached result.
    pub fn display_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Boolean(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            CellValue::Formula(f) => match &f.cached {
                FormulaResult::Number(n) => Some(n.to_string()),
                FormulaResult::Text(s) => Some(s.clone()),
                FormulaResult::Boolean(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
                FormulaResult::Error(e) => Some(e.to_string()),
                FormulaResult::None => None,
            },
            CellValue::Error(e) => Some(e.to_string()),
            CellValue::Blank | CellValue::Unsupported(_) => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Formula(formula) => write!(f, "={}", formula.expression),
            CellValue::Unsupported(label) => write!(f, "<{label}>"),
            other => f.write_str(&other.display_text().unwrap_or_default()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<Formula> for CellValue {
    fn from(f: Formula) -> Self {
        CellValue::Formula(f)
    }
}
