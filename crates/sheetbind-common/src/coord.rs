//! Zero-based cell coordinates rendered in A1 notation for diagnostics.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute cell position (row, column), both zero-based.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// `A1`-style reference for this coordinate.
    pub fn to_a1(self) -> String {
        format!("{}{}", col_letters(self.col), u64::from(self.row) + 1)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (row {}, column {})", self.to_a1(), self.row, self.col)
    }
}

impl From<(u32, u32)> for CellCoord {
    fn from((row, col): (u32, u32)) -> Self {
        Self::new(row, col)
    }
}

/// Column letters for a zero-based column index (`0` → `A`, `26` → `AA`).
pub fn col_letters(col: u32) -> String {
    let mut n = u64::from(col) + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
