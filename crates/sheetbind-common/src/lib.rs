//! Core value types shared by the sheetbind engine adapters and the binder.

pub mod coord;
pub mod date;
pub mod error;
pub mod value;

pub use coord::*;
pub use date::*;
pub use error::*;
pub use value::*;
