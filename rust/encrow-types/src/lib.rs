//! Logical column types, decoded values and the physical encodings they can
//! be stored in.

pub mod column_type;
pub mod datum;
pub mod encoding;

pub use column_type::ColumnType;
pub use datum::Datum;
pub use encoding::{DatumEncoding, Direction};
