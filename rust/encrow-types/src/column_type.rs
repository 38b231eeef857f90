//! Logical column types.

use std::fmt;

use encrow_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

use crate::datum::Datum;

/// The declared semantic type of a column value, independent of how the value
/// is physically encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ColumnType {
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Bytes = 5,
    Date = 6,
    Timestamp = 7,
}

impl ColumnType {
    pub const ALL: [ColumnType; 7] = [
        ColumnType::Bool,
        ColumnType::Int,
        ColumnType::Float,
        ColumnType::String,
        ColumnType::Bytes,
        ColumnType::Date,
        ColumnType::Timestamp,
    ];

    /// Stable wire tag of the type. Never zero: value encodings reserve zero
    /// for the null tag.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<ColumnType> {
        Self::ALL.into_iter().find(|ty| ty.tag() == tag)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Bool => "BOOL",
            ColumnType::Int => "INT",
            ColumnType::Float => "FLOAT",
            ColumnType::String => "STRING",
            ColumnType::Bytes => "BYTES",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    /// Returns `true` if the runtime type of `datum` is this type.
    ///
    /// `Datum::Null` carries no runtime type and is never type-equal; callers
    /// that accept null must exempt it explicitly.
    pub fn type_equal(self, datum: &Datum) -> bool {
        datum.column_type() == Some(self)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for ColumnType {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .and_then(ColumnType::from_tag)
            .ok_or_else(|| Error::invalid_arg("column_type", format!("unknown type tag {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_unique_and_nonzero() {
        for ty in ColumnType::ALL {
            assert_ne!(ty.tag(), 0);
            assert_eq!(ColumnType::from_tag(ty.tag()), Some(ty));
            assert_eq!(ColumnType::try_from(ty.tag() as i32).unwrap(), ty);
        }
        assert!(ColumnType::try_from(0).is_err());
        assert!(ColumnType::try_from(300).is_err());
    }

    #[test]
    fn test_type_equal_rejects_null() {
        assert!(ColumnType::Int.type_equal(&Datum::Int(1)));
        assert!(!ColumnType::Int.type_equal(&Datum::Bool(true)));
        assert!(!ColumnType::Int.type_equal(&Datum::Null));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ColumnType::Timestamp).unwrap();
        assert_eq!(json, "\"Timestamp\"");
        let ty: ColumnType = serde_json::from_str("\"Bytes\"").unwrap();
        assert_eq!(ty, ColumnType::Bytes);
    }
}
