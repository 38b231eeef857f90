//! Physical encodings of a logical value.

use std::fmt;

use encrow_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

/// Byte-level representation a value is (or should be) encoded in.
///
/// The absence of an encoding is expressed as `Option::<DatumEncoding>::None`
/// rather than as a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatumEncoding {
    /// Order-preserving key encoding.
    AscendingKey,
    /// Order-reversing key encoding.
    DescendingKey,
    /// Compact value encoding, no ordering guarantees.
    Value,
}

/// Sort direction of a key encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl DatumEncoding {
    pub const ALL: [DatumEncoding; 3] = [
        DatumEncoding::AscendingKey,
        DatumEncoding::DescendingKey,
        DatumEncoding::Value,
    ];

    /// Key direction for key encodings, `None` for the value encoding.
    #[inline]
    pub fn direction(self) -> Option<Direction> {
        match self {
            DatumEncoding::AscendingKey => Some(Direction::Ascending),
            DatumEncoding::DescendingKey => Some(Direction::Descending),
            DatumEncoding::Value => None,
        }
    }

    #[inline]
    pub fn is_key(self) -> bool {
        self.direction().is_some()
    }

    pub fn to_i32(self) -> i32 {
        match self {
            DatumEncoding::AscendingKey => 0,
            DatumEncoding::DescendingKey => 1,
            DatumEncoding::Value => 2,
        }
    }
}

impl From<Direction> for DatumEncoding {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Ascending => DatumEncoding::AscendingKey,
            Direction::Descending => DatumEncoding::DescendingKey,
        }
    }
}

impl TryFrom<i32> for DatumEncoding {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(DatumEncoding::AscendingKey),
            1 => Ok(DatumEncoding::DescendingKey),
            2 => Ok(DatumEncoding::Value),
            _ => Err(Error::invalid_arg(
                "encoding",
                format!("unknown encoding {value}"),
            )),
        }
    }
}

impl fmt::Display for DatumEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatumEncoding::AscendingKey => "ASCENDING_KEY",
            DatumEncoding::DescendingKey => "DESCENDING_KEY",
            DatumEncoding::Value => "VALUE",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        for enc in DatumEncoding::ALL {
            assert_eq!(DatumEncoding::try_from(enc.to_i32()).unwrap(), enc);
        }
        assert!(DatumEncoding::try_from(3).is_err());
        assert!(DatumEncoding::try_from(-1).is_err());
    }

    #[test]
    fn test_direction() {
        assert_eq!(
            DatumEncoding::DescendingKey.direction(),
            Some(Direction::Descending)
        );
        assert!(!DatumEncoding::Value.is_key());
        assert_eq!(
            DatumEncoding::from(Direction::Ascending),
            DatumEncoding::AscendingKey
        );
        assert_eq!(DatumEncoding::Value.to_string(), "VALUE");
    }
}
