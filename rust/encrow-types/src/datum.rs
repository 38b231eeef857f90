//! Materialized (decoded) column values.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;

use crate::column_type::ColumnType;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A decoded column value.
///
/// Variable-length payloads are reference counted, so cloning a `Datum` never
/// copies string or byte contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datum {
    /// Logical SQL null. Carries no runtime type.
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    String(Arc<str>),
    Bytes(Bytes),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Datum {
    /// The runtime logical type of the value, `None` for null.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Datum::Null => None,
            Datum::Bool(_) => Some(ColumnType::Bool),
            Datum::Int(_) => Some(ColumnType::Int),
            Datum::Float(_) => Some(ColumnType::Float),
            Datum::String(_) => Some(ColumnType::String),
            Datum::Bytes(_) => Some(ColumnType::Bytes),
            Datum::Date(_) => Some(ColumnType::Date),
            Datum::Timestamp(_) => Some(ColumnType::Timestamp),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Human readable name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.column_type().map_or("NULL", ColumnType::name)
    }

    pub fn float(value: f64) -> Datum {
        Datum::Float(OrderedFloat(value))
    }

    pub fn string(value: &str) -> Datum {
        Datum::String(Arc::from(value))
    }

    pub fn bytes(value: &[u8]) -> Datum {
        Datum::Bytes(Bytes::copy_from_slice(value))
    }

    /// Builds a `Date` from a day offset relative to 1970-01-01.
    pub fn date_from_unix_days(days: i32) -> Option<Datum> {
        days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(Datum::Date)
    }

    /// Builds a `Timestamp` from microseconds since 1970-01-01 00:00:00.
    pub fn timestamp_from_unix_micros(micros: i64) -> Option<Datum> {
        DateTime::from_timestamp_micros(micros).map(|ts| Datum::Timestamp(ts.naive_utc()))
    }
}

/// Day offset of `date` relative to 1970-01-01.
pub fn unix_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Microseconds of `ts` since 1970-01-01 00:00:00.
pub fn unix_micros(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_micros()
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("NULL"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Int(i) => write!(f, "{i}"),
            Datum::Float(v) => write!(f, "{v}"),
            Datum::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Datum::Bytes(b) => {
                f.write_str("'\\x")?;
                for byte in b.iter() {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("'")
            }
            Datum::Date(d) => write!(f, "'{}'", d.format("%Y-%m-%d")),
            Datum::Timestamp(ts) => write!(f, "'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Bool(value)
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Int(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::float(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(Datum::Null.to_string(), "NULL");
        assert_eq!(Datum::Int(-5).to_string(), "-5");
        assert_eq!(Datum::Bool(true).to_string(), "true");
        assert_eq!(Datum::string("it's").to_string(), "'it''s'");
        assert_eq!(Datum::bytes(&[0x0a, 0xff]).to_string(), "'\\x0aff'");
        assert_eq!(
            Datum::date_from_unix_days(0).unwrap().to_string(),
            "'1970-01-01'"
        );
        assert_eq!(
            Datum::timestamp_from_unix_micros(1_000_006).unwrap().to_string(),
            "'1970-01-01 00:00:01.000006'"
        );
    }

    #[test]
    fn test_unix_offsets() {
        let date = Datum::date_from_unix_days(-365).unwrap();
        match date {
            Datum::Date(d) => assert_eq!(unix_days(d), -365),
            other => panic!("unexpected {other:?}"),
        }
        let ts = Datum::timestamp_from_unix_micros(-42).unwrap();
        match ts {
            Datum::Timestamp(t) => assert_eq!(unix_micros(t), -42),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Datum::date_from_unix_days(i32::MAX).is_none());
    }

    #[test]
    fn test_column_type() {
        assert_eq!(Datum::Null.column_type(), None);
        assert_eq!(Datum::Null.type_name(), "NULL");
        assert_eq!(Datum::from(1.5).column_type(), Some(ColumnType::Float));
        assert_eq!(Datum::from("x").type_name(), "STRING");
    }
}
