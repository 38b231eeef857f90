//! Compact value encoding for storage and transport.
//!
//! A value is a tag byte followed by a type-specific payload. The tag is
//! [`NULL_TAG`] for null and the column type tag otherwise:
//!
//! - BOOL: one byte, 0 or 1
//! - INT, DATE, TIMESTAMP: zigzag varint
//! - FLOAT: 8-byte big-endian IEEE bits
//! - STRING, BYTES: varint length, then the raw bytes

use std::sync::Arc;

use bytes::Bytes;
use encrow_common::{Result, error::Error, verify_data};
use encrow_types::{
    ColumnType, Datum,
    datum::{unix_days, unix_micros},
};

use crate::varint::{decode_varint, peek_varint, put_varint, zigzag_decode, zigzag_encode};

pub const NULL_TAG: u8 = 0;

pub fn encode_value(out: &mut Vec<u8>, datum: &Datum) {
    out.push(datum.column_type().map_or(NULL_TAG, ColumnType::tag));
    match datum {
        Datum::Null => {}
        Datum::Bool(b) => out.push(*b as u8),
        Datum::Int(v) => put_varint(out, zigzag_encode(*v)),
        Datum::Float(v) => out.extend_from_slice(&v.0.to_bits().to_be_bytes()),
        Datum::Date(d) => put_varint(out, zigzag_encode(unix_days(*d) as i64)),
        Datum::Timestamp(ts) => put_varint(out, zigzag_encode(unix_micros(*ts))),
        Datum::String(s) => put_length_prefixed(out, s.as_bytes()),
        Datum::Bytes(b) => put_length_prefixed(out, b),
    }
}

fn put_length_prefixed(out: &mut Vec<u8>, data: &[u8]) {
    put_varint(out, data.len() as u64);
    out.extend_from_slice(data);
}

/// Length of the value at the start of `buf`, determined without decoding it.
pub fn peek_value_length(buf: &[u8]) -> Result<usize> {
    let tag = *buf
        .first()
        .ok_or_else(|| Error::decode("value", "empty buffer"))?;
    if tag == NULL_TAG {
        return Ok(1);
    }
    let ty = ColumnType::from_tag(tag)
        .ok_or_else(|| Error::decode("value", format!("unknown tag {tag}")))?;
    let payload = &buf[1..];
    let len = match ty {
        ColumnType::Bool => 1,
        ColumnType::Float => 8,
        ColumnType::Int | ColumnType::Date | ColumnType::Timestamp => peek_varint(payload)?,
        ColumnType::String | ColumnType::Bytes => {
            let (data_len, width) = decode_varint(payload)?;
            usize::try_from(data_len)
                .ok()
                .and_then(|n| n.checked_add(width))
                .ok_or_else(|| Error::decode("value", "length overflow"))?
        }
    };
    verify_data!(value, payload.len() >= len);
    Ok(1 + len)
}

/// Decodes one value of type `ty` from the start of `buf`, returning the value
/// and the unconsumed remainder.
pub fn decode_value(ty: ColumnType, buf: &[u8]) -> Result<(Datum, &[u8])> {
    let len = peek_value_length(buf)?;
    let (enc, rest) = buf.split_at(len);
    let tag = enc[0];
    if tag == NULL_TAG {
        return Ok((Datum::Null, rest));
    }
    if tag != ty.tag() {
        return Err(Error::decode(
            format!("{ty} value"),
            format!("unexpected tag {tag}"),
        ));
    }
    let payload = &enc[1..];
    let datum = match ty {
        ColumnType::Bool => match payload[0] {
            0 => Datum::Bool(false),
            1 => Datum::Bool(true),
            other => return Err(Error::decode("BOOL value", format!("invalid byte {other}"))),
        },
        ColumnType::Int => Datum::Int(zigzag_decode(decode_varint(payload)?.0)),
        ColumnType::Float => {
            let mut bits = [0u8; 8];
            bits.copy_from_slice(payload);
            Datum::float(f64::from_bits(u64::from_be_bytes(bits)))
        }
        ColumnType::Date => {
            let days = zigzag_decode(decode_varint(payload)?.0);
            i32::try_from(days)
                .ok()
                .and_then(Datum::date_from_unix_days)
                .ok_or_else(|| Error::decode("DATE value", format!("{days} days out of range")))?
        }
        ColumnType::Timestamp => {
            let micros = zigzag_decode(decode_varint(payload)?.0);
            Datum::timestamp_from_unix_micros(micros).ok_or_else(|| {
                Error::decode("TIMESTAMP value", format!("{micros} micros out of range"))
            })?
        }
        ColumnType::String => {
            let data = length_prefixed(payload)?;
            let s = std::str::from_utf8(data)
                .map_err(|e| Error::decode("STRING value", e.to_string()))?;
            Datum::String(Arc::from(s))
        }
        ColumnType::Bytes => Datum::Bytes(Bytes::copy_from_slice(length_prefixed(payload)?)),
    };
    Ok((datum, rest))
}

fn length_prefixed(payload: &[u8]) -> Result<&[u8]> {
    let (_, width) = decode_varint(payload)?;
    Ok(&payload[width..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(datum: &Datum) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_value(&mut buf, datum);
        buf
    }

    #[test]
    fn test_layouts() {
        assert_eq!(encode(&Datum::Null), [NULL_TAG]);
        assert_eq!(encode(&Datum::Int(5)), [ColumnType::Int.tag(), 10]);
        assert_eq!(encode(&Datum::Int(-1)), [ColumnType::Int.tag(), 1]);
        assert_eq!(
            encode(&Datum::string("hi")),
            [ColumnType::String.tag(), 2, b'h', b'i']
        );
    }

    #[test]
    fn test_decode_each_type() {
        let datums = [
            (ColumnType::Bool, Datum::Bool(true)),
            (ColumnType::Int, Datum::Int(-123_456_789)),
            (ColumnType::Float, Datum::float(-0.25)),
            (ColumnType::String, Datum::string("héllo")),
            (ColumnType::Bytes, Datum::bytes(&[0, 1, 255])),
            (ColumnType::Date, Datum::date_from_unix_days(-7).unwrap()),
            (
                ColumnType::Timestamp,
                Datum::timestamp_from_unix_micros(1_461_024_000_000_123).unwrap(),
            ),
            (ColumnType::Int, Datum::Null),
        ];
        for (ty, datum) in datums {
            let mut buf = encode(&datum);
            let len = buf.len();
            buf.push(0xAA);
            assert_eq!(peek_value_length(&buf).unwrap(), len);
            let (decoded, rest) = decode_value(ty, &buf).unwrap();
            assert_eq!(decoded, datum);
            assert_eq!(rest, [0xAA]);
        }
    }

    #[test]
    fn test_long_string_length_prefix() {
        let long = "x".repeat(5000);
        let buf = encode(&Datum::string(&long));
        assert_eq!(buf.len(), 1 + 3 + 5000);
        assert_eq!(peek_value_length(&buf).unwrap(), buf.len());
    }

    #[test]
    fn test_malformed_values() {
        assert!(peek_value_length(&[]).is_err());
        assert!(peek_value_length(&[99]).is_err());
        assert!(peek_value_length(&[ColumnType::Float.tag(), 0, 0]).is_err());
        assert!(peek_value_length(&[ColumnType::String.tag(), 5, b'a']).is_err());
        assert!(decode_value(ColumnType::Bool, &[ColumnType::Bool.tag(), 2]).is_err());

        let int = encode(&Datum::Int(1));
        let err = decode_value(ColumnType::String, &int).unwrap_err();
        assert!(err.is_corrupt_data());
    }
}
