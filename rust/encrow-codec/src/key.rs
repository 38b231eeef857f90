//! Byte-comparable key encoding.
//!
//! Every encoded key starts with a marker byte identifying the value kind,
//! followed by a payload whose lexicographic order matches the value order:
//!
//! ```text
//! 0x01       NULL
//! 0x02/0x03  false/true
//! 0x10       INT        8 bytes, big-endian, sign bit flipped
//! 0x11       FLOAT      8 bytes, IEEE bits rearranged to sort as integers
//! 0x12       DATE       4 bytes, days since epoch, sign bit flipped
//! 0x13       TIMESTAMP  8 bytes, micros since epoch, sign bit flipped
//! 0x20/0x21  STRING/BYTES  escaped bytes, then 0x00 0x01
//! ```
//!
//! Inside strings, `0x00` is written as `0x00 0xFF`; the `0x00 0x01`
//! terminator sorts below any escaped byte, so a string sorts before all of
//! its extensions.
//!
//! Descending keys are the byte-wise complement of the ascending form. All
//! encodings of one type form a prefix-free set, so complementing reverses
//! the order.

use std::sync::Arc;

use bytes::Bytes;
use encrow_common::{Result, error::Error, verify_data};
use encrow_types::{
    ColumnType, Datum, Direction,
    datum::{unix_days, unix_micros},
};

pub mod marker {
    pub const NULL: u8 = 0x01;
    pub const FALSE: u8 = 0x02;
    pub const TRUE: u8 = 0x03;
    pub const INT: u8 = 0x10;
    pub const FLOAT: u8 = 0x11;
    pub const DATE: u8 = 0x12;
    pub const TIMESTAMP: u8 = 0x13;
    pub const STRING: u8 = 0x20;
    pub const BYTES: u8 = 0x21;
}

const ESCAPE: u8 = 0x00;
const ESCAPED_00: u8 = 0xFF;
const TERMINATOR: u8 = 0x01;

const SIGN_64: u64 = 1 << 63;
const SIGN_32: u32 = 1 << 31;

#[inline]
fn normalize(byte: u8, dir: Direction) -> u8 {
    match dir {
        Direction::Ascending => byte,
        Direction::Descending => !byte,
    }
}

pub fn encode_key(out: &mut Vec<u8>, datum: &Datum, dir: Direction) {
    let start = out.len();
    encode_ascending(out, datum);
    if dir == Direction::Descending {
        out[start..].iter_mut().for_each(|b| *b = !*b);
    }
}

fn encode_ascending(out: &mut Vec<u8>, datum: &Datum) {
    match datum {
        Datum::Null => out.push(marker::NULL),
        Datum::Bool(false) => out.push(marker::FALSE),
        Datum::Bool(true) => out.push(marker::TRUE),
        Datum::Int(v) => {
            out.push(marker::INT);
            out.extend_from_slice(&((*v as u64) ^ SIGN_64).to_be_bytes());
        }
        Datum::Float(v) => {
            out.push(marker::FLOAT);
            out.extend_from_slice(&float_key_bits(v.0).to_be_bytes());
        }
        Datum::Date(d) => {
            out.push(marker::DATE);
            out.extend_from_slice(&((unix_days(*d) as u32) ^ SIGN_32).to_be_bytes());
        }
        Datum::Timestamp(ts) => {
            out.push(marker::TIMESTAMP);
            out.extend_from_slice(&((unix_micros(*ts) as u64) ^ SIGN_64).to_be_bytes());
        }
        Datum::String(s) => encode_escaped(out, marker::STRING, s.as_bytes()),
        Datum::Bytes(b) => encode_escaped(out, marker::BYTES, b),
    }
}

fn float_key_bits(value: f64) -> u64 {
    let bits = if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    };
    if bits & SIGN_64 != 0 {
        !bits
    } else {
        bits ^ SIGN_64
    }
}

fn float_from_key_bits(bits: u64) -> f64 {
    if bits & SIGN_64 != 0 {
        f64::from_bits(bits ^ SIGN_64)
    } else {
        f64::from_bits(!bits)
    }
}

fn encode_escaped(out: &mut Vec<u8>, marker: u8, data: &[u8]) {
    out.reserve(data.len() + 3);
    out.push(marker);
    for chunk in data.split_inclusive(|&b| b == ESCAPE) {
        out.extend_from_slice(chunk);
        if chunk.last() == Some(&ESCAPE) {
            out.push(ESCAPED_00);
        }
    }
    out.extend_from_slice(&[ESCAPE, TERMINATOR]);
}

/// Length of the key at the start of `buf`, determined without decoding it.
pub fn peek_key_length(buf: &[u8], dir: Direction) -> Result<usize> {
    let first = *buf
        .first()
        .ok_or_else(|| Error::decode("key", "empty buffer"))?;
    let len = match normalize(first, dir) {
        marker::NULL | marker::FALSE | marker::TRUE => 1,
        marker::INT | marker::FLOAT | marker::TIMESTAMP => 9,
        marker::DATE => 5,
        marker::STRING | marker::BYTES => return peek_escaped_length(buf, dir),
        other => {
            return Err(Error::decode(
                "key",
                format!("unknown marker {other:#04x}"),
            ));
        }
    };
    verify_data!(key, buf.len() >= len);
    Ok(len)
}

fn peek_escaped_length(buf: &[u8], dir: Direction) -> Result<usize> {
    let mut pos = 1;
    loop {
        let rest = &buf[pos..];
        let Some(offset) = rest.iter().position(|&b| normalize(b, dir) == ESCAPE) else {
            return Err(Error::decode("key", "unterminated string"));
        };
        let follow = pos + offset + 1;
        match buf.get(follow).map(|&b| normalize(b, dir)) {
            Some(TERMINATOR) => return Ok(follow + 1),
            Some(ESCAPED_00) => pos = follow + 1,
            Some(other) => {
                return Err(Error::decode(
                    "key",
                    format!("invalid escape sequence 0x00 {other:#04x}"),
                ));
            }
            None => return Err(Error::decode("key", "unterminated string")),
        }
    }
}

fn read_u64(bytes: &[u8], dir: Direction) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | normalize(b, dir) as u64)
}

/// Unescapes a validated string payload into `scratch`.
fn unescape_into(scratch: &mut Vec<u8>, payload: &[u8], dir: Direction) {
    scratch.clear();
    let mut i = 0;
    while i < payload.len() {
        let b = normalize(payload[i], dir);
        if b == ESCAPE {
            if normalize(payload[i + 1], dir) == TERMINATOR {
                break;
            }
            scratch.push(ESCAPE);
            i += 2;
        } else {
            scratch.push(b);
            i += 1;
        }
    }
}

/// Decodes one key of type `ty` from the start of `buf`, returning the value
/// and the unconsumed remainder. `scratch` receives unescaped string bytes.
pub fn decode_key<'b>(
    scratch: &mut Vec<u8>,
    ty: ColumnType,
    buf: &'b [u8],
    dir: Direction,
) -> Result<(Datum, &'b [u8])> {
    let len = peek_key_length(buf, dir)?;
    let (enc, rest) = buf.split_at(len);
    let found = normalize(enc[0], dir);
    let datum = match (ty, found) {
        (_, marker::NULL) => Datum::Null,
        (ColumnType::Bool, marker::FALSE) => Datum::Bool(false),
        (ColumnType::Bool, marker::TRUE) => Datum::Bool(true),
        (ColumnType::Int, marker::INT) => Datum::Int((read_u64(&enc[1..], dir) ^ SIGN_64) as i64),
        (ColumnType::Float, marker::FLOAT) => {
            Datum::float(float_from_key_bits(read_u64(&enc[1..], dir)))
        }
        (ColumnType::Date, marker::DATE) => {
            let days = (read_u64(&enc[1..], dir) as u32 ^ SIGN_32) as i32;
            Datum::date_from_unix_days(days)
                .ok_or_else(|| Error::decode("DATE key", format!("{days} days out of range")))?
        }
        (ColumnType::Timestamp, marker::TIMESTAMP) => {
            let micros = (read_u64(&enc[1..], dir) ^ SIGN_64) as i64;
            Datum::timestamp_from_unix_micros(micros).ok_or_else(|| {
                Error::decode("TIMESTAMP key", format!("{micros} micros out of range"))
            })?
        }
        (ColumnType::String, marker::STRING) => {
            unescape_into(scratch, &enc[1..], dir);
            let s = std::str::from_utf8(scratch)
                .map_err(|e| Error::decode("STRING key", e.to_string()))?;
            Datum::String(Arc::from(s))
        }
        (ColumnType::Bytes, marker::BYTES) => {
            unescape_into(scratch, &enc[1..], dir);
            Datum::Bytes(Bytes::copy_from_slice(scratch))
        }
        (ty, found) => {
            return Err(Error::decode(
                format!("{ty} key"),
                format!("unexpected marker {found:#04x}"),
            ));
        }
    };
    Ok((datum, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(datum: &Datum, dir: Direction) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_key(&mut buf, datum, dir);
        buf
    }

    fn decode(ty: ColumnType, buf: &[u8], dir: Direction) -> Datum {
        let mut scratch = Vec::new();
        let (datum, rest) = decode_key(&mut scratch, ty, buf, dir).unwrap();
        assert!(rest.is_empty());
        datum
    }

    #[test]
    fn test_int_layout() {
        assert_eq!(
            encode(&Datum::Int(5), Direction::Ascending),
            [0x10, 0x80, 0, 0, 0, 0, 0, 0, 5]
        );
        assert_eq!(
            encode(&Datum::Int(5), Direction::Descending),
            [0xEF, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFA]
        );
    }

    #[test]
    fn test_string_escaping() {
        let datum = Datum::string("a\0b");
        let buf = encode(&datum, Direction::Ascending);
        assert_eq!(buf, [0x20, b'a', 0x00, 0xFF, b'b', 0x00, 0x01]);
        assert_eq!(peek_key_length(&buf, Direction::Ascending).unwrap(), 7);
        assert_eq!(decode(ColumnType::String, &buf, Direction::Ascending), datum);

        let desc = encode(&datum, Direction::Descending);
        assert_eq!(peek_key_length(&desc, Direction::Descending).unwrap(), 7);
        assert_eq!(decode(ColumnType::String, &desc, Direction::Descending), datum);
    }

    #[test]
    fn test_int_order_matches_value_order() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut values: Vec<i64> = (0..200).map(|_| rng.i64(..)).collect();
        values.extend([i64::MIN, -1, 0, 1, i64::MAX]);
        values.sort_unstable();
        values.dedup();
        for dir in [Direction::Ascending, Direction::Descending] {
            let keys: Vec<Vec<u8>> = values
                .iter()
                .map(|&v| encode(&Datum::Int(v), dir))
                .collect();
            for pair in keys.windows(2) {
                match dir {
                    Direction::Ascending => assert!(pair[0] < pair[1]),
                    Direction::Descending => assert!(pair[0] > pair[1]),
                }
            }
        }
    }

    #[test]
    fn test_float_and_string_order() {
        let floats = [f64::NEG_INFINITY, -2.5, -0.5, 0.0, 1e-9, 3.0, f64::INFINITY];
        let keys: Vec<Vec<u8>> = floats
            .iter()
            .map(|&v| encode(&Datum::float(v), Direction::Ascending))
            .collect();
        assert!(keys.windows(2).all(|p| p[0] < p[1]));

        let strings = ["", "a", "a\0", "a\u{1}", "ab", "b"];
        let keys: Vec<Vec<u8>> = strings
            .iter()
            .map(|s| encode(&Datum::string(s), Direction::Ascending))
            .collect();
        assert!(keys.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn test_null_sorts_first() {
        let null = encode(&Datum::Null, Direction::Ascending);
        let int = encode(&Datum::Int(i64::MIN), Direction::Ascending);
        assert!(null < int);
        assert_eq!(decode(ColumnType::Int, &null, Direction::Ascending), Datum::Null);
    }

    #[test]
    fn test_remainder_is_returned() {
        let mut buf = encode(&Datum::Bool(true), Direction::Descending);
        buf.extend_from_slice(&[9, 9]);
        let mut scratch = Vec::new();
        let (datum, rest) =
            decode_key(&mut scratch, ColumnType::Bool, &buf, Direction::Descending).unwrap();
        assert_eq!(datum, Datum::Bool(true));
        assert_eq!(rest, [9, 9]);
    }

    #[test]
    fn test_malformed_keys() {
        let dir = Direction::Ascending;
        assert!(peek_key_length(&[], dir).is_err());
        assert!(peek_key_length(&[0x7F], dir).is_err());
        assert!(peek_key_length(&[marker::INT, 1, 2], dir).is_err());
        assert!(peek_key_length(&[marker::STRING, b'a'], dir).is_err());
        assert!(peek_key_length(&[marker::STRING, 0x00, 0x05], dir).is_err());

        let mut scratch = Vec::new();
        let int = encode(&Datum::Int(1), dir);
        let err = decode_key(&mut scratch, ColumnType::String, &int, dir).unwrap_err();
        assert!(err.is_corrupt_data());

        let bad_utf8 = [marker::STRING, 0xC3, 0x00, 0x01];
        assert!(decode_key(&mut scratch, ColumnType::String, &bad_utf8, dir).is_err());
    }
}
