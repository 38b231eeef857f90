//! Variable-length unsigned integers.
//!
//! The leading byte selects the width, so the encoded length is known after
//! reading a single byte and byte-wise comparison matches numeric order:
//!
//! | Value range              | Bytes | Layout                              |
//! |--------------------------|-------|-------------------------------------|
//! | 0 - 240                  | 1     | `[v]`                               |
//! | 241 - 2287               | 2     | `[241 + (v-240)>>8, (v-240)&0xFF]`  |
//! | 2288 - 67823             | 3     | `[249, (v-2288)>>8, (v-2288)&0xFF]` |
//! | 67824 - 0xFF_FFFF        | 4     | `[250, 3-byte big-endian]`          |
//! | 0x100_0000 - u32::MAX    | 5     | `[251, 4-byte big-endian]`          |
//! | above u32::MAX           | 9     | `[255, 8-byte big-endian]`          |
//!
//! Markers 252-254 are invalid.

use encrow_common::{Result, error::Error};

pub fn varint_len(value: u64) -> usize {
    if value <= 240 {
        1
    } else if value <= 2287 {
        2
    } else if value <= 67823 {
        3
    } else if value <= 0xFF_FFFF {
        4
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/// Encoded width implied by the leading byte, `None` for reserved markers.
#[inline]
pub fn width_from_marker(first: u8) -> Option<usize> {
    match first {
        0..=240 => Some(1),
        241..=248 => Some(2),
        249 => Some(3),
        250 => Some(4),
        251 => Some(5),
        255 => Some(9),
        _ => None,
    }
}

pub fn put_varint(out: &mut Vec<u8>, value: u64) {
    if value <= 240 {
        out.push(value as u8);
    } else if value <= 2287 {
        let v = value - 240;
        out.extend_from_slice(&[((v >> 8) + 241) as u8, (v & 0xFF) as u8]);
    } else if value <= 67823 {
        let v = value - 2288;
        out.extend_from_slice(&[249, (v >> 8) as u8, (v & 0xFF) as u8]);
    } else if value <= 0xFF_FFFF {
        out.push(250);
        out.extend_from_slice(&value.to_be_bytes()[5..]);
    } else if value <= 0xFFFF_FFFF {
        out.push(251);
        out.extend_from_slice(&value.to_be_bytes()[4..]);
    } else {
        out.push(255);
        out.extend_from_slice(&value.to_be_bytes());
    }
}

/// Number of bytes taken by the varint at the start of `buf`.
pub fn peek_varint(buf: &[u8]) -> Result<usize> {
    let first = *buf
        .first()
        .ok_or_else(|| Error::decode("varint", "empty buffer"))?;
    let width = width_from_marker(first)
        .ok_or_else(|| Error::decode("varint", format!("invalid marker {first}")))?;
    if buf.len() < width {
        return Err(Error::decode(
            "varint",
            format!("truncated {width}-byte varint"),
        ));
    }
    Ok(width)
}

/// Decodes the varint at the start of `buf`, returning the value and the
/// number of bytes read.
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    let width = peek_varint(buf)?;
    let first = buf[0] as u64;
    let value = match width {
        1 => first,
        2 => 240 + ((first - 241) << 8) + buf[1] as u64,
        3 => 2288 + ((buf[1] as u64) << 8) + buf[2] as u64,
        _ => buf[1..width]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64),
    };
    Ok((value, width))
}

#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
