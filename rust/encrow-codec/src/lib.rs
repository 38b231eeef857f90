//! Encode, decode and length-peek primitives for every logical type and
//! physical encoding, behind the [`DatumCodec`] trait.

use encrow_common::Result;
use encrow_types::{ColumnType, Datum, DatumEncoding, Direction};

pub mod key;
pub mod value;
pub mod varint;

/// The per-type encoding primitives consumed by encoded datums.
///
/// Decoders return the decoded value together with the unconsumed remainder
/// of the input. Encoders append to `out` and must leave `out` untouched when
/// they fail.
pub trait DatumCodec {
    /// Number of leading bytes of `buf` holding one value in `encoding`.
    fn peek_length(&self, encoding: DatumEncoding, buf: &[u8]) -> Result<usize>;

    fn decode_key<'b>(
        &self,
        scratch: &mut Vec<u8>,
        ty: ColumnType,
        buf: &'b [u8],
        dir: Direction,
    ) -> Result<(Datum, &'b [u8])>;

    fn decode_value<'b>(
        &self,
        scratch: &mut Vec<u8>,
        ty: ColumnType,
        buf: &'b [u8],
    ) -> Result<(Datum, &'b [u8])>;

    fn encode_key(&self, out: &mut Vec<u8>, datum: &Datum, dir: Direction) -> Result<()>;

    fn encode_value(&self, out: &mut Vec<u8>, datum: &Datum) -> Result<()>;
}

impl<C: DatumCodec + ?Sized> DatumCodec for &C {
    fn peek_length(&self, encoding: DatumEncoding, buf: &[u8]) -> Result<usize> {
        (**self).peek_length(encoding, buf)
    }

    fn decode_key<'b>(
        &self,
        scratch: &mut Vec<u8>,
        ty: ColumnType,
        buf: &'b [u8],
        dir: Direction,
    ) -> Result<(Datum, &'b [u8])> {
        (**self).decode_key(scratch, ty, buf, dir)
    }

    fn decode_value<'b>(
        &self,
        scratch: &mut Vec<u8>,
        ty: ColumnType,
        buf: &'b [u8],
    ) -> Result<(Datum, &'b [u8])> {
        (**self).decode_value(scratch, ty, buf)
    }

    fn encode_key(&self, out: &mut Vec<u8>, datum: &Datum, dir: Direction) -> Result<()> {
        (**self).encode_key(out, datum, dir)
    }

    fn encode_value(&self, out: &mut Vec<u8>, datum: &Datum) -> Result<()> {
        (**self).encode_value(out, datum)
    }
}

/// The table key/value formats implemented in [`key`] and [`value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TableCodec;

impl DatumCodec for TableCodec {
    fn peek_length(&self, encoding: DatumEncoding, buf: &[u8]) -> Result<usize> {
        match encoding.direction() {
            Some(dir) => key::peek_key_length(buf, dir),
            None => value::peek_value_length(buf),
        }
    }

    fn decode_key<'b>(
        &self,
        scratch: &mut Vec<u8>,
        ty: ColumnType,
        buf: &'b [u8],
        dir: Direction,
    ) -> Result<(Datum, &'b [u8])> {
        key::decode_key(scratch, ty, buf, dir)
    }

    fn decode_value<'b>(
        &self,
        _scratch: &mut Vec<u8>,
        ty: ColumnType,
        buf: &'b [u8],
    ) -> Result<(Datum, &'b [u8])> {
        value::decode_value(ty, buf)
    }

    fn encode_key(&self, out: &mut Vec<u8>, datum: &Datum, dir: Direction) -> Result<()> {
        key::encode_key(out, datum, dir);
        Ok(())
    }

    fn encode_value(&self, out: &mut Vec<u8>, datum: &Datum) -> Result<()> {
        value::encode_value(out, datum);
        Ok(())
    }
}

/// Transient working storage for decoding and encoding, paired with the codec
/// that does the work.
///
/// A single `DatumAlloc` is meant to be reused across many cells (a whole row
/// or batch) so that scratch space is allocated once.
#[derive(Debug, Default)]
pub struct DatumAlloc<C = TableCodec> {
    codec: C,
    scratch: Vec<u8>,
}

impl DatumAlloc {
    pub fn new() -> DatumAlloc {
        DatumAlloc::with_codec(TableCodec)
    }
}

impl<C: DatumCodec> DatumAlloc<C> {
    pub fn with_codec(codec: C) -> DatumAlloc<C> {
        DatumAlloc {
            codec,
            scratch: Vec::new(),
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Decodes one value in `encoding` from the start of `buf`.
    pub fn decode<'b>(
        &mut self,
        ty: ColumnType,
        encoding: DatumEncoding,
        buf: &'b [u8],
    ) -> Result<(Datum, &'b [u8])> {
        match encoding.direction() {
            Some(dir) => self.codec.decode_key(&mut self.scratch, ty, buf, dir),
            None => self.codec.decode_value(&mut self.scratch, ty, buf),
        }
    }

    /// Appends `datum` to `out` in `encoding`.
    pub fn encode(&self, encoding: DatumEncoding, datum: &Datum, out: &mut Vec<u8>) -> Result<()> {
        match encoding.direction() {
            Some(dir) => self.codec.encode_key(out, datum, dir),
            None => self.codec.encode_value(out, datum),
        }
    }
}
