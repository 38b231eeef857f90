//! A column value backed by an encoding, a decoded [`Datum`], or both.

use std::fmt;

use bytes::Bytes;
use encrow_codec::{DatumAlloc, DatumCodec};
use encrow_common::{Result, error::Error};
use encrow_types::{ColumnType, Datum, DatumEncoding};

/// A value that can be passed through the pipeline in the physical encoding
/// it arrived in, and is only decoded when a concrete value is needed.
///
/// The encoded bytes are an immutable, reference-counted [`Bytes`] range, so
/// a datum (and every copy of it) keeps the underlying buffer alive and the
/// bytes cannot change underneath it.
///
/// An `EncodedDatum` is reused across batches: every `set_*` call replaces
/// the previous contents regardless of the current state.
#[derive(Debug, Clone, Default)]
pub struct EncodedDatum(Repr);

#[derive(Debug, Clone, Default)]
enum Repr {
    #[default]
    Unset,
    Encoded {
        ty: ColumnType,
        encoded: Encoded,
    },
    Decoded {
        ty: ColumnType,
        datum: Datum,
    },
    Both {
        ty: ColumnType,
        encoded: Encoded,
        datum: Datum,
    },
}

#[derive(Debug, Clone)]
struct Encoded {
    encoding: DatumEncoding,
    bytes: Bytes,
}

impl EncodedDatum {
    pub fn new() -> EncodedDatum {
        EncodedDatum(Repr::Unset)
    }

    pub fn from_encoded(ty: ColumnType, encoding: DatumEncoding, bytes: Bytes) -> EncodedDatum {
        let mut ed = EncodedDatum::new();
        ed.set_encoded(ty, encoding, bytes);
        ed
    }

    pub fn from_datum(ty: ColumnType, datum: Datum) -> Result<EncodedDatum> {
        let mut ed = EncodedDatum::new();
        ed.set_datum(ty, datum)?;
        Ok(ed)
    }

    /// Installs an encoded value, dropping any decoded value.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is empty: no encoding produces an empty range.
    pub fn set_encoded(&mut self, ty: ColumnType, encoding: DatumEncoding, bytes: Bytes) {
        assert!(!bytes.is_empty(), "empty encoded value");
        self.0 = Repr::Encoded {
            ty,
            encoded: Encoded { encoding, bytes },
        };
    }

    /// Installs the value at the start of `buf`, which may be followed by
    /// other data, and returns the rest of the buffer.
    ///
    /// The value's extent is found with the codec's length peek; neither the
    /// value nor the remainder is copied. On error the datum is unchanged.
    pub fn set_from_buffer<C: DatumCodec + ?Sized>(
        &mut self,
        codec: &C,
        ty: ColumnType,
        encoding: DatumEncoding,
        mut buf: Bytes,
    ) -> Result<Bytes> {
        let len = codec.peek_length(encoding, &buf)?;
        if len == 0 || len > buf.len() {
            return Err(Error::decode(
                format!("{ty} {encoding}"),
                format!("peeked length {len} outside buffer of {} bytes", buf.len()),
            ));
        }
        let encoded = buf.split_to(len);
        self.set_encoded(ty, encoding, encoded);
        Ok(buf)
    }

    /// Installs a decoded value, dropping any encoded bytes.
    ///
    /// Fails with `TypeMismatch` if `datum` is neither null nor of type `ty`;
    /// the datum is left unchanged in that case.
    pub fn set_datum(&mut self, ty: ColumnType, datum: Datum) -> Result<()> {
        check_type(ty, &datum)?;
        self.0 = Repr::Decoded { ty, datum };
        Ok(())
    }

    /// Returns `true` if nothing was ever installed.
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self.0, Repr::Unset)
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        match &self.0 {
            Repr::Unset => None,
            Repr::Encoded { ty, .. } | Repr::Decoded { ty, .. } | Repr::Both { ty, .. } => {
                Some(*ty)
            }
        }
    }

    /// The decoded value, if it has been materialized.
    pub fn datum(&self) -> Option<&Datum> {
        match &self.0 {
            Repr::Decoded { datum, .. } | Repr::Both { datum, .. } => Some(datum),
            Repr::Unset | Repr::Encoded { .. } => None,
        }
    }

    /// The cached encoded bytes, if any.
    pub fn encoded_bytes(&self) -> Option<&Bytes> {
        self.cached().map(|encoded| &encoded.bytes)
    }

    /// The encoding of the cached bytes, or `None` when no bytes are cached
    /// (even if a decoded value is present).
    pub fn encoding(&self) -> Option<DatumEncoding> {
        self.cached().map(|encoded| encoded.encoding)
    }

    fn cached(&self) -> Option<&Encoded> {
        match &self.0 {
            Repr::Encoded { encoded, .. } | Repr::Both { encoded, .. } => Some(encoded),
            Repr::Unset | Repr::Decoded { .. } => None,
        }
    }

    /// Makes sure the decoded value is present, decoding the cached bytes if
    /// necessary. A no-op when already decoded.
    ///
    /// On failure nothing changes: the encoded bytes stay cached and no
    /// decoded value is recorded, so the call can be retried.
    ///
    /// # Panics
    ///
    /// Panics if the datum is unset.
    pub fn decode<C: DatumCodec>(&mut self, alloc: &mut DatumAlloc<C>) -> Result<()> {
        let datum = match &self.0 {
            Repr::Unset => panic!("decoding unset EncodedDatum"),
            Repr::Decoded { .. } | Repr::Both { .. } => return Ok(()),
            Repr::Encoded { ty, encoded } => decode_encoded(alloc, *ty, encoded)?,
        };
        self.0 = match std::mem::take(&mut self.0) {
            Repr::Encoded { ty, encoded } => Repr::Both { ty, encoded, datum },
            other => other,
        };
        Ok(())
    }

    /// [`decode`](Self::decode), then borrow the decoded value.
    pub fn ensure_decoded<C: DatumCodec>(&mut self, alloc: &mut DatumAlloc<C>) -> Result<&Datum> {
        self.decode(alloc)?;
        match &self.0 {
            Repr::Decoded { datum, .. } | Repr::Both { datum, .. } => Ok(datum),
            Repr::Unset | Repr::Encoded { .. } => unreachable!("decode leaves a datum"),
        }
    }

    /// Appends the value to `out` in `encoding`.
    ///
    /// Cached bytes already in `encoding` are copied as-is, without decoding.
    /// Otherwise the value is decoded (and the decoded value kept) and encoded
    /// afresh; the fresh encoding is not cached. On error `out` is left as it
    /// was.
    pub fn encode<C: DatumCodec>(
        &mut self,
        alloc: &mut DatumAlloc<C>,
        encoding: DatumEncoding,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        if let Some(encoded) = self.cached().filter(|e| e.encoding == encoding) {
            out.extend_from_slice(&encoded.bytes);
            return Ok(());
        }
        let datum = self.ensure_decoded(alloc)?;
        let start = out.len();
        alloc
            .encode(encoding, datum, out)
            .inspect_err(|_| out.truncate(start))
    }

    /// Writes a human readable form of the value to `out`.
    ///
    /// Encoded-only values are decoded into a temporary using `alloc`; the
    /// datum itself is not modified. Decode failures are rendered inline as
    /// `<error: ...>`.
    pub fn render<C, W>(&self, alloc: &mut DatumAlloc<C>, out: &mut W) -> fmt::Result
    where
        C: DatumCodec,
        W: fmt::Write + ?Sized,
    {
        match &self.0 {
            Repr::Unset => out.write_str("<unset>"),
            Repr::Decoded { datum, .. } | Repr::Both { datum, .. } => write!(out, "{datum}"),
            Repr::Encoded { ty, encoded } => match decode_encoded(alloc, *ty, encoded) {
                Ok(datum) => write!(out, "{datum}"),
                Err(err) => {
                    log::debug!("rendering undecodable {ty} {}: {err}", encoded.encoding);
                    write!(out, "<error: {err}>")
                }
            },
        }
    }
}

impl fmt::Display for EncodedDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(&mut DatumAlloc::new(), f)
    }
}

fn check_type(ty: ColumnType, datum: &Datum) -> Result<()> {
    if datum.is_null() || ty.type_equal(datum) {
        Ok(())
    } else {
        Err(Error::type_mismatch(ty.name(), datum.type_name()))
    }
}

fn decode_encoded<C: DatumCodec>(
    alloc: &mut DatumAlloc<C>,
    ty: ColumnType,
    encoded: &Encoded,
) -> Result<Datum> {
    let (datum, rest) = alloc.decode(ty, encoded.encoding, &encoded.bytes)?;
    if !rest.is_empty() {
        return Err(Error::trailing_bytes(rest.len()));
    }
    check_type(ty, &datum)?;
    Ok(datum)
}
