#![allow(dead_code)]

use std::cell::Cell;

use encrow::{ColumnType, Datum, DatumCodec, DatumEncoding, Direction, Result, TableCodec};

/// Delegates to [`TableCodec`] and counts calls per primitive.
#[derive(Default)]
pub struct CountingCodec {
    pub peeks: Cell<usize>,
    pub decodes: Cell<usize>,
    pub encodes: Cell<usize>,
}

impl CountingCodec {
    pub fn new() -> CountingCodec {
        CountingCodec::default()
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl DatumCodec for CountingCodec {
    fn peek_length(&self, encoding: DatumEncoding, buf: &[u8]) -> Result<usize> {
        bump(&self.peeks);
        TableCodec.peek_length(encoding, buf)
    }

    fn decode_key<'b>(
        &self,
        scratch: &mut Vec<u8>,
        ty: ColumnType,
        buf: &'b [u8],
        dir: Direction,
    ) -> Result<(Datum, &'b [u8])> {
        bump(&self.decodes);
        TableCodec.decode_key(scratch, ty, buf, dir)
    }

    fn decode_value<'b>(
        &self,
        scratch: &mut Vec<u8>,
        ty: ColumnType,
        buf: &'b [u8],
    ) -> Result<(Datum, &'b [u8])> {
        bump(&self.decodes);
        TableCodec.decode_value(scratch, ty, buf)
    }

    fn encode_key(&self, out: &mut Vec<u8>, datum: &Datum, dir: Direction) -> Result<()> {
        bump(&self.encodes);
        TableCodec.encode_key(out, datum, dir)
    }

    fn encode_value(&self, out: &mut Vec<u8>, datum: &Datum) -> Result<()> {
        bump(&self.encodes);
        TableCodec.encode_value(out, datum)
    }
}

/// One representative non-null value per column type.
pub fn sample_datums(rng: &mut fastrand::Rng) -> Vec<(ColumnType, Datum)> {
    let text: String = (0..rng.usize(0..12)).map(|_| rng.alphanumeric()).collect();
    let mut raw = vec![0u8; rng.usize(0..12)];
    rng.fill(&mut raw);
    raw.push(0);
    vec![
        (ColumnType::Bool, Datum::Bool(rng.bool())),
        (ColumnType::Int, Datum::Int(rng.i64(..))),
        (ColumnType::Float, Datum::float(rng.f64() * 1e6 - 5e5)),
        (ColumnType::String, Datum::string(&text)),
        (ColumnType::Bytes, Datum::bytes(&raw)),
        (
            ColumnType::Date,
            Datum::date_from_unix_days(rng.i32(-100_000..100_000)).unwrap(),
        ),
        (
            ColumnType::Timestamp,
            Datum::timestamp_from_unix_micros(rng.i64(-1_000_000_000_000_000..1_000_000_000_000_000))
                .unwrap(),
        ),
    ]
}

pub fn encode_with_table_codec(datum: &Datum, encoding: DatumEncoding) -> Vec<u8> {
    let mut out = Vec::new();
    encrow::DatumAlloc::new()
        .encode(encoding, datum, &mut out)
        .unwrap();
    out
}
