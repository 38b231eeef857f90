//! Lazily decoded column values for query execution pipelines.
//!
//! An [`EncodedDatum`] holds a column value in whatever physical encoding it
//! arrived in (a key or value fragment read from storage) and/or as a decoded
//! [`Datum`]. Values are decoded only when needed, and re-emitting a value in
//! the encoding it already has is a plain byte copy.
//!
//! Rows of datums are handed out by a [`RowArena`], which batches the
//! allocation of many small rows into a few large chunks.

pub mod arena;
pub mod enc_datum;
pub mod row;

pub use arena::{ArenaConfig, ArenaStats, RowArena};
pub use enc_datum::EncodedDatum;
pub use row::{Row, RowSet};

pub use encrow_codec::{DatumAlloc, DatumCodec, TableCodec};
pub use encrow_common::{
    Result,
    error::{Error, ErrorKind},
};
pub use encrow_types::{ColumnType, Datum, DatumEncoding, Direction};
