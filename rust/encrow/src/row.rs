//! Rows of encoded datums and row sets, as handed out by [`RowArena`](crate::RowArena).

use std::fmt;
use std::ops::{Deref, DerefMut};

use bytes::Bytes;
use encrow_codec::{DatumAlloc, DatumCodec};
use encrow_common::{Result, verify_arg};
use encrow_types::{ColumnType, DatumEncoding};

use crate::enc_datum::EncodedDatum;

/// A fixed-width, ordered sequence of column values.
///
/// The cells are an exclusively borrowed slice: a row cannot grow past the
/// width it was created with.
pub struct Row<'a> {
    cells: &'a mut [EncodedDatum],
}

impl<'a> Row<'a> {
    pub fn from_cells(cells: &'a mut [EncodedDatum]) -> Row<'a> {
        Row { cells }
    }

    pub fn into_cells(self) -> &'a mut [EncodedDatum] {
        self.cells
    }

    /// Fills every cell from `buf`, which holds one value per column in
    /// `encoding`, back to back. Returns the unconsumed remainder.
    ///
    /// Cells before a failing column keep their new contents.
    pub fn set_from_buffer<C: DatumCodec + ?Sized>(
        &mut self,
        codec: &C,
        types: &[ColumnType],
        encoding: DatumEncoding,
        mut buf: Bytes,
    ) -> Result<Bytes> {
        verify_arg!(types, types.len() == self.cells.len());
        for (cell, &ty) in self.cells.iter_mut().zip(types) {
            buf = cell.set_from_buffer(codec, ty, encoding, buf)?;
        }
        Ok(buf)
    }

    /// Appends every cell to `out` in `encoding`. On error `out` is left as
    /// it was.
    pub fn encode<C: DatumCodec>(
        &mut self,
        alloc: &mut DatumAlloc<C>,
        encoding: DatumEncoding,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let start = out.len();
        for cell in self.cells.iter_mut() {
            if let Err(e) = cell.encode(alloc, encoding, out) {
                out.truncate(start);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn decode_all<C: DatumCodec>(&mut self, alloc: &mut DatumAlloc<C>) -> Result<()> {
        self.cells.iter_mut().try_for_each(|cell| cell.decode(alloc))
    }

    /// Renders the row as `[cell0 cell1 ...]`, sharing `alloc` across cells.
    pub fn render<C, W>(&self, alloc: &mut DatumAlloc<C>, out: &mut W) -> fmt::Result
    where
        C: DatumCodec,
        W: fmt::Write + ?Sized,
    {
        out.write_char('[')?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                out.write_char(' ')?;
            }
            cell.render(alloc, out)?;
        }
        out.write_char(']')
    }
}

impl Deref for Row<'_> {
    type Target = [EncodedDatum];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.cells
    }
}

impl DerefMut for Row<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cells
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cells.iter()).finish()
    }
}

impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(&mut DatumAlloc::new(), f)
    }
}

/// An ordered batch of rows, used for diagnostics.
#[derive(Debug, Default)]
pub struct RowSet<'a> {
    rows: Vec<Row<'a>>,
}

impl<'a> RowSet<'a> {
    pub fn new() -> RowSet<'a> {
        RowSet { rows: Vec::new() }
    }

    pub fn push(&mut self, row: Row<'a>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row<'a>> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row<'a>> {
        self.rows.iter_mut()
    }

    pub fn into_rows(self) -> Vec<Row<'a>> {
        self.rows
    }
}

impl<'a> FromIterator<Row<'a>> for RowSet<'a> {
    fn from_iter<I: IntoIterator<Item = Row<'a>>>(iter: I) -> Self {
        RowSet {
            rows: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for RowSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut alloc = DatumAlloc::new();
        f.write_str("[")?;
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            row.render(&mut alloc, f)?;
        }
        f.write_str("]")
    }
}
