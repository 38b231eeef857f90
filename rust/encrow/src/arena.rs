//! Chunked bump allocation of rows.
//!
//! A [`RowArena`] carves rows out of large chunks of cells so that many small
//! rows of the same width cost one allocation per batch instead of one per
//! row. Rows are never freed individually; all chunks are released together
//! when the arena is dropped, which the borrow checker only allows once no
//! row handed out by the arena is alive.

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use encrow_common::{Result, verify_arg};
use serde::{Deserialize, Serialize};

use crate::enc_datum::EncodedDatum;
use crate::row::Row;

/// Chunk sizing policy of a [`RowArena`].
///
/// When a row of width `w` does not fit in the current chunk, the next chunk
/// holds `w * small_row_batch` cells if `w <= small_row_max_width`,
/// `w * medium_row_batch` cells if `w <= medium_row_max_width`, and exactly
/// `w` cells otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub small_row_max_width: usize,
    pub small_row_batch: usize,
    pub medium_row_max_width: usize,
    pub medium_row_batch: usize,
    /// Cells to allocate up front, before the first row is requested.
    pub initial_chunk_cells: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            small_row_max_width: 16,
            small_row_batch: 16,
            medium_row_max_width: 64,
            medium_row_batch: 4,
            initial_chunk_cells: 0,
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<()> {
        verify_arg!(small_row_batch, self.small_row_batch > 0);
        verify_arg!(medium_row_batch, self.medium_row_batch > 0);
        verify_arg!(
            medium_row_max_width,
            self.medium_row_max_width >= self.small_row_max_width
        );
        Ok(())
    }

    /// Size in cells of a fresh chunk allocated for a row of `width`.
    pub fn chunk_len(&self, width: usize) -> usize {
        let batch = if width <= self.small_row_max_width {
            self.small_row_batch
        } else if width <= self.medium_row_max_width {
            self.medium_row_batch
        } else {
            1
        };
        width.saturating_mul(batch)
    }
}

/// Allocation counters of a [`RowArena`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Chunks allocated so far.
    pub chunks: usize,
    /// Total cells across all chunks.
    pub chunk_cells: usize,
    /// Rows handed out.
    pub rows: usize,
    /// Cells handed out as rows.
    pub row_cells: usize,
}

/// Hands out [`Row`]s from shared chunks of cells.
///
/// Every row is an exclusive borrow of a distinct range of a chunk, so rows
/// never alias each other and none of them can outlive the arena. The arena
/// is not `Sync`; it can be moved to another thread along with ownership of
/// all its rows.
pub struct RowArena {
    config: ArenaConfig,
    /// Leaked boxed slices, reclaimed in `Drop`. Only the last one has free
    /// cells.
    chunks: RefCell<Vec<NonNull<[EncodedDatum]>>>,
    /// Cells of the last chunk already handed out.
    used: Cell<usize>,
    stats: Cell<ArenaStats>,
}

// SAFETY: the chunks are uniquely owned by the arena and `EncodedDatum` is
// `Send`. Rows borrow the arena, so none can be left behind on the old thread.
unsafe impl Send for RowArena {}

impl RowArena {
    pub fn new() -> RowArena {
        RowArena::from_valid_config(ArenaConfig::default())
    }

    pub fn with_config(config: ArenaConfig) -> Result<RowArena> {
        config.validate()?;
        Ok(RowArena::from_valid_config(config))
    }

    fn from_valid_config(config: ArenaConfig) -> RowArena {
        let initial = config.initial_chunk_cells;
        let arena = RowArena {
            config,
            chunks: RefCell::new(Vec::new()),
            used: Cell::new(0),
            stats: Cell::new(ArenaStats::default()),
        };
        if initial > 0 {
            arena.push_chunk(&mut arena.chunks.borrow_mut(), initial);
        }
        arena
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats.get()
    }

    /// Returns a row of exactly `width` unset cells.
    ///
    /// When the current chunk has fewer than `width` free cells, a new chunk
    /// sized by [`ArenaConfig::chunk_len`] replaces it; the unused tail of the
    /// old chunk is abandoned.
    pub fn alloc_row(&self, width: usize) -> Row<'_> {
        if width == 0 {
            return Row::from_cells(&mut []);
        }
        let mut chunks = self.chunks.borrow_mut();
        let free = chunks.last().map_or(0, |chunk| chunk.len() - self.used.get());
        if free < width {
            self.push_chunk(&mut chunks, self.config.chunk_len(width));
        }
        let chunk = chunks[chunks.len() - 1];
        let start = self.used.get();
        self.used.set(start + width);

        let mut stats = self.stats.get();
        stats.rows += 1;
        stats.row_cells += width;
        self.stats.set(stats);

        // SAFETY: `chunk` points to a live, leaked boxed slice of at least
        // `start + width` cells. The range `start..start + width` is handed
        // out exactly once because `used` only grows within a chunk, and the
        // chunk is not freed before the arena (which the row borrows) drops.
        let cells = unsafe {
            let base = chunk.as_ptr() as *mut EncodedDatum;
            std::slice::from_raw_parts_mut(base.add(start), width)
        };
        Row::from_cells(cells)
    }

    /// Allocates a row of the same width as `row` and clones every cell into
    /// it. Encoded bytes and decoded values are shared with the source, not
    /// copied; later `set_*` calls on either row do not affect the other.
    pub fn copy_row(&self, row: &[EncodedDatum]) -> Row<'_> {
        let mut copy = self.alloc_row(row.len());
        copy.clone_from_slice(row);
        copy
    }

    fn push_chunk(&self, chunks: &mut Vec<NonNull<[EncodedDatum]>>, len: usize) {
        log::trace!(
            "row arena: allocating chunk #{} of {len} cells",
            chunks.len() + 1
        );
        let chunk: Box<[EncodedDatum]> = std::iter::repeat_with(EncodedDatum::new)
            .take(len)
            .collect();
        chunks.push(NonNull::from(Box::leak(chunk)));
        self.used.set(0);

        let mut stats = self.stats.get();
        stats.chunks += 1;
        stats.chunk_cells += len;
        self.stats.set(stats);
    }
}

impl Default for RowArena {
    fn default() -> Self {
        RowArena::new()
    }
}

impl std::fmt::Debug for RowArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowArena")
            .field("config", &self.config)
            .field("stats", &self.stats.get())
            .finish_non_exhaustive()
    }
}

impl Drop for RowArena {
    fn drop(&mut self) {
        for chunk in self.chunks.get_mut().drain(..) {
            // SAFETY: every chunk was produced by `Box::leak` in `push_chunk`
            // and is released exactly once, here. `&mut self` guarantees that
            // no row borrowed from the arena is still alive.
            drop(unsafe { Box::from_raw(chunk.as_ptr()) });
        }
    }
}
