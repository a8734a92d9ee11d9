//! Incremental rendering of a result list in fixed-size batches.
//!
//! The host draws whatever range a [`Batch`] names, then hands the batch back
//! via [`Pager::complete`]. While more records remain the pager arms a
//! [`Sentinel`]; the host reports it with [`Pager::on_visible`] once it scrolls
//! into view. Every [`Pager::reset`] bumps the generation, so sentinels from a
//! previous result list are ignored.

use std::ops::Range;

pub const INITIAL_BATCH: usize = 20;
pub const BATCH: usize = 10;

/// A range of result indices to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub generation: u64,
    pub start: usize,
    pub end: usize,
}

impl Batch {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Marker placed after the last rendered record while more remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinel {
    pub generation: u64,
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct Pager {
    initial_batch: usize,
    batch: usize,
    len: usize,
    cursor: usize,
    generation: u64,
    in_flight: bool,
    sentinel: Option<Sentinel>,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(INITIAL_BATCH, BATCH)
    }
}

impl Pager {
    /// Batch sizes below 1 are raised to 1.
    pub fn new(initial_batch: usize, batch: usize) -> Self {
        Self {
            initial_batch: initial_batch.max(1),
            batch: batch.max(1),
            len: 0,
            cursor: 0,
            generation: 0,
            in_flight: false,
            sentinel: None,
        }
    }

    /// Start over for a result list of `len` records.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.cursor = 0;
        self.generation += 1;
        self.in_flight = false;
        self.sentinel = None;
    }

    /// Claim the next batch. `None` while a batch is in flight or when every
    /// record has been rendered.
    pub fn begin(&mut self) -> Option<Batch> {
        if self.in_flight || self.cursor >= self.len {
            return None;
        }
        let size = if self.cursor == 0 {
            self.initial_batch
        } else {
            self.batch
        };
        self.in_flight = true;
        self.sentinel = None;
        Some(Batch {
            generation: self.generation,
            start: self.cursor,
            end: (self.cursor + size).min(self.len),
        })
    }

    /// Mark `batch` rendered. A batch from an earlier generation is dropped
    /// and `false` returned.
    pub fn complete(&mut self, batch: Batch) -> bool {
        if batch.generation != self.generation {
            return false;
        }
        self.cursor = batch.end;
        self.in_flight = false;
        self.sentinel = (self.cursor < self.len).then_some(Sentinel {
            generation: self.generation,
            position: self.cursor,
        });
        true
    }

    /// Render one more batch synchronously.
    pub fn load_more(&mut self) -> Option<Batch> {
        let batch = self.begin()?;
        self.complete(batch);
        Some(batch)
    }

    /// Visibility callback. Only the currently armed sentinel triggers a load.
    pub fn on_visible(&mut self, sentinel: Sentinel) -> Option<Batch> {
        if self.sentinel != Some(sentinel) {
            tracing::trace!(?sentinel, "ignoring stale sentinel");
            return None;
        }
        self.load_more()
    }

    /// Number of records rendered so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sentinel(&self) -> Option<Sentinel> {
        self.sentinel
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn has_more(&self) -> bool {
        self.cursor < self.len
    }
}
