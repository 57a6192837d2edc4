//! Chunk partitioning.
//!
//! Contiguous ranges of at most `size` items covering `[0, total)`
//! exactly once, in order.

use std::num::NonZeroUsize;
use std::ops::Range;

use hexflow_types::{HydroError, HydroResult};

/// Split of `[0, total)` into chunks of `size` (the last may be shorter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total: usize,
    size: NonZeroUsize,
}

impl ChunkPlan {
    /// Fails with `InvalidConfig` for a zero chunk size.
    pub fn new(total: usize, size: usize) -> HydroResult<Self> {
        let size = NonZeroUsize::new(size).ok_or_else(|| {
            HydroError::InvalidConfig("Task size of zero is not allowed".into())
        })?;
        Ok(Self::with_size(total, size))
    }

    pub fn with_size(total: usize, size: NonZeroUsize) -> Self {
        Self { total, size }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn size(&self) -> NonZeroUsize {
        self.size
    }

    /// Number of chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.total.div_ceil(self.size.get())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> {
        let total = self.total;
        let size = self.size.get();
        (0..total)
            .step_by(size)
            .map(move |start| start..(start + size).min(total))
    }

    /// Sub-chunks of a region of `len` elements for the material phase.
    ///
    /// `len / size` chunks (at least one), plus one more when the
    /// remainder exceeds 30% of `size`. Chunks get `len / n` elements
    /// each and the last one takes whatever is left, so no remainder
    /// chunk is ever tiny. An empty region yields no chunks.
    pub fn region_split(len: usize, size: NonZeroUsize) -> Vec<Range<usize>> {
        if len == 0 {
            return Vec::new();
        }
        let size = size.get();
        let mut n = len / size;
        if n == 0 {
            n = 1;
        } else if len - n * size > (0.3 * size as f64) as usize {
            n += 1;
        }
        let per_chunk = len / n;
        (0..n)
            .map(|i| {
                let start = i * per_chunk;
                let end = if i + 1 == n { len } else { start + per_chunk };
                start..end
            })
            .collect()
    }
}
