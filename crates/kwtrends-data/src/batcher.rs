//! Splitting keyword lists into provider-sized batches.

use kwtrends_common::{Batch, Keyword, Result, TrendsError};
use kwtrends_config::MAX_BATCH_SIZE;
use std::num::NonZeroUsize;

/// Partitions keywords into consecutive batches of at most `size` terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batcher {
    size: NonZeroUsize,
}

impl Batcher {
    /// Creates a batcher; `size` must be at least 1.
    pub fn new(size: usize) -> Result<Self> {
        NonZeroUsize::new(size)
            .map(|size| Self { size })
            .ok_or_else(|| TrendsError::validation_field("batch size must be at least 1", "batching.batch_size"))
    }

    /// Configured batch size.
    pub const fn size(&self) -> usize {
        self.size.get()
    }

    /// Consecutive batches in input order; the last may be shorter.
    pub fn split(&self, keywords: &[Keyword]) -> Vec<Batch> {
        keywords
            .chunks(self.size.get())
            .map(|chunk| Batch::new(chunk.to_vec()))
            .collect()
    }

    /// Number of batches `split` produces for `len` keywords.
    pub const fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.size.get())
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self {
            size: NonZeroUsize::new(MAX_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }
}
