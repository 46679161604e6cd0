//! # kwtrends data
//!
//! Everything between an uploaded keyword file and the combined result table:
//! keyword extraction, batching, the trends provider abstraction with its
//! Google Trends client, the session result cache, and the sequential fetcher
//! that merges batch results.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod batcher;
pub mod cache;
pub mod fetcher;
pub mod google;
pub mod loader;
pub mod provider;
pub mod table;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use batcher::Batcher;
pub use cache::{CacheKey, CacheMetrics, CachedRows, ResultCache};
pub use fetcher::{AnalysisOutcome, BatchReport, BatchStatus, TrendsFetcher};
pub use google::GoogleTrendsClient;
pub use loader::{InputFormat, KeywordLoader, KEYWORD_COLUMN};
pub use provider::TrendsProvider;
pub use table::CombinedTable;
