//! Trends provider abstraction.

use async_trait::async_trait;
use kwtrends_common::{Batch, FetchError, QueryParams, TrendsRow};

/// A source of interest-over-time data.
///
/// One call corresponds to one external query comparing every keyword of the
/// batch. Implementations must not retry on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrendsProvider: Send + Sync {
    /// Fetch daily interest rows for every keyword in `batch`.
    async fn interest_over_time(
        &self,
        batch: &Batch,
        params: &QueryParams,
    ) -> Result<Vec<TrendsRow>, FetchError>;

    /// Short provider name used in logs.
    fn name(&self) -> &'static str;
}
