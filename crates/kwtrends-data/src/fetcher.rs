//! Sequential, cache-checked fetching of keyword batches.

use crate::cache::{CacheKey, CachedRows, ResultCache};
use crate::provider::TrendsProvider;
use crate::table::CombinedTable;
use kwtrends_common::{Batch, FetchError, Keyword, QueryParams};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What happened to one batch during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchStatus {
    /// Rows were merged into the table.
    Fetched {
        rows: usize,
        /// Served from the session cache without an external call.
        cached: bool,
    },
    /// The batch failed; its keywords are reported as failed.
    Failed(FetchError),
}

/// Per-batch entry of the run report.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// 1-based position of the batch in the run.
    pub number: usize,
    pub batch: Batch,
    pub status: BatchStatus,
}

impl BatchReport {
    pub const fn is_failed(&self) -> bool {
        matches!(self.status, BatchStatus::Failed(_))
    }
}

/// Result of one analysis run: the merged table plus the per-batch report.
///
/// Partial success is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOutcome {
    pub table: CombinedTable,
    pub reports: Vec<BatchReport>,
}

impl AnalysisOutcome {
    /// Keywords of every failed batch, in batch order.
    pub fn failed_keywords(&self) -> Vec<Keyword> {
        self.reports
            .iter()
            .filter(|r| r.is_failed())
            .flat_map(|r| r.batch.keywords().iter().cloned())
            .collect()
    }

    /// Failed batches with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Batch, &FetchError)> {
        self.reports.iter().filter_map(|r| match &r.status {
            BatchStatus::Failed(e) => Some((&r.batch, e)),
            BatchStatus::Fetched { .. } => None,
        })
    }

    /// Whether every batch succeeded.
    pub fn is_complete(&self) -> bool {
        self.reports.iter().all(|r| !r.is_failed())
    }

    /// Number of batches answered from the cache.
    pub fn cache_hits(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, BatchStatus::Fetched { cached: true, .. }))
            .count()
    }
}

/// Fetches batches one after another through a [`ResultCache`].
#[derive(Clone)]
pub struct TrendsFetcher {
    provider: Arc<dyn TrendsProvider>,
    params: QueryParams,
}

impl TrendsFetcher {
    pub fn new(provider: Arc<dyn TrendsProvider>, params: QueryParams) -> Self {
        Self { provider, params }
    }

    /// Query parameters sent with every batch.
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Fetch one batch, answering from `cache` when possible.
    ///
    /// An empty provider answer is reported as [`FetchError::NoData`].
    #[instrument(skip(self, cache), fields(provider = self.provider.name()))]
    pub async fn fetch_batch(&self, batch: &Batch, cache: &ResultCache) -> Result<CachedRows, FetchError> {
        let key = CacheKey::new(batch, &self.params);
        cache
            .get_or_fetch(key, async {
                let rows = self.provider.interest_over_time(batch, &self.params).await?;
                if rows.is_empty() {
                    return Err(FetchError::no_data(batch.terms()));
                }
                Ok(rows)
            })
            .await
    }

    /// Run every batch in order and merge the results.
    ///
    /// A failed batch is recorded and the run moves on to the next one.
    #[instrument(skip_all, fields(batches = batches.len()))]
    pub async fn run(&self, batches: &[Batch], cache: &ResultCache) -> AnalysisOutcome {
        let total = batches.len();
        let mut outcome = AnalysisOutcome::default();

        for (i, batch) in batches.iter().enumerate() {
            let number = i + 1;
            info!("Processing batch {} of {}: {}", number, total, batch);

            let status = match self.fetch_batch(batch, cache).await {
                Ok(fetched) => {
                    let merged = outcome.table.merge_batch(batch, &fetched.rows);
                    info!(
                        "Batch {} merged {} cells ({})",
                        number,
                        merged,
                        if fetched.hit { "cached" } else { "fetched" }
                    );
                    BatchStatus::Fetched {
                        rows: fetched.rows.len(),
                        cached: fetched.hit,
                    }
                }
                Err(e) => {
                    warn!("Batch {} failed: {}", number, e);
                    BatchStatus::Failed(e)
                }
            };

            outcome.reports.push(BatchReport {
                number,
                batch: batch.clone(),
                status,
            });
        }

        let failed = outcome.failed_keywords();
        if failed.is_empty() {
            info!("Analysis finished: {} cells", outcome.table.len());
        } else {
            warn!(
                "Analysis finished with {} failed keywords: {}",
                failed.len(),
                failed.iter().map(Keyword::as_str).collect::<Vec<_>>().join(", ")
            );
        }

        outcome
    }
}

impl std::fmt::Debug for TrendsFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendsFetcher")
            .field("provider", &self.provider.name())
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockTrendsProvider;
    use crate::Batcher;
    use kwtrends_common::test_utils::{keywords, mock_date, trends_fixtures};
    use mockall::{predicate, Sequence};

    fn rows_for(batch: &Batch) -> Vec<kwtrends_common::TrendsRow> {
        let terms = batch.terms();
        let refs: Vec<&str> = terms.iter().map(String::as_str).collect();
        trends_fixtures::batch_rows(&refs, mock_date(2024, 1, 1), 5)
    }

    fn fetcher(mock: MockTrendsProvider) -> TrendsFetcher {
        TrendsFetcher::new(Arc::new(mock), QueryParams::default())
    }

    fn mock() -> MockTrendsProvider {
        let mut mock = MockTrendsProvider::new();
        mock.expect_name().return_const("mock");
        mock
    }

    #[tokio::test]
    async fn test_single_batch_single_call() {
        let mut mock = mock();
        mock.expect_interest_over_time()
            .with(predicate::eq(Batch::new(keywords(&["cats", "dogs"]))), predicate::always())
            .times(1)
            .returning(|batch, _| Ok(rows_for(batch)));

        let batches = Batcher::new(5).unwrap().split(&keywords(&["cats", "dogs"]));
        let outcome = fetcher(mock).run(&batches, &ResultCache::new()).await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.table.keywords().len(), 2);
        assert_eq!(outcome.table.len(), 10);
    }

    #[tokio::test]
    async fn test_batches_fetched_in_order() {
        let terms: Vec<String> = (1..=12).map(|i| format!("kw{i}")).collect();
        let refs: Vec<&str> = terms.iter().map(String::as_str).collect();
        let batches = Batcher::new(5).unwrap().split(&keywords(&refs));

        let mut seq = Sequence::new();
        let mut mock = mock();
        for batch in batches.clone() {
            mock.expect_interest_over_time()
                .with(predicate::eq(batch), predicate::always())
                .times(1)
                .in_sequence(&mut seq)
                .returning(|batch, _| Ok(rows_for(batch)));
        }

        let outcome = fetcher(mock).run(&batches, &ResultCache::new()).await;
        let numbers: Vec<usize> = outcome.reports.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(outcome.table.keywords().len(), 12);
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_other_results() {
        let batches = vec![
            Batch::new(keywords(&["a", "b"])),
            Batch::new(keywords(&["c", "d"])),
            Batch::new(keywords(&["e"])),
        ];
        let mut mock = mock();
        mock.expect_interest_over_time().times(3).returning(|batch, _| {
            if batch.contains(&Keyword::parse("c").unwrap()) {
                Err(FetchError::rate_limited("429 Too Many Requests"))
            } else {
                Ok(rows_for(batch))
            }
        });

        let outcome = fetcher(mock).run(&batches, &ResultCache::new()).await;

        assert!(!outcome.is_complete());
        let failed = outcome.failed_keywords();
        let failed: Vec<&str> = failed.iter().map(Keyword::as_str).collect();
        assert_eq!(failed, vec!["c", "d"]);
        let kept: Vec<&str> = outcome.table.keywords().iter().map(Keyword::as_str).collect();
        assert_eq!(kept, vec!["a", "b", "e"]);
        let (_, err) = outcome.failures().next().unwrap();
        assert_eq!(err.kind(), "rate_limited");
    }

    #[tokio::test]
    async fn test_empty_rows_are_no_data() {
        let mut mock = mock();
        mock.expect_interest_over_time().times(1).returning(|_, _| Ok(Vec::new()));

        let cache = ResultCache::new();
        let batch = Batch::new(keywords(&["zzqx"]));
        let err = fetcher(mock).fetch_batch(&batch, &cache).await.unwrap_err();
        assert_eq!(err, FetchError::no_data(["zzqx"]));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_repeat_run_uses_cache() {
        let mut mock = mock();
        mock.expect_interest_over_time()
            .times(1)
            .returning(|batch, _| Ok(rows_for(batch)));

        let fetcher = fetcher(mock);
        let cache = ResultCache::new();
        let batches = vec![Batch::new(keywords(&["cats"]))];

        let first = fetcher.run(&batches, &cache).await;
        let second = fetcher.run(&batches, &cache).await;

        assert_eq!(first.table, second.table);
        assert_eq!(first.cache_hits(), 0);
        assert_eq!(second.cache_hits(), 1);
    }

    #[tokio::test]
    async fn test_no_batches_no_calls() {
        let mut mock = mock();
        mock.expect_interest_over_time().never();

        let outcome = fetcher(mock).run(&[], &ResultCache::new()).await;
        assert!(outcome.table.is_empty());
        assert!(outcome.reports.is_empty());
        assert!(outcome.is_complete());
    }
}
