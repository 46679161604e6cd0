//! End-to-end runs from an uploaded file to the combined table.

use async_trait::async_trait;
use kwtrends_common::test_utils::{init_test_logging, mock_date, trends_fixtures};
use kwtrends_common::{Batch, FetchError, Keyword, QueryParams, TrendsError, TrendsRow};
use kwtrends_data::{Batcher, KeywordLoader, ResultCache, TrendsFetcher, TrendsProvider};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingProvider {
    calls: Mutex<Vec<Vec<String>>>,
    rate_limited_call: Option<usize>,
}

#[async_trait]
impl TrendsProvider for RecordingProvider {
    async fn interest_over_time(
        &self,
        batch: &Batch,
        _params: &QueryParams,
    ) -> Result<Vec<TrendsRow>, FetchError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(batch.terms());
            calls.len()
        };
        if self.rate_limited_call == Some(call) {
            return Err(FetchError::rate_limited("429 Too Many Requests"));
        }
        let terms = batch.terms();
        let refs: Vec<&str> = terms.iter().map(String::as_str).collect();
        Ok(trends_fixtures::batch_rows(&refs, mock_date(2024, 1, 1), 90))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

async fn analyze(upload: &[u8], provider: Arc<RecordingProvider>) -> Result<kwtrends_data::AnalysisOutcome, TrendsError> {
    let keywords = KeywordLoader::new().load(upload)?;
    let batches = Batcher::new(5)?.split(&keywords);
    let fetcher = TrendsFetcher::new(provider, QueryParams::default());
    Ok(fetcher.run(&batches, &ResultCache::new()).await)
}

fn numbered_terms(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("keyword {i}")).collect()
}

#[tokio::test]
async fn test_two_keywords_one_batch() {
    init_test_logging();
    let provider = Arc::new(RecordingProvider::default());
    let outcome = analyze(&trends_fixtures::keyword_csv(&["cats", "dogs"]), provider.clone())
        .await
        .unwrap();

    assert_eq!(*provider.calls.lock().unwrap(), vec![vec!["cats".to_string(), "dogs".to_string()]]);
    for term in ["cats", "dogs"] {
        let series = outcome.table.series(&Keyword::parse(term).unwrap());
        assert_eq!(series.len(), 90);
    }
    assert_eq!(
        outcome.table.date_range(),
        Some((mock_date(2024, 1, 1), mock_date(2024, 3, 30)))
    );
}

#[tokio::test]
async fn test_twelve_keywords_three_calls_in_order() {
    let terms = numbered_terms(12);
    let refs: Vec<&str> = terms.iter().map(String::as_str).collect();
    let provider = Arc::new(RecordingProvider::default());

    let outcome = analyze(&trends_fixtures::keyword_csv(&refs), provider.clone())
        .await
        .unwrap();

    let calls = provider.calls.lock().unwrap().clone();
    let sizes: Vec<usize> = calls.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![5, 5, 2]);
    let flat: Vec<String> = calls.into_iter().flatten().collect();
    assert_eq!(flat, terms);
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn test_missing_column_stops_before_fetch() {
    let provider = Arc::new(RecordingProvider::default());
    let err = analyze(b"Terms,Volume\ncats,1\n", provider.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, TrendsError::MissingColumn { .. }));
    assert!(provider.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rate_limited_second_batch() {
    let terms = numbered_terms(12);
    let refs: Vec<&str> = terms.iter().map(String::as_str).collect();
    let provider = Arc::new(RecordingProvider {
        rate_limited_call: Some(2),
        ..RecordingProvider::default()
    });

    let outcome = analyze(&trends_fixtures::keyword_csv(&refs), provider.clone())
        .await
        .unwrap();

    let failed: Vec<String> = outcome
        .failed_keywords()
        .into_iter()
        .map(Keyword::into_inner)
        .collect();
    assert_eq!(failed, terms[5..10].to_vec());

    let kept: Vec<&str> = outcome.table.keywords().iter().map(Keyword::as_str).collect();
    let expected: Vec<&str> = refs[..5].iter().chain(&refs[10..]).copied().collect();
    assert_eq!(kept, expected);
    assert_eq!(provider.calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_blank_keywords_are_empty_input() {
    let provider = Arc::new(RecordingProvider::default());
    let err = analyze(b"Keywords\n  \n\t\n,\n", provider.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, TrendsError::EmptyInput { .. }));
    assert!(provider.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cache_answers_repeated_batch_once() {
    let provider = Arc::new(RecordingProvider::default());
    let fetcher = TrendsFetcher::new(provider.clone(), QueryParams::default());
    let cache = ResultCache::new();
    let batch = Batch::new(vec![Keyword::parse("cats").unwrap()]);

    let first = fetcher.fetch_batch(&batch, &cache).await.unwrap();
    let second = fetcher.fetch_batch(&batch, &cache).await.unwrap();

    assert_eq!(provider.calls.lock().unwrap().len(), 1);
    assert_eq!(first.rows, second.rows);
    assert!(!first.hit);
    assert!(second.hit);
}
