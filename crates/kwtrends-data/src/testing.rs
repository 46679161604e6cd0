//! In-memory provider for tests of this and downstream crates.

use crate::provider::TrendsProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use kwtrends_common::test_utils::{mock_date, trends_fixtures};
use kwtrends_common::{Batch, FetchError, QueryParams, TrendsRow};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Provider that answers from fixtures and records every call.
///
/// Each batch gets `days` of daily rows starting at `start`. Failures can be
/// scripted for a batch, identified by its keyword texts in order.
#[derive(Debug)]
pub struct ScriptedProvider {
    start: NaiveDate,
    days: u32,
    failures: HashMap<Vec<String>, FetchError>,
    calls: Mutex<Vec<Batch>>,
}

impl ScriptedProvider {
    /// 30 days of data from 2024-01-01 for every batch.
    pub fn new() -> Self {
        Self {
            start: mock_date(2024, 1, 1),
            days: 30,
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Change the date axis returned for every batch.
    #[must_use]
    pub const fn with_dates(mut self, start: NaiveDate, days: u32) -> Self {
        self.start = start;
        self.days = days;
        self
    }

    /// Fail the batch made of exactly `terms` with `error`.
    #[must_use]
    pub fn failing(mut self, terms: &[&str], error: FetchError) -> Self {
        self.failures
            .insert(terms.iter().map(ToString::to_string).collect(), error);
        self
    }

    /// Batches requested so far, in call order.
    pub fn calls(&self) -> Vec<Batch> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of provider calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrendsProvider for ScriptedProvider {
    async fn interest_over_time(
        &self,
        batch: &Batch,
        _params: &QueryParams,
    ) -> Result<Vec<TrendsRow>, FetchError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch.clone());

        if let Some(error) = self.failures.get(&batch.terms()) {
            return Err(error.clone());
        }

        let terms = batch.terms();
        let refs: Vec<&str> = terms.iter().map(String::as_str).collect();
        Ok(trends_fixtures::batch_rows(&refs, self.start, self.days))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
