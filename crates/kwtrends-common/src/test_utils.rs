//! Test utilities and shared fixtures for the kwtrends workspace.
//!
//! Available in unit tests of this crate and, through the `testing` feature,
//! to the tests of every other crate.

use crate::{Keyword, TrendsRow};
use chrono::{Duration, NaiveDate};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Build a calendar date, panicking on invalid input.
pub fn mock_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Build a keyword list from string literals.
pub fn keywords(terms: &[&str]) -> Vec<Keyword> {
    terms
        .iter()
        .map(|t| Keyword::parse(t).expect("non-empty fixture keyword"))
        .collect()
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Trend row fixtures.
pub mod trends_fixtures {
    use super::*;

    /// `days` consecutive daily rows for `keyword` starting at `start`.
    ///
    /// Interest follows a deterministic saw-tooth so different keywords can be
    /// told apart by their `offset`.
    pub fn daily_rows(keyword: &str, start: NaiveDate, days: u32, offset: u32) -> Vec<TrendsRow> {
        let keyword = Keyword::parse(keyword).expect("non-empty fixture keyword");
        (0..days)
            .map(|i| {
                TrendsRow::new(
                    start + Duration::days(i64::from(i)),
                    keyword.clone(),
                    (offset + i * 7) % 101,
                )
            })
            .collect()
    }

    /// Daily rows for every keyword in `terms`, sharing one date axis.
    pub fn batch_rows(terms: &[&str], start: NaiveDate, days: u32) -> Vec<TrendsRow> {
        terms
            .iter()
            .zip(0u32..)
            .flat_map(|(term, i)| daily_rows(term, start, days, i * 13))
            .collect()
    }

    /// A CSV upload with a `Keywords` column and a distractor column.
    pub fn keyword_csv(terms: &[&str]) -> Vec<u8> {
        let mut out = String::from("Keywords,Volume\n");
        for (i, term) in terms.iter().enumerate() {
            out.push_str(&format!("{term},{}\n", i * 100));
        }
        out.into_bytes()
    }
}
