//! Domain types shared across the workspace.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trimmed, non-empty search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    /// Trims `raw` and returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The keyword text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the keyword and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An ordered group of keywords sent together in one provider query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Batch {
    keywords: Vec<Keyword>,
}

impl Batch {
    /// Creates a batch from keywords in query order.
    pub const fn new(keywords: Vec<Keyword>) -> Self {
        Self { keywords }
    }

    /// Keywords in query order.
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Keyword texts in query order.
    pub fn terms(&self) -> Vec<String> {
        self.keywords.iter().map(|k| k.as_str().to_string()).collect()
    }

    /// Number of keywords in the batch.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Whether the batch contains `keyword`.
    pub fn contains(&self, keyword: &Keyword) -> bool {
        self.keywords.contains(keyword)
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.terms().join(", "))
    }
}

/// Fixed parameters of every provider query in a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryParams {
    /// Provider timeframe expression, e.g. `today 3-m`.
    pub timeframe: String,
    /// Geography code, e.g. `DE`. Empty means worldwide.
    pub geo: String,
    /// Host language, e.g. `de-DE`.
    pub language: String,
    /// Timezone offset in minutes as the provider expects it.
    pub tz_offset: i32,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            timeframe: "today 3-m".to_string(),
            geo: "DE".to_string(),
            language: "de-DE".to_string(),
            tz_offset: 60,
        }
    }
}

/// One interest observation: a keyword's score on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrendsRow {
    /// Calendar date of the sample.
    pub date: NaiveDate,
    /// Keyword the score belongs to.
    pub keyword: Keyword,
    /// Normalized popularity, 0 to 100.
    pub interest: u32,
}

impl TrendsRow {
    /// Creates a row.
    pub const fn new(date: NaiveDate, keyword: Keyword, interest: u32) -> Self {
        Self {
            date,
            keyword,
            interest,
        }
    }
}
