//! The combined result table of one analysis run.

use chrono::NaiveDate;
use kwtrends_common::{Batch, Keyword, TrendsRow};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Interest scores keyed by (date, keyword), merged across batches.
///
/// Keywords keep the order in which batches were merged. The date axis is the
/// union of every merged batch's dates. A (date, keyword) pair is stored at
/// most once: the first value merged wins, which also collapses sub-daily
/// provider samples to the first sample of each date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedTable {
    keywords: Vec<Keyword>,
    index: HashMap<Keyword, usize>,
    cells: BTreeMap<NaiveDate, BTreeMap<usize, u32>>,
}

impl CombinedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the rows fetched for `batch`. Returns the number of new cells.
    ///
    /// Rows for keywords outside the batch are ignored.
    pub fn merge_batch(&mut self, batch: &Batch, rows: &[TrendsRow]) -> usize {
        for keyword in batch.keywords() {
            if rows.iter().any(|row| &row.keyword == keyword) {
                self.register(keyword);
            }
        }

        let mut inserted = 0;
        for row in rows {
            if !batch.contains(&row.keyword) {
                debug!("Ignoring row for '{}' outside batch {}", row.keyword, batch);
                continue;
            }
            let Some(&column) = self.index.get(&row.keyword) else {
                continue;
            };
            let day = self.cells.entry(row.date).or_default();
            if let std::collections::btree_map::Entry::Vacant(slot) = day.entry(column) {
                slot.insert(row.interest);
                inserted += 1;
            }
        }

        inserted
    }

    fn register(&mut self, keyword: &Keyword) {
        if !self.index.contains_key(keyword) {
            self.index.insert(keyword.clone(), self.keywords.len());
            self.keywords.push(keyword.clone());
        }
    }

    /// Keywords with data, in merge order.
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.cells.keys().copied()
    }

    /// Interest of `keyword` on `date`.
    pub fn get(&self, date: NaiveDate, keyword: &Keyword) -> Option<u32> {
        let column = self.index.get(keyword)?;
        self.cells.get(&date)?.get(column).copied()
    }

    /// Date-ordered points of one keyword.
    pub fn series(&self, keyword: &Keyword) -> Vec<(NaiveDate, u32)> {
        let Some(column) = self.index.get(keyword) else {
            return Vec::new();
        };
        self.cells
            .iter()
            .filter_map(|(date, day)| day.get(column).map(|v| (*date, *v)))
            .collect()
    }

    /// Row values of `date` in keyword order; `None` marks a missing cell.
    pub fn row(&self, date: NaiveDate) -> Vec<Option<u32>> {
        let day = self.cells.get(&date);
        (0..self.keywords.len())
            .map(|column| day.and_then(|d| d.get(&column).copied()))
            .collect()
    }

    /// Every cell as a row, ordered by date then keyword order.
    pub fn rows(&self) -> Vec<TrendsRow> {
        self.cells
            .iter()
            .flat_map(|(date, day)| {
                day.iter()
                    .map(|(column, interest)| TrendsRow::new(*date, self.keywords[*column].clone(), *interest))
            })
            .collect()
    }

    /// First and last date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.cells.keys().next()?;
        let last = self.cells.keys().next_back()?;
        Some((*first, *last))
    }

    /// Highest interest in the table.
    pub fn max_interest(&self) -> Option<u32> {
        self.cells.values().flat_map(BTreeMap::values).copied().max()
    }

    /// Number of (date, keyword) cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
