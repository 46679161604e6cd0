//! Keyword extraction from uploaded CSV files and spreadsheets.

use calamine::Reader;
use kwtrends_common::{Keyword, Result, TrendsError};
use std::collections::HashSet;
use std::io::Cursor;
use tracing::{debug, info, instrument};

/// Name of the column keywords are read from.
pub const KEYWORD_COLUMN: &str = "Keywords";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const UTF8_BOM: char = '\u{feff}';

/// Tabular formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma separated text.
    Csv,
    /// `.xlsx`, `.xls` or `.ods` workbook; the first sheet is read.
    Workbook,
}

impl InputFormat {
    /// Detect the format from the leading bytes of the upload.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE2_MAGIC) {
            Self::Workbook
        } else {
            Self::Csv
        }
    }
}

/// Header row plus data rows, every cell as text.
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Reads the keyword column out of an uploaded table.
#[derive(Debug, Clone)]
pub struct KeywordLoader {
    column: String,
}

impl KeywordLoader {
    /// Loader reading the `Keywords` column.
    pub fn new() -> Self {
        Self::with_column(KEYWORD_COLUMN)
    }

    /// Loader reading a differently named column. Matching is case-sensitive.
    pub fn with_column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// Column this loader reads.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Parse `bytes` and return the trimmed, de-duplicated keywords in file
    /// order. The first occurrence of a repeated keyword wins.
    #[instrument(skip(self, bytes), fields(len = bytes.len(), column = %self.column))]
    pub fn load(&self, bytes: &[u8]) -> Result<Vec<Keyword>> {
        let format = InputFormat::detect(bytes);
        debug!(?format, "Detected upload format");

        let table = match format {
            InputFormat::Csv => read_csv(bytes)?,
            InputFormat::Workbook => read_workbook(bytes)?,
        };

        let keywords = self.extract(&table)?;
        info!("Loaded {} keywords", keywords.len());
        Ok(keywords)
    }

    fn extract(&self, table: &RawTable) -> Result<Vec<Keyword>> {
        let index = table
            .headers
            .iter()
            .position(|h| h == &self.column)
            .ok_or_else(|| TrendsError::missing_column(&self.column, table.headers.clone()))?;

        let mut seen = HashSet::new();
        let keywords: Vec<Keyword> = table
            .rows
            .iter()
            .filter_map(|row| row.get(index))
            .filter_map(|cell| Keyword::parse(cell))
            .filter(|keyword| seen.insert(keyword.clone()))
            .collect();

        if keywords.is_empty() {
            return Err(TrendsError::empty_input(&self.column));
        }

        Ok(keywords)
    }
}

impl Default for KeywordLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| TrendsError::input_with_source("could not read CSV header", e))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h };
            h.to_string()
        })
        .collect();

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| TrendsError::input_with_source("could not read CSV row", e))
        })
        .collect::<Result<Vec<Vec<String>>>>()?;

    Ok(RawTable { headers, rows })
}

fn read_workbook(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| TrendsError::input_with_source("could not open workbook", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TrendsError::input("workbook contains no sheets"))?
        .map_err(|e| TrendsError::input_with_source("could not read first sheet", e))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect::<Vec<String>>());

    Ok(RawTable {
        headers: rows.next().unwrap_or_default(),
        rows: rows.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(keywords: &[Keyword]) -> Vec<&str> {
        keywords.iter().map(Keyword::as_str).collect()
    }

    #[test]
    fn test_reads_keyword_column_only() {
        let csv = b"Volume,Keywords,Notes\n10,cats,a\n20,dogs,b\n";
        let keywords = KeywordLoader::new().load(csv).unwrap();
        assert_eq!(terms(&keywords), vec!["cats", "dogs"]);
    }

    #[test]
    fn test_trims_skips_blanks_and_dedups() {
        let csv = b"Keywords\n  cats \n\n   \ndogs\ncats\n dogs\nbirds\n";
        let keywords = KeywordLoader::new().load(csv).unwrap();
        assert_eq!(terms(&keywords), vec!["cats", "dogs", "birds"]);
    }

    #[test]
    fn test_column_match_is_case_sensitive() {
        let err = KeywordLoader::new().load(b"keywords\ncats\n").unwrap_err();
        match err {
            TrendsError::MissingColumn { column, found } => {
                assert_eq!(column, "Keywords");
                assert_eq!(found, vec!["keywords".to_string()]);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_column_is_empty_input() {
        let err = KeywordLoader::new().load(b"Keywords,Other\n ,1\n,2\n").unwrap_err();
        assert!(matches!(err, TrendsError::EmptyInput { .. }));
    }

    #[test]
    fn test_header_only_is_empty_input() {
        let err = KeywordLoader::new().load(b"Keywords\n").unwrap_err();
        assert!(matches!(err, TrendsError::EmptyInput { .. }));
    }

    #[test]
    fn test_ragged_rows_are_tolerated() {
        let csv = b"Id,Keywords\n1\n2,cats\n3,dogs,extra\n";
        let keywords = KeywordLoader::new().load(csv).unwrap();
        assert_eq!(terms(&keywords), vec!["cats", "dogs"]);
    }

    #[test]
    fn test_utf8_bom_is_ignored() {
        let csv = "\u{feff}Keywords\nkatzen\n".as_bytes();
        let keywords = KeywordLoader::new().load(csv).unwrap();
        assert_eq!(terms(&keywords), vec!["katzen"]);
    }

    #[test]
    fn test_quoted_keywords_with_commas() {
        let csv = b"Keywords\n\"rust, the language\"\n";
        let keywords = KeywordLoader::new().load(csv).unwrap();
        assert_eq!(terms(&keywords), vec!["rust, the language"]);
    }

    #[test]
    fn test_custom_column() {
        let loader = KeywordLoader::with_column("Terms");
        assert_eq!(loader.column(), "Terms");
        let keywords = loader.load(b"Terms\nx\n").unwrap();
        assert_eq!(terms(&keywords), vec!["x"]);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(InputFormat::detect(b"Keywords\ncats"), InputFormat::Csv);
        assert_eq!(InputFormat::detect(b"PK\x03\x04rest"), InputFormat::Workbook);
        assert_eq!(InputFormat::detect(OLE2_MAGIC), InputFormat::Workbook);
        assert_eq!(InputFormat::detect(b""), InputFormat::Csv);
    }

    #[test]
    fn test_corrupt_workbook_is_input_error() {
        let err = KeywordLoader::new().load(b"PK\x03\x04not really a zip").unwrap_err();
        assert!(matches!(err, TrendsError::Input { .. }));
        assert!(err.is_input_error());
    }
}
