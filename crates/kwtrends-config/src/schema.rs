//! Configuration schema definitions using serde.

use kwtrends_common::{LoggingConfig, QueryParams, TrendsError};
use serde::{Deserialize, Serialize};

/// Largest number of terms the provider compares in one query.
pub const MAX_BATCH_SIZE: usize = 5;

/// Main configuration structure for kwtrends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trends provider configuration.
    pub provider: ProviderConfig,
    /// Keyword batching configuration.
    pub batching: BatchingConfig,
    /// Chart configuration.
    pub chart: ChartConfig,
    /// Export configuration.
    pub export: ExportConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Trends provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the trends service.
    pub base_url: String,
    /// Timeframe expression sent with every query.
    pub timeframe: String,
    /// Geography code; empty means worldwide.
    pub geo: String,
    /// Host language.
    pub language: String,
    /// Timezone offset in minutes.
    pub tz_offset: i32,
    /// Search category, 0 for all categories.
    pub category: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Minimum spacing between two provider requests, in seconds.
    pub request_interval_seconds: u64,
    /// User agent sent to the provider.
    pub user_agent: String,
}

impl ProviderConfig {
    /// The query parameters that identify a provider request.
    pub fn query_params(&self) -> QueryParams {
        QueryParams {
            timeframe: self.timeframe.clone(),
            geo: self.geo.clone(),
            language: self.language.clone(),
            tz_offset: self.tz_offset,
        }
    }
}

/// Keyword batching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingConfig {
    /// Keywords per provider query.
    pub batch_size: usize,
}

/// Chart configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Chart title.
    pub title: String,
    /// X axis title.
    pub x_label: String,
    /// Y axis title.
    pub y_label: String,
    /// Series palette as `#rrggbb`, assigned in keyword order.
    pub colors: Vec<String>,
    /// Background color as `#rrggbb`.
    pub background: String,
    /// Whether to draw grid lines in the PNG snapshot.
    pub show_grid: bool,
}

/// CSV column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvLayout {
    /// One row per date, one column per keyword.
    Wide,
    /// One row per (date, keyword, interest).
    Long,
}

impl std::str::FromStr for CsvLayout {
    type Err = TrendsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wide" => Ok(Self::Wide),
            "long" => Ok(Self::Long),
            other => Err(TrendsError::validation_field(
                format!("unknown CSV layout '{other}' (expected wide or long)"),
                "export.csv_layout",
            )),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// CSV column layout.
    pub csv_layout: CsvLayout,
    /// PNG width in pixels.
    pub png_width: u32,
    /// PNG height in pixels.
    pub png_height: u32,
    /// File name of the CSV download.
    pub csv_file_name: String,
    /// File name of the PNG download.
    pub png_file_name: String,
    /// File name of the chart figure JSON.
    pub chart_file_name: String,
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TrendsError> {
        let batch_size = self.batching.batch_size;
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(TrendsError::validation_field(
                format!("batch size must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"),
                "batching.batch_size",
            ));
        }

        if self.provider.timeframe.trim().is_empty() {
            return Err(TrendsError::validation_field(
                "timeframe cannot be empty",
                "provider.timeframe",
            ));
        }

        if !self.provider.base_url.starts_with("http://") && !self.provider.base_url.starts_with("https://") {
            return Err(TrendsError::validation_field(
                format!("base URL must be http(s), got '{}'", self.provider.base_url),
                "provider.base_url",
            ));
        }

        if self.provider.timeout_seconds == 0 {
            return Err(TrendsError::validation_field(
                "timeout must be greater than 0",
                "provider.timeout_seconds",
            ));
        }

        if self.export.png_width == 0 || self.export.png_height == 0 {
            return Err(TrendsError::validation_field(
                "PNG dimensions must be greater than 0",
                "export.png_width",
            ));
        }

        if self.chart.colors.is_empty() {
            return Err(TrendsError::validation_field(
                "chart palette cannot be empty",
                "chart.colors",
            ));
        }

        for color in self.chart.colors.iter().chain(std::iter::once(&self.chart.background)) {
            if !is_hex_color(color) {
                return Err(TrendsError::validation_field(
                    format!("'{color}' is not a #rrggbb color"),
                    "chart.colors",
                ));
            }
        }

        Ok(())
    }
}

/// Whether `value` looks like `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
