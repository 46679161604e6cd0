//! Default values for every configuration section.

use crate::schema::*;

/// Plotly's qualitative palette, the colors the charts have always used.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trends.google.com".to_string(),
            timeframe: "today 3-m".to_string(),
            geo: "DE".to_string(),
            language: "de-DE".to_string(),
            tz_offset: 60,
            category: 0,
            timeout_seconds: 30,
            request_interval_seconds: 10,
            user_agent: concat!("kwtrends/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Google Trends Data".to_string(),
            x_label: "Date".to_string(),
            y_label: "Search Interest".to_string(),
            colors: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            background: "#ffffff".to_string(),
            show_grid: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_layout: CsvLayout::Wide,
            png_width: 1200,
            png_height: 600,
            csv_file_name: "google_trends_data.csv".to_string(),
            png_file_name: "google_trends_plot.png".to_string(),
            chart_file_name: "google_trends_chart.json".to_string(),
        }
    }
}
