//! Chart model built from a combined trends table

use crate::figure::PlotlyFigure;
use chrono::NaiveDate;
use kwtrends_config::ChartConfig;
use kwtrends_data::CombinedTable;
use serde::{Deserialize, Serialize};

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);

    /// Parse `#rrggbb`; anything else yields black.
    pub fn parse(value: &str) -> Self {
        if let Some(hex) = value.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                if let (Ok(r), Ok(g), Ok(b)) = (
                    u8::from_str_radix(&hex[0..2], 16),
                    u8::from_str_radix(&hex[2..4], 16),
                    u8::from_str_radix(&hex[4..6], 16),
                ) {
                    return Self(r, g, b);
                }
            }
        }
        Self::BLACK
    }

    /// `#rrggbb` in lowercase.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Mix towards white by `amount` (0.0 keeps the color, 1.0 gives white).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn tint(self, amount: f64) -> Self {
        let mix = |c: u8| (f64::from(c) + (255.0 - f64::from(c)) * amount).round() as u8;
        Self(mix(self.0), mix(self.1), mix(self.2))
    }
}

/// Color of the series at `index`.
///
/// The palette is used in order; past its end every further round reuses it
/// tinted a little lighter, so colors stay distinct and stable per position.
pub fn series_color(palette: &[Rgb], index: usize) -> Rgb {
    if palette.is_empty() {
        return Rgb::BLACK;
    }
    let base = palette[index % palette.len()];
    let round = index / palette.len();
    if round == 0 {
        base
    } else {
        #[allow(clippy::cast_precision_loss)]
        let round = round as f64;
        base.tint(0.6 * round / (round + 1.0))
    }
}

/// One line of the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub color: Rgb,
    pub points: Vec<(NaiveDate, u32)>,
}

/// Everything needed to draw the trends chart, independent of output format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartModel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub background: Rgb,
    pub show_grid: bool,
    pub series: Vec<Series>,
}

impl ChartModel {
    /// One series per keyword, colored in keyword order.
    pub fn from_table(table: &CombinedTable, config: &ChartConfig) -> Self {
        let palette: Vec<Rgb> = config.colors.iter().map(|c| Rgb::parse(c)).collect();
        let series = table
            .keywords()
            .iter()
            .enumerate()
            .map(|(i, keyword)| Series {
                name: keyword.as_str().to_string(),
                color: series_color(&palette, i),
                points: table.series(keyword),
            })
            .collect();

        Self {
            title: config.title.clone(),
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
            background: Rgb::parse(&config.background),
            show_grid: config.show_grid,
            series,
        }
    }

    /// Whether there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// First and last date over all series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.series.iter().flat_map(|s| s.points.iter().map(|(d, _)| *d));
        let (min, max) = dates.fold((None, None), |(min, max): (Option<NaiveDate>, Option<NaiveDate>), d| {
            (
                Some(min.map_or(d, |m| m.min(d))),
                Some(max.map_or(d, |m| m.max(d))),
            )
        });
        min.zip(max)
    }

    /// Highest value over all series.
    pub fn max_value(&self) -> Option<u32> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|(_, v)| *v))
            .max()
    }
}

/// Turns combined tables into chart models and interactive figures.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    pub const fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Chart model for `table`.
    pub fn render(&self, table: &CombinedTable) -> ChartModel {
        ChartModel::from_table(table, &self.config)
    }

    /// Interactive figure for `table`.
    pub fn interactive(&self, table: &CombinedTable) -> PlotlyFigure {
        PlotlyFigure::from_chart(&self.render(table))
    }
}
