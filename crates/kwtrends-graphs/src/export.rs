//! Download formats: CSV table, PNG snapshot and chart figure JSON

use crate::chart::ChartModel;
use crate::figure::PlotlyFigure;
use crate::renderer::PngRenderer;
use kwtrends_common::{Result, TrendsError};
use kwtrends_config::{CsvLayout, ExportConfig};
use kwtrends_data::CombinedTable;
use tracing::{debug, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serializes a [`CombinedTable`] as CSV.
///
/// The output depends only on the table, so repeated calls give identical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvExporter {
    layout: CsvLayout,
}

impl CsvExporter {
    pub const fn new(layout: CsvLayout) -> Self {
        Self { layout }
    }

    pub const fn layout(&self) -> CsvLayout {
        self.layout
    }

    /// CSV bytes for `table`: `date` plus one column per keyword (wide), or
    /// `date,keyword,interest` rows (long). Missing wide cells are left empty.
    /// In the wide layout the date column is renamed `date_` when a keyword
    /// is itself called `date`.
    #[instrument(skip_all, fields(layout = ?self.layout, cells = table.len()))]
    pub fn to_bytes(&self, table: &CombinedTable) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        match self.layout {
            CsvLayout::Wide => {
                let date_column = date_header(table);
                let header = std::iter::once(date_column.as_str())
                    .chain(table.keywords().iter().map(|k| k.as_str()));
                writer.write_record(header).map_err(csv_error)?;

                for date in table.dates() {
                    let mut record = vec![date.format(DATE_FORMAT).to_string()];
                    record.extend(
                        table
                            .row(date)
                            .into_iter()
                            .map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()),
                    );
                    writer.write_record(&record).map_err(csv_error)?;
                }
            }
            CsvLayout::Long => {
                writer
                    .write_record(["date", "keyword", "interest"])
                    .map_err(csv_error)?;
                for row in table.rows() {
                    writer
                        .write_record([
                            row.date.format(DATE_FORMAT).to_string(),
                            row.keyword.into_inner(),
                            row.interest.to_string(),
                        ])
                        .map_err(csv_error)?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| TrendsError::export_with_source("could not finish CSV", e.into_error()))?;
        debug!("Wrote {} CSV bytes", bytes.len());
        Ok(bytes)
    }
}

/// `date`, suffixed with `_` until no keyword column has the same name.
fn date_header(table: &CombinedTable) -> String {
    let mut name = String::from("date");
    while table.keywords().iter().any(|k| k.as_str() == name) {
        name.push('_');
    }
    name
}

fn csv_error(e: csv::Error) -> TrendsError {
    TrendsError::export_with_source("could not write CSV", e)
}

/// All downloadable artifacts of an analysis
#[derive(Debug, Clone)]
pub struct Exporter {
    csv: CsvExporter,
    png: PngRenderer,
}

impl Exporter {
    pub const fn new(export: &ExportConfig) -> Self {
        Self {
            csv: CsvExporter::new(export.csv_layout),
            png: PngRenderer::from_config(export),
        }
    }

    /// CSV bytes of the table.
    pub fn csv(&self, table: &CombinedTable) -> Result<Vec<u8>> {
        self.csv.to_bytes(table)
    }

    /// PNG snapshot of the chart.
    pub fn png(&self, chart: &ChartModel) -> Result<Vec<u8>> {
        self.png.render(chart)
    }

    /// Plotly figure JSON of the chart.
    pub fn chart_json(&self, chart: &ChartModel) -> Result<Vec<u8>> {
        PlotlyFigure::from_chart(chart).to_json_bytes()
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(&ExportConfig::default())
    }
}
