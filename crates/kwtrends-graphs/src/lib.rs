//! Charting and export for kwtrends
//!
//! A [`ChartModel`] is built from the combined table; from it come the
//! interactive Plotly figure, the PNG snapshot and, next to the table, the CSV
//! download.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod chart;
pub mod export;
pub mod figure;
pub mod renderer;

pub use chart::{series_color, ChartModel, ChartRenderer, Rgb, Series};
pub use export::{CsvExporter, Exporter};
pub use figure::PlotlyFigure;
pub use renderer::PngRenderer;
