//! Static PNG snapshot of the trends chart

use crate::chart::{ChartModel, Rgb};
use chrono::{Duration, NaiveDate};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use kwtrends_common::{Result, TrendsError};
use kwtrends_config::ExportConfig;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, instrument, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Draws a [`ChartModel`] with plotters and encodes it as PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngRenderer {
    width: u32,
    height: u32,
}

impl PngRenderer {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn from_config(export: &ExportConfig) -> Self {
        Self::new(export.png_width, export.png_height)
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render `chart` to PNG bytes. An empty chart yields axes and a title only.
    #[instrument(skip_all, fields(series = chart.series.len(), width = self.width, height = self.height))]
    pub fn render(&self, chart: &ChartModel) -> Result<Vec<u8>> {
        if self.width == 0 || self.height == 0 {
            return Err(TrendsError::graph("PNG dimensions must be non-zero"));
        }

        #[allow(clippy::cast_possible_truncation)]
        let mut pixels = vec![0u8; self.width as usize * self.height as usize * 3];

        // Text needs a system font; without one the chart is drawn unlabeled.
        if let Err(e) = self.draw(&mut pixels, chart, true) {
            warn!(error = ?e, "Rendering chart without text");
            pixels.fill(0);
            self.draw(&mut pixels, chart, false)?;
        }

        let png = encode_png(&pixels, self.width, self.height)?;
        debug!("Encoded {} byte PNG", png.len());
        Ok(png)
    }

    fn draw(&self, pixels: &mut [u8], chart: &ChartModel, labels: bool) -> Result<()> {
        let root = BitMapBackend::with_buffer(pixels, (self.width, self.height)).into_drawing_area();
        root.fill(&to_rgb(chart.background)).map_err(draw_error)?;
        draw_chart(&root, chart, labels)?;
        root.present().map_err(draw_error)
    }
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartModel,
    labels: bool,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (start, end) = chart
        .date_range()
        .unwrap_or_else(|| (NaiveDate::default(), NaiveDate::default()));
    let span = (end - start).num_days().max(1);
    let y_top = chart.max_value().unwrap_or(0).max(100) + 5;

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if labels {
        builder
            .caption(chart.title.as_str(), ("sans-serif", 24))
            .x_label_area_size(45)
            .y_label_area_size(55);
    }
    let mut ctx = builder
        .build_cartesian_2d(0i64..span, 0u32..y_top)
        .map_err(draw_error)?;

    // Label counts also drive tick computation and must stay positive.
    let format_date = |offset: &i64| (start + Duration::days(*offset)).format(DATE_FORMAT).to_string();
    let blank = |_: &i64| String::new();
    let format_x: &dyn Fn(&i64) -> String = if chart.is_empty() { &blank } else { &format_date };

    let mut mesh = ctx.configure_mesh();
    mesh.x_labels(8).y_labels(6);
    if !chart.show_grid {
        mesh.disable_mesh();
    }
    if labels {
        mesh.x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_label_formatter(format_x);
    } else {
        mesh.disable_axes();
    }
    mesh.draw().map_err(draw_error)?;

    for series in &chart.series {
        let color = to_rgb(series.color);
        let points = series
            .points
            .iter()
            .map(|(date, value)| ((*date - start).num_days(), *value));
        let drawn = ctx
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(draw_error)?;
        if labels {
            drawn
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(2)));
        }
    }

    if labels && !chart.series.is_empty() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_error)?;
    }

    Ok(())
}

const fn to_rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn draw_error<E: std::error::Error + Send + Sync + 'static>(e: DrawingAreaErrorKind<E>) -> TrendsError {
    TrendsError::graph_with_source("chart drawing failed", e)
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(pixels, width, height, ColorType::Rgb8)
        .map_err(|e| TrendsError::export_with_source("could not encode PNG", e))?;
    Ok(out)
}
