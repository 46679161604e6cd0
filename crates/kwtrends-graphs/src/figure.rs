//! Interactive chart as a Plotly figure
//!
//! The figure is plain JSON (`data` + `layout`) that any Plotly front end can
//! render directly, with a unified hover across all lines for a date.

use crate::chart::ChartModel;
use kwtrends_common::{Result, TrendsError};
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotlyFigure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// A line trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<u32>,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub showgrid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub hovermode: String,
    pub showlegend: bool,
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
}

impl PlotlyFigure {
    /// Build the figure for `chart`; an empty chart gives a figure without traces.
    pub fn from_chart(chart: &ChartModel) -> Self {
        let data = chart
            .series
            .iter()
            .map(|series| Trace {
                kind: "scatter".to_string(),
                mode: "lines".to_string(),
                name: series.name.clone(),
                x: series
                    .points
                    .iter()
                    .map(|(date, _)| date.format(DATE_FORMAT).to_string())
                    .collect(),
                y: series.points.iter().map(|(_, v)| *v).collect(),
                line: Line {
                    color: series.color.to_hex(),
                },
            })
            .collect();

        let background = chart.background.to_hex();
        Self {
            data,
            layout: Layout {
                title: Title {
                    text: chart.title.clone(),
                },
                xaxis: Axis {
                    title: Title {
                        text: chart.x_label.clone(),
                    },
                    kind: Some("date".to_string()),
                    showgrid: chart.show_grid,
                },
                yaxis: Axis {
                    title: Title {
                        text: chart.y_label.clone(),
                    },
                    kind: None,
                    showgrid: chart.show_grid,
                },
                hovermode: "x unified".to_string(),
                showlegend: true,
                plot_bgcolor: background.clone(),
                paper_bgcolor: background,
            },
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(TrendsError::from)
    }

    /// Pretty-printed JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(TrendsError::from)
    }
}
