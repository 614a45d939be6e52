//! Declarative plot description handed to a `PlotRenderer`.
//!
//! Field names follow Plotly's `react(data, layout, config)` contract so a
//! `Figure` can be serialized straight into a browser call.
use serde::Serialize;

/// Everything one render call needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
    pub config: PlotConfig,
}

impl Figure {
    /// JSON form of the figure.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Trace {
    Pie(PieTrace),
    Cartesian(CartesianTrace),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub textinfo: &'static str,
    pub hoverinfo: &'static str,
    pub insidetextfont: Font,
    pub marker: PieMarker,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieMarker {
    pub colors: Vec<String>,
    pub line: Line,
}

/// Axis data: category labels on one axis, numbers on the other.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisData {
    Labels(Vec<String>),
    Values(Vec<Option<f64>>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartesianTrace {
    #[serde(rename = "type")]
    pub trace_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    pub name: String,
    pub x: AxisData,
    pub y: AxisData,
    /// `"v"` or `"h"`.
    pub orientation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<&'static str>,
    pub marker: BarMarker,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BarMarker {
    pub color: String,
    pub line: Line,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Font {
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    pub gridcolor: String,
    pub zerolinecolor: String,
    pub automargin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
    pub font: Font,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis2: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<Axis>,
    pub hovermode: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlotConfig {
    pub responsive: bool,
    #[serde(rename = "displayModeBar")]
    pub display_mode_bar: bool,
    pub displaylogo: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            responsive: true,
            display_mode_bar: false,
            displaylogo: false,
        }
    }
}
