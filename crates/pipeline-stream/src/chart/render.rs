use tracing::{debug, warn};

use super::figure::{
    Axis, AxisData, BarMarker, CartesianTrace, Figure, Font, Layout, Line, PieMarker, PieTrace,
    PlotConfig, Title, Trace,
};
use super::normalize::{ChartDescriptor, ChartKind, NormalizedChart, Orientation, Series};
use crate::ports::{ChartPlaceholder, PlotRenderer};

/// Tableau 10 qualitative palette.
pub const PALETTE: [&str; 10] = [
    "#4E79A7", "#F28E2B", "#E15759", "#76B7B2", "#59A14F", "#EDC948", "#B07AA1", "#FF9DA7",
    "#9C755F", "#BAB0AC",
];

/// Outcome of one render attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartOutcome {
    /// The plotting collaborator accepted the figure.
    Plotted,
    /// Nothing was plotted; show this instead.
    Placeholder(ChartPlaceholder),
}

/// Maps normalized charts onto plotting calls.
#[derive(Clone, Debug, Default)]
pub struct ChartRenderAdapter {
    config: PlotConfig,
}

impl ChartRenderAdapter {
    /// Creates an adapter with the given plot config.
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    /// Renders `chart`, making at most one call to `plotter`.
    ///
    /// Plotting errors are contained and reported as a placeholder.
    pub fn render(&self, chart: &NormalizedChart, plotter: &mut dyn PlotRenderer) -> ChartOutcome {
        let descriptor = match chart {
            NormalizedChart::Empty => {
                return ChartOutcome::Placeholder(ChartPlaceholder::NoVisualization);
            }
            NormalizedChart::Invalid(reason) => {
                warn!(%reason, "chart descriptor rejected");
                return ChartOutcome::Placeholder(ChartPlaceholder::InvalidData);
            }
            NormalizedChart::Chart(descriptor) => descriptor,
        };

        let figure = self.build_figure(descriptor);
        match plotter.react(&figure) {
            Ok(()) => {
                debug!(traces = figure.data.len(), "chart rendered");
                ChartOutcome::Plotted
            }
            Err(err) => {
                warn!(error = %err, "plotting failed");
                ChartOutcome::Placeholder(ChartPlaceholder::RenderFailed(err.to_string()))
            }
        }
    }

    /// Builds the figure for a descriptor without rendering it.
    pub fn build_figure(&self, chart: &ChartDescriptor) -> Figure {
        let data = match chart.kind {
            ChartKind::Pie => vec![pie_trace(chart)],
            _ => chart
                .series
                .iter()
                .enumerate()
                .map(|(idx, series)| cartesian_trace(chart, idx, series))
                .collect(),
        };

        let secondary = data.iter().any(|t| {
            matches!(t, Trace::Cartesian(c) if c.xaxis.is_some() || c.yaxis.is_some())
        });
        let (xaxis2, yaxis2) = match (secondary, chart.orientation) {
            (false, _) => (None, None),
            (true, Orientation::Horizontal) => (Some(overlay_axis("x", "top")), None),
            (true, Orientation::Vertical) => (None, Some(overlay_axis("y", "right"))),
        };

        Figure {
            data,
            layout: Layout {
                title: Title {
                    text: chart.title.clone(),
                },
                paper_bgcolor: "rgba(17,17,17,0.8)".into(),
                plot_bgcolor: "rgba(24,24,24,0.35)".into(),
                font: Font {
                    color: "#EAEAEA".into(),
                },
                xaxis: base_axis(),
                yaxis: base_axis(),
                xaxis2,
                yaxis2,
                hovermode: "closest",
            },
            config: self.config.clone(),
        }
    }
}

fn pie_trace(chart: &ChartDescriptor) -> Trace {
    let values = chart
        .series
        .first()
        .map(|s| s.values.clone())
        .unwrap_or_default();
    let slices = chart.labels.len().max(values.len());
    Trace::Pie(PieTrace {
        trace_type: "pie",
        labels: chart.labels.clone(),
        values,
        textinfo: "label+percent",
        hoverinfo: "label+percent+value",
        insidetextfont: Font {
            color: "#FAFAFA".into(),
        },
        marker: PieMarker {
            colors: (0..slices).map(palette_color).collect(),
            line: Line {
                color: "#1f2937".into(),
                width: 2.0,
            },
        },
    })
}

fn cartesian_trace(chart: &ChartDescriptor, idx: usize, series: &Series) -> Trace {
    let labels = AxisData::Labels(chart.labels.clone());
    let values = AxisData::Values(series.values.clone());
    let secondary = is_count_series(&series.label);
    let (x, y, orientation, xaxis, yaxis) = match chart.orientation {
        Orientation::Vertical => (labels, values, "v", None, secondary.then_some("y2")),
        Orientation::Horizontal => (values, labels, "h", secondary.then_some("x2"), None),
    };
    let (trace_type, mode) = match &chart.kind {
        ChartKind::Line => ("scatter".to_string(), Some("lines+markers")),
        ChartKind::Scatter => ("scatter".to_string(), Some("markers")),
        other => (other.name().to_string(), None),
    };
    Trace::Cartesian(CartesianTrace {
        trace_type,
        mode,
        name: series.label.clone(),
        x,
        y,
        orientation,
        xaxis,
        yaxis,
        marker: BarMarker {
            color: palette_color(idx),
            line: Line {
                color: "rgba(255,255,255,0.15)".into(),
                width: 1.5,
            },
            opacity: 0.9,
        },
    })
}

/// Series that count things are drawn against their own overlaid axis.
fn is_count_series(label: &str) -> bool {
    label.to_ascii_lowercase().contains("count")
}

fn palette_color(idx: usize) -> String {
    PALETTE[idx % PALETTE.len()].to_string()
}

fn base_axis() -> Axis {
    Axis {
        gridcolor: "rgba(255,255,255,0.06)".into(),
        zerolinecolor: "rgba(255,255,255,0.1)".into(),
        automargin: true,
        overlaying: None,
        side: None,
    }
}

fn overlay_axis(overlaying: &'static str, side: &'static str) -> Axis {
    Axis {
        overlaying: Some(overlaying),
        side: Some(side),
        ..base_axis()
    }
}
