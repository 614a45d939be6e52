//! Outbound collaborators the dispatcher talks to.
//!
//! The core never touches a UI toolkit directly; hosts implement these traits
//! (a browser bridge, a terminal view, a recording fake in tests).
use crate::chart::figure::Figure;
use crate::errors::PlotError;
use crate::table::TableData;

/// Status and result surface of the host UI.
pub trait PresentationPort: Send {
    /// Clears all result panes before a new run.
    fn reset_results(&mut self);
    /// Replaces the progress/status line.
    fn set_status(&mut self, text: &str);
    /// Shows or hides the busy indicator.
    fn set_busy(&mut self, busy: bool);
    /// Enables or disables the submit affordance.
    fn set_submit_enabled(&mut self, enabled: bool);
    fn show_sql(&mut self, sql: &str);
    /// Replaces the results table. An empty table should render a "no data"
    /// placeholder.
    fn show_table(&mut self, table: &TableData);
    /// Publishes the recommended chart kind.
    fn show_recommendation(&mut self, kind: &str);
    /// Replaces the chart pane with a placeholder message.
    fn show_chart_placeholder(&mut self, placeholder: &ChartPlaceholder);
    /// Replaces the insight pane with already-sanitized HTML.
    fn show_insight(&mut self, html: &str);
    /// Terminal success message.
    fn show_done(&mut self, message: &str);
    /// Terminal failure message.
    fn show_error(&mut self, message: &str);
}

/// External plotting library.
pub trait PlotRenderer: Send {
    /// Draws `figure`, replacing whatever was drawn before.
    fn react(&mut self, figure: &Figure) -> Result<(), PlotError>;
}

/// What the chart pane shows instead of a plot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartPlaceholder {
    /// The pipeline did not request a chart.
    NoVisualization,
    /// The descriptor could not be used.
    InvalidData,
    /// The plotting library rejected the figure.
    RenderFailed(String),
}

impl ChartPlaceholder {
    /// Message shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::NoVisualization => "No visualization available.".to_string(),
            Self::InvalidData => "Invalid chart data format.".to_string(),
            Self::RenderFailed(err) => format!("Error rendering chart: {err}"),
        }
    }

    /// True for placeholders that report a problem rather than an absence.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::NoVisualization)
    }
}
