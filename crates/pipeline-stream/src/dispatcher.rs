use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chart::{ChartOutcome, ChartRenderAdapter, normalize};
use crate::config::StatusMessages;
use crate::errors::{ClientError, RunFailure};
use crate::event::{StagePayload, StreamEvent};
use crate::markdown::{MarkdownToHtml, PulldownMarkdownRenderer, escape_text};
use crate::ports::{PlotRenderer, PresentationPort};

/// Lifecycle of one submission.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed(RunFailure),
}

impl RunState {
    /// True for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// Last status projected to the presentation surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineStatus {
    pub text: String,
    pub busy: bool,
}

/// Interprets stream events and drives the presentation port.
///
/// Events are handled strictly in arrival order. Once a run reaches a
/// terminal state every further event is dropped until `begin` starts a new
/// run.
pub struct EventDispatcher<P, R> {
    port: P,
    plotter: R,
    markdown: Arc<dyn MarkdownToHtml>,
    charts: ChartRenderAdapter,
    messages: StatusMessages,
    state: RunState,
    status: PipelineStatus,
    run_id: Option<uuid::Uuid>,
}

impl<P: PresentationPort, R: PlotRenderer> EventDispatcher<P, R> {
    /// Creates an idle dispatcher with the default markdown renderer and
    /// status texts.
    pub fn new(port: P, plotter: R) -> Self {
        Self {
            port,
            plotter,
            markdown: Arc::new(PulldownMarkdownRenderer),
            charts: ChartRenderAdapter::default(),
            messages: StatusMessages::default(),
            state: RunState::Idle,
            status: PipelineStatus::default(),
            run_id: None,
        }
    }

    /// Replaces the markdown renderer used for insights.
    pub fn with_markdown(mut self, markdown: Arc<dyn MarkdownToHtml>) -> Self {
        self.markdown = markdown;
        self
    }

    /// Replaces the status texts.
    pub fn with_status_messages(mut self, messages: StatusMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Replaces the chart adapter.
    pub fn with_chart_adapter(mut self, charts: ChartRenderAdapter) -> Self {
        self.charts = charts;
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn status(&self) -> &PipelineStatus {
        &self.status
    }

    pub fn run_id(&self) -> Option<uuid::Uuid> {
        self.run_id
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn plotter(&self) -> &R {
        &self.plotter
    }

    /// Consumes the dispatcher and returns its collaborators.
    pub fn into_parts(self) -> (P, R) {
        (self.port, self.plotter)
    }

    /// Starts a new run.
    ///
    /// Callers must not submit while a run is in flight; doing so is rejected
    /// with `ClientError::Busy` and leaves the current run untouched.
    pub fn begin(&mut self, run_id: uuid::Uuid) -> Result<(), ClientError> {
        if self.state == RunState::Running {
            return Err(ClientError::Busy);
        }
        info!(%run_id, "run started");
        self.run_id = Some(run_id);
        self.state = RunState::Running;
        self.port.reset_results();
        self.port.set_submit_enabled(false);
        self.set_busy(true);
        let thinking = self.messages.thinking.clone();
        self.set_status(&thinking);
        Ok(())
    }

    /// Handles one event and returns the resulting state.
    pub fn dispatch(&mut self, event: StreamEvent) -> &RunState {
        if self.state != RunState::Running {
            debug!(stage = %event.stage, state = ?self.state, "event ignored outside a running run");
            return &self.state;
        }
        debug!(run_id = ?self.run_id, stage = %event.stage, "dispatching event");

        match event.payload {
            StagePayload::ValidateQuestion {
                error: Some(message),
            }
            | StagePayload::ValidateSql {
                error: Some(message),
                ..
            } => {
                self.finish_failed(
                    RunFailure::Validation {
                        message: message.clone(),
                    },
                    message,
                );
            }
            StagePayload::ValidateQuestion { error: None } => {}
            StagePayload::ValidateSql { validated_sql, error: None } => {
                let text = self.messages.validate_sql.clone();
                self.set_status(&text);
                if let Some(sql) = validated_sql {
                    self.port.show_sql(&sql);
                }
            }
            StagePayload::ExecuteSql { table, error } => {
                if let Some(error) = error {
                    warn!(%error, "query execution reported an error");
                }
                let text = self.messages.execute_sql.clone();
                self.set_status(&text);
                self.port.show_table(&table);
            }
            StagePayload::Visualizer { visualization } => {
                let text = self.messages.visualizer.clone();
                self.set_status(&text);
                self.port
                    .show_recommendation(visualization.as_deref().unwrap_or("none"));
            }
            StagePayload::Formatter { descriptor } => {
                let text = self.messages.formatter.clone();
                self.set_status(&text);
                let chart = normalize(&descriptor);
                if let ChartOutcome::Placeholder(placeholder) =
                    self.charts.render(&chart, &mut self.plotter)
                {
                    self.port.show_chart_placeholder(&placeholder);
                }
            }
            StagePayload::Insight { markdown } => {
                let text = self.messages.insight.clone();
                self.set_status(&text);
                let html = self.markdown.render(&markdown).unwrap_or_else(|err| {
                    warn!(error = %err, "insight markdown failed to render");
                    format!("<p>{}</p>", escape_text(&markdown))
                });
                self.port.show_insight(&html);
            }
            StagePayload::End => self.finish_completed(),
            StagePayload::Error { message } => {
                let text = format!("{}{message}", self.messages.pipeline_failure_prefix);
                self.finish_failed(RunFailure::Pipeline { message }, text);
            }
            StagePayload::Unknown { .. } => {
                debug!(stage = %event.stage, "ignoring unknown stage");
            }
        }
        &self.state
    }

    /// Ends a running run because the stream itself failed.
    pub fn fail(&mut self, err: &ClientError) -> &RunState {
        if self.state != RunState::Running {
            return &self.state;
        }
        let message = match err {
            ClientError::Framing { .. } => self.messages.framing_failure.clone(),
            ClientError::Cancelled => self.messages.cancelled.clone(),
            ClientError::Validation(message) => message.clone(),
            _ => self.messages.transport_failure.clone(),
        };
        warn!(run_id = ?self.run_id, error = %err, "run failed");
        self.finish_failed(RunFailure::from(err), message);
        &self.state
    }

    /// Called when the transport closes.
    ///
    /// A run still in progress is treated as complete.
    pub fn finish_stream(&mut self) -> &RunState {
        if self.state == RunState::Running {
            debug!(run_id = ?self.run_id, "stream closed without an end event");
            self.finish_completed();
        }
        &self.state
    }

    fn finish_completed(&mut self) {
        self.state = RunState::Completed;
        let done = self.messages.done.clone();
        self.status.text = done.clone();
        self.port.show_done(&done);
        self.release();
        info!(run_id = ?self.run_id, "run completed");
    }

    fn finish_failed(&mut self, failure: RunFailure, message: String) {
        info!(run_id = ?self.run_id, %failure, "run failed");
        self.state = RunState::Failed(failure);
        self.port.show_error(&message);
        self.status.text = message;
        self.release();
    }

    fn release(&mut self) {
        self.set_busy(false);
        self.port.set_submit_enabled(true);
    }

    fn set_status(&mut self, text: &str) {
        self.status.text = text.to_string();
        self.port.set_status(text);
    }

    fn set_busy(&mut self, busy: bool) {
        self.status.busy = busy;
        self.port.set_busy(busy);
    }
}
