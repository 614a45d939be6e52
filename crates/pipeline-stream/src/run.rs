use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::dispatcher::{EventDispatcher, RunState};
use crate::errors::ClientError;
use crate::frame::EventFrameParser;
use crate::ports::{PlotRenderer, PresentationPort};
use crate::source::{EventSource, HttpEventSource, QueryRequest};
use crate::stream::event_stream;

/// Handle used to request cancellation of a running stream.
#[derive(Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for AbortHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests cancellation.
    ///
    /// The run ends as `RunState::Failed(RunFailure::Cancelled)` at its next
    /// suspension point.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Ends a run as cancelled if its future is dropped while still running.
struct RunGuard<'a, P: PresentationPort, R: PlotRenderer> {
    dispatcher: &'a mut EventDispatcher<P, R>,
}

impl<P: PresentationPort, R: PlotRenderer> Deref for RunGuard<'_, P, R> {
    type Target = EventDispatcher<P, R>;

    fn deref(&self) -> &Self::Target {
        self.dispatcher
    }
}

impl<P: PresentationPort, R: PlotRenderer> DerefMut for RunGuard<'_, P, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.dispatcher
    }
}

impl<P: PresentationPort, R: PlotRenderer> Drop for RunGuard<'_, P, R> {
    fn drop(&mut self) {
        if self.dispatcher.state() == &RunState::Running {
            debug!(
                run_id = ?self.dispatcher.run_id(),
                "run dropped before reaching a terminal state"
            );
            self.dispatcher.fail(&ClientError::Cancelled);
        }
    }
}

/// Submits questions and feeds the resulting event stream to a dispatcher.
///
/// One run at a time per dispatcher: callers keep the submit affordance
/// disabled while a run is in flight (the dispatcher does that through its
/// presentation port) and a second `run` on a busy dispatcher is rejected.
#[derive(Clone)]
pub struct PipelineClient {
    source: Arc<dyn EventSource>,
    config: ClientConfig,
}

impl PipelineClient {
    /// Creates a client over an arbitrary event source.
    pub fn new(source: Arc<dyn EventSource>, config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Creates a client that talks HTTP to `config.base_url`.
    pub fn http(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let source = HttpEventSource::new(&config)?;
        Ok(Self {
            source: Arc::new(source),
            config,
        })
    }

    /// Creates an HTTP client from `PIPELINE_STREAM_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::http(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Creates a dispatcher that uses this client's status texts.
    pub fn dispatcher<P: PresentationPort, R: PlotRenderer>(
        &self,
        port: P,
        plotter: R,
    ) -> EventDispatcher<P, R> {
        EventDispatcher::new(port, plotter).with_status_messages(self.config.status.clone())
    }

    /// Runs one question to a terminal state.
    ///
    /// Returns `Err` only when the run could not start (blank question or a
    /// run already in flight). Every failure after that is reported through
    /// the dispatcher and the returned `RunState`.
    pub async fn run<P: PresentationPort, R: PlotRenderer>(
        &self,
        request: &QueryRequest,
        dispatcher: &mut EventDispatcher<P, R>,
    ) -> Result<RunState, ClientError> {
        self.run_with_abort(request, dispatcher, &AbortHandle::new()).await
    }

    /// Like `run`, but stops early when `abort` is triggered.
    ///
    /// Dropping the returned future before it resolves ends the run as
    /// `RunFailure::Cancelled` and re-enables submission.
    pub async fn run_with_abort<P: PresentationPort, R: PlotRenderer>(
        &self,
        request: &QueryRequest,
        dispatcher: &mut EventDispatcher<P, R>,
        abort: &AbortHandle,
    ) -> Result<RunState, ClientError> {
        request.validate()?;
        let run_id = uuid::Uuid::new_v4();
        dispatcher.begin(run_id)?;
        let mut dispatcher = RunGuard { dispatcher };

        let mut abort_rx = abort.subscribe();
        if *abort_rx.borrow_and_update() {
            return Ok(dispatcher.fail(&ClientError::Cancelled).clone());
        }

        let opened = tokio::select! {
            biased;
            _ = abort_rx.changed() => Err(ClientError::Cancelled),
            opened = self.source.open(request) => opened,
        };
        let bytes_stream = match opened {
            Ok(bytes_stream) => bytes_stream,
            Err(err) => return Ok(dispatcher.fail(&err).clone()),
        };

        let parser = EventFrameParser::new(self.config.event_prefix.clone());
        let events = event_stream(bytes_stream, parser, self.config.idle_timeout);
        futures::pin_mut!(events);

        let mut abort_live = true;
        loop {
            tokio::select! {
                biased;
                changed = abort_rx.changed(), if abort_live => {
                    match changed {
                        Ok(()) if *abort_rx.borrow() => {
                            dispatcher.fail(&ClientError::Cancelled);
                            break;
                        }
                        Ok(()) => {}
                        Err(_) => abort_live = false,
                    }
                }
                next = events.next() => {
                    match next {
                        Some(Ok(event)) => {
                            if dispatcher.dispatch(event).is_terminal() {
                                break;
                            }
                        }
                        Some(Err(err)) => {
                            dispatcher.fail(&err);
                            break;
                        }
                        None => {
                            dispatcher.finish_stream();
                            break;
                        }
                    }
                }
            }
        }

        debug!(%run_id, state = ?dispatcher.state(), "event stream released");
        info!(%run_id, "run finished");
        Ok(dispatcher.state().clone())
    }
}
