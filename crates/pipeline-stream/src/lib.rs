//! Streaming client for staged query pipelines.
//!
//! A backend answers a question by running a fixed sequence of stages
//! (question validation, SQL generation and execution, chart recommendation
//! and formatting, insight generation) and reports each one as a
//! `data: {"event": ..., "data": ...}` line on a streamed response. This
//! crate decodes that stream, drives a run state machine over it and projects
//! every stage onto an injected presentation surface and plotting backend.
//!
//! # Usage
//!
//! ```no_run
//! use pipeline_stream::prelude::*;
//!
//! struct Console;
//!
//! impl PresentationPort for Console {
//!     fn reset_results(&mut self) {}
//!     fn set_status(&mut self, text: &str) { println!("{text}"); }
//!     fn set_busy(&mut self, _busy: bool) {}
//!     fn set_submit_enabled(&mut self, _enabled: bool) {}
//!     fn show_sql(&mut self, sql: &str) { println!("{sql}"); }
//!     fn show_table(&mut self, table: &TableData) { println!("{} rows", table.data.len()); }
//!     fn show_recommendation(&mut self, kind: &str) { println!("chart: {kind}"); }
//!     fn show_chart_placeholder(&mut self, placeholder: &ChartPlaceholder) {
//!         println!("{}", placeholder.message());
//!     }
//!     fn show_insight(&mut self, html: &str) { println!("{html}"); }
//!     fn show_done(&mut self, message: &str) { println!("{message}"); }
//!     fn show_error(&mut self, message: &str) { eprintln!("{message}"); }
//! }
//!
//! struct Discard;
//!
//! impl PlotRenderer for Discard {
//!     fn react(&mut self, _figure: &Figure) -> Result<(), PlotError> {
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let client = PipelineClient::http(ClientConfig::new("http://localhost:8000"))?;
//! let mut dispatcher = client.dispatcher(Console, Discard);
//! let state = client
//!     .run(&QueryRequest::new("Which regions cost the most?"), &mut dispatcher)
//!     .await?;
//! println!("{state:?}");
//! # Ok(())
//! # }
//! ```

/// Chart descriptor normalization, figure model, and rendering.
pub mod chart;
/// Client configuration and status texts.
pub mod config;
/// Byte chunks to newline-delimited frames.
pub mod decoder;
/// Run state machine over stream events.
pub mod dispatcher;
/// Error types.
pub mod errors;
/// Stage names and typed stage payloads.
pub mod event;
/// Event line parsing.
pub mod frame;
/// Markdown to HTML for insights.
pub mod markdown;
/// Tracing subscriber bootstrap.
pub mod observability;
/// Presentation and plotting collaborators.
pub mod ports;
/// Common imports for typical usage.
pub mod prelude;
/// Client entry point and cancellation handle.
pub mod run;
/// Transport seam and HTTP implementation.
pub mod source;
/// Byte stream to event stream.
pub mod stream;
/// Tabular stage payloads.
pub mod table;

pub use chart::{ChartOutcome, ChartRenderAdapter, Figure, NormalizedChart, normalize};
pub use config::{ClientConfig, StatusMessages};
pub use decoder::ChunkDecoder;
pub use dispatcher::{EventDispatcher, PipelineStatus, RunState};
pub use errors::{ChartDataError, ClientError, MarkdownError, PlotError, RunFailure};
pub use event::{Stage, StagePayload, StreamEvent};
pub use frame::EventFrameParser;
pub use markdown::{MarkdownToHtml, PulldownMarkdownRenderer};
pub use observability::init_observability;
pub use ports::{ChartPlaceholder, PlotRenderer, PresentationPort};
pub use run::{AbortHandle, PipelineClient};
pub use source::{EventSource, HttpEventSource, QueryRequest};
pub use stream::{ByteStream, event_stream};
pub use table::TableData;
