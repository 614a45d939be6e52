//! Common imports for wiring a client to a presentation surface.
pub use crate::{
    AbortHandle, ChartPlaceholder, ClientConfig, ClientError, EventDispatcher, Figure,
    PipelineClient, PlotError, PlotRenderer, PresentationPort, QueryRequest, RunFailure,
    RunState, TableData,
};
