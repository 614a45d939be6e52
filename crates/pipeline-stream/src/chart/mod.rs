//! Chart descriptor normalization and rendering.
//!
//! The formatter stage publishes an untrusted chart description.
//! [`normalize`] turns it into a [`NormalizedChart`] and
//! [`ChartRenderAdapter`] turns that into at most one plotting call.
pub mod figure;
pub mod normalize;
pub mod render;

pub use figure::{Figure, PlotConfig, Trace};
pub use normalize::{
    ChartDescriptor, ChartKind, NormalizedChart, Orientation, Series, normalize, shorten_label,
};
pub use render::{ChartOutcome, ChartRenderAdapter, PALETTE};
