//! Weather pipeline for Localcast
//!
//! Turns a coordinate reading into a published location name and forecast
//! using the National Weather Service API.

pub mod diagnostics;
pub mod location;
pub mod nws;
pub mod observer;
pub mod pipeline;
pub mod state;
pub mod types;

pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};
pub use location::{
    coordinates_channel, ConfiguredProvider, CoordinateAcquisition, FixedLocation,
    GeolocationProvider,
};
pub use nws::{NwsClient, PointInfo};
pub use observer::CoordinateObserver;
pub use pipeline::{ForecastPipeline, RunOutcome};
pub use state::{ForecastState, ForecastStore};
pub use types::*;
