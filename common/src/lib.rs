//! Everything behind the air quality dashboard that does not need a window: the `/api/data`
//! model and sources, the chart model, and the poller that drives refresh cycles.

pub mod chart;
pub mod clock;
pub mod dashboard;
mod error;
pub mod poller;
pub mod readings;
pub mod source;
pub mod telemetry;

pub use error::{Error, Result};
