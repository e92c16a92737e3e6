// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

mod dummysource;
#[cfg(feature = "http")]
mod httpsource;

pub use dummysource::DummyTelemetrySource;
#[cfg(feature = "http")]
pub use httpsource::HttpTelemetrySource;

use std::sync::Arc;

use async_trait::async_trait;

use crate::telemetry::TelemetryResponse;
use crate::Result;

pub type TelemetrySourcePointer = Arc<dyn TelemetrySource>;

/// Provides the sensor node's current readings and history.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetches one response. A returned value has already been validated.
    async fn fetch(&self) -> Result<TelemetryResponse>;

    /// Short description used in log messages.
    fn describe(&self) -> String;
}
