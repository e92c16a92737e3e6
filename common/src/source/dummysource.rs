// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::source::TelemetrySource;
use crate::telemetry::TelemetryResponse;
use crate::Result;

/// Serves a bundled recording, so the dashboard can run without a sensor node.
#[derive(Clone, Debug, Default)]
pub struct DummyTelemetrySource {
    response: TelemetryResponse,
}

impl DummyTelemetrySource {
    pub fn new() -> Result<Self> {
        let json_data = std::include_str!("./dummy_telemetry.json");

        Ok(Self {
            response: TelemetryResponse::from_slice(json_data.as_bytes())?,
        })
    }
}

#[async_trait]
impl TelemetrySource for DummyTelemetrySource {
    async fn fetch(&self) -> Result<TelemetryResponse> {
        Ok(self.response.clone())
    }

    fn describe(&self) -> String {
        "bundled dummy data".into()
    }
}

#[tokio::test]
async fn test_dummy_telemetry_source() {
    use crate::telemetry::{Metric, HISTORY_CAPACITY};

    let source = DummyTelemetrySource::new().unwrap();
    let response = source.fetch().await.unwrap();

    assert_eq!(response.current.temperature, 21.34);
    assert_eq!(response.history.len(), HISTORY_CAPACITY);
    assert_eq!(response.history.series(Metric::Nox).len(), HISTORY_CAPACITY);
}
