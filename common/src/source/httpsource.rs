// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::time::Duration;

use async_trait::async_trait;

use crate::source::TelemetrySource;
use crate::telemetry::TelemetryResponse;
use crate::{Error, Result};

/// Fetches `GET /api/data` from the sensor node.
pub struct HttpTelemetrySource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTelemetrySource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetrySource {
    async fn fetch(&self) -> Result<TelemetryResponse> {
        log::debug!("-> GET {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        log::debug!("<- {status}");
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        log::debug!("Read {} bytes", body.len());

        TelemetryResponse::from_slice(&body)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const BODY: &str = r#"{
        "current": {"temperature": 21.34, "humidity": 45.0, "pm25": 3.2, "pm10": 4.1, "voc": 100.0, "nox": 1.0},
        "history": {
            "timestamps": [1700000000, 1700000300],
            "temperature": [21.0, 21.5],
            "humidity": [45.0, 44.8],
            "pm25": [3.0, 3.2],
            "pm10": [4.0, 4.1],
            "voc": [98.0, 100.0],
            "nox": [1.0, 1.0]
        }
    }"#;

    /// Answers a single request with `status` and `body`, returns the endpoint URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/api/data")
    }

    fn source(endpoint: String) -> HttpTelemetrySource {
        HttpTelemetrySource::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_decodes() {
        let endpoint = serve_once("200 OK", BODY).await;

        let response = source(endpoint).fetch().await.unwrap();

        assert_eq!(response.current.temperature, 21.34);
        assert_eq!(response.history.temperature, vec![21.0, 21.5]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let endpoint = serve_once("503 Service Unavailable", "busy").await;

        assert!(matches!(
            source(endpoint).fetch().await,
            Err(Error::Status(503))
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let endpoint = serve_once("200 OK", "{\"current\": 1}").await;

        assert!(matches!(source(endpoint).fetch().await, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn ragged_history_is_an_error() {
        let endpoint = serve_once(
            "200 OK",
            r#"{
                "current": {"temperature": 1, "humidity": 1, "pm25": 1, "pm10": 1, "voc": 1, "nox": 1},
                "history": {"timestamps": [1], "temperature": [], "humidity": [1], "pm25": [1], "pm10": [1], "voc": [1], "nox": [1]}
            }"#,
        )
        .await;

        assert!(matches!(
            source(endpoint).fetch().await,
            Err(Error::Shape {
                field: "temperature",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(matches!(
            source(format!("http://{addr}/api/data")).fetch().await,
            Err(Error::Http(_))
        ));
    }
}
