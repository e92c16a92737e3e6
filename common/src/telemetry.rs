// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::chart::Color;
use crate::{Error, Result};

/// Number of samples the sensor node keeps: one hour at 5 minute intervals.
pub const HISTORY_CAPACITY: usize = 12;

/// The quantities measured by the SEN55.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    Pm25,
    Pm10,
    Voc,
    Nox,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Pm25,
        Metric::Pm10,
        Metric::Voc,
        Metric::Nox,
    ];

    /// The key used for this metric in the `/api/data` payload.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Pm25 => "pm25",
            Metric::Pm10 => "pm10",
            Metric::Voc => "voc",
            Metric::Nox => "nox",
        }
    }

    /// Legend label of the chart series.
    pub fn series_label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature (°C)",
            Metric::Humidity => "Humidity (%)",
            Metric::Pm25 => "PM2.5 (μg/m³)",
            Metric::Pm10 => "PM10 (μg/m³)",
            Metric::Voc => "VOC Index",
            Metric::Nox => "NOx Index",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Metric::Temperature => "Temp",
            Metric::Humidity => "Humidity",
            Metric::Pm25 => "PM2.5",
            Metric::Pm10 => "PM10",
            Metric::Voc => "VOC",
            Metric::Nox => "NOx",
        }
    }

    /// Unit suffix, empty for the dimensionless gas indices.
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::Pm25 | Metric::Pm10 => "µg/m³",
            Metric::Voc | Metric::Nox => "",
        }
    }

    /// Palette colour of the metric's series.
    pub fn color(self) -> Color {
        match self {
            Metric::Temperature => Color::rgba(255, 99, 132, 0.7),
            Metric::Humidity => Color::rgba(54, 162, 235, 0.7),
            Metric::Pm25 => Color::rgba(255, 206, 86, 0.7),
            Metric::Pm10 => Color::rgba(75, 192, 192, 0.7),
            Metric::Voc => Color::rgba(153, 102, 255, 0.7),
            Metric::Nox => Color::rgba(255, 159, 64, 0.7),
        }
    }
}

/// The current readings of the sensor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct SensorSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub voc: f64,
    pub nox: f64,
}

impl SensorSnapshot {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pm25 => self.pm25,
            Metric::Pm10 => self.pm10,
            Metric::Voc => self.voc,
            Metric::Nox => self.nox,
        }
    }
}

/// The recent samples kept by the sensor node, oldest first.
///
/// All sequences have the same length. The node decides what the window contains, the
/// dashboard never appends to or trims it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct SensorHistory {
    /// Seconds since the Unix epoch. Fractional, as the node stamps samples with `time.time()`.
    pub timestamps: Vec<f64>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub pm25: Vec<f64>,
    pub pm10: Vec<f64>,
    pub voc: Vec<f64>,
    pub nox: Vec<f64>,
}

impl SensorHistory {
    pub fn series(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Pm25 => &self.pm25,
            Metric::Pm10 => &self.pm10,
            Metric::Voc => &self.voc,
            Metric::Nox => &self.nox,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Checks that every metric has one sample per timestamp.
    pub fn validate(&self) -> Result<()> {
        let expected = self.timestamps.len();

        for metric in Metric::ALL {
            let found = self.series(metric).len();
            if found != expected {
                return Err(Error::Shape {
                    field: metric.key(),
                    expected,
                    found,
                });
            }
        }

        if expected > HISTORY_CAPACITY {
            log::debug!("history has {expected} samples, more than the usual {HISTORY_CAPACITY}");
        }

        Ok(())
    }
}

/// Body of `GET /api/data`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct TelemetryResponse {
    pub current: SensorSnapshot,
    pub history: SensorHistory,
}

impl TelemetryResponse {
    /// Decodes and validates a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let response: Self = serde_json::from_slice(body)?;
        response.history.validate()?;

        Ok(response)
    }
}
