// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// The backend answered with a non-success HTTP status.
    Status(u16),
    #[cfg(feature = "http")]
    Http(reqwest::Error),
    Json(serde_json::Error),
    /// A sequence does not have the length its neighbours have.
    Shape {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    SeriesIndex {
        chart: &'static str,
        index: usize,
    },
    /// The chart's values cannot be mapped onto a finite y axis.
    Range { chart: &'static str },
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "network response was not ok: status {code}"),
            #[cfg(feature = "http")]
            Self::Http(err) => {
                if err.is_timeout() {
                    write!(f, "request timed out: {err}")
                } else {
                    write!(f, "http error: {err}")
                }
            }
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Shape {
                field,
                expected,
                found,
            } => write!(f, "{field} has {found} samples, expected {expected}"),
            Self::SeriesIndex { chart, index } => {
                write!(f, "chart {chart} has no series at index {index}")
            }
            Self::Range { chart } => write!(f, "chart {chart} has no finite value range"),
        }
    }
}

impl std::error::Error for Error {}
