// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// Shown for a timestamp that cannot be placed on the calendar.
pub const INVALID_LABEL: &str = "--:--";

/// Formats a sample timestamp (seconds since the epoch) as `HH:MM` in `tz`.
pub fn format_label<Tz>(timestamp: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if !timestamp.is_finite() {
        return INVALID_LABEL.to_string();
    }

    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;

    match DateTime::from_timestamp(secs as i64, nanos) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M").to_string(),
        None => {
            log::warn!("timestamp {timestamp} is out of range");
            INVALID_LABEL.to_string()
        }
    }
}

/// Chart labels for a history's timestamps.
pub fn format_labels<Tz>(timestamps: &[f64], tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamps
        .iter()
        .map(|&timestamp| format_label(timestamp, tz))
        .collect()
}

pub fn format_last_updated<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("Last updated: {}", now.format("%H:%M:%S"))
}

#[test]
fn test_format_label() {
    use chrono::{FixedOffset, Utc};

    assert_eq!(format_label(1700000000.0, &Utc), "22:13");
    assert_eq!(format_label(1700000300.9, &Utc), "22:18");
    assert_eq!(format_label(1699974000.0, &Utc), "15:00");

    let cet = FixedOffset::east_opt(3600).unwrap();
    assert_eq!(format_label(1700000000.0, &cet), "23:13");

    assert_eq!(format_label(f64::NAN, &Utc), INVALID_LABEL);
    assert_eq!(format_label(1e300, &Utc), INVALID_LABEL);
}

#[test]
fn test_format_last_updated() {
    use chrono::Utc;

    let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 4, 9).unwrap();
    assert_eq!(format_last_updated(&now), "Last updated: 08:04:09");
}
