// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use crate::telemetry::{Metric, SensorSnapshot};

/// Something that shows one text slot per metric.
pub trait ReadingsSink {
    fn set_reading(&mut self, metric: Metric, text: String);
}

/// Formats a reading the way the dashboard shows it, with one decimal.
pub fn format_reading(value: f64) -> String {
    format!("{value:.1}")
}

/// Writes all six readings of `snapshot` into `sink`.
pub fn update_current_readings(snapshot: &SensorSnapshot, sink: &mut impl ReadingsSink) {
    for metric in Metric::ALL {
        sink.set_reading(metric, format_reading(snapshot.get(metric)));
    }
}

/// Multi-line summary as printed on the sensor node's own display.
pub fn summary_text(snapshot: &SensorSnapshot) -> String {
    Metric::ALL
        .iter()
        .map(|&metric| {
            let value = format_reading(snapshot.get(metric));
            match metric.unit() {
                "" => format!("{}: {value}", metric.short_name()),
                unit @ ("°C" | "%") => format!("{}: {value}{unit}", metric.short_name()),
                unit => format!("{}: {value} {unit}", metric.short_name()),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The text slots of the "current readings" panel, `"--"` until the first update.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingsPanel {
    slots: [String; 6],
}

impl Default for ReadingsPanel {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| "--".to_string()),
        }
    }
}

impl ReadingsPanel {
    pub fn get(&self, metric: Metric) -> &str {
        &self.slots[Self::slot(metric)]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &str)> {
        Metric::ALL
            .into_iter()
            .map(move |metric| (metric, self.get(metric)))
    }

    fn slot(metric: Metric) -> usize {
        match metric {
            Metric::Temperature => 0,
            Metric::Humidity => 1,
            Metric::Pm25 => 2,
            Metric::Pm10 => 3,
            Metric::Voc => 4,
            Metric::Nox => 5,
        }
    }
}

impl ReadingsSink for ReadingsPanel {
    fn set_reading(&mut self, metric: Metric, text: String) {
        self.slots[Self::slot(metric)] = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink(Vec<(Metric, String)>);

    impl ReadingsSink for RecordingSink {
        fn set_reading(&mut self, metric: Metric, text: String) {
            self.0.push((metric, text));
        }
    }

    fn snapshot() -> SensorSnapshot {
        SensorSnapshot {
            temperature: 21.34,
            humidity: 45.06,
            pm25: 3.0,
            pm10: 12.96,
            voc: 101.0,
            nox: -0.04,
        }
    }

    #[test]
    fn writes_exactly_six_slots() {
        let mut sink = RecordingSink::default();
        update_current_readings(&snapshot(), &mut sink);

        assert_eq!(
            sink.0,
            vec![
                (Metric::Temperature, "21.3".to_string()),
                (Metric::Humidity, "45.1".to_string()),
                (Metric::Pm25, "3.0".to_string()),
                (Metric::Pm10, "13.0".to_string()),
                (Metric::Voc, "101.0".to_string()),
                (Metric::Nox, "-0.0".to_string()),
            ]
        );
    }

    #[test]
    fn panel_keeps_placeholders_until_updated() {
        let mut panel = ReadingsPanel::default();
        assert!(panel.iter().all(|(_, text)| text == "--"));

        update_current_readings(&snapshot(), &mut panel);
        assert_eq!(panel.get(Metric::Temperature), "21.3");
        assert_eq!(panel.get(Metric::Voc), "101.0");
    }

    #[test]
    fn summary_matches_node_display() {
        assert_eq!(
            summary_text(&snapshot()),
            "Temp: 21.3°C\nHumidity: 45.1%\nPM2.5: 3.0 µg/m³\nPM10: 13.0 µg/m³\nVOC: 101.0\nNOx: -0.0"
        );
    }
}
