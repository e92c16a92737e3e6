// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

//! The dashboard's state: connection indicator, readings panel, charts and update stamp.

use std::fmt::Display;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone};

use crate::chart::{ChartHandle, ChartId};
use crate::clock::{format_labels, format_last_updated};
use crate::readings::{summary_text, update_current_readings, ReadingsPanel};
use crate::telemetry::{SensorHistory, TelemetryResponse};
use crate::Result;

pub type DashboardSharedPointer = Arc<Mutex<Dashboard>>;

/// Outcome of the most recent fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    status: Option<ConnectionStatus>,
    readings: ReadingsPanel,
    charts: [ChartHandle; 4],
    last_updated: Option<String>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Creates the four charts. They live as long as the dashboard and are updated in place.
    pub fn new() -> Self {
        Self {
            status: None,
            readings: ReadingsPanel::default(),
            charts: ChartId::ALL.map(|id| ChartHandle::create(id.config())),
            last_updated: None,
        }
    }

    pub fn shared(self) -> DashboardSharedPointer {
        Arc::new(Mutex::new(self))
    }

    /// `None` until the first cycle completed.
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.status
    }

    pub fn status_text(&self) -> &'static str {
        match self.status {
            None => "⚪ Connecting...",
            Some(ConnectionStatus::Connected) => "🟢 Connected",
            Some(ConnectionStatus::Disconnected) => "🔴 Disconnected",
        }
    }

    pub fn readings(&self) -> &ReadingsPanel {
        &self.readings
    }

    pub fn chart(&self, id: ChartId) -> &ChartHandle {
        &self.charts[Self::chart_slot(id)]
    }

    pub fn charts(&self) -> impl Iterator<Item = (ChartId, &ChartHandle)> {
        ChartId::ALL.into_iter().zip(self.charts.iter())
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    /// Applies a successful fetch.
    ///
    /// Readings and charts are computed before anything is committed: on error the
    /// dashboard is left exactly as it was.
    pub fn apply<Tz>(&mut self, response: &TelemetryResponse, now: &DateTime<Tz>) -> Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut charts = self.charts.clone();
        render_history(&mut charts, &response.history, &now.timezone())?;

        let mut readings = self.readings.clone();
        update_current_readings(&response.current, &mut readings);

        self.status = Some(ConnectionStatus::Connected);
        self.readings = readings;
        self.charts = charts;
        self.last_updated = Some(format_last_updated(now));

        Ok(())
    }

    pub fn mark_disconnected(&mut self) {
        self.status = Some(ConnectionStatus::Disconnected);
    }

    /// Applies the result of a cycle. Failures only flip the connection indicator.
    pub fn handle_cycle<Tz>(&mut self, result: Result<TelemetryResponse>, now: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let outcome = result.and_then(|response| {
            self.apply(&response, now)?;
            Ok(response)
        });

        match outcome {
            Ok(response) => {
                log::info!(
                    "Dashboard updated with {} samples\n{}",
                    response.history.len(),
                    summary_text(&response.current)
                );
            }
            Err(e) => {
                log::error!("Error fetching data: {e}");
                self.mark_disconnected();
            }
        }
    }

    fn chart_slot(id: ChartId) -> usize {
        match id {
            ChartId::Temperature => 0,
            ChartId::Humidity => 1,
            ChartId::Particles => 2,
            ChartId::Gases => 3,
        }
    }
}

/// Replaces labels and series of every chart with `history` and redraws them.
pub fn render_history<Tz>(
    charts: &mut [ChartHandle; 4],
    history: &SensorHistory,
    tz: &Tz,
) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let labels = format_labels(&history.timestamps, tz);

    for (id, chart) in ChartId::ALL.into_iter().zip(charts.iter_mut()) {
        chart.set_labels(labels.clone());
        for (index, &metric) in id.metrics().iter().enumerate() {
            chart.set_series_data(index, history.series(metric).to_vec())?;
        }
        chart.update()?;
    }

    Ok(())
}
