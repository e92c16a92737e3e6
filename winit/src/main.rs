// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

mod args;

use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use air_dashboard_common::chart::{self, ChartHandle, LegendPosition};
use air_dashboard_common::dashboard::{ConnectionStatus, Dashboard, DashboardSharedPointer};
use air_dashboard_common::poller::{Cycle, Poller, PollerHandle};
use air_dashboard_common::source::{
    DummyTelemetrySource, HttpTelemetrySource, TelemetrySourcePointer,
};
use clap::Parser as _;
use slint::{ModelRc, SharedString, VecModel};

use args::Args;

/// Our App struct that holds the UI, the dashboard state and the poller refreshing it.
///
/// The dashboard is shared between the UI thread and the poller thread, so it lives in an
/// Arc<Mutex>. The poller updates it after every fetch and then asks the event loop to
/// push the new state into the view model.
struct App {
    ui: AppWindow,
    dashboard: DashboardSharedPointer,
    source: TelemetrySourcePointer,
    interval: Duration,
    poller: Option<PollerHandle>,
}

impl App {
    /// Create a new App struct.
    ///
    /// Builds the window and the four (still empty) charts before anything is fetched.
    fn new(args: &Args) -> anyhow::Result<Self> {
        // Make a new AppWindow
        let ui = AppWindow::new()?;

        // Either talk to the sensor node or replay the bundled recording.
        let source: TelemetrySourcePointer = if args.dummy {
            Arc::new(DummyTelemetrySource::new()?)
        } else {
            Arc::new(HttpTelemetrySource::new(
                args.endpoint.clone(),
                args.timeout(),
            )?)
        };

        let dashboard = Dashboard::new().shared();

        // Show titles and legends right away
        show_dashboard(&ui, &lock(&dashboard));

        Ok(Self {
            ui,
            dashboard,
            source,
            interval: args.interval(),
            poller: None,
        })
    }

    /// Run the App: start polling and run the UI until the window is closed.
    fn run(&mut self) -> anyhow::Result<()> {
        // Get the handle to the UI as a weak reference.
        let ui_handle = self.ui.as_weak();

        // The cycle callback runs on the poller thread.
        let dashboard = self.dashboard.clone();

        let poller = Poller::new(self.source.clone(), self.interval);
        self.poller = Some(poller.spawn(move |cycle: Cycle| {
            log::debug!("Cycle {} resolved", cycle.sequence);
            lock(&dashboard).handle_cycle(cycle.result, &chrono::Local::now());

            let dashboard = dashboard.clone();
            let refreshed = ui_handle.upgrade_in_event_loop(move |ui| {
                show_dashboard(&ui, &lock(&dashboard));
            });
            if let Err(e) = refreshed {
                log::error!("Unable to refresh the UI: {e}");
            }
        })?);

        // Run the UI (and map an error to an anyhow::Error).
        let result = self.ui.run().map_err(|e| e.into());

        // Stop polling before the window goes away.
        if let Some(poller) = self.poller.take() {
            poller.shutdown();
        }

        result
    }
}

fn lock(dashboard: &DashboardSharedPointer) -> MutexGuard<'_, Dashboard> {
    dashboard.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Copy the dashboard state into the view model.
fn show_dashboard(ui: &AppWindow, dashboard: &Dashboard) {
    let model = ui.global::<ViewModel>();

    model.set_status(dashboard.status_text().into());
    model.set_link(match dashboard.status() {
        None => LinkState::Connecting,
        Some(ConnectionStatus::Connected) => LinkState::Connected,
        Some(ConnectionStatus::Disconnected) => LinkState::Disconnected,
    });

    let readings: Vec<ReadingRecord> = dashboard
        .readings()
        .iter()
        .map(|(metric, value)| ReadingRecord {
            label: metric.short_name().into(),
            value: value.into(),
            unit: metric.unit().into(),
        })
        .collect();
    model.set_readings(ModelRc::new(VecModel::from(readings)));

    let charts: Vec<ChartRecord> = dashboard
        .charts()
        .map(|(_, chart)| ChartRecord::from(chart))
        .collect();
    model.set_charts(ModelRc::new(VecModel::from(charts)));

    model.set_last_update(dashboard.last_updated().unwrap_or_default().into());
}

fn slint_color(color: chart::Color) -> slint::Color {
    slint::Color::from_argb_u8(color.alpha_u8(), color.red, color.green, color.blue)
}

fn ticks(ticks: &[chart::AxisTick]) -> ModelRc<TickRecord> {
    let ticks: Vec<TickRecord> = ticks
        .iter()
        .map(|tick| TickRecord {
            position: tick.position as f32,
            text: tick.text.as_str().into(),
        })
        .collect();

    ModelRc::new(VecModel::from(ticks))
}

/// Convert a chart's last frame into a chart record.
impl From<&ChartHandle> for ChartRecord {
    fn from(chart: &ChartHandle) -> Self {
        let config = chart.config();
        let frame = chart.frame();

        let series: Vec<SeriesRecord> = frame
            .series
            .iter()
            .map(|series| {
                let points: Vec<PlotPoint> = series
                    .points
                    .iter()
                    .map(|&(x, y)| PlotPoint {
                        x: x as f32,
                        y: y as f32,
                    })
                    .collect();

                SeriesRecord {
                    label: series.label.into(),
                    color: slint_color(series.color),
                    fill: slint_color(series.fill),
                    border_width: series.border_width,
                    point_radius: series.point_radius,
                    line_commands: series.line_commands.as_str().into(),
                    area_commands: series.area_commands.as_str().into(),
                    points: ModelRc::new(VecModel::from(points)),
                }
            })
            .collect();

        let tooltips: Vec<SharedString> = frame
            .tooltips
            .iter()
            .map(|tooltip| tooltip.as_str().into())
            .collect();

        Self {
            title: config.title.into(),
            title_size: config.title_font_size,
            legend_top: config.legend == LegendPosition::Top,
            x_title: config.x_axis.title.unwrap_or_default().into(),
            series: ModelRc::new(VecModel::from(series)),
            x_ticks: ticks(&frame.x_ticks),
            y_ticks: ticks(&frame.y_ticks),
            tooltips: ModelRc::new(VecModel::from(tooltips)),
        }
    }
}

/// A minimal main function that parses the configuration, initializes the App and runs it.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::debug!("{args:?}");

    let mut app = App::new(&args)?;

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_dashboard_common::chart::ChartId;
    use slint::Model;

    #[test]
    fn chart_record_from_empty_chart() {
        let record = ChartRecord::from(&ChartHandle::create(ChartId::Particles.config()));

        assert_eq!(record.title, "Particulate Matter over time");
        assert_eq!(record.x_title, "Time");
        assert!(record.legend_top);
        assert_eq!(record.series.row_count(), 2);
        assert_eq!(record.tooltips.row_count(), 0);

        let pm25 = record.series.row_data(0).unwrap();
        assert_eq!(pm25.label, "PM2.5 (μg/m³)");
        assert_eq!(
            (pm25.color.red(), pm25.color.green(), pm25.color.blue()),
            (255, 206, 86)
        );
        assert_eq!(pm25.fill.alpha(), 0);
    }

    #[test]
    fn chart_record_carries_geometry() {
        let mut chart = ChartHandle::create(ChartId::Temperature.config());
        chart.set_labels(vec!["22:13".into(), "22:18".into()]);
        chart.set_series_data(0, vec![21.0, 21.5]).unwrap();
        chart.update().unwrap();

        let record = ChartRecord::from(&chart);
        let series = record.series.row_data(0).unwrap();

        assert_eq!(series.points.row_count(), 2);
        assert!(!series.area_commands.is_empty());
        assert_eq!(record.x_ticks.row_data(1).unwrap().text, "22:18");
        assert_eq!(record.tooltips.row_count(), 2);
    }
}
