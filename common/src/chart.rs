// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

//! Line chart model.
//!
//! A [`ChartHandle`] is created once from a [`ChartConfig`] and then mutated in place: the
//! renderer replaces its labels and series data and calls [`ChartHandle::update`], which
//! recomputes the [`ChartFrame`] the UI draws.

use std::fmt::{self, Write as _};

use crate::telemetry::Metric;
use crate::{Error, Result};

/// Width of the viewbox the path commands are expressed in.
pub const VIEW_WIDTH: f64 = 1000.0;
/// Height of the viewbox the path commands are expressed in.
pub const VIEW_HEIGHT: f64 = 400.0;

const MAX_TICKS: usize = 6;
const MAX_DECIMALS: usize = 12;
/// Spans below this fraction of the values' magnitude count as flat.
const FLAT_RANGE: f64 = 1e-9;
/// Half-height of the band drawn around a flat series, relative to its magnitude.
const FLAT_PAD: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    pub fn alpha_u8(self) -> u8 {
        (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    pub fn is_transparent(self) -> bool {
        self.alpha <= 0.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendPosition {
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipMode {
    /// One tooltip listing every series at the hovered x index.
    Index,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesStyle {
    pub border_color: Color,
    pub fill_color: Color,
    pub border_width: f32,
    /// Bézier smoothing, `0.0` draws straight segments.
    pub tension: f64,
    pub point_radius: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesConfig {
    pub metric: Metric,
    pub label: &'static str,
    pub style: SeriesStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisConfig {
    pub title: Option<&'static str>,
    pub begin_at_zero: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartConfig {
    pub title: &'static str,
    pub title_font_size: f32,
    pub legend: LegendPosition,
    pub tooltip: TooltipMode,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    pub series: Vec<SeriesConfig>,
}

/// The four charts of the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartId {
    Temperature,
    Humidity,
    Particles,
    Gases,
}

impl ChartId {
    pub const ALL: [ChartId; 4] = [
        ChartId::Temperature,
        ChartId::Humidity,
        ChartId::Particles,
        ChartId::Gases,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartId::Temperature => "Temperature over time",
            ChartId::Humidity => "Humidity over time",
            ChartId::Particles => "Particulate Matter over time",
            ChartId::Gases => "Gas Indices over time",
        }
    }

    pub fn metrics(self) -> &'static [Metric] {
        match self {
            ChartId::Temperature => &[Metric::Temperature],
            ChartId::Humidity => &[Metric::Humidity],
            ChartId::Particles => &[Metric::Pm25, Metric::Pm10],
            ChartId::Gases => &[Metric::Voc, Metric::Nox],
        }
    }

    /// Single series charts get a faint fill under the line, shared charts none.
    pub fn config(self) -> ChartConfig {
        let metrics = self.metrics();
        let filled = metrics.len() == 1;

        let series = metrics
            .iter()
            .map(|&metric| SeriesConfig {
                metric,
                label: metric.series_label(),
                style: SeriesStyle {
                    border_color: metric.color(),
                    fill_color: if filled {
                        metric.color().with_alpha(0.1)
                    } else {
                        Color::TRANSPARENT
                    },
                    border_width: 2.0,
                    tension: 0.3,
                    point_radius: 3.0,
                },
            })
            .collect();

        ChartConfig {
            title: self.title(),
            title_font_size: 16.0,
            legend: LegendPosition::Top,
            tooltip: TooltipMode::Index,
            x_axis: AxisConfig {
                title: Some("Time"),
                begin_at_zero: false,
            },
            y_axis: AxisConfig {
                title: None,
                begin_at_zero: false,
            },
            series,
        }
    }
}

/// A tick on an axis. `position` runs from 0 (left, top) to 1 (right, bottom).
#[derive(Clone, Debug, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesFrame {
    pub label: &'static str,
    pub color: Color,
    pub fill: Color,
    pub border_width: f32,
    pub point_radius: f32,
    /// Path commands of the line, in a `VIEW_WIDTH` x `VIEW_HEIGHT` viewbox.
    pub line_commands: String,
    /// Closed path under the line, empty when the series is not filled.
    pub area_commands: String,
    /// Normalised point positions, y growing downwards.
    pub points: Vec<(f64, f64)>,
}

/// Drawing geometry of a chart as of its last `update()`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ChartFrame {
    pub y_min: f64,
    pub y_max: f64,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub series: Vec<SeriesFrame>,
    /// Tooltip text per x index.
    pub tooltips: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartHandle {
    config: ChartConfig,
    labels: Vec<String>,
    data: Vec<Vec<f64>>,
    frame: ChartFrame,
}

impl ChartHandle {
    pub fn create(config: ChartConfig) -> Self {
        let data = vec![Vec::new(); config.series.len()];
        let mut handle = Self {
            config,
            labels: Vec::new(),
            data,
            frame: ChartFrame::default(),
        };
        handle.frame = handle.render().unwrap_or_default();

        handle
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn series_data(&self, index: usize) -> Option<&[f64]> {
        self.data.get(index).map(Vec::as_slice)
    }

    pub fn frame(&self) -> &ChartFrame {
        &self.frame
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }

    pub fn set_series_data(&mut self, index: usize, data: Vec<f64>) -> Result<()> {
        let slot = self.data.get_mut(index).ok_or(Error::SeriesIndex {
            chart: self.config.title,
            index,
        })?;
        *slot = data;

        Ok(())
    }

    /// Redraws the chart from its current labels and data.
    pub fn update(&mut self) -> Result<()> {
        let expected = self.labels.len();
        for (series, data) in self.config.series.iter().zip(&self.data) {
            if data.len() != expected {
                return Err(Error::Shape {
                    field: series.label,
                    expected,
                    found: data.len(),
                });
            }
        }

        self.frame = self.render()?;

        Ok(())
    }

    fn render(&self) -> Result<ChartFrame> {
        let scale = Scale::fit(
            self.data.iter().flatten().copied(),
            self.config.y_axis.begin_at_zero,
        )
        .ok_or(Error::Range {
            chart: self.config.title,
        })?;
        let count = self.labels.len();

        let x_ticks = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| AxisTick {
                position: x_position(i, count),
                text: label.clone(),
            })
            .collect();

        let series = self
            .config
            .series
            .iter()
            .zip(&self.data)
            .map(|(config, data)| render_series(config, data, &scale))
            .collect();

        let tooltips = match self.config.tooltip {
            TooltipMode::Index => (0..count).map(|i| self.tooltip(i)).collect(),
            TooltipMode::Disabled => Vec::new(),
        };

        Ok(ChartFrame {
            y_min: scale.min,
            y_max: scale.max,
            x_ticks,
            y_ticks: scale.ticks(),
            series,
            tooltips,
        })
    }

    fn tooltip(&self, index: usize) -> String {
        let mut text = self.labels[index].clone();
        for (config, data) in self.config.series.iter().zip(&self.data) {
            if let Some(value) = data.get(index) {
                let _ = write!(text, "\n{}: {value:.1}", config.label);
            }
        }

        text
    }
}

fn x_position(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.5
    } else {
        index as f64 / (count - 1) as f64
    }
}

fn render_series(config: &SeriesConfig, data: &[f64], scale: &Scale) -> SeriesFrame {
    let points: Vec<(f64, f64)> = data
        .iter()
        .enumerate()
        .map(|(i, &value)| (x_position(i, data.len()), scale.position(value)))
        .collect();

    let view: Vec<(f64, f64)> = points
        .iter()
        .map(|&(x, y)| (x * VIEW_WIDTH, y * VIEW_HEIGHT))
        .collect();

    let line_commands = line_path(&view, config.style.tension);
    let area_commands = match (view.first(), view.last()) {
        (Some(first), Some(last)) if view.len() > 1 && !config.style.fill_color.is_transparent() => {
            format!(
                "{line_commands} L {:.2} {VIEW_HEIGHT:.2} L {:.2} {VIEW_HEIGHT:.2} Z",
                last.0, first.0
            )
        }
        _ => String::new(),
    };

    SeriesFrame {
        label: config.label,
        color: config.style.border_color,
        fill: config.style.fill_color,
        border_width: config.style.border_width,
        point_radius: config.style.point_radius,
        line_commands,
        area_commands,
        points,
    }
}

fn line_path(points: &[(f64, f64)], tension: f64) -> String {
    let Some(&(x, y)) = points.first() else {
        return String::new();
    };

    let mut commands = format!("M {x:.2} {y:.2}");
    if tension <= 0.0 {
        for &(x, y) in &points[1..] {
            let _ = write!(commands, " L {x:.2} {y:.2}");
        }
        return commands;
    }

    let controls: Vec<_> = (0..points.len())
        .map(|i| {
            let previous = points[i.saturating_sub(1)];
            let next = points[(i + 1).min(points.len() - 1)];
            control_points(previous, points[i], next, tension)
        })
        .collect();

    for i in 1..points.len() {
        let (_, (x1, y1)) = controls[i - 1];
        let ((x2, y2), _) = controls[i];
        let (x, y) = points[i];
        let _ = write!(
            commands,
            " C {x1:.2} {y1:.2} {x2:.2} {y2:.2} {x:.2} {y:.2}"
        );
    }

    commands
}

/// Control points before and after `current`, weighted by the distance to each neighbour.
fn control_points(
    previous: (f64, f64),
    current: (f64, f64),
    next: (f64, f64),
    tension: f64,
) -> ((f64, f64), (f64, f64)) {
    let d01 = distance(previous, current);
    let d12 = distance(current, next);
    let total = d01 + d12;
    let (s01, s12) = if total > 0.0 {
        (d01 / total, d12 / total)
    } else {
        (0.0, 0.0)
    };

    let fa = tension * s01;
    let fb = tension * s12;
    let dx = next.0 - previous.0;
    let dy = next.1 - previous.1;

    let before = (current.0 - fa * dx, (current.1 - fa * dy).clamp(0.0, VIEW_HEIGHT));
    let after = (current.0 + fb * dx, (current.1 + fb * dy).clamp(0.0, VIEW_HEIGHT));

    (before, after)
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

/// Value axis rounded out to "nice" 1, 2 or 5 times a power of ten steps.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Scale {
    min: f64,
    max: f64,
    step: f64,
}

impl Scale {
    /// `None` when the values span more than a finite axis can show.
    fn fit(values: impl Iterator<Item = f64>, begin_at_zero: bool) -> Option<Self> {
        let (mut min, mut max) = values
            .filter(|value| value.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            });

        if min > max {
            min = 0.0;
            max = 1.0;
        }
        if begin_at_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        // A flat series gets a band around its value, wide enough to survive rounding.
        let magnitude = min.abs().max(max.abs());
        if max - min <= magnitude * FLAT_RANGE {
            let pad = (magnitude * FLAT_PAD).max(1.0);
            min -= pad;
            max += pad;
        }

        let range = nice_number(max - min, false);
        let step = nice_number(range / (MAX_TICKS - 1) as f64, true);
        if !step.is_finite() || step <= 0.0 {
            return None;
        }

        let scale = Self {
            min: (min / step + 1e-9).floor() * step,
            max: (max / step - 1e-9).ceil() * step,
            step,
        };
        let span = scale.max - scale.min;

        (span.is_finite() && span > 0.0).then_some(scale)
    }

    /// Normalised vertical position of `value`, 0 at the top.
    fn position(&self, value: f64) -> f64 {
        1.0 - (value - self.min) / (self.max - self.min)
    }

    fn ticks(&self) -> Vec<AxisTick> {
        let count = ((self.max - self.min) / self.step).round() as usize;
        let decimals = if self.step >= 1.0 {
            0
        } else {
            ((-self.step.log10()).ceil() as usize).min(MAX_DECIMALS)
        };

        (0..=count)
            .map(|k| {
                let mut value = self.min + k as f64 * self.step;
                if value.abs() < self.step * 1e-6 {
                    value = 0.0;
                }
                AxisTick {
                    position: self.position(value),
                    text: format!("{value:.decimals$}"),
                }
            })
            .collect()
    }
}

fn nice_number(range: f64, round: bool) -> f64 {
    let exponent = range.log10().floor();
    let fraction = range / 10f64.powf(exponent);

    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * 10f64.powf(exponent)
}
