//! Distribution layout: turns a list of outcome scores into histogram, line,
//! or box-plot geometry in viewport coordinates (y grows downward).
//!
//! Layout never fails. Empty input or an unknown chart name produces `None`,
//! which callers treat as "draw nothing".

use std::fmt;

use itertools::Itertools;
use serde_json::Value;

/// Fraction of a histogram slot covered by its bar.
pub const BAR_FILL: f64 = 0.8;

/// Tukey fence multiplier.
pub const WHISKER_SPAN: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Histogram,
    Line,
    Box,
}

impl ChartKind {
    pub fn parse(name: &str) -> Option<ChartKind> {
        match name.trim().to_ascii_lowercase().as_str() {
            "histogram" => Some(ChartKind::Histogram),
            "line" => Some(ChartKind::Line),
            "box" => Some(ChartKind::Box),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Line => "line",
            ChartKind::Box => "box",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Histogram => "Histogram",
            ChartKind::Line => "Line",
            ChartKind::Box => "Box Plot",
        }
    }

    /// Cycle order used by the chart toggle.
    pub fn next(self) -> ChartKind {
        match self {
            ChartKind::Histogram => ChartKind::Line,
            ChartKind::Line => ChartKind::Box,
            ChartKind::Box => ChartKind::Histogram,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub box_width: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 300.0,
            height: 120.0,
            margins: Margins {
                top: 4.0,
                right: 6.0,
                bottom: 18.0,
                left: 24.0,
            },
            box_width: 40.0,
        }
    }
}

impl Viewport {
    pub fn plot_width(&self) -> f64 {
        (self.width - self.margins.left - self.margins.right).max(0.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - self.margins.top - self.margins.bottom).max(0.0)
    }

    pub fn plot_left(&self) -> f64 {
        self.margins.left
    }

    pub fn plot_right(&self) -> f64 {
        self.width - self.margins.right
    }

    pub fn plot_top(&self) -> f64 {
        self.margins.top
    }

    pub fn plot_bottom(&self) -> f64 {
        self.height - self.margins.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Dashed line marking the reference value (the distribution mean).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub value: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub value: f64,
    pub count: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramGeometry {
    pub bins: Vec<Bar>,
    pub slot_width: f64,
    pub max_count: usize,
    pub reference_bin: Option<usize>,
    pub reference: Option<ReferenceLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineGeometry {
    pub points: Vec<Point>,
    pub min: f64,
    pub max: f64,
    pub reference: Option<ReferenceLine>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub iqr: f64,
    pub low_whisker: f64,
    pub high_whisker: f64,
}

impl BoxStats {
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.low_whisker || value > self.high_whisker
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outlier {
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxGeometry {
    pub stats: BoxStats,
    pub center_x: f64,
    pub box_width: f64,
    pub low_y: f64,
    pub q1_y: f64,
    pub q2_y: f64,
    pub q3_y: f64,
    pub high_y: f64,
    pub outliers: Vec<Outlier>,
    pub reference: Option<ReferenceLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Histogram(HistogramGeometry),
    Line(LineGeometry),
    Box(BoxGeometry),
}

impl Geometry {
    pub fn kind(&self) -> ChartKind {
        match self {
            Geometry::Histogram(_) => ChartKind::Histogram,
            Geometry::Line(_) => ChartKind::Line,
            Geometry::Box(_) => ChartKind::Box,
        }
    }

    pub fn reference(&self) -> Option<&ReferenceLine> {
        match self {
            Geometry::Histogram(h) => h.reference.as_ref(),
            Geometry::Line(l) => l.reference.as_ref(),
            Geometry::Box(b) => b.reference.as_ref(),
        }
    }
}

pub fn layout(
    values: &[f64],
    reference: Option<f64>,
    kind: ChartKind,
    viewport: &Viewport,
) -> Option<Geometry> {
    if values.is_empty() {
        return None;
    }
    let sorted = sanitize_sorted(values);
    let reference = reference.filter(|r| r.is_finite());
    let geometry = match kind {
        ChartKind::Histogram => Geometry::Histogram(histogram(&sorted, reference, viewport)),
        ChartKind::Line => Geometry::Line(line(&sorted, reference, viewport)),
        ChartKind::Box => Geometry::Box(box_plot(&sorted, reference, viewport)),
    };
    Some(geometry)
}

/// Like [`layout`] but takes the chart kind by name; unknown names give `None`.
pub fn layout_named(
    values: &[f64],
    reference: Option<f64>,
    kind: &str,
    viewport: &Viewport,
) -> Option<Geometry> {
    let kind = ChartKind::parse(kind)?;
    layout(values, reference, kind, viewport)
}

/// Loose numeric coercion for distribution entries off the wire.
pub fn coerce_values(raw: &[Value]) -> Vec<f64> {
    raw.iter().map(coerce_value).collect()
}

fn coerce_value(raw: &Value) -> f64 {
    let v = match raw {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Quartiles by index selection on the sorted values, whiskers at the
/// Tukey fences clipped to the data range.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    Some(box_stats_sorted(&sanitize_sorted(values)))
}

fn box_stats_sorted(sorted: &[f64]) -> BoxStats {
    let n = sorted.len();
    let pick = |p: f64| sorted[((n as f64 * p).floor() as usize).min(n - 1)];
    let q1 = pick(0.25);
    let q2 = pick(0.5);
    let q3 = pick(0.75);
    let iqr = q3 - q1;
    BoxStats {
        q1,
        q2,
        q3,
        iqr,
        low_whisker: sorted[0].max(q1 - WHISKER_SPAN * iqr),
        high_whisker: sorted[n - 1].min(q3 + WHISKER_SPAN * iqr),
    }
}

/// Half-up rounding, so `2.5` rounds to `3` and `-2.5` to `-2`.
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Bin for the reference marker: the bin equal to the rounded reference,
/// otherwise the bin nearest the reference (earliest on ties).
pub fn marker_bin(bin_values: &[f64], reference: f64) -> Option<usize> {
    let target = round_half_up(reference);
    if let Some(i) = bin_values.iter().position(|&v| v == target) {
        return Some(i);
    }
    bin_values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - reference).abs().total_cmp(&(*b - reference).abs()))
        .map(|(i, _)| i)
}

fn sanitize_sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() && v != 0.0 { v } else { 0.0 })
        .collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn span(min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 {
        1.0
    } else {
        range
    }
}

fn histogram(sorted: &[f64], reference: Option<f64>, vp: &Viewport) -> HistogramGeometry {
    let groups: Vec<(usize, f64)> = sorted.iter().copied().dedup_with_count().collect();
    let max_count = groups.iter().map(|&(count, _)| count).max().unwrap_or(1).max(1);
    let slot_width = vp.plot_width() / groups.len() as f64;
    let plot_height = vp.plot_height();
    let bottom = vp.plot_bottom();

    let bins: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, &(count, value))| {
            let height = count as f64 / max_count as f64 * plot_height;
            Bar {
                value,
                count,
                x: vp.plot_left() + i as f64 * slot_width,
                y: bottom - height,
                width: slot_width * BAR_FILL,
                height,
            }
        })
        .collect();

    let bin_values: Vec<f64> = groups.iter().map(|&(_, v)| v).collect();
    let reference_bin = reference.and_then(|r| marker_bin(&bin_values, r));
    let reference = reference.zip(reference_bin).map(|(value, i)| {
        let x = vp.plot_left() + i as f64 * slot_width + slot_width / 2.0;
        ReferenceLine {
            value,
            x1: x,
            y1: vp.plot_top(),
            x2: x,
            y2: bottom,
        }
    });

    HistogramGeometry {
        bins,
        slot_width,
        max_count,
        reference_bin,
        reference,
    }
}

fn line(sorted: &[f64], reference: Option<f64>, vp: &Viewport) -> LineGeometry {
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];
    let range = span(min, max);
    let divisor = if n > 1 { (n - 1) as f64 } else { 1.0 };
    let plot_width = vp.plot_width();
    let plot_height = vp.plot_height();
    let scale_y = |v: f64| vp.plot_top() + plot_height - (v - min) / range * plot_height;

    let points = sorted
        .iter()
        .enumerate()
        .map(|(i, &v)| Point {
            x: vp.plot_left() + i as f64 / divisor * plot_width,
            y: scale_y(v),
        })
        .collect();

    let reference = reference.map(|value| {
        let y = scale_y(value);
        ReferenceLine {
            value,
            x1: vp.plot_left(),
            y1: y,
            x2: vp.plot_right(),
            y2: y,
        }
    });

    LineGeometry {
        points,
        min,
        max,
        reference,
    }
}

fn box_plot(sorted: &[f64], reference: Option<f64>, vp: &Viewport) -> BoxGeometry {
    let stats = box_stats_sorted(sorted);
    let n = sorted.len();
    let floor = stats.low_whisker.min(sorted[0]);
    let range = span(floor, stats.high_whisker.max(sorted[n - 1]));
    let plot_height = vp.plot_height();
    let scale_y = |v: f64| vp.plot_top() + plot_height - (v - floor) / range * plot_height;
    let center_x = (vp.plot_left() + vp.plot_right()) / 2.0;

    let outliers = sorted
        .iter()
        .filter(|&&v| stats.is_outlier(v))
        .map(|&value| Outlier {
            value,
            x: center_x,
            y: scale_y(value),
        })
        .collect();

    let reference = reference.map(|value| {
        let y = scale_y(value);
        ReferenceLine {
            value,
            x1: vp.plot_left(),
            y1: y,
            x2: vp.plot_right(),
            y2: y,
        }
    });

    BoxGeometry {
        stats,
        center_x,
        box_width: vp.box_width,
        low_y: scale_y(stats.low_whisker),
        q1_y: scale_y(stats.q1),
        q2_y: scale_y(stats.q2),
        q3_y: scale_y(stats.q3),
        high_y: scale_y(stats.high_whisker),
        outliers,
        reference,
    }
}
