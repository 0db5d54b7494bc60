//! Chart primitives drawn as SVG: bar, stacked bar, line, heatmap, box,
//! funnel, scatter and the Pareto bar-plus-cumulative-line combination.

use super::svg::{format_tick, nice_max, Anchor, LinearScale, SvgDocument};
use crate::constants::{AXIS_COLOR, CHART_COLORS, CHART_MARGIN, EMPTY_VIEW_TEXT, GRID_COLOR};
use crate::data::views::{BoxStats, HeatmapGrid, ParetoEntry, StackedCounts};
use serde::{Deserialize, Serialize};

/// Number of horizontal grid lines on value axes
const TICKS: usize = 5;

/// Pixel size of a rendered chart
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: crate::constants::DEFAULT_CHART_WIDTH,
            height: crate::constants::DEFAULT_CHART_HEIGHT,
        }
    }
}

/// Plot area inside the margins
#[derive(Clone, Copy, Debug)]
struct Plot {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Plot {
    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Width of one of `n` equal category bands
    fn band(&self, n: usize) -> f64 {
        self.width() / n.max(1) as f64
    }
}

fn color(i: usize) -> &'static str {
    CHART_COLORS[i % CHART_COLORS.len()]
}

/// Document with title, plot area and axis captions
fn frame(size: ChartSize, title: &str, x_label: &str, y_label: &str) -> (SvgDocument, Plot) {
    let mut doc = SvgDocument::new(size.width, size.height);
    let (top, right, bottom, left) = CHART_MARGIN;
    let plot = Plot {
        left,
        top,
        right: doc.width() - right,
        bottom: doc.height() - bottom,
    };

    doc.text(doc.width() / 2.0, 28.0, title, 18, Anchor::Middle);
    if !x_label.is_empty() {
        doc.text(
            plot.left + plot.width() / 2.0,
            doc.height() - 12.0,
            x_label,
            12,
            Anchor::Middle,
        );
    }
    if !y_label.is_empty() {
        doc.text_rotated(18.0, plot.top + plot.height() / 2.0, y_label, 12, Anchor::Middle, -90.0);
    }
    (doc, plot)
}

/// Horizontal grid and tick labels for a value axis starting at zero
fn value_axis(doc: &mut SvgDocument, plot: &Plot, max: f64) -> LinearScale {
    let scale = LinearScale::new((0.0, max), (plot.bottom, plot.top));
    for i in 0..=TICKS {
        let value = max * i as f64 / TICKS as f64;
        let y = scale.map(value);
        doc.line(plot.left, y, plot.right, y, GRID_COLOR, 1.0);
        doc.text(plot.left - 8.0, y + 4.0, &format_tick(value), 11, Anchor::End);
    }
    doc.line(plot.left, plot.bottom, plot.right, plot.bottom, AXIS_COLOR, 1.0);
    scale
}

/// Category labels centered under each band, rotated when crowded
fn category_axis(doc: &mut SvgDocument, plot: &Plot, labels: &[String]) {
    let band = plot.band(labels.len());
    let crowded = band < 70.0;
    for (i, label) in labels.iter().enumerate() {
        let x = plot.left + band * (i as f64 + 0.5);
        if crowded {
            doc.text_rotated(x, plot.bottom + 14.0, label, 11, Anchor::End, -40.0);
        } else {
            doc.text(x, plot.bottom + 18.0, label, 11, Anchor::Middle);
        }
    }
}

/// Placeholder drawn for a view without data
pub fn placeholder(size: ChartSize, title: &str) -> String {
    let (mut doc, plot) = frame(size, title, "", "");
    doc.text(
        plot.left + plot.width() / 2.0,
        plot.top + plot.height() / 2.0,
        EMPTY_VIEW_TEXT,
        16,
        Anchor::Middle,
    );
    doc.finish(title)
}

/// Vertical bars, one per label
pub fn bar_chart(
    size: ChartSize,
    title: &str,
    x_label: &str,
    y_label: &str,
    bars: &[(String, f64)],
) -> String {
    let (mut doc, plot) = frame(size, title, x_label, y_label);
    let max = nice_max(bars.iter().map(|(_, v)| *v).fold(0.0, f64::max));
    let scale = value_axis(&mut doc, &plot, max);
    let band = plot.band(bars.len());

    for (i, (label, value)) in bars.iter().enumerate() {
        let x = plot.left + band * i as f64 + band * 0.15;
        let y = scale.map(*value);
        let tip = format!("{}: {}", label, format_tick(*value));
        doc.rect(x, y, band * 0.7, plot.bottom - y, color(0), Some(&tip));
    }

    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    category_axis(&mut doc, &plot, &labels);
    doc.finish(title)
}

/// Stacked bars: one bar per category, one colored segment per state
pub fn stacked_bar_chart(size: ChartSize, title: &str, data: &StackedCounts) -> String {
    let (mut doc, plot) = frame(size, title, "category", "count");
    let totals: Vec<u64> = data.counts.iter().map(|row| row.iter().sum()).collect();
    let max = nice_max(totals.iter().copied().max().unwrap_or(0) as f64);
    let scale = value_axis(&mut doc, &plot, max);
    let band = plot.band(data.categories.len());

    for (c, category) in data.categories.iter().enumerate() {
        let x = plot.left + band * c as f64 + band * 0.15;
        let mut running = 0u64;
        for (s, state) in data.states.iter().enumerate() {
            let count = data.counts[c][s];
            if count == 0 {
                continue;
            }
            let y_top = scale.map((running + count) as f64);
            let y_bottom = scale.map(running as f64);
            let tip = format!("{} / {}: {}", category, state, count);
            doc.rect(x, y_top, band * 0.7, y_bottom - y_top, color(s), Some(&tip));
            running += count;
        }
    }

    category_axis(&mut doc, &plot, &data.categories);

    // Legend
    for (s, state) in data.states.iter().enumerate() {
        let x = plot.right - 110.0;
        let y = plot.top + 16.0 * s as f64;
        doc.rect(x, y - 9.0, 10.0, 10.0, color(s), None);
        doc.text(x + 14.0, y, state.label(), 11, Anchor::Start);
    }
    doc.finish(title)
}

/// Connected points over evenly spaced labels
pub fn line_chart(
    size: ChartSize,
    title: &str,
    x_label: &str,
    y_label: &str,
    points: &[(String, f64)],
) -> String {
    let (mut doc, plot) = frame(size, title, x_label, y_label);
    let max = nice_max(points.iter().map(|(_, v)| *v).fold(0.0, f64::max));
    let scale = value_axis(&mut doc, &plot, max);
    let band = plot.band(points.len());

    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (plot.left + band * (i as f64 + 0.5), scale.map(*v)))
        .collect();
    doc.polyline(&coords, color(0), 2.0);
    for ((x, y), (label, value)) in coords.iter().zip(points) {
        let tip = format!("{}: {}", label, format_tick(*value));
        doc.circle(*x, *y, 2.5, color(0), Some(&tip));
    }

    // Thin out date labels so they stay legible
    let stride = (points.len() / 15).max(1);
    let labels: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, (l, _))| if i % stride == 0 { l.clone() } else { String::new() })
        .collect();
    category_axis(&mut doc, &plot, &labels);
    doc.finish(title)
}

/// Weekday × hour heatmap, cell shade proportional to count
pub fn heatmap(size: ChartSize, title: &str, grid: &HeatmapGrid) -> String {
    let (mut doc, plot) = frame(size, title, "opened hour", "");
    let rows = grid.weekdays.len().max(1);
    let cols = grid.hours.len().max(1);
    let cell_w = plot.width() / cols as f64;
    let cell_h = plot.height() / rows as f64;
    let max = grid.max().max(1) as f64;

    for (r, weekday) in grid.weekdays.iter().enumerate() {
        let y = plot.top + cell_h * r as f64;
        doc.text(plot.left - 6.0, y + cell_h / 2.0 + 4.0, weekday, 11, Anchor::End);
        for (c, hour) in grid.hours.iter().enumerate() {
            let count = grid.counts[r][c];
            // Lightness runs from near-white (0) to deep blue (max)
            let lightness = 96.0 - 56.0 * (count as f64 / max);
            let fill = format!("hsl(220, 85%, {:.0}%)", lightness);
            let tip = format!("{} {:02}:00: {}", weekday, hour, count);
            doc.rect(
                plot.left + cell_w * c as f64,
                y,
                cell_w - 1.0,
                cell_h - 1.0,
                &fill,
                Some(&tip),
            );
        }
    }
    for (c, hour) in grid.hours.iter().enumerate() {
        doc.text(
            plot.left + cell_w * (c as f64 + 0.5),
            plot.bottom + 16.0,
            &hour.to_string(),
            10,
            Anchor::Middle,
        );
    }
    doc.finish(title)
}

/// One box per category with whiskers and outlier dots
pub fn box_plot(size: ChartSize, title: &str, y_label: &str, stats: &[BoxStats]) -> String {
    let (mut doc, plot) = frame(size, title, "category", y_label);
    let max = nice_max(stats.iter().map(|s| s.max).fold(0.0, f64::max));
    let scale = value_axis(&mut doc, &plot, max);
    let band = plot.band(stats.len());

    for (i, s) in stats.iter().enumerate() {
        let center = plot.left + band * (i as f64 + 0.5);
        let half = band * 0.25;
        let fill = color(i);

        doc.line(center, scale.map(s.lower_whisker), center, scale.map(s.q1), AXIS_COLOR, 1.0);
        doc.line(center, scale.map(s.q3), center, scale.map(s.upper_whisker), AXIS_COLOR, 1.0);
        for whisker in [s.lower_whisker, s.upper_whisker] {
            let y = scale.map(whisker);
            doc.line(center - half / 2.0, y, center + half / 2.0, y, AXIS_COLOR, 1.0);
        }

        let tip = format!(
            "{} (n={}): q1 {} / median {} / q3 {}",
            s.label,
            s.count,
            format_tick(s.q1),
            format_tick(s.median),
            format_tick(s.q3)
        );
        let y_q3 = scale.map(s.q3);
        doc.rect(center - half, y_q3, half * 2.0, scale.map(s.q1) - y_q3, fill, Some(&tip));
        let y_median = scale.map(s.median);
        doc.line(center - half, y_median, center + half, y_median, "#ffffff", 2.0);

        for outlier in &s.outliers {
            doc.circle(center, scale.map(*outlier), 2.0, fill, None);
        }
    }

    let labels: Vec<String> = stats.iter().map(|s| s.label.clone()).collect();
    category_axis(&mut doc, &plot, &labels);
    doc.finish(title)
}

/// Centered horizontal bars, one per stage, widest stage spanning the plot
pub fn funnel(size: ChartSize, title: &str, stages: &[(String, u64)]) -> String {
    let (mut doc, plot) = frame(size, title, "count", "");
    let max = stages.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1) as f64;
    let row = plot.height() / stages.len().max(1) as f64;
    let center = plot.left + plot.width() / 2.0;

    for (i, (label, count)) in stages.iter().enumerate() {
        let y = plot.top + row * i as f64;
        let w = plot.width() * (*count as f64 / max);
        let tip = format!("{}: {}", label, count);
        doc.rect(center - w / 2.0, y + row * 0.1, w, row * 0.8, color(0), Some(&tip));
        doc.text(plot.left - 6.0, y + row / 2.0 + 4.0, label, 12, Anchor::End);
        doc.text(center, y + row / 2.0 + 4.0, &count.to_string(), 12, Anchor::Middle);
    }
    doc.finish(title)
}

/// Point cloud of (x, y) pairs
pub fn scatter(
    size: ChartSize,
    title: &str,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64)],
) -> String {
    let (mut doc, plot) = frame(size, title, x_label, y_label);
    let x_max = nice_max(points.iter().map(|(x, _)| *x).fold(0.0, f64::max));
    let y_max = nice_max(points.iter().map(|(_, y)| *y).fold(0.0, f64::max));
    let y_scale = value_axis(&mut doc, &plot, y_max);
    let x_scale = LinearScale::new((0.0, x_max), (plot.left, plot.right));

    for i in 0..=TICKS {
        let value = x_max * i as f64 / TICKS as f64;
        doc.text(x_scale.map(value), plot.bottom + 18.0, &format_tick(value), 11, Anchor::Middle);
    }
    for (x, y) in points {
        let tip = format!("{}, {}", format_tick(*x), format_tick(*y));
        doc.circle(x_scale.map(*x), y_scale.map(*y), 3.0, color(0), Some(&tip));
    }
    doc.finish(title)
}

/// Ranked bars with a cumulative-percentage line on a secondary 0-100 axis
pub fn pareto(size: ChartSize, title: &str, entries: &[ParetoEntry]) -> String {
    let (mut doc, plot) = frame(size, title, "configuration item", "count");
    let max = nice_max(entries.iter().map(|e| e.count).max().unwrap_or(0) as f64);
    let scale = value_axis(&mut doc, &plot, max);
    let pct_scale = LinearScale::new((0.0, 100.0), (plot.bottom, plot.top));
    let band = plot.band(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        let x = plot.left + band * i as f64 + band * 0.15;
        let y = scale.map(entry.count as f64);
        let tip = format!("{}: {}", entry.label, entry.count);
        doc.rect(x, y, band * 0.7, plot.bottom - y, color(0), Some(&tip));
    }

    let line: Vec<(f64, f64)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (plot.left + band * (i as f64 + 0.5), pct_scale.map(e.cumulative_pct)))
        .collect();
    doc.polyline(&line, color(2), 2.0);
    for ((x, y), entry) in line.iter().zip(entries) {
        let tip = format!("Cumulative: {:.1}%", entry.cumulative_pct);
        doc.circle(*x, *y, 3.0, color(2), Some(&tip));
    }

    for i in 0..=TICKS {
        let pct = 100.0 * i as f64 / TICKS as f64;
        doc.text(plot.right + 8.0, pct_scale.map(pct) + 4.0, &format!("{}%", pct), 11, Anchor::Start);
    }
    doc.line(plot.right, plot.top, plot.right, plot.bottom, AXIS_COLOR, 1.0);

    let labels: Vec<String> = entries.iter().map(|e| e.label.clone()).collect();
    category_axis(&mut doc, &plot, &labels);
    doc.finish(title)
}
