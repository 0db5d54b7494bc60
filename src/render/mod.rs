//! Renderer: maps each view result to its chart and places it on a surface.
//!
//! Both surfaces draw the same SVG from the same `ViewResult`. The dashboard
//! wraps it in a tab panel, the figure export writes it to a file.

mod charts;
mod figures;
mod page;
pub mod svg;

pub use charts::*;
pub use figures::*;
pub use page::*;

use crate::data::{ViewResult, ViewSet};
use crate::types::{ChartKind, ViewKind};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the renderer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Caller paired a view with another view's result
    #[error("cannot render {result:?} result as view {view:?}")]
    ViewMismatch { view: ViewKind, result: ViewKind },
}

/// A rendered chart ready for either surface
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartArtifact {
    pub view: ViewKind,
    pub chart: ChartKind,
    pub title: String,
    pub empty: bool,
    pub svg: String,
}

impl ChartArtifact {
    /// Tab panel element for the dashboard page
    pub fn page_element(&self) -> String {
        format!(
            r#"<section class="panel" id="panel-{slug}" data-chart="{chart}">{svg}</section>"#,
            slug = self.view.slug(),
            chart = self.chart.label().to_lowercase(),
            svg = self.svg
        )
    }

    /// File name used by the figure export, prefixed with its tab position
    pub fn figure_name(&self) -> String {
        let position = ViewKind::all()
            .iter()
            .position(|v| *v == self.view)
            .map(|i| i + 1)
            .unwrap_or(0);
        format!("{:02}-{}.svg", position, self.view.slug())
    }
}

/// Render a result as the view it belongs to
pub fn render_view(
    view: ViewKind,
    result: &ViewResult,
    size: ChartSize,
) -> Result<ChartArtifact, RenderError> {
    if result.kind() != view {
        return Err(RenderError::ViewMismatch {
            view,
            result: result.kind(),
        });
    }
    Ok(render(result, size))
}

/// Render a view result with the one chart type its view uses
pub fn render(result: &ViewResult, size: ChartSize) -> ChartArtifact {
    let view = result.kind();
    let title = view.title();
    let empty = result.is_empty();

    let svg = if empty {
        placeholder(size, title)
    } else {
        match result {
            ViewResult::IncidentsByPriority(counts) => {
                bar_chart(size, title, "priority", "count", &count_bars(counts))
            }
            ViewResult::OpenedPerDay(days) => {
                let points: Vec<(String, f64)> = days
                    .iter()
                    .map(|d| (d.date.to_string(), d.count as f64))
                    .collect();
                line_chart(size, title, "opened date", "count", &points)
            }
            ViewResult::MeanTtrByPriority(values) => bar_chart(
                size,
                title,
                "priority",
                "time_to_resolve_minutes",
                &value_bars(values),
            ),
            ViewResult::SlaBreachByGroup(values) => bar_chart(
                size,
                title,
                "assignment_group",
                "sla_breach_pct",
                &value_bars(values),
            ),
            ViewResult::StateByCategory(stacked) => stacked_bar_chart(size, title, stacked),
            ViewResult::OpenedHourVsWeekday(grid) => heatmap(size, title, grid),
            ViewResult::TtrDistributionByCategory(stats) => {
                box_plot(size, title, "time_to_resolve_minutes", stats)
            }
            ViewResult::CiPareto(entries) => pareto(size, title, entries),
            ViewResult::WorkflowFunnel(stages) => {
                let stages: Vec<(String, u64)> =
                    stages.iter().map(|s| (s.label.clone(), s.count)).collect();
                funnel(size, title, &stages)
            }
            ViewResult::FirstResponseVsCsat(points) => {
                let points: Vec<(f64, f64)> = points
                    .iter()
                    .map(|p| (p.first_response_minutes, p.customer_satisfaction))
                    .collect();
                scatter(
                    size,
                    title,
                    "time_to_first_response_minutes",
                    "customer_satisfaction",
                    &points,
                )
            }
        }
    };

    ChartArtifact {
        view,
        chart: view.chart_kind(),
        title: title.to_string(),
        empty,
        svg,
    }
}

/// Render every report of a view set, in tab order
pub fn render_all(views: &ViewSet, size: ChartSize) -> Vec<ChartArtifact> {
    views
        .reports
        .iter()
        .map(|report| render(&report.result, size))
        .collect()
}

fn count_bars(counts: &[crate::data::views::LabeledCount]) -> Vec<(String, f64)> {
    counts
        .iter()
        .map(|c| (c.label.clone(), c.count as f64))
        .collect()
}

fn value_bars(values: &[crate::data::views::LabeledValue]) -> Vec<(String, f64)> {
    values.iter().map(|v| (v.label.clone(), v.value)).collect()
}
