//! View computer: the ten named summary views over an [`IncidentTable`].
//!
//! Every view is a pure function of the table. Results are deterministic:
//! ties are broken by the natural order of the grouping key. Grouping and
//! aggregation happen here rather than in the render path, so the dashboard
//! and the static figures chart identical numbers.

use crate::constants::{PARETO_TOP_N, SLA_BREACH_TOP_N};
use crate::perf::PerfLog;
use crate::types::{IncidentTable, Priority, State, ViewKind};
use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Weekday labels in heatmap row order
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ============================================================================
// Result shapes
// ============================================================================

/// A category with an incident count
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabeledCount {
    pub label: String,
    pub count: u64,
}

/// A category with a numeric metric
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Category × state counts; `counts[c][s]` pairs `categories[c]` with `states[s]`
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StackedCounts {
    pub categories: Vec<String>,
    pub states: Vec<State>,
    pub counts: Vec<Vec<u64>>,
}

/// Weekday × hour grid, always 7 rows of 24 cells
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub weekdays: Vec<String>,
    pub hours: Vec<u32>,
    pub counts: Vec<Vec<u64>>,
}

impl HeatmapGrid {
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn max(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Five-number summary with 1.5·IQR whiskers
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParetoEntry {
    pub label: String,
    pub count: u64,
    pub cumulative_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub incident_id: String,
    pub first_response_minutes: f64,
    pub customer_satisfaction: f64,
}

/// Aggregated result of one view, tagged by the view that produced it
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum ViewResult {
    IncidentsByPriority(Vec<LabeledCount>),
    OpenedPerDay(Vec<DailyCount>),
    MeanTtrByPriority(Vec<LabeledValue>),
    SlaBreachByGroup(Vec<LabeledValue>),
    StateByCategory(StackedCounts),
    OpenedHourVsWeekday(HeatmapGrid),
    TtrDistributionByCategory(Vec<BoxStats>),
    CiPareto(Vec<ParetoEntry>),
    WorkflowFunnel(Vec<LabeledCount>),
    FirstResponseVsCsat(Vec<ScatterPoint>),
}

impl ViewResult {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewResult::IncidentsByPriority(_) => ViewKind::IncidentsByPriority,
            ViewResult::OpenedPerDay(_) => ViewKind::OpenedPerDay,
            ViewResult::MeanTtrByPriority(_) => ViewKind::MeanTtrByPriority,
            ViewResult::SlaBreachByGroup(_) => ViewKind::SlaBreachByGroup,
            ViewResult::StateByCategory(_) => ViewKind::StateByCategory,
            ViewResult::OpenedHourVsWeekday(_) => ViewKind::OpenedHourVsWeekday,
            ViewResult::TtrDistributionByCategory(_) => ViewKind::TtrDistributionByCategory,
            ViewResult::CiPareto(_) => ViewKind::CiPareto,
            ViewResult::WorkflowFunnel(_) => ViewKind::WorkflowFunnel,
            ViewResult::FirstResponseVsCsat(_) => ViewKind::FirstResponseVsCsat,
        }
    }

    /// True when the grouping produced no data to chart
    pub fn is_empty(&self) -> bool {
        match self {
            ViewResult::IncidentsByPriority(v) => v.is_empty(),
            ViewResult::OpenedPerDay(v) => v.is_empty(),
            ViewResult::MeanTtrByPriority(v) => v.is_empty(),
            ViewResult::SlaBreachByGroup(v) => v.is_empty(),
            ViewResult::StateByCategory(s) => s.categories.is_empty(),
            ViewResult::OpenedHourVsWeekday(grid) => grid.total() == 0,
            ViewResult::TtrDistributionByCategory(v) => v.is_empty(),
            ViewResult::CiPareto(v) => v.is_empty(),
            ViewResult::WorkflowFunnel(v) => v.iter().all(|s| s.count == 0),
            ViewResult::FirstResponseVsCsat(v) => v.is_empty(),
        }
    }
}

/// Non-fatal notice that a view had nothing to aggregate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EmptyGroupWarning {
    pub view: ViewKind,
}

impl fmt::Display for EmptyGroupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view '{}' has no data to chart", self.view.title())
    }
}

/// One computed view with its optional empty-group warning
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewReport {
    pub kind: ViewKind,
    pub result: ViewResult,
    pub warning: Option<EmptyGroupWarning>,
}

impl ViewReport {
    pub fn new(result: ViewResult) -> Self {
        let kind = result.kind();
        let warning = result.is_empty().then_some(EmptyGroupWarning { view: kind });
        Self {
            kind,
            result,
            warning,
        }
    }
}

/// All ten views plus how long each took
#[derive(Clone, Debug)]
pub struct ViewSet {
    pub reports: Vec<ViewReport>,
    pub perf: PerfLog,
}

impl ViewSet {
    pub fn get(&self, kind: ViewKind) -> Option<&ViewReport> {
        self.reports.iter().find(|r| r.kind == kind)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &EmptyGroupWarning> {
        self.reports.iter().filter_map(|r| r.warning.as_ref())
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Compute a single view
pub fn compute(kind: ViewKind, table: &IncidentTable) -> ViewResult {
    match kind {
        ViewKind::IncidentsByPriority => ViewResult::IncidentsByPriority(incidents_by_priority(table)),
        ViewKind::OpenedPerDay => ViewResult::OpenedPerDay(opened_per_day(table)),
        ViewKind::MeanTtrByPriority => ViewResult::MeanTtrByPriority(mean_ttr_by_priority(table)),
        ViewKind::SlaBreachByGroup => ViewResult::SlaBreachByGroup(sla_breach_by_group(table)),
        ViewKind::StateByCategory => ViewResult::StateByCategory(state_by_category(table)),
        ViewKind::OpenedHourVsWeekday => {
            ViewResult::OpenedHourVsWeekday(opened_hour_vs_weekday(table))
        }
        ViewKind::TtrDistributionByCategory => {
            ViewResult::TtrDistributionByCategory(ttr_distribution_by_category(table))
        }
        ViewKind::CiPareto => ViewResult::CiPareto(ci_pareto(table)),
        ViewKind::WorkflowFunnel => ViewResult::WorkflowFunnel(workflow_funnel(table)),
        ViewKind::FirstResponseVsCsat => {
            ViewResult::FirstResponseVsCsat(first_response_vs_csat(table))
        }
    }
}

/// Compute every view in tab order, logging empty-group warnings
pub fn compute_all(table: &IncidentTable) -> ViewSet {
    let mut perf = PerfLog::new();
    let reports: Vec<ViewReport> = ViewKind::all()
        .iter()
        .map(|kind| {
            let result = perf.measure(kind.slug(), || compute(*kind, table));
            let report = ViewReport::new(result);
            if let Some(warning) = &report.warning {
                tracing::warn!("EmptyGroupWarning: {}", warning);
            }
            report
        })
        .collect();

    tracing::debug!(
        "Computed {} views over {} incidents in {:.2}ms",
        reports.len(),
        table.len(),
        perf.total_ms()
    );

    ViewSet { reports, perf }
}

// ============================================================================
// Views
// ============================================================================

/// Incident count per priority, in severity order
pub fn incidents_by_priority(table: &IncidentTable) -> Vec<LabeledCount> {
    let mut counts: BTreeMap<Priority, u64> = BTreeMap::new();
    for incident in table {
        *counts.entry(incident.priority).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(priority, count)| LabeledCount {
            label: priority.label(),
            count,
        })
        .collect()
}

/// Incidents opened per calendar day, chronological
pub fn opened_per_day(table: &IncidentTable) -> Vec<DailyCount> {
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for incident in table {
        *counts.entry(incident.opened_date()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Mean time-to-resolve per priority; unresolved incidents are skipped
pub fn mean_ttr_by_priority(table: &IncidentTable) -> Vec<LabeledValue> {
    let mut sums: BTreeMap<Priority, (f64, u64)> = BTreeMap::new();
    for incident in table {
        if let Some(ttr) = incident.time_to_resolve_minutes {
            let entry = sums.entry(incident.priority).or_default();
            entry.0 += ttr;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(priority, (sum, n))| LabeledValue {
            label: priority.label(),
            value: sum / n as f64,
        })
        .collect()
}

/// Share of breached incidents per assignment group, as a percentage.
///
/// Rounded to two decimals, sorted by descending breach rate with ties by
/// group name, truncated to the top [`SLA_BREACH_TOP_N`] groups.
pub fn sla_breach_by_group(table: &IncidentTable) -> Vec<LabeledValue> {
    let mut groups: HashMap<&str, (u64, u64)> = HashMap::new();
    for incident in table {
        let entry = groups.entry(incident.assignment_group.as_str()).or_default();
        entry.0 += u64::from(incident.sla_breached);
        entry.1 += 1;
    }

    let mut rates: Vec<LabeledValue> = groups
        .into_iter()
        .map(|(group, (breached, total))| LabeledValue {
            label: group.to_string(),
            value: round2(breached as f64 / total as f64 * 100.0),
        })
        .collect();

    rates.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    rates.truncate(SLA_BREACH_TOP_N);
    rates
}

/// Counts per category and state.
///
/// Categories are alphabetical; only states that occur are listed, in
/// workflow order. Missing combinations are zero.
pub fn state_by_category(table: &IncidentTable) -> StackedCounts {
    let mut cells: BTreeMap<&str, BTreeMap<State, u64>> = BTreeMap::new();
    for incident in table {
        *cells
            .entry(incident.category.as_str())
            .or_default()
            .entry(incident.state)
            .or_default() += 1;
    }

    let states: Vec<State> = State::all()
        .iter()
        .copied()
        .filter(|state| cells.values().any(|row| row.contains_key(state)))
        .collect();

    let counts = cells
        .values()
        .map(|row| {
            states
                .iter()
                .map(|state| row.get(state).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    StackedCounts {
        categories: cells.keys().map(|c| c.to_string()).collect(),
        states,
        counts,
    }
}

/// Opened incidents on a Monday-first weekday × hour-of-day grid
pub fn opened_hour_vs_weekday(table: &IncidentTable) -> HeatmapGrid {
    let mut counts = vec![vec![0u64; 24]; 7];
    for incident in table {
        let day = incident.opened_at.weekday().num_days_from_monday() as usize;
        let hour = incident.opened_at.hour() as usize;
        counts[day][hour] += 1;
    }
    HeatmapGrid {
        weekdays: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        hours: (0..24).collect(),
        counts,
    }
}

/// Time-to-resolve distribution per category, alphabetical
pub fn ttr_distribution_by_category(table: &IncidentTable) -> Vec<BoxStats> {
    let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for incident in table {
        if let Some(ttr) = incident.time_to_resolve_minutes {
            values.entry(incident.category.as_str()).or_default().push(ttr);
        }
    }
    values
        .into_iter()
        .filter_map(|(category, mut v)| box_stats(category, &mut v))
        .collect()
}

/// Top configuration items by incident count with cumulative share.
///
/// Items past the top [`PARETO_TOP_N`] are dropped, not folded into an
/// "other" bucket; the cumulative share is relative to the kept items.
pub fn ci_pareto(table: &IncidentTable) -> Vec<ParetoEntry> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for incident in table {
        *counts.entry(incident.configuration_item.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(PARETO_TOP_N);

    let kept: u64 = ranked.iter().map(|(_, n)| n).sum();
    let mut running = 0u64;
    ranked
        .into_iter()
        .map(|(item, count)| {
            running += count;
            ParetoEntry {
                label: item.to_string(),
                count,
                cumulative_pct: running as f64 / kept as f64 * 100.0,
            }
        })
        .collect()
}

/// Incident count for every workflow state, zero-filled, in workflow order
pub fn workflow_funnel(table: &IncidentTable) -> Vec<LabeledCount> {
    let mut counts: HashMap<State, u64> = HashMap::new();
    for incident in table {
        *counts.entry(incident.state).or_default() += 1;
    }
    State::all()
        .iter()
        .map(|state| LabeledCount {
            label: state.label().to_string(),
            count: counts.get(state).copied().unwrap_or(0),
        })
        .collect()
}

/// First response time paired with CSAT; incidents without a score are excluded
pub fn first_response_vs_csat(table: &IncidentTable) -> Vec<ScatterPoint> {
    table
        .iter()
        .filter_map(|incident| {
            incident
                .customer_satisfaction
                .map(|csat| ScatterPoint {
                    incident_id: incident.incident_id.clone(),
                    first_response_minutes: incident.time_to_first_response_minutes,
                    customer_satisfaction: csat,
                })
        })
        .collect()
}

// ============================================================================
// Helpers
// ============================================================================

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Quantile by linear interpolation between closest ranks; `sorted` must be non-empty
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn box_stats(label: &str, values: &mut [f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile(values, 0.25);
    let median = quantile(values, 0.5);
    let q3 = quantile(values, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min).min(q1);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max).max(q3);

    Some(BoxStats {
        label: label.to_string(),
        count: values.len(),
        min: values[0],
        q1,
        median,
        q3,
        max: values[values.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers: values
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect(),
    })
}
