//! Core domain types: incidents, their categorical fields, and the view catalog.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Priority
// ============================================================================

/// Incident priority, ordered by severity (most severe first)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Moderate,
    Low,
    Planning,
}

impl Priority {
    pub fn all() -> &'static [Priority] {
        &[
            Priority::Critical,
            Priority::High,
            Priority::Moderate,
            Priority::Low,
            Priority::Planning,
        ]
    }

    /// Severity rank, 1 = most severe
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::High => 2,
            Priority::Moderate => 3,
            Priority::Low => 4,
            Priority::Planning => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Moderate => "Moderate",
            Priority::Low => "Low",
            Priority::Planning => "Planning",
        }
    }

    /// Canonical label as written in the dataset, e.g. `"1 - Critical"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.rank(), self.name())
    }

    /// Parse a priority cell.
    ///
    /// Accepts `"1 - Critical"`, `"P1"`, `"1"` and `"critical"` style values.
    pub fn parse(value: &str) -> Option<Self> {
        let lower = value.trim().to_lowercase();
        let ranked = match lower.strip_prefix('p') {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
            _ => lower.as_str(),
        };

        if let Some(first) = ranked.chars().next() {
            if let Some(rank) = first.to_digit(10) {
                let rest = ranked[1..].trim_start();
                if rest.is_empty() || rest.starts_with('-') {
                    return Self::from_rank(rank as u8);
                }
                return None;
            }
        }

        match ranked {
            "critical" => Some(Priority::Critical),
            "high" => Some(Priority::High),
            "moderate" | "medium" => Some(Priority::Moderate),
            "low" => Some(Priority::Low),
            "planning" => Some(Priority::Planning),
            _ => None,
        }
    }

    fn from_rank(rank: u8) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.rank() == rank)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ============================================================================
// State
// ============================================================================

/// Lifecycle state, declared in workflow order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum State {
    New,
    InProgress,
    OnHold,
    Resolved,
    Closed,
    Cancelled,
}

impl State {
    /// All states in workflow order
    pub fn all() -> &'static [State] {
        &[
            State::New,
            State::InProgress,
            State::OnHold,
            State::Resolved,
            State::Closed,
            State::Cancelled,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            State::New => "New",
            State::InProgress => "In Progress",
            State::OnHold => "On Hold",
            State::Resolved => "Resolved",
            State::Closed => "Closed",
            State::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "new" => Some(State::New),
            "inprogress" => Some(State::InProgress),
            "onhold" => Some(State::OnHold),
            "resolved" => Some(State::Resolved),
            "closed" => Some(State::Closed),
            "cancelled" | "canceled" => Some(State::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Incident
// ============================================================================

/// One row of the incident dataset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: String,
    pub opened_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub priority: Priority,
    pub state: State,
    pub category: String,
    pub subcategory: String,
    pub assignment_group: String,
    pub assignee: String,
    pub channel: String,
    pub location: String,
    pub configuration_item: String,
    pub time_to_first_response_minutes: f64,
    /// `None` while the incident is unresolved
    pub time_to_resolve_minutes: Option<f64>,
    pub reopen_count: u32,
    /// Ordinal 1..=5, `None` when the customer gave no score
    pub customer_satisfaction: Option<f64>,
    pub sla_target_minutes: f64,
    pub sla_breached: bool,
}

impl Incident {
    /// SLA is breached when resolution took longer than the target
    pub fn derive_sla_breached(time_to_resolve_minutes: f64, sla_target_minutes: f64) -> bool {
        time_to_resolve_minutes > sla_target_minutes
    }

    pub fn opened_date(&self) -> NaiveDate {
        self.opened_at.date()
    }
}

// ============================================================================
// IncidentTable
// ============================================================================

/// Immutable, validated set of incidents.
///
/// Built once by the loader; views only ever borrow it.
#[derive(Clone, Debug, Default)]
pub struct IncidentTable {
    name: String,
    rows: Vec<Incident>,
}

impl IncidentTable {
    /// Build a table, returning the id of the first duplicate on failure
    pub fn new(name: impl Into<String>, rows: Vec<Incident>) -> Result<Self, String> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if seen.insert(row.incident_id.as_str(), idx).is_some() {
                return Err(row.incident_id.clone());
            }
        }
        Ok(Self {
            name: name.into(),
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Incident] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Incident> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a IncidentTable {
    type Item = &'a Incident;
    type IntoIter = std::slice::Iter<'a, Incident>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ============================================================================
// Views and Charts
// ============================================================================

/// Chart primitive a view is drawn with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Heatmap,
    Box,
    Funnel,
    Scatter,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar",
            ChartKind::Line => "Line",
            ChartKind::Heatmap => "Heatmap",
            ChartKind::Box => "Box",
            ChartKind::Funnel => "Funnel",
            ChartKind::Scatter => "Scatter",
        }
    }
}

/// The ten named summary views
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    IncidentsByPriority,
    OpenedPerDay,
    MeanTtrByPriority,
    SlaBreachByGroup,
    StateByCategory,
    OpenedHourVsWeekday,
    TtrDistributionByCategory,
    CiPareto,
    WorkflowFunnel,
    FirstResponseVsCsat,
}

impl ViewKind {
    /// All views in dashboard tab order
    pub fn all() -> &'static [ViewKind] {
        &[
            ViewKind::IncidentsByPriority,
            ViewKind::OpenedPerDay,
            ViewKind::MeanTtrByPriority,
            ViewKind::SlaBreachByGroup,
            ViewKind::StateByCategory,
            ViewKind::OpenedHourVsWeekday,
            ViewKind::TtrDistributionByCategory,
            ViewKind::CiPareto,
            ViewKind::WorkflowFunnel,
            ViewKind::FirstResponseVsCsat,
        ]
    }

    /// Chart title
    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::IncidentsByPriority => "Incidents by Priority",
            ViewKind::OpenedPerDay => "Incidents Opened per Day",
            ViewKind::MeanTtrByPriority => "Mean TTR by Priority",
            ViewKind::SlaBreachByGroup => "Top 10 Assignment Groups by SLA Breach %",
            ViewKind::StateByCategory => "Incident States by Category",
            ViewKind::OpenedHourVsWeekday => "Incidents Opened: Hour vs Weekday",
            ViewKind::TtrDistributionByCategory => "TTR Distribution by Category",
            ViewKind::CiPareto => "Pareto: Top 10 Configuration Items",
            ViewKind::WorkflowFunnel => "Workflow Funnel by State",
            ViewKind::FirstResponseVsCsat => "First Response Time vs CSAT",
        }
    }

    /// Short label for the dashboard tab
    pub fn tab_label(&self) -> &'static str {
        match self {
            ViewKind::IncidentsByPriority => "Priority Mix",
            ViewKind::OpenedPerDay => "Daily Volume",
            ViewKind::MeanTtrByPriority => "TTR by Priority",
            ViewKind::SlaBreachByGroup => "SLA Breach %",
            ViewKind::StateByCategory => "State by Category",
            ViewKind::OpenedHourVsWeekday => "Hourly Heatmap",
            ViewKind::TtrDistributionByCategory => "TTR by Category",
            ViewKind::CiPareto => "CI Pareto",
            ViewKind::WorkflowFunnel => "State Funnel",
            ViewKind::FirstResponseVsCsat => "First Response vs CSAT",
        }
    }

    /// URL and file name slug
    pub fn slug(&self) -> &'static str {
        match self {
            ViewKind::IncidentsByPriority => "incidents-by-priority",
            ViewKind::OpenedPerDay => "opened-per-day",
            ViewKind::MeanTtrByPriority => "mean-ttr-by-priority",
            ViewKind::SlaBreachByGroup => "sla-breach-by-group",
            ViewKind::StateByCategory => "state-by-category",
            ViewKind::OpenedHourVsWeekday => "opened-hour-vs-weekday",
            ViewKind::TtrDistributionByCategory => "ttr-distribution-by-category",
            ViewKind::CiPareto => "ci-pareto",
            ViewKind::WorkflowFunnel => "workflow-funnel",
            ViewKind::FirstResponseVsCsat => "first-response-vs-csat",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.slug() == slug)
    }

    /// The one chart type each view is drawn with
    pub fn chart_kind(&self) -> ChartKind {
        match self {
            ViewKind::IncidentsByPriority
            | ViewKind::MeanTtrByPriority
            | ViewKind::SlaBreachByGroup
            | ViewKind::StateByCategory
            | ViewKind::CiPareto => ChartKind::Bar,
            ViewKind::OpenedPerDay => ChartKind::Line,
            ViewKind::OpenedHourVsWeekday => ChartKind::Heatmap,
            ViewKind::TtrDistributionByCategory => ChartKind::Box,
            ViewKind::WorkflowFunnel => ChartKind::Funnel,
            ViewKind::FirstResponseVsCsat => ChartKind::Scatter,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
