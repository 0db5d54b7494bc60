//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `IncidentBuilder` - Builder for a single incident with sensible defaults
//! - `TestTableBuilder` - Builder for an `IncidentTable`
//! - Helpers for writing datasets to disk

use chrono::{Duration, NaiveDateTime};
use incident_board::data::generator;
use incident_board::types::{Incident, IncidentTable, Priority, State};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Parse a `YYYY-MM-DDTHH:MM` timestamp
pub fn ts(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").unwrap()
}

// ============================================================================
// IncidentBuilder
// ============================================================================

/// Builder for one incident.
///
/// # Example
/// ```ignore
/// let incident = IncidentBuilder::new("INC1")
///     .priority(Priority::High)
///     .resolved_after(90.0)
///     .csat(4.0)
///     .build();
/// ```
pub struct IncidentBuilder {
    incident: Incident,
}

impl IncidentBuilder {
    /// A new, unresolved, moderate-priority network incident
    pub fn new(id: &str) -> Self {
        Self {
            incident: Incident {
                incident_id: id.to_string(),
                opened_at: ts("2024-01-01T10:00"),
                resolved_at: None,
                priority: Priority::Moderate,
                state: State::New,
                category: "Network".to_string(),
                subcategory: "VPN".to_string(),
                assignment_group: "Service Desk".to_string(),
                assignee: "alice.moreau".to_string(),
                channel: "Email".to_string(),
                location: "Berlin".to_string(),
                configuration_item: "vpn-gw-01".to_string(),
                time_to_first_response_minutes: 10.0,
                time_to_resolve_minutes: None,
                reopen_count: 0,
                customer_satisfaction: None,
                sla_target_minutes: 120.0,
                sla_breached: false,
            },
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.incident.priority = priority;
        self
    }

    pub fn state(mut self, state: State) -> Self {
        self.incident.state = state;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.incident.category = category.to_string();
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.incident.assignment_group = group.to_string();
        self
    }

    pub fn ci(mut self, ci: &str) -> Self {
        self.incident.configuration_item = ci.to_string();
        self
    }

    pub fn opened(mut self, at: &str) -> Self {
        self.incident.opened_at = ts(at);
        self
    }

    pub fn first_response(mut self, minutes: f64) -> Self {
        self.incident.time_to_first_response_minutes = minutes;
        self
    }

    pub fn sla_target(mut self, minutes: f64) -> Self {
        self.incident.sla_target_minutes = minutes;
        self
    }

    /// Resolve the incident `minutes` after opening, deriving the breach flag
    pub fn resolved_after(mut self, minutes: f64) -> Self {
        let incident = &mut self.incident;
        incident.time_to_resolve_minutes = Some(minutes);
        incident.resolved_at =
            Some(incident.opened_at + Duration::seconds((minutes * 60.0) as i64));
        incident.sla_breached = Incident::derive_sla_breached(minutes, incident.sla_target_minutes);
        if incident.state == State::New {
            incident.state = State::Resolved;
        }
        self
    }

    pub fn csat(mut self, score: f64) -> Self {
        self.incident.customer_satisfaction = Some(score);
        self
    }

    pub fn build(self) -> Incident {
        self.incident
    }
}

// ============================================================================
// TestTableBuilder
// ============================================================================

/// Builder for test tables; incident ids must be unique.
#[derive(Default)]
pub struct TestTableBuilder {
    rows: Vec<Incident>,
}

impl TestTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, incident: IncidentBuilder) -> Self {
        self.rows.push(incident.build());
        self
    }

    /// Add `n` incidents customised by `f`, with ids `<prefix>-<i>`
    pub fn with_many(
        mut self,
        prefix: &str,
        n: usize,
        f: impl Fn(IncidentBuilder) -> IncidentBuilder,
    ) -> Self {
        for i in 0..n {
            let builder = f(IncidentBuilder::new(&format!("{}-{}", prefix, i)));
            self.rows.push(builder.build());
        }
        self
    }

    pub fn build(self) -> IncidentTable {
        IncidentTable::new("test", self.rows).unwrap()
    }
}

/// Write incidents as a CSV file in `dir`
pub fn write_dataset(dir: &Path, name: &str, incidents: &[Incident]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    generator::write_csv(incidents, file).unwrap();
    path
}
