//! Synthetic incident dataset generator.
//!
//! Produces a reproducible, ServiceNow-flavoured incident table for the demo.
//! The same seed always yields the same rows.

use crate::data::csv_parser::write_csv_line;
use crate::data::loader::REQUIRED_COLUMNS;
use crate::types::{Incident, Priority, State};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CATEGORIES: [(&str, &[&str]); 5] = [
    ("Network", &["VPN", "Wi-Fi", "LAN"]),
    ("Software", &["Email", "ERP", "Browser"]),
    ("Hardware", &["Laptop", "Printer", "Monitor"]),
    ("Access", &["Password Reset", "Permissions", "MFA"]),
    ("Database", &["Performance", "Backup"]),
];

const GROUPS: [(&str, &[&str]); 6] = [
    ("Service Desk", &["alice.moreau", "bilal.khan", "chen.wei"]),
    ("Network Ops", &["dana.ortiz", "erik.lund"]),
    ("App Support", &["fatima.noor", "gareth.hughes", "hana.sato"]),
    ("Infrastructure", &["ivan.petrov", "jade.okafor"]),
    ("DBA", &["kofi.mensah", "lena.fischer"]),
    ("Security", &["mario.rossi", "nadia.haddad"]),
];

const CHANNELS: [(&str, u32); 5] = [
    ("Email", 30),
    ("Phone", 25),
    ("Self-service", 25),
    ("Chat", 15),
    ("Walk-in", 5),
];

const LOCATIONS: [&str; 5] = ["Berlin", "London", "New York", "Singapore", "Sydney"];

const PRIORITIES: [(Priority, u32); 5] = [
    (Priority::Critical, 5),
    (Priority::High, 15),
    (Priority::Moderate, 40),
    (Priority::Low, 30),
    (Priority::Planning, 10),
];

const STATES: [(State, u32); 6] = [
    (State::New, 8),
    (State::InProgress, 12),
    (State::OnHold, 5),
    (State::Resolved, 25),
    (State::Closed, 45),
    (State::Cancelled, 5),
];

/// Number of distinct configuration items
const CI_COUNT: usize = 25;

/// Parameters for a generated dataset
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub rows: usize,
    pub seed: u64,
    pub start: NaiveDate,
    pub days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 2_000,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            days: 90,
        }
    }
}

/// SLA resolution target per priority, in minutes
pub fn sla_target_minutes(priority: Priority) -> f64 {
    match priority {
        Priority::Critical => 240.0,
        Priority::High => 480.0,
        Priority::Moderate => 1_440.0,
        Priority::Low => 2_880.0,
        Priority::Planning => 4_320.0,
    }
}

/// Generate incidents for the given configuration
pub fn generate(config: &GeneratorConfig) -> Vec<Incident> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let ci_names: Vec<String> = (0..CI_COUNT).map(ci_name).collect();
    // Zipf-like weights so a handful of items dominate the Pareto chart
    let ci_weights: Vec<(usize, u32)> = (0..CI_COUNT).map(|i| (i, 1_000 / (i as u32 + 1))).collect();

    (0..config.rows)
        .map(|i| {
            let priority = pick(&mut rng, &PRIORITIES);
            let state = pick(&mut rng, &STATES);
            let (category, subcategories) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            let (group, assignees) = GROUPS[rng.gen_range(0..GROUPS.len())];
            let opened_at = opened_at(&mut rng, config);
            let target = sla_target_minutes(priority);

            let resolved = matches!(state, State::Resolved | State::Closed);
            let time_to_resolve_minutes = resolved.then(|| {
                // Most incidents land well inside target, a tail overshoots it
                let factor = 0.1 + 1.5 * rng.r#gen::<f64>().powi(2);
                round1(target * factor)
            });
            let resolved_at = time_to_resolve_minutes
                .map(|ttr| opened_at + Duration::seconds((ttr * 60.0).round() as i64));
            let sla_breached = time_to_resolve_minutes
                .map(|ttr| Incident::derive_sla_breached(ttr, target))
                .unwrap_or(false);

            let customer_satisfaction = (resolved && rng.gen_bool(0.7)).then(|| {
                let base: i32 = if sla_breached { 2 } else { 4 };
                f64::from((base + rng.gen_range(-1..=1)).clamp(1, 5))
            });

            let reopen_roll = rng.gen_range(0..100);
            let reopen_count = match reopen_roll {
                0..=2 => 2,
                3..=12 => 1,
                _ => 0,
            };

            Incident {
                incident_id: format!("INC{:07}", 1_000_000 + i),
                opened_at,
                resolved_at,
                priority,
                state,
                category: category.to_string(),
                subcategory: subcategories[rng.gen_range(0..subcategories.len())].to_string(),
                assignment_group: group.to_string(),
                assignee: assignees[rng.gen_range(0..assignees.len())].to_string(),
                channel: pick(&mut rng, &CHANNELS).to_string(),
                location: LOCATIONS[rng.gen_range(0..LOCATIONS.len())].to_string(),
                configuration_item: ci_names[pick(&mut rng, &ci_weights)].clone(),
                time_to_first_response_minutes: round1(
                    rng.gen_range(1.0..=(target / 8.0).max(2.0)),
                ),
                time_to_resolve_minutes,
                reopen_count,
                customer_satisfaction,
                sla_target_minutes: target,
                sla_breached,
            }
        })
        .collect()
}

/// Write incidents as CSV with the canonical header
pub fn write_csv<W: Write>(incidents: &[Incident], mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{}", write_csv_line(&REQUIRED_COLUMNS, ','))?;
    for incident in incidents {
        writeln!(writer, "{}", write_csv_line(&incident_cells(incident), ','))?;
    }
    writer.flush()
}

/// Cells of one incident in [`REQUIRED_COLUMNS`] order
pub fn incident_cells(incident: &Incident) -> Vec<String> {
    vec![
        incident.incident_id.clone(),
        incident.opened_at.format(TIMESTAMP_FORMAT).to_string(),
        incident
            .resolved_at
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
        incident.priority.label(),
        incident.state.label().to_string(),
        incident.category.clone(),
        incident.subcategory.clone(),
        incident.assignment_group.clone(),
        incident.assignee.clone(),
        incident.channel.clone(),
        incident.location.clone(),
        incident.configuration_item.clone(),
        incident.time_to_first_response_minutes.to_string(),
        incident
            .time_to_resolve_minutes
            .map(|v| v.to_string())
            .unwrap_or_default(),
        incident.reopen_count.to_string(),
        incident
            .customer_satisfaction
            .map(|v| v.to_string())
            .unwrap_or_default(),
        incident.sla_target_minutes.to_string(),
        incident.sla_breached.to_string(),
    ]
}

fn ci_name(i: usize) -> String {
    const KINDS: [&str; 5] = ["app", "db", "srv", "rtr", "lb"];
    format!("{}-{:02}", KINDS[i % KINDS.len()], i + 1)
}

/// Weighted choice over a small static table
fn pick<T: Copy>(rng: &mut StdRng, table: &[(T, u32)]) -> T {
    let total: u32 = table.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total.max(1));
    for (value, weight) in table {
        if roll < *weight {
            return *value;
        }
        roll -= weight;
    }
    table[table.len() - 1].0
}

/// Opening time skewed toward weekday business hours
fn opened_at(rng: &mut StdRng, config: &GeneratorConfig) -> NaiveDateTime {
    let day = config.start + Duration::days(i64::from(rng.gen_range(0..config.days.max(1))));
    let hour = if rng.gen_bool(0.75) {
        rng.gen_range(8..18)
    } else {
        rng.gen_range(0..24)
    };
    let time = NaiveTime::from_hms_opt(hour, rng.gen_range(0..60), rng.gen_range(0..60))
        .unwrap_or_default();
    day.and_time(time)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
