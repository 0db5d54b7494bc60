//! End-to-end pipeline: generate, write, load, compute, render and export.

use crate::helpers::write_dataset;
use incident_board::data::generator::{generate, GeneratorConfig};
use incident_board::data::{self, compute_all, ViewResult};
use incident_board::render::{render_all, write_figures, ChartSize, SUMMARY_FILE};
use incident_board::types::ViewKind;
use std::fs;
use tempfile::TempDir;

fn config(rows: usize) -> GeneratorConfig {
    GeneratorConfig {
        rows,
        seed: 11,
        ..Default::default()
    }
}

#[test]
fn test_generated_dataset_survives_the_loader() {
    let temp_dir = TempDir::new().unwrap();
    let incidents = generate(&config(400));
    let path = write_dataset(temp_dir.path(), "servicenow_incidents.csv", &incidents);

    let table = data::load(&path).unwrap();
    assert_eq!(table.len(), 400);
    assert_eq!(table.rows(), incidents.as_slice());
}

#[test]
fn test_views_over_generated_dataset_hold_invariants() {
    let table = {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(temp_dir.path(), "incidents.csv", &generate(&config(1_000)));
        data::load(&path).unwrap()
    };
    let views = compute_all(&table);
    assert_eq!(views.warnings().count(), 0);

    for report in &views.reports {
        match &report.result {
            ViewResult::IncidentsByPriority(counts) => {
                assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 1_000);
            }
            ViewResult::SlaBreachByGroup(rates) => {
                assert!(rates.len() <= 10);
                assert!(rates.iter().all(|r| (0.0..=100.0).contains(&r.value)));
                assert!(rates.windows(2).all(|w| w[0].value >= w[1].value));
            }
            ViewResult::OpenedHourVsWeekday(grid) => assert_eq!(grid.total(), 1_000),
            ViewResult::CiPareto(entries) => {
                assert!(entries.len() <= 10);
                assert!(entries.windows(2).all(|w| w[0].count >= w[1].count));
                let last = entries.last().map(|e| e.cumulative_pct).unwrap_or(0.0);
                assert!((last - 100.0).abs() < 1e-9);
            }
            ViewResult::WorkflowFunnel(stages) => {
                assert_eq!(stages.iter().map(|s| s.count).sum::<u64>(), 1_000);
            }
            ViewResult::FirstResponseVsCsat(points) => {
                let scored = table
                    .iter()
                    .filter(|i| i.customer_satisfaction.is_some())
                    .count();
                assert_eq!(points.len(), scored);
            }
            _ => {}
        }
    }
}

#[test]
fn test_figures_export_writes_every_chart_and_summary() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_dataset(temp_dir.path(), "incidents.csv", &generate(&config(200)));
    let table = data::load(&path).unwrap();

    let views = compute_all(&table);
    let artifacts = render_all(&views, ChartSize::default());
    let out = temp_dir.path().join("figures");
    let written = write_figures(&out, &artifacts, &views).unwrap();

    assert_eq!(written.len(), ViewKind::all().len() + 1);
    assert_eq!(written.last(), Some(&out.join(SUMMARY_FILE)));
    for artifact in &artifacts {
        let svg = fs::read_to_string(out.join(artifact.figure_name())).unwrap();
        assert_eq!(svg, artifact.svg);
    }

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(SUMMARY_FILE)).unwrap()).unwrap();
    let reports = summary.as_array().unwrap();
    assert_eq!(reports.len(), 10);
    assert_eq!(reports[0]["kind"], "incidents_by_priority");
    assert_eq!(reports[0]["result"]["view"], "incidents_by_priority");
    assert!(reports[0]["warning"].is_null());
}

#[test]
fn test_rendering_is_deterministic() {
    let table = {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(temp_dir.path(), "incidents.csv", &generate(&config(150)));
        data::load(&path).unwrap()
    };
    let views = compute_all(&table);
    let first = render_all(&views, ChartSize::default());
    let second = render_all(&compute_all(&table), ChartSize::default());
    assert_eq!(first, second);
}
