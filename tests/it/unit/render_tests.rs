//! Renderer tests: chart selection, placeholders and the dashboard page.

use crate::helpers::{IncidentBuilder, TestTableBuilder};
use incident_board::constants::EMPTY_VIEW_TEXT;
use incident_board::data::{compute, compute_all};
use incident_board::render::svg::escape_xml;
use incident_board::render::{
    dashboard_page, render, render_all, render_view, ChartSize, RenderError,
};
use incident_board::types::{ChartKind, IncidentTable, Priority, State, ViewKind};

fn small_table() -> IncidentTable {
    TestTableBuilder::new()
        .with(IncidentBuilder::new("a").priority(Priority::High).resolved_after(30.0).csat(5.0))
        .with(IncidentBuilder::new("b").category("Software").state(State::OnHold))
        .with(IncidentBuilder::new("c").ci("db-01").resolved_after(600.0).csat(1.0))
        .build()
}

#[test]
fn test_every_view_renders_with_its_chart_kind() {
    let views = compute_all(&small_table());
    let artifacts = render_all(&views, ChartSize::default());

    assert_eq!(artifacts.len(), ViewKind::all().len());
    for (artifact, kind) in artifacts.iter().zip(ViewKind::all()) {
        assert_eq!(artifact.view, *kind);
        assert_eq!(artifact.chart, kind.chart_kind());
        assert!(artifact.svg.starts_with("<svg"));
        assert!(artifact.svg.ends_with("</svg>"));
        assert!(!artifact.empty, "{} should have data", kind.title());
    }
}

#[test]
fn test_empty_view_renders_placeholder() {
    let table = IncidentTable::default();
    let artifact = render(&compute(ViewKind::CiPareto, &table), ChartSize::default());
    assert!(artifact.empty);
    assert!(artifact.svg.contains(EMPTY_VIEW_TEXT));
    assert_eq!(artifact.chart, ChartKind::Bar);
}

#[test]
fn test_render_view_rejects_mismatched_result() {
    let result = compute(ViewKind::WorkflowFunnel, &small_table());
    let err = render_view(ViewKind::OpenedPerDay, &result, ChartSize::default()).unwrap_err();
    assert_eq!(
        err,
        RenderError::ViewMismatch {
            view: ViewKind::OpenedPerDay,
            result: ViewKind::WorkflowFunnel,
        }
    );
}

#[test]
fn test_chart_size_is_applied() {
    let size = ChartSize {
        width: 640,
        height: 320,
    };
    let artifact = render(&compute(ViewKind::IncidentsByPriority, &small_table()), size);
    assert!(artifact.svg.contains(r#"width="640" height="320""#));
}

#[test]
fn test_figure_names_follow_tab_order() {
    let views = compute_all(&small_table());
    let names: Vec<String> = render_all(&views, ChartSize::default())
        .iter()
        .map(|a| a.figure_name())
        .collect();
    assert_eq!(names.first().map(String::as_str), Some("01-incidents-by-priority.svg"));
    assert_eq!(names.last().map(String::as_str), Some("10-first-response-vs-csat.svg"));
}

#[test]
fn test_dashboard_page_has_one_tab_per_view() {
    let views = compute_all(&small_table());
    let artifacts = render_all(&views, ChartSize::default());
    let page = dashboard_page("Ops & Incidents", "demo", &artifacts);

    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Ops &amp; Incidents</title>"));
    assert_eq!(page.matches("onclick=\"showTab(").count(), 10);
    assert_eq!(page.matches("class=\"panel active\"").count(), 1);
    assert!(page.contains(r#"id="panel-incidents-by-priority""#));
    for kind in ViewKind::all() {
        assert!(page.contains(&format!("id=\"panel-{}\"", kind.slug())));
    }
}

#[test]
fn test_escape_xml() {
    assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
}
