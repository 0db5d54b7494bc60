//! Dashboard routing and a live server on an ephemeral port.

use crate::helpers::{IncidentBuilder, TestTableBuilder};
use incident_board::render::ChartSize;
use incident_board::server::{Dashboard, DashboardServer};
use incident_board::types::{Priority, ViewKind};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;
use tiny_http::Method;

fn dashboard() -> Dashboard {
    let table = TestTableBuilder::new()
        .with_many("inc", 4, |b| b.priority(Priority::High).resolved_after(45.0).csat(4.0))
        .with(IncidentBuilder::new("open").ci("db-01"))
        .build();
    Dashboard::build(&table, ChartSize::default())
}

fn body(dashboard: &Dashboard, url: &str) -> String {
    let response = dashboard.route(&Method::Get, url);
    assert_eq!(response.status, 200, "GET {}", url);
    String::from_utf8(response.body).unwrap()
}

#[test]
fn test_index_serves_tabbed_page() {
    let dashboard = dashboard();
    let page = body(&dashboard, "/");
    assert!(page.contains("Incident Operations Dashboard"));
    assert!(page.contains("5 incidents"));
    assert_eq!(dashboard.route(&Method::Get, "/index.html").body, page.into_bytes());
}

#[test]
fn test_each_view_serves_its_svg() {
    let dashboard = dashboard();
    for kind in ViewKind::all() {
        let response = dashboard.route(&Method::Get, &format!("/views/{}.svg", kind.slug()));
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "image/svg+xml");
    }
    assert_eq!(dashboard.route(&Method::Get, "/views/nope.svg").status, 404);
}

#[test]
fn test_api_lists_views_and_results() {
    let dashboard = dashboard();
    let listing: serde_json::Value = serde_json::from_str(&body(&dashboard, "/api/views")).unwrap();
    let listing = listing.as_array().unwrap();
    assert_eq!(listing.len(), 10);
    assert_eq!(listing[0]["slug"], "incidents-by-priority");
    assert_eq!(listing[0]["chart"], "Bar");
    assert_eq!(listing[0]["empty"], false);

    let report: serde_json::Value =
        serde_json::from_str(&body(&dashboard, "/api/views/incidents-by-priority?x=1")).unwrap();
    assert_eq!(report["result"]["data"][0]["label"], "2 - High");
    assert_eq!(report["result"]["data"][0]["count"], 4);
}

#[test]
fn test_unknown_paths_and_methods() {
    let dashboard = dashboard();
    assert_eq!(dashboard.route(&Method::Get, "/missing").status, 404);
    assert_eq!(dashboard.route(&Method::Get, "/api/views/unknown").status, 404);
    assert_eq!(dashboard.route(&Method::Post, "/").status, 405);
    assert_eq!(dashboard.route(&Method::Head, "/healthz").status, 200);
}

#[test]
fn test_etag_is_stable_for_same_body() {
    let dashboard = dashboard();
    let a = dashboard.route(&Method::Get, "/views/ci-pareto.svg");
    let b = dashboard.route(&Method::Get, "/views/ci-pareto.svg");
    let c = dashboard.route(&Method::Get, "/views/workflow-funnel.svg");
    assert_eq!(a.etag(), b.etag());
    assert_ne!(a.etag(), c.etag());
    assert!(a.etag().starts_with('"') && a.etag().ends_with('"'));
}

#[test]
fn test_if_none_match_only_applies_to_success() {
    let dashboard = dashboard();
    let ok = dashboard.route(&Method::Get, "/views/ci-pareto.svg");
    let etag = ok.etag();

    assert!(ok.not_modified_for(&etag));
    assert!(ok.not_modified_for("*"));
    assert!(ok.not_modified_for(&format!("\"other\", W/{}", etag)));
    assert!(!ok.not_modified_for("\"other\""));

    let missing = dashboard.route(&Method::Get, "/nope");
    assert!(!missing.not_modified_for(&missing.etag()));
    assert!(!missing.not_modified_for("*"));
    let rejected = dashboard.route(&Method::Post, "/");
    assert!(!rejected.not_modified_for(&rejected.etag()));
}

fn raw_request(server: &DashboardServer, request: &str) -> String {
    let mut stream = TcpStream::connect(server.local_addr()).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(request.as_bytes()).unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

#[test]
fn test_live_server_answers_and_shuts_down() {
    let server = DashboardServer::start("127.0.0.1:0", Arc::new(dashboard())).unwrap();
    assert_ne!(server.local_addr().port(), 0);
    assert!(server.url().starts_with("http://127.0.0.1:"));

    let response = raw_request(
        &server,
        "GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    );
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.ends_with("ok"));

    let missing = raw_request(
        &server,
        "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    );
    assert!(missing.starts_with("HTTP/1.1 404"), "{}", missing);

    let etag = dashboard().route(&Method::Get, "/healthz").etag();
    let cached = raw_request(
        &server,
        &format!(
            "GET /healthz HTTP/1.1\r\nHost: localhost\r\nIf-None-Match: {}\r\nConnection: close\r\n\r\n",
            etag
        ),
    );
    assert!(cached.starts_with("HTTP/1.1 304"), "{}", cached);

    let missing_etag = dashboard().route(&Method::Get, "/nope").etag();
    let still_missing = raw_request(
        &server,
        &format!(
            "GET /nope HTTP/1.1\r\nHost: localhost\r\nIf-None-Match: {}\r\nConnection: close\r\n\r\n",
            missing_etag
        ),
    );
    assert!(still_missing.starts_with("HTTP/1.1 404"), "{}", still_missing);

    // Joins the server thread
    drop(server);
}

#[test]
fn test_bind_failure_is_reported() {
    let first = DashboardServer::start("127.0.0.1:0", Arc::new(dashboard())).unwrap();
    let taken = first.local_addr().to_string();
    assert!(DashboardServer::start(&taken, Arc::new(dashboard())).is_err());
}
