//! Loader tests against files on disk and in-memory CSV text.

use crate::helpers::{write_dataset, IncidentBuilder};
use incident_board::data::{self, DataError, REQUIRED_COLUMNS};
use incident_board::types::{IncidentTable, Priority, State};
use std::fs;
use tempfile::TempDir;

fn header() -> String {
    REQUIRED_COLUMNS.join(",")
}

fn row(id: &str, ttr: &str, target: &str, breached: &str) -> String {
    format!(
        "{id},2024-01-01 10:00:00,,2 - High,In Progress,Network,VPN,Service Desk,alice,Email,Berlin,vpn-gw-01,12,{ttr},0,,{target},{breached}"
    )
}

/// Load the same content from a file on disk and from memory
fn load_both_ways(file_name: &str, content: &str) -> (IncidentTable, IncidentTable) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(file_name);
    fs::write(&path, content).unwrap();
    let from_file = data::load(&path).unwrap();
    let from_stream = data::load_from_reader(content.as_bytes(), "stream").unwrap();
    (from_file, from_stream)
}

#[test]
fn test_load_file_round_trips_typed_values() {
    let temp_dir = TempDir::new().unwrap();
    let incidents = vec![
        IncidentBuilder::new("INC0001")
            .priority(Priority::Critical)
            .resolved_after(150.0)
            .csat(4.5)
            .build(),
        IncidentBuilder::new("INC0002")
            .state(State::OnHold)
            .opened("2024-02-29T23:10")
            .build(),
    ];
    let path = write_dataset(temp_dir.path(), "incidents.csv", &incidents);

    let table = data::load(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows(), incidents.as_slice());
    assert_eq!(table.name(), "incidents");
}

#[test]
fn test_load_derives_breach_from_resolve_time() {
    let content = [
        header(),
        row("A", "150", "120", "false"),
        row("B", "90", "120", "true"),
        row("C", "", "120", "true"),
    ]
    .join("\n");
    let table = data::load_from_str(&content).unwrap();
    let flags: Vec<bool> = table.iter().map(|i| i.sla_breached).collect();
    assert_eq!(flags, [true, false, true]);
    assert_eq!(table.rows()[2].time_to_resolve_minutes, None);
}

#[test]
fn test_missing_column_is_schema_error_listing_every_column() {
    let content = "incident_id,opened_at,priority\nINC1,2024-01-01 10:00:00,1 - Critical";
    match data::load_from_str(content) {
        Err(DataError::Schema { missing }) => {
            assert_eq!(missing.len(), REQUIRED_COLUMNS.len() - 3);
            assert!(missing.contains(&"sla_breached".to_string()));
            assert!(!missing.contains(&"incident_id".to_string()));
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_failed_reload_leaves_previous_table_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_dataset(
        temp_dir.path(),
        "good.csv",
        &[IncidentBuilder::new("INC1").build()],
    );
    let bad = temp_dir.path().join("bad.csv");
    fs::write(&bad, "incident_id,opened_at\nINC9,2024-01-01 10:00:00\n").unwrap();

    let table = data::load(&good).unwrap();
    let err = data::load(&bad).unwrap_err();
    assert!(matches!(err, DataError::Schema { .. }));
    assert!(err.is_data_error());
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].incident_id, "INC1");
}

#[test]
fn test_parse_error_reports_row_and_column() {
    let content = [header(), row("A", "10", "120", "false"), row("B", "-5", "120", "false")]
        .join("\n");
    match data::load_from_str(&content) {
        Err(DataError::Parse { row, column, value, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(column, "time_to_resolve_minutes");
            assert_eq!(value, "-5");
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_duplicate_id_rejected_at_second_occurrence() {
    let content = [
        header(),
        row("A", "10", "120", "false"),
        row("B", "10", "120", "false"),
        row("A", "20", "120", "false"),
    ]
    .join("\n");
    let err = data::load_from_str(&content).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Parse error at row 3, column 'incident_id' (value \"A\"): duplicate incident identifier"
    );
}

#[test]
fn test_tsv_file_is_detected_by_extension() {
    let temp_dir = TempDir::new().unwrap();
    let content = [header(), row("A", "10", "120", "false")]
        .join("\n")
        .replace(',', "\t");
    let path = temp_dir.path().join("incidents.tsv");
    fs::write(&path, content).unwrap();

    let table = data::load(&path).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0].priority, Priority::High);
}

#[test]
fn test_empty_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.csv");
    fs::write(&path, "").unwrap();
    assert!(matches!(data::load(&path), Err(DataError::EmptyFile)));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = data::load(temp_dir.path().join("nope.csv"));
    assert!(matches!(result, Err(DataError::Io(_))));
}

#[test]
fn test_quoted_newline_loads_same_from_file_and_stream() {
    let content = [
        header(),
        row("A", "10", "120", "false").replace(",VPN,", ",\"VPN\nedge\","),
        row("B", "20", "120", "false"),
    ]
    .join("\n");
    let (from_file, from_stream) = load_both_ways("multiline.csv", &content);

    assert_eq!(from_stream.len(), 2);
    assert_eq!(from_stream.rows()[0].subcategory, "VPN\nedge");
    assert_eq!(from_file.rows(), from_stream.rows());
}

#[test]
fn test_written_dataset_with_newlines_reads_back_from_stream() {
    let incident = {
        let mut incident = IncidentBuilder::new("INC1").resolved_after(30.0).build();
        incident.subcategory = "VPN\nedge, west".to_string();
        incident
    };
    let mut buf = Vec::new();
    incident_board::data::generator::write_csv(std::slice::from_ref(&incident), &mut buf).unwrap();

    let table = data::load_from_reader(buf.as_slice(), "written").unwrap();
    assert_eq!(table.rows(), &[incident]);
}

#[test]
fn test_semicolon_csv_loads_same_from_file_and_stream() {
    let content = [header(), row("A", "150", "120", "false")]
        .join("\n")
        .replace(',', ";");
    let (from_file, from_stream) = load_both_ways("semicolon.csv", &content);

    assert_eq!(from_file.len(), 1);
    assert!(from_file.rows()[0].sla_breached);
    assert_eq!(from_file.rows(), from_stream.rows());
}

#[test]
fn test_fractional_second_timestamps_are_accepted() {
    let content = [header(), row("A", "10", "120", "false")]
        .join("\n")
        .replace("2024-01-01 10:00:00,", "2024-01-01 10:00:00.250000,");
    let (from_file, from_stream) = load_both_ways("fractional.csv", &content);

    let opened = from_stream.rows()[0].opened_at;
    assert_eq!(opened.and_utc().timestamp_subsec_millis(), 250);
    assert_eq!(from_file.rows(), from_stream.rows());
}
