//! Dataset loader: schema validation and typed parsing of incident rows.
//!
//! `load` reads a file through polars, `load_from_reader` and `load_from_str`
//! go through the text parser. All three end in [`table_from_raw`], which
//! checks the header against [`REQUIRED_COLUMNS`] before touching any row.

use crate::constants::{CSAT_MAX, CSAT_MIN};
use crate::data::csv_parser::{detect_delimiter, parse_csv_content, RawTable};
use crate::data::error::{DataError, DataResult};
use crate::data::frame_reader::read_raw_file;
use crate::perf::ScopedTimer;
use crate::types::{Incident, IncidentTable, Priority, State};
use chrono::{DateTime, NaiveDateTime};
use std::io::Read;
use std::path::Path;

/// Columns every dataset must carry, in canonical order
pub const REQUIRED_COLUMNS: [&str; 18] = [
    "incident_id",
    "opened_at",
    "resolved_at",
    "priority",
    "state",
    "category",
    "subcategory",
    "assignment_group",
    "assignee",
    "channel",
    "location",
    "configuration_item",
    "time_to_first_response_minutes",
    "time_to_resolve_minutes",
    "reopen_count",
    "customer_satisfaction",
    "sla_target_minutes",
    "sla_breached",
];

/// Timestamp layouts tried in order after RFC 3339; `%.f` also matches no fraction
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Load the incident dataset from a CSV/TSV file
pub fn load(path: impl AsRef<Path>) -> DataResult<IncidentTable> {
    let path = path.as_ref();
    let _timer = ScopedTimer::new("load_dataset", 500.0);
    let raw = read_raw_file(path)?;
    let table = table_from_raw(&raw)?;
    tracing::info!("Loaded {} incidents from {}", table.len(), path.display());
    Ok(table)
}

/// Load the incident dataset from any byte stream
pub fn load_from_reader<R: Read>(mut reader: R, name: &str) -> DataResult<IncidentTable> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    let delimiter = detect_delimiter(None, &content);
    let raw = parse_csv_content(&content, delimiter, name)?;
    table_from_raw(&raw)
}

/// Load the incident dataset from in-memory CSV text
pub fn load_from_str(content: &str) -> DataResult<IncidentTable> {
    load_from_reader(content.as_bytes(), "Data")
}

/// Validate the header and convert every row to an [`Incident`]
pub fn table_from_raw(raw: &RawTable) -> DataResult<IncidentTable> {
    let columns = ColumnMap::resolve(raw)?;

    let mut incidents = Vec::with_capacity(raw.rows.len());
    for (idx, cells) in raw.rows.iter().enumerate() {
        let row = RowReader {
            row: idx + 1,
            cells,
            columns: &columns,
        };
        incidents.push(row.incident()?);
    }

    IncidentTable::new(raw.name.clone(), incidents).map_err(|duplicate| {
        let row = raw
            .rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cell(cells, columns.index("incident_id")) == Some(duplicate.as_str()))
            .nth(1)
            .map(|(idx, _)| idx + 1)
            .unwrap_or(0);
        DataError::parse(row, "incident_id", &duplicate, "duplicate incident identifier")
    })
}

fn cell(cells: &[Option<String>], idx: usize) -> Option<&str> {
    cells.get(idx).and_then(|c| c.as_deref())
}

/// Header positions of the required columns
struct ColumnMap {
    indices: [usize; REQUIRED_COLUMNS.len()],
}

impl ColumnMap {
    fn resolve(raw: &RawTable) -> DataResult<Self> {
        let mut indices = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();

        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            match raw.column_index(name) {
                Some(idx) => indices[slot] = idx,
                None => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(Self { indices })
        } else {
            Err(DataError::Schema { missing })
        }
    }

    fn index(&self, name: &str) -> usize {
        REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == name)
            .map(|slot| self.indices[slot])
            .unwrap_or(usize::MAX)
    }
}

/// Typed accessors over one raw row
struct RowReader<'a> {
    row: usize,
    cells: &'a [Option<String>],
    columns: &'a ColumnMap,
}

impl RowReader<'_> {
    fn incident(&self) -> DataResult<Incident> {
        let opened_at = self.timestamp("opened_at")?;
        let resolved_at = self.optional_timestamp("resolved_at")?;
        if let Some(resolved) = resolved_at {
            if resolved < opened_at {
                return Err(self.error(
                    "resolved_at",
                    "resolved_at is earlier than opened_at",
                ));
            }
        }

        let time_to_resolve_minutes = self.optional_duration("time_to_resolve_minutes")?;
        let sla_target_minutes = self.duration("sla_target_minutes")?;
        let recorded_breach = self.optional_boolean("sla_breached")?;
        let sla_breached = match time_to_resolve_minutes {
            Some(ttr) => {
                let derived = Incident::derive_sla_breached(ttr, sla_target_minutes);
                if recorded_breach.is_some_and(|recorded| recorded != derived) {
                    tracing::warn!(
                        "Row {}: sla_breached disagrees with resolve time ({} > {}), using {}",
                        self.row,
                        ttr,
                        sla_target_minutes,
                        derived
                    );
                }
                derived
            }
            None => recorded_breach.unwrap_or(false),
        };

        Ok(Incident {
            incident_id: self.required_text("incident_id")?,
            opened_at,
            resolved_at,
            priority: self.priority()?,
            state: self.state()?,
            category: self.required_text("category")?,
            subcategory: self.text("subcategory"),
            assignment_group: self.required_text("assignment_group")?,
            assignee: self.text("assignee"),
            channel: self.text("channel"),
            location: self.text("location"),
            configuration_item: self.required_text("configuration_item")?,
            time_to_first_response_minutes: self.duration("time_to_first_response_minutes")?,
            time_to_resolve_minutes,
            reopen_count: self.count("reopen_count")?,
            customer_satisfaction: self.csat()?,
            sla_target_minutes,
            sla_breached,
        })
    }

    fn raw(&self, column: &str) -> Option<&str> {
        cell(self.cells, self.columns.index(column))
    }

    fn error(&self, column: &str, reason: &str) -> DataError {
        DataError::parse(self.row, column, self.raw(column).unwrap_or(""), reason)
    }

    fn text(&self, column: &str) -> String {
        self.raw(column).unwrap_or_default().to_string()
    }

    fn required_text(&self, column: &str) -> DataResult<String> {
        self.raw(column)
            .map(str::to_string)
            .ok_or_else(|| self.error(column, "value is required"))
    }

    fn timestamp(&self, column: &str) -> DataResult<NaiveDateTime> {
        self.optional_timestamp(column)?
            .ok_or_else(|| self.error(column, "value is required"))
    }

    fn optional_timestamp(&self, column: &str) -> DataResult<Option<NaiveDateTime>> {
        match self.raw(column) {
            None => Ok(None),
            Some(value) => parse_timestamp(value)
                .map(Some)
                .ok_or_else(|| self.error(column, "not a recognised timestamp")),
        }
    }

    fn duration(&self, column: &str) -> DataResult<f64> {
        self.optional_duration(column)?
            .ok_or_else(|| self.error(column, "value is required"))
    }

    fn optional_duration(&self, column: &str) -> DataResult<Option<f64>> {
        let Some(value) = self.raw(column) else {
            return Ok(None);
        };
        let minutes: f64 = value
            .parse()
            .map_err(|_| self.error(column, "not a number"))?;
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(self.error(column, "duration must be a non-negative number"));
        }
        Ok(Some(minutes))
    }

    fn count(&self, column: &str) -> DataResult<u32> {
        let value = self
            .raw(column)
            .ok_or_else(|| self.error(column, "value is required"))?;
        if let Ok(n) = value.parse::<u32>() {
            return Ok(n);
        }
        // Accept integral floats such as "2.0"
        match value.parse::<f64>() {
            Ok(n) if n.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&n) => Ok(n as u32),
            _ => Err(self.error(column, "not a non-negative integer")),
        }
    }

    fn csat(&self) -> DataResult<Option<f64>> {
        let column = "customer_satisfaction";
        let Some(value) = self.raw(column) else {
            return Ok(None);
        };
        if value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("null") {
            return Ok(None);
        }
        let score: f64 = value
            .parse()
            .map_err(|_| self.error(column, "not a number"))?;
        if !(CSAT_MIN..=CSAT_MAX).contains(&score) {
            return Err(self.error(column, "score outside 1..=5"));
        }
        Ok(Some(score))
    }

    fn optional_boolean(&self, column: &str) -> DataResult<Option<bool>> {
        let Some(value) = self.raw(column) else {
            return Ok(None);
        };
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" | "y" => Ok(Some(true)),
            "false" | "no" | "0" | "n" => Ok(Some(false)),
            _ => Err(self.error(column, "not a boolean")),
        }
    }

    fn priority(&self) -> DataResult<Priority> {
        let column = "priority";
        self.raw(column)
            .and_then(Priority::parse)
            .ok_or_else(|| self.error(column, "unknown priority"))
    }

    fn state(&self) -> DataResult<State> {
        let column = "state";
        self.raw(column)
            .and_then(State::parse)
            .ok_or_else(|| self.error(column, "unknown state"))
    }
}

/// Parse a timestamp cell; RFC 3339 values are normalised to UTC
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
