//! Dataset file reading with the polars CSV backend.
//!
//! Every column is read as a string so that type coercion, and the errors it
//! raises, stay with the loader. Files are size-checked before polars sees them.

use crate::constants::{MAX_CSV_ROWS, MAX_CSV_SIZE_MB};
use crate::data::csv_parser::{detect_delimiter, RawTable};
use crate::data::error::{DataError, DataResult};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lines sampled for delimiter detection
const SNIFF_LINES: usize = 5;

/// Read a CSV or TSV file into an untyped [`RawTable`]
pub fn read_raw_file(path: &Path) -> DataResult<RawTable> {
    let start = std::time::Instant::now();

    // Check file size before reading
    let metadata = std::fs::metadata(path)?;
    let size_mb = metadata.len() / (1024 * 1024);
    if size_mb > MAX_CSV_SIZE_MB as u64 {
        return Err(DataError::TooLarge {
            size_mb,
            max_mb: MAX_CSV_SIZE_MB,
        });
    }
    if metadata.len() == 0 {
        return Err(DataError::EmptyFile);
    }

    // Same delimiter rules as in-memory content
    let separator = detect_delimiter(Some(path), &head_lines(path)?) as u8;

    // A zero-length inference window reads every column as String
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(separator)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    let row_count = df.height();
    if row_count > MAX_CSV_ROWS {
        return Err(DataError::TooManyRows {
            rows: row_count,
            max_rows: MAX_CSV_ROWS,
        });
    }

    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let columns: Vec<&Column> = headers
        .iter()
        .map(|name| df.column(name))
        .collect::<PolarsResult<Vec<_>>>()?;

    let rows: Vec<Vec<Option<String>>> = (0..row_count)
        .map(|row_idx| {
            columns
                .iter()
                .map(|column| polars_value_to_string(column, row_idx))
                .collect()
        })
        .collect();

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Data")
        .to_string();

    tracing::debug!(
        "Read {} with {} rows x {} cols in {:?}",
        path.display(),
        row_count,
        headers.len(),
        start.elapsed()
    );

    Ok(RawTable {
        name,
        headers,
        rows,
    })
}

/// First few lines of a file, lossily decoded
fn head_lines(path: &Path) -> DataResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut head = String::new();
    let mut buf = Vec::new();
    for _ in 0..SNIFF_LINES {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        head.push_str(&String::from_utf8_lossy(&buf));
    }
    Ok(head)
}

/// Convert a polars cell to an optional string, mapping nulls and blanks to `None`
fn polars_value_to_string(column: &Column, row_idx: usize) -> Option<String> {
    let value = column.get(row_idx).ok()?;
    let text = match value {
        AnyValue::Null => return None,
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => {
            let s_str: &str = &s;
            s_str.to_string()
        }
        other => format!("{}", other),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
