//! CSV and TSV text parsing
//!
//! Splits delimited text into an untyped [`RawTable`] of header names and
//! string cells. Typing and schema checks happen in the loader.
//!
//! ## Memory Limits
//!
//! Content resulting in more than [`MAX_CSV_ROWS`] rows is rejected with
//! [`DataError::TooManyRows`].

use crate::constants::MAX_CSV_ROWS;
use crate::data::error::{DataError, DataResult};
use std::path::Path;

/// Untyped table: header names plus one string cell per column.
///
/// Empty cells are `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Position of a header, matched after trimming
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Parse CSV/TSV content from a string
pub fn parse_csv_content(content: &str, delimiter: char, name: &str) -> DataResult<RawTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = records(content).into_iter();

    // Parse header row
    let header_line = records.next().ok_or(DataError::EmptyFile)?;
    let headers: Vec<String> = split_csv_line(&header_line, delimiter);

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for line in records {
        if rows.len() >= MAX_CSV_ROWS {
            return Err(DataError::TooManyRows {
                rows: rows.len() + 1, // +1 for the current row that exceeded limit
                max_rows: MAX_CSV_ROWS,
            });
        }
        let cells = split_csv_line(&line, delimiter)
            .into_iter()
            .map(|cell| if cell.is_empty() { None } else { Some(cell) })
            .collect();
        rows.push(cells);
    }

    Ok(RawTable {
        name: name.to_string(),
        headers,
        rows,
    })
}

/// Detect the delimiter to use for parsing
pub fn detect_delimiter(path: Option<&Path>, content: &str) -> char {
    // Check file extension first
    if let Some(ext) = path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
        if ext.eq_ignore_ascii_case("tsv") {
            return '\t';
        }
    }

    // Count delimiters in first few lines to determine most likely
    let first_lines: String = content.lines().take(5).collect::<Vec<_>>().join("\n");

    let comma_count = first_lines.matches(',').count();
    let tab_count = first_lines.matches('\t').count();
    let semicolon_count = first_lines.matches(';').count();

    if tab_count > comma_count && tab_count > semicolon_count {
        '\t'
    } else if semicolon_count > comma_count {
        ';'
    } else {
        ','
    }
}

/// Group physical lines into records, joining lines while a quoted field is open.
///
/// Blank lines between records are skipped; inside a quoted field they are kept.
fn records(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut pending: Option<String> = None;

    for line in content.lines() {
        let record = match pending.take() {
            Some(mut open) => {
                open.push('\n');
                open.push_str(line);
                open
            }
            None if line.trim().is_empty() => continue,
            None => line.to_string(),
        };
        // Doubled quotes keep the parity, so an odd count means a field is still open
        if record.matches('"').count() % 2 == 1 {
            pending = Some(record);
        } else {
            records.push(record);
        }
    }

    // An unterminated quote keeps whatever was read
    records.extend(pending);
    records
}

/// Split a CSV record respecting quoted fields
fn split_csv_line(line: &str, delimiter: char) -> Vec<String> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            result.push(unquote(&line[start..i]));
            start = i + c.len_utf8();
        }
    }

    // Add the last field
    result.push(unquote(&line[start..]));
    result
}

/// Remove surrounding quotes from a field and collapse doubled quotes
fn unquote(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

/// Quote a CSV field if necessary (contains delimiter, quotes, or newlines)
pub fn quote_csv_field(value: &str, delimiter: char) -> String {
    let needs_quoting = value.contains(delimiter)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        // Escape internal quotes by doubling them
        let escaped = value.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}

/// Join already-formatted cells into one CSV line
pub fn write_csv_line<S: AsRef<str>>(cells: &[S], delimiter: char) -> String {
    cells
        .iter()
        .map(|cell| quote_csv_field(cell.as_ref(), delimiter))
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}
