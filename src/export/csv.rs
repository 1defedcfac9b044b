//! CSV handling for bulk export files
//!
//! Marketo export files start with a header line. The line right after the
//! header is dropped before rows are read; this matches the long-standing
//! handling of these files and is pinned by tests.

use crate::error::{Error, Result};
use crate::normalize::Normalizer;
use crate::types::{JsonValue, Record};

const DELIMITER: char = ',';

/// Parsed export file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    /// Folded header names, in file order
    pub headers: Vec<String>,
    /// One record per data row; values stay strings
    pub records: Vec<Record>,
}

/// Parse an export file into records keyed by folded header names
pub fn parse_export(text: &str, normalizer: &Normalizer) -> Result<CsvTable> {
    let mut rows = split_rows(text).into_iter();

    let Some(header_row) = rows.next() else {
        return Ok(CsvTable::default());
    };
    let raw_headers: Vec<String> = header_row.iter().map(|h| h.trim().to_string()).collect();
    if raw_headers.iter().all(String::is_empty) {
        return Err(Error::export("export file has an empty header line"));
    }
    let headers = normalizer.normalize_headers(&raw_headers)?;

    // Line immediately after the header.
    rows.next();

    let records = rows
        .filter(|row| !(row.len() == 1 && row[0].is_empty()))
        .map(|row| {
            headers
                .iter()
                .zip(row)
                .map(|(header, value)| (header.clone(), JsonValue::String(value)))
                .collect::<Record>()
        })
        .collect();

    Ok(CsvTable { headers, records })
}

/// Split CSV text into rows of fields.
///
/// Quoted fields may contain delimiters, escaped quotes (`""`) and newlines.
/// A trailing `\r` on a line is dropped.
pub fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                in_quotes = true;
            }
        } else if c == DELIMITER && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else if c == '\n' && !in_quotes {
            if current.ends_with('\r') {
                current.pop();
            }
            fields.push(std::mem::take(&mut current));
            rows.push(std::mem::take(&mut fields));
        } else {
            current.push(c);
        }
    }

    if !current.is_empty() || !fields.is_empty() {
        if current.ends_with('\r') {
            current.pop();
        }
        fields.push(current);
        rows.push(fields);
    }

    rows
}
