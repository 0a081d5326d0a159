//! Delimited-text parsing for the published spreadsheet export.
//!
//! The first record is the header row; every later record is zipped against
//! the header positions. Quoted fields may contain commas, newlines, doubled
//! quotes, and backslash escapes. Ragged rows are padded with empty cells
//! rather than rejected; the sheet regularly trails off mid-row.

use std::collections::BTreeMap;

/// One data record in original column order, header text preserved.
pub type RawRow = Vec<(String, String)>;

/// A record re-keyed by canonical camelCase field names.
pub type NormalizedRow = BTreeMap<String, String>;

/// Parse CSV text into header-zipped rows.
///
/// Empty input (or input with only a header) yields no rows. Cells beyond
/// the header width are dropped; missing trailing cells become empty
/// strings.
pub fn parse_table(raw: &str) -> Vec<RawRow> {
    let mut records = split_records(raw).into_iter();
    let Some(headers) = records.next() else {
        return Vec::new();
    };

    records
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let cell = cells.get(idx).cloned().unwrap_or_default();
                    (header.clone(), cell)
                })
                .collect()
        })
        .collect()
}

/// Re-key a raw row by camelCase field names.
pub fn normalize_row_keys(row: &RawRow) -> NormalizedRow {
    row.iter()
        .map(|(key, value)| (camel_case_key(key), value.clone()))
        .collect()
}

/// Canonical compound key convention: split on runs of non-alphanumerics,
/// lowercase the first segment, capitalize the rest, join with nothing.
/// Headers with no alphanumeric content pass through unchanged.
pub fn camel_case_key(header: &str) -> String {
    let trimmed = header.trim();
    let segments: Vec<&str> = trimmed
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        return trimmed.to_string();
    }

    let mut key = String::with_capacity(trimmed.len());
    for (idx, segment) in segments.iter().enumerate() {
        let lowered = segment.to_ascii_lowercase();
        if idx == 0 {
            key.push_str(&lowered);
        } else {
            let mut chars = lowered.chars();
            if let Some(first) = chars.next() {
                key.extend(first.to_uppercase());
                key.push_str(chars.as_str());
            }
        }
    }
    key
}

/// Split raw CSV into records of cells, honoring quoting.
///
/// Inside quotes: `""` is a literal quote, `\x` is a literal `x`, and
/// delimiters/newlines are data. A lone trailing quote or escape is kept
/// as-is; malformed tails still produce a usable record.
fn split_records(raw: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut saw_any = false;

    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        saw_any = true;
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        cell.push(escaped);
                    } else {
                        cell.push('\\');
                    }
                }
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => {
                cells.push(std::mem::take(&mut cell));
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                finish_record(&mut records, &mut cells, &mut cell);
            }
            '\n' => finish_record(&mut records, &mut cells, &mut cell),
            _ => cell.push(c),
        }
    }

    if saw_any && (!cell.is_empty() || !cells.is_empty()) {
        finish_record(&mut records, &mut cells, &mut cell);
    }

    records
}

fn finish_record(records: &mut Vec<Vec<String>>, cells: &mut Vec<String>, cell: &mut String) {
    cells.push(std::mem::take(cell));
    // A bare newline between records produces a single empty cell; skip it
    // so blank lines in the export do not become phantom rows.
    if cells.len() == 1 && cells[0].is_empty() {
        cells.clear();
        return;
    }
    records.push(std::mem::take(cells));
}
