// 🧹 Field Normalizer
// Raw feed text → (name, percentage, rank), or an explicit rejection
//
// Locale handling lives entirely in `parse_percentage`; nothing here reads
// the runtime locale.

use crate::config::ColumnConfig;
use crate::error::RowRejection;
use crate::snapshot::Entity;
use std::collections::HashMap;

// ============================================================================
// RAW ROW
// ============================================================================

/// One decoded feed line, keyed by header name
///
/// Transient: discarded once normalized.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// 1-based line in the feed (header is line 1)
    pub line: usize,
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(line: usize) -> Self {
        RawRow {
            line,
            fields: HashMap::new(),
        }
    }

    /// Build from parallel header/value slices; short records leave columns absent
    pub fn from_record<'a, H, V>(line: usize, headers: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        // Repeated header names: the first column wins
        let mut fields = HashMap::new();
        for (h, v) in headers.into_iter().zip(values) {
            fields
                .entry(h.to_string())
                .or_insert_with(|| v.to_string());
        }
        RawRow { line, fields }
    }

    /// Builder pattern: set one column
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.fields.insert(column.to_string(), value.to_string());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(|s| s.as_str())
    }
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Trimmed, non-empty name
pub fn normalize_name(text: &str) -> Option<String> {
    let name = text.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Parse a gain percentage
///
/// Accepted formats (surrounding whitespace ignored):
/// - `12.5`, `12.5%`, `12,5`, `12,5 %`
/// - signed values and values above 100 (`-3,2%`, `140%`)
///
/// The result must be finite; `NaN`/`inf` spellings are rejected. No clamping.
/// The whole field must be numeric: unlike prefix parsing, `12,5,3` and
/// `1.234,5` are rejected rather than truncated.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let without_sign = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if without_sign.is_empty() {
        return None;
    }

    let decimal = without_sign.replace(',', ".");
    decimal
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a declared rank from ordinal text
///
/// Reads an optional sign followed by leading digits and ignores any
/// suffix, so `3`, ` 3 `, `3º`, `3rd` and `3.0` all give 3. Text with no
/// leading digits is rejected.
pub fn parse_rank(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => ("-", &trimmed[1..]),
        Some(b'+') => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };

    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }

    format!("{}{}", sign, &rest[..digits_len]).parse::<i64>().ok()
}

// ============================================================================
// ROW NORMALIZATION
// ============================================================================

/// Normalize one row against the configured columns
///
/// Checks name, then percentage, then rank; the first failure is reported.
pub fn normalize_row(row: &RawRow, columns: &ColumnConfig) -> Result<Entity, RowRejection> {
    let name = row
        .get(&columns.name)
        .and_then(normalize_name)
        .ok_or(RowRejection::MissingName)?;

    let percentage_text = row.get(&columns.percentage).unwrap_or("");
    let percentage = parse_percentage(percentage_text)
        .ok_or_else(|| RowRejection::InvalidPercentage(percentage_text.to_string()))?;

    let rank_text = row.get(&columns.rank).unwrap_or("");
    let rank =
        parse_rank(rank_text).ok_or_else(|| RowRejection::InvalidRank(rank_text.to_string()))?;

    Ok(Entity {
        name,
        percentage,
        rank,
    })
}

// ============================================================================
// TESTS
// ============================================================================
