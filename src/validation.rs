use crate::models::{Guest, PageCursor};
use chrono::DateTime;
use thiserror::Error;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid CSV on line {line}: {reason}")]
    InvalidCsv { line: usize, reason: String },
}

/// Trimmed, non-empty guest name
pub fn validate_guest_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingParameter("name".to_string()));
    }
    Ok(name)
}

pub fn validate_comment_content(content: &str) -> Result<&str, ValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::MissingParameter("content".to_string()));
    }
    Ok(content)
}

/// Page size from the query string. Anything unparsable or below 1 falls back
/// to the default; large values are capped.
pub fn parse_page_limit(limit: Option<&str>) -> i64 {
    match limit.and_then(|value| value.trim().parse::<i64>().ok()) {
        Some(limit) if limit >= 1 => limit.min(MAX_PAGE_LIMIT),
        _ => DEFAULT_PAGE_LIMIT,
    }
}

/// Pagination cursor: an RFC 3339 timestamp, normalised to UTC, optionally
/// followed by `_<comment id>`
pub fn parse_cursor(cursor: Option<&str>) -> Result<Option<PageCursor>, ValidationError> {
    let Some(cursor) = cursor.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let invalid = || ValidationError::InvalidParameter(format!("cursor '{}' is not a valid page cursor", cursor));

    let (timestamp, id) = match cursor.rsplit_once('_') {
        Some((timestamp, id)) => (timestamp, Some(id.parse::<i64>().map_err(|_| invalid())?)),
        None => (cursor, None),
    };

    let created_at = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| invalid())?
        .naive_utc();

    Ok(Some(PageCursor { created_at, id }))
}

/// Parse a guest list upload.
///
/// Expected columns: `name,attending,plus_ones,dietary_restrictions`. The first
/// row is a header and is skipped, as are blank lines.
pub fn parse_guest_csv(input: &str) -> Result<Vec<Guest>, ValidationError> {
    let mut guests = Vec::new();

    for (index, line) in input.lines().enumerate().skip(1) {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_csv_line(line);
        if fields.len() < 4 {
            return Err(ValidationError::InvalidCsv {
                line: line_number,
                reason: format!("expected 4 columns, found {}", fields.len()),
            });
        }

        let name = fields[0].trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidCsv {
                line: line_number,
                reason: "name is empty".to_string(),
            });
        }

        let attending = match fields[1].trim() {
            "" => None,
            value => Some(value.eq_ignore_ascii_case("true")),
        };

        let plus_ones = match fields[2].trim() {
            "" => 0,
            value => value.parse::<i64>().map_err(|e| ValidationError::InvalidCsv {
                line: line_number,
                reason: format!("invalid plus_ones value: {}", e),
            })?,
        };

        let dietary_restrictions = Some(fields[3].trim())
            .filter(|value| !value.is_empty())
            .map(String::from);

        guests.push(Guest {
            attending,
            plus_ones,
            dietary_restrictions,
            ..Guest::new(name)
        });
    }

    Ok(guests)
}

/// Split one CSV record, honouring double-quoted fields and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
}
