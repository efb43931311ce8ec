//! `git log` parsing for a fixed machine-readable format

use super::parse_timestamp;
use crate::types::LogEntry;

/// Commit id, author, ISO date and body, unit-separated, record-terminated.
pub const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%aI%x1f%B%x1e";

/// Commit id, author and ISO date only.
pub const STAMP_FORMAT: &str = "--format=%H%x1f%an%x1f%aI";

const FIELD_SEPARATOR: char = '\x1f';
const RECORD_SEPARATOR: char = '\x1e';

/// Parse output produced with [`LOG_FORMAT`] or [`STAMP_FORMAT`].
pub fn parse_log(output: &str) -> Vec<LogEntry> {
    output
        .split(RECORD_SEPARATOR)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .filter_map(parse_record)
        .collect()
}

fn parse_record(record: &str) -> Option<LogEntry> {
    let mut fields = record.splitn(4, FIELD_SEPARATOR);
    let id = fields.next()?.trim();
    if id.is_empty() {
        return None;
    }
    let author = fields.next().map(str::trim).filter(|a| !a.is_empty());
    let date = fields.next().and_then(parse_timestamp);
    let message = fields.next().unwrap_or_default().trim_end();

    Some(LogEntry {
        id: id.to_string(),
        author: author.map(str::to_string),
        date,
        message: message.to_string(),
    })
}
