//! Parsers turning backend output into canonical records

pub mod git_log;
pub mod porcelain;
pub mod svn_xml;

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp as printed by `svn --xml` and `git %aI`.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
