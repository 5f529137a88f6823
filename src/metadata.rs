//! Post metadata resolution.
//!
//! Each field is resolved independently from the sources available for it,
//! first non-empty value wins:
//!
//! - **Title**: front matter → file name (`2024-03-01-spring-notes.md` → "Spring Notes")
//! - **Date**: front matter → file-name date prefix → build date
//! - **Author**: front matter → `site.author` → none
//!
//! Dates are kept as written for display and parsed separately for sorting
//! and archive grouping. A date that does not parse is still shown, but the
//! post sorts last and is left out of the archive.

use crate::types::DateSource;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats tried, in order, for front-matter dates without a time zone.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Resolve a metadata field from multiple sources.
///
/// Takes optional values in priority order and returns the first non-None,
/// non-blank value, trimmed.
///
/// ```text
/// title:  resolve(&[front_matter_title, file_name_title])
/// author: resolve(&[front_matter_author, site_author])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// A post date after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDate {
    pub display: String,
    pub published: Option<NaiveDate>,
    pub source: DateSource,
}

/// Resolve a post date from front matter, the file-name prefix, or `today`.
pub fn resolve_date(
    front_matter: Option<&str>,
    from_file_name: Option<NaiveDate>,
    today: NaiveDate,
) -> ResolvedDate {
    if let Some(raw) = front_matter.map(str::trim).filter(|s| !s.is_empty()) {
        return ResolvedDate {
            display: raw.to_string(),
            published: parse_date(raw),
            source: DateSource::FrontMatter,
        };
    }
    let (date, source) = match from_file_name {
        Some(date) => (date, DateSource::FileName),
        None => (today, DateSource::Today),
    };
    ResolvedDate {
        display: date.format("%Y-%m-%d").to_string(),
        published: Some(date),
        source,
    }
}

/// Parse a date written in front matter. Time-of-day and offsets are accepted
/// and dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Text of the first level-one ATX heading (`# Title`) in a Markdown body.
pub fn first_heading(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().trim_end_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
}
