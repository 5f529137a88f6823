//! File-name conventions for posts.
//!
//! Post files may carry a leading `YYYY-MM-DD-` date prefix, which then serves
//! as the post date when the front matter has none:
//!
//! - `2024-03-01-spring-notes.md` → date 2024-03-01, title "Spring Notes"
//! - `hello-world.md` → no date, title "Hello World"
//!
//! Titles derived from file names have dashes and underscores turned into
//! spaces and each word capitalized.

use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Result of parsing a post file stem like `2024-03-01-spring-notes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStem {
    /// Date prefix if present and a real calendar date.
    pub date: Option<NaiveDate>,
    /// Stem with the date prefix removed. Equals the full stem when undated.
    pub name: String,
    /// Title-cased display title derived from `name`.
    pub display_title: String,
}

/// Whether a path names a Markdown source file (not hidden, `.md`/`.markdown`).
pub fn is_markdown(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    !hidden
        && path
            .extension()
            .map(|e| {
                let ext = e.to_string_lossy().to_lowercase();
                MARKDOWN_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
}

/// Parse a post file stem, splitting off an optional `YYYY-MM-DD-` prefix.
///
/// A prefix that looks like a date but isn't one (`2024-13-40-x`) is left in
/// the name.
pub fn parse_post_stem(stem: &str) -> ParsedStem {
    if let Some(caps) = date_prefix_regex().captures(stem)
        && let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d")
    {
        let rest = caps.get(2).map_or("", |m| m.as_str());
        let name = if rest.is_empty() { stem } else { rest };
        return ParsedStem {
            date: Some(date),
            name: name.to_string(),
            display_title: title_from_name(name),
        };
    }
    ParsedStem {
        date: None,
        name: stem.to_string(),
        display_title: title_from_name(stem),
    }
}

fn date_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:[-_](.*))?$").unwrap())
}

/// Turn a file-name fragment into a display title.
///
/// `my-first_post` → `My First Post`
pub fn title_from_name(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Convert a string to a URL-safe slug.
///
/// - Lowercase
/// - Whitespace and underscores become hyphens
/// - Punctuation is dropped; Unicode letters and digits are kept
/// - Runs of hyphens collapse, leading/trailing hyphens are trimmed
pub fn slugify(input: &str) -> String {
    let lowercased = input.to_lowercase();
    let mut slug = String::with_capacity(lowercased.len());
    for g in lowercased.graphemes(true) {
        let Some(c) = g.chars().next() else { continue };
        if c.is_whitespace() || c == '_' || c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_alphanumeric() {
            slug.push_str(g);
        }
    }
    slug.trim_end_matches('-').to_string()
}
