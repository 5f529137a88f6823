//! Shared types passed between the scan and generate stages.
//!
//! These are serialized into the scan manifest (`manifest.json`) and read back
//! by the generate stage, so both sides use the same definitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A blog post: one per Markdown source file, with every metadata default
/// already applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Output file stem; the post is written to `<id>.html`. Unique per site.
    pub id: String,
    /// Source file name inside the posts directory.
    pub source: String,
    pub title: String,
    /// Date as displayed: the front-matter text, or `YYYY-MM-DD` when defaulted.
    pub date: String,
    /// Parsed calendar date. `None` when the front-matter date is unrecognised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<NaiveDate>,
    pub date_source: DateSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    /// Summary from front matter. Generated from the body when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_head: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    /// Unrecognised front-matter keys.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
    /// Markdown body with the front matter removed.
    pub body: String,
}

impl Post {
    /// Output file name relative to the site root.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.id)
    }
}

/// Where a post's date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    FrontMatter,
    /// `YYYY-MM-DD-` prefix of the file name.
    FileName,
    /// Nothing else available; the build date was used.
    Today,
}

/// Source of the about page (`about.md`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutPage {
    /// Front-matter title, first `# ` heading, or the configured about title.
    pub title: String,
    /// Path of the source file relative to the project root.
    pub source: String,
    /// Markdown body with the front matter removed.
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_head: Option<String>,
}
