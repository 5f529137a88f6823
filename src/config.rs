//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the project root and is sparse: stock defaults are overridden key by key by
//! whatever the user writes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "My Blog"
//! description = ""
//! language = "en"
//! direction = "ltr"         # "rtl" for right-to-left scripts
//! author = ""               # Default author for posts without one
//! base_url = ""             # Prefix for site-internal links; empty = relative
//!
//! [paths]
//! posts = "posts"
//! templates = "templates"
//! assets = "assets"
//! about = "about.md"
//!
//! [posts]
//! naming = "stem"           # "stem" (file name) or "title" (slugified title)
//! drafts = false            # Include posts marked `draft: true`
//!
//! [markdown]
//! tables = true
//! footnotes = true
//! strikethrough = true
//! tasklists = true
//! smart_punctuation = false
//! heading_anchors = true
//!
//! [toc]
//! enabled = true
//! base_level = 1            # 2 renders `#` as <h2>
//! max_level = 6
//!
//! [index]
//! sort = "date-desc"        # "date-desc", "date-asc" or "filename"
//! summary_length = 150
//!
//! [archive]
//! enabled = true
//! month_names = ["January", ..., "December"]
//!
//! [about]
//! enabled = true
//! title = "About"
//! preserve_existing = false
//!
//! [processing]
//! max_processes = 4         # Max parallel render workers (omit for auto)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity shown in the header, footer and `<title>`.
    pub site: SiteInfo,
    /// Input locations, relative to the project root.
    pub paths: PathsConfig,
    /// How posts are named and filtered.
    pub posts: PostsConfig,
    /// Markdown extensions.
    pub markdown: MarkdownConfig,
    /// Table of contents and heading levels.
    pub toc: TocConfig,
    /// Index page ordering and summaries.
    pub index: IndexConfig,
    /// Archive page grouping.
    pub archive: ArchiveConfig,
    /// About page.
    pub about: AboutConfig,
    /// Interface strings used by the built-in templates.
    pub labels: Labels,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Layout settings.
    pub theme: ThemeConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation("site.title must not be empty".into()));
        }
        if !matches!(self.site.direction.as_str(), "ltr" | "rtl") {
            return Err(ConfigError::Validation(
                "site.direction must be \"ltr\" or \"rtl\"".into(),
            ));
        }
        if self
            .site
            .base_url
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>'))
        {
            return Err(ConfigError::Validation(
                "site.base_url contains a character not allowed in a link".into(),
            ));
        }
        if !(1..=6).contains(&self.toc.base_level) {
            return Err(ConfigError::Validation("toc.base_level must be 1-6".into()));
        }
        if !(1..=6).contains(&self.toc.max_level) {
            return Err(ConfigError::Validation("toc.max_level must be 1-6".into()));
        }
        if self.index.summary_length == 0 {
            return Err(ConfigError::Validation(
                "index.summary_length must be greater than zero".into(),
            ));
        }
        if self.archive.month_names.len() != 12 {
            return Err(ConfigError::Validation(format!(
                "archive.month_names must have 12 entries, found {}",
                self.archive.month_names.len()
            )));
        }
        Ok(())
    }
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    /// Value of `<html lang>`.
    pub language: String,
    /// Value of `<html dir>`: `ltr` or `rtl`.
    pub direction: String,
    /// Author applied to posts that don't name one. Empty means none.
    pub author: String,
    /// Prefix for links between generated pages. Empty keeps links relative.
    pub base_url: String,
}

impl SiteInfo {
    /// `base_url` as a link prefix: empty, or ending in exactly one `/`.
    pub fn link_prefix(&self) -> String {
        let base = self.base_url.trim();
        if base.is_empty() {
            String::new()
        } else {
            format!("{}/", base.trim_end_matches('/'))
        }
    }
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            language: "en".to_string(),
            direction: "ltr".to_string(),
            author: String::new(),
            base_url: String::new(),
        }
    }
}

/// Input locations relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub posts: String,
    pub templates: String,
    pub assets: String,
    pub about: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            posts: "posts".to_string(),
            templates: "templates".to_string(),
            assets: "assets".to_string(),
            about: "about.md".to_string(),
        }
    }
}

/// How a post's output file name is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostNaming {
    /// Source file stem: `hello-world.md` → `hello-world.html`.
    #[default]
    Stem,
    /// Slugified title: `title: Hello, World!` → `hello-world.html`.
    Title,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    pub naming: PostNaming,
    /// Include posts whose front matter sets `draft: true`.
    pub drafts: bool,
}

/// Markdown extensions passed to the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
    /// Append a `#` permalink inside every heading.
    pub heading_anchors: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
            heading_anchors: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    pub enabled: bool,
    /// Level that a top-level `#` heading renders at.
    pub base_level: u8,
    /// Deepest (rendered) heading level listed in the TOC.
    pub max_level: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_level: 1,
            max_level: 6,
        }
    }
}

/// Post ordering on the index page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Newest first. Undated posts go last.
    #[default]
    DateDesc,
    /// Oldest first. Undated posts go last.
    DateAsc,
    /// Source file name order.
    Filename,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub sort: SortOrder,
    /// Maximum summary length in characters before `...` is appended.
    pub summary_length: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            sort: SortOrder::DateDesc,
            summary_length: 150,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    pub enabled: bool,
    /// Display names for months 1-12.
    pub month_names: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            month_names: [
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AboutConfig {
    pub enabled: bool,
    /// Title used when `about.md` has none, and for the built-in page.
    pub title: String,
    /// Leave an existing `about.html` in the output alone when there is no
    /// `about.md` to render.
    pub preserve_existing: bool,
}

impl Default for AboutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "About".to_string(),
            preserve_existing: false,
        }
    }
}

/// Interface strings for the built-in templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labels {
    pub home: String,
    pub archive: String,
    pub about: String,
    pub posts: String,
    pub toc: String,
    pub author: String,
    pub about_author: String,
    pub read_more: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            home: "Home".to_string(),
            archive: "Archive".to_string(),
            about: "About".to_string(),
            posts: "Posts".to_string(),
            toc: "Table of Contents".to_string(),
            author: "Author".to_string(),
            about_author: "About the author".to_string(),
            read_more: "Read more".to_string(),
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never less than one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Maximum width of the main column (CSS value).
    pub content_width: String,
    /// Body font stack (CSS value).
    pub font_family: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            content_width: "48rem".to_string(),
            font_family: "system-ui, -apple-system, \"Segoe UI\", sans-serif".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    /// Card and TOC panels.
    pub surface: String,
    pub text: String,
    /// Dates, captions, footer.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Header band and tag chips.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f5f5f7".to_string(),
            surface: "#ffffff".to_string(),
            text: "#1d1d1f".to_string(),
            text_muted: "#6e6e73".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#2563eb".to_string(),
            link_hover: "#1e40af".to_string(),
            accent: "#4f46e5".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0f0f12".to_string(),
            surface: "#1a1a1f".to_string(),
            text: "#ececf1".to_string(),
            text_muted: "#9a9aa5".to_string(),
            border: "#2e2e36".to_string(),
            link: "#93b4ff".to_string(),
            link_hover: "#c7d7ff".to_string(),
            accent: "#6d64f0".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(root)?;
    if overlay.is_none() {
        tracing::debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` and `init` commands.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Blog Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "My Blog"
description = ""
# Value of <html lang> and <html dir>. Use direction = "rtl" for
# right-to-left scripts such as Persian or Arabic.
language = "en"
direction = "ltr"
# Author applied to posts whose front matter has none.
author = ""
# Prefix for links between generated pages and to relative asset paths,
# e.g. "/blog/" or "https://example.com/". Empty keeps every link relative.
base_url = ""

# ---------------------------------------------------------------------------
# Input locations (relative to this file)
# ---------------------------------------------------------------------------
[paths]
posts = "posts"
# Files here override the built-in templates of the same name:
# base.html, post.html, index.html, archive.html, about.html
templates = "templates"
# Copied verbatim to <output>/<assets>.
assets = "assets"
about = "about.md"

# ---------------------------------------------------------------------------
# Posts
# ---------------------------------------------------------------------------
[posts]
# Output file name: "stem" keeps the source file name,
# "title" uses the slugified post title.
naming = "stem"
# Include posts whose front matter sets `draft: true`.
drafts = false

# ---------------------------------------------------------------------------
# Markdown extensions (fenced code blocks are always on)
# ---------------------------------------------------------------------------
[markdown]
tables = true
footnotes = true
strikethrough = true
tasklists = true
smart_punctuation = false
# Append a "#" permalink to every heading.
heading_anchors = true

# ---------------------------------------------------------------------------
# Table of contents
# ---------------------------------------------------------------------------
[toc]
enabled = true
# Level a top-level "#" heading renders at. 2 turns "#" into <h2>.
base_level = 1
# Deepest rendered heading level listed in the table of contents.
max_level = 6

# ---------------------------------------------------------------------------
# Index page
# ---------------------------------------------------------------------------
[index]
# "date-desc" (newest first), "date-asc" or "filename".
sort = "date-desc"
# Summaries longer than this many characters are cut and end in "...".
summary_length = 150

# ---------------------------------------------------------------------------
# Archive page
# ---------------------------------------------------------------------------
[archive]
enabled = true
month_names = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
]

# ---------------------------------------------------------------------------
# About page (rendered from about.md, or a built-in placeholder)
# ---------------------------------------------------------------------------
[about]
enabled = true
title = "About"
# Keep an existing about.html in the output when there is no about.md.
preserve_existing = false

# ---------------------------------------------------------------------------
# Interface strings
# ---------------------------------------------------------------------------
[labels]
home = "Home"
archive = "Archive"
about = "About"
posts = "Posts"
toc = "Table of Contents"
author = "Author"
about_author = "About the author"
read_more = "Read more"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#f5f5f7"
surface = "#ffffff"
text = "#1d1d1f"
text_muted = "#6e6e73"
border = "#e0e0e0"
link = "#2563eb"
link_hover = "#1e40af"
accent = "#4f46e5"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0f0f12"
surface = "#1a1a1f"
text = "#ececf1"
text_muted = "#9a9aa5"
border = "#2e2e36"
link = "#93b4ff"
link_hover = "#c7d7ff"
accent = "#6d64f0"

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[theme]
content_width = "48rem"
font_family = 'system-ui, -apple-system, "Segoe UI", sans-serif'

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}",
        color_vars(&colors.light, "    "),
        color_vars(&colors.dark, "        "),
    )
}

fn color_vars(scheme: &ColorScheme, indent: &str) -> String {
    [
        ("bg", &scheme.background),
        ("surface", &scheme.surface),
        ("text", &scheme.text),
        ("text-muted", &scheme.text_muted),
        ("border", &scheme.border),
        ("link", &scheme.link),
        ("link-hover", &scheme.link_hover),
        ("accent", &scheme.accent),
    ]
    .iter()
    .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
    .collect()
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        ":root {{\n    --content-width: {};\n    --font-family: {};\n}}",
        theme.content_width, theme.font_family,
    )
}
