//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every post is its semantic identity (positional index and title),
//! with dates, tags and source files shown as indented context lines. This
//! reads as a content inventory while still letting users trace each entry
//! back to a file.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Posts
//! 001 Hello World
//!     Date: 2024-06-10
//!     Source: hello-world.md
//!     Tags: intro, meta
//! 002 Spring Notes
//!     Date: 2024-03-01 (file name)
//!     Source: 2024-03-01-spring-notes.md
//!
//! About
//!     About Field Notes
//!         Source: about.md
//!
//! Config
//!     config.toml
//!     templates/ (post.html)
//!     assets/
//! ```
//!
//! ## Generate
//!
//! ```text
//! Posts
//! 001 Hello World → hello-world.html
//! 002 Spring Notes → 2024-03-01-spring-notes.html
//!
//! Pages
//! Field Notes → index.html
//! Archive → archives.html
//! About Field Notes → about.html
//!
//! Generated 2 posts, 3 pages, 2 assets
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions do no I/O
//! beyond checking which optional project files exist.

use crate::generate::{GenerateReport, PageKind};
use crate::scan::Manifest;
use crate::templates;
use crate::types::{DateSource, Post};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max).collect::<String>())
    }
}

/// Date line with a marker when the date was defaulted or did not parse.
fn date_line(post: &Post) -> String {
    let note = match (post.date_source, post.published) {
        (_, None) => " (unrecognised)",
        (DateSource::FileName, _) => " (file name)",
        (DateSource::Today, _) => " (today)",
        (DateSource::FrontMatter, _) => "",
    };
    format!("Date: {}{}", post.date, note)
}

// ============================================================================
// Scan
// ============================================================================

/// Format scan stage output: the post inventory, the about page, and which
/// optional project files are present.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let config = &manifest.config;

    lines.push("Posts".to_string());
    if manifest.posts.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, post) in manifest.posts.iter().enumerate() {
        let draft = if post.draft { " [draft]" } else { "" };
        lines.push(format!("{} {}{}", format_index(i + 1), post.title, draft));
        lines.push(format!("{}{}", indent(1), date_line(post)));
        lines.push(format!("{}Source: {}", indent(1), post.source));
        let stem = Path::new(&post.source).file_stem().map(|s| s.to_string_lossy());
        if stem.as_deref() != Some(post.id.as_str()) {
            lines.push(format!("{}Output: {}", indent(1), post.file_name()));
        }
        if !post.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), post.tags.join(", ")));
        }
        if let Some(summary) = &post.summary {
            lines.push(format!("{}{}", indent(1), truncate_desc(summary.trim(), 60)));
        }
    }

    if let Some(about) = &manifest.about {
        lines.push(String::new());
        lines.push("About".to_string());
        lines.push(format!("{}{}", indent(1), about.title));
        lines.push(format!("{}Source: {}", indent(2), about.source));
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join(crate::config::CONFIG_FILE).exists() {
        lines.push(format!("{}{}", indent(1), crate::config::CONFIG_FILE));
    }
    let templates_dir = source_root.join(&config.paths.templates);
    if templates_dir.is_dir() {
        let overrides: Vec<&str> = [
            templates::BASE,
            templates::POST,
            templates::INDEX,
            templates::ARCHIVE,
            templates::ABOUT,
        ]
        .into_iter()
        .filter(|name| templates_dir.join(name).is_file())
        .collect();
        if overrides.is_empty() {
            lines.push(format!("{}{}/", indent(1), config.paths.templates));
        } else {
            lines.push(format!(
                "{}{}/ ({})",
                indent(1),
                config.paths.templates,
                overrides.join(", ")
            ));
        }
    }
    if source_root.join(&config.paths.assets).is_dir() {
        lines.push(format!("{}{}/", indent(1), config.paths.assets));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format generate stage output: every written page as `title → path`.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Posts".to_string());
    let posts = report.pages.iter().filter(|p| p.kind == PageKind::Post);
    for (i, page) in posts.enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            page.title,
            page.path
        ));
    }

    lines.push(String::new());
    lines.push("Pages".to_string());
    for page in report.pages.iter().filter(|p| p.kind != PageKind::Post) {
        lines.push(format!("{}{} \u{2192} {}", indent(1), page.title, page.path));
    }
    if report.about_preserved {
        lines.push(format!("{}about.html kept (existing file)", indent(1)));
    }

    if !report.templates_overridden.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Templates from project: {}",
            report.templates_overridden.join(", ")
        ));
    }
    if !report.undated_posts.is_empty() {
        lines.push(format!(
            "Not in archive (unrecognised date): {}",
            report.undated_posts.join(", ")
        ));
    }

    let post_count = report.post_count();
    lines.push(String::new());
    lines.push(format!(
        "Generated {} posts, {} pages, {} assets",
        post_count,
        report.pages.len() - post_count,
        report.assets_copied
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Scaffolding
// ============================================================================

/// Format a list of created files relative to `root`.
pub fn format_created_files(files: &[PathBuf], root: &Path) -> Vec<String> {
    files
        .iter()
        .map(|f| {
            let rel = f.strip_prefix(root).unwrap_or(f);
            format!("Created {}", rel.display())
        })
        .collect()
}

/// Print created files to stdout.
pub fn print_created_files(files: &[PathBuf], root: &Path) {
    for line in format_created_files(files, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GeneratedPage;
    use crate::test_helpers::{find_post, scan_fixtures, setup_fixtures};
    use std::fs;

    fn page(kind: PageKind, title: &str, path: &str) -> GeneratedPage {
        GeneratedPage {
            kind,
            title: title.to_string(),
            path: path.to_string(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn truncate_desc_counts_characters() {
        assert_eq!(truncate_desc("short", 10), "short");
        assert_eq!(truncate_desc("hello world", 5), "hello...");
        assert_eq!(truncate_desc("ééééé", 3), "ééé...");
    }

    #[test]
    fn date_line_notes_source() {
        let tmp = setup_fixtures();
        let manifest = scan_fixtures(tmp.path());
        assert_eq!(
            date_line(find_post(&manifest, "hello-world")),
            "Date: 2024-06-10"
        );
        assert_eq!(
            date_line(find_post(&manifest, "2024-03-01-spring-notes")),
            "Date: 2024-03-01 (file name)"
        );
        assert_eq!(
            date_line(find_post(&manifest, "someday")),
            "Date: someday soon (unrecognised)"
        );
    }

    // =========================================================================
    // Scan
    // =========================================================================

    #[test]
    fn scan_output_lists_posts_in_order() {
        let tmp = setup_fixtures();
        let manifest = scan_fixtures(tmp.path());
        let lines = format_scan_output(&manifest, tmp.path());

        assert_eq!(lines[0], "Posts");
        assert_eq!(lines[1], "001 Hello World");
        assert!(lines.contains(&"    Source: hello-world.md".to_string()));
        assert!(lines.contains(&"    Tags: intro, meta".to_string()));
        assert!(lines.contains(&"002 Rust Tips".to_string()));
        assert!(lines.contains(&"    A handful of small Rust habits.".to_string()));
    }

    #[test]
    fn scan_output_about_and_config() {
        let tmp = setup_fixtures();
        let manifest = scan_fixtures(tmp.path());
        let lines = format_scan_output(&manifest, tmp.path());

        let about = lines.iter().position(|l| l == "About").unwrap();
        assert_eq!(lines[about + 1], "    About Field Notes");
        assert_eq!(lines[about + 2], "        Source: about.md");

        let config = lines.iter().position(|l| l == "Config").unwrap();
        assert_eq!(lines[config + 1], "    config.toml");
        assert_eq!(lines[config + 2], "    assets/");
    }

    #[test]
    fn scan_output_shows_template_overrides() {
        let tmp = setup_fixtures();
        fs::create_dir_all(tmp.path().join("templates")).unwrap();
        fs::write(tmp.path().join("templates/post.html"), "x").unwrap();
        let manifest = scan_fixtures(tmp.path());
        let lines = format_scan_output(&manifest, tmp.path());
        assert!(lines.contains(&"    templates/ (post.html)".to_string()));
    }

    #[test]
    fn scan_output_marks_custom_output_name() {
        let tmp = setup_fixtures();
        fs::write(
            tmp.path().join("posts/renamed.md"),
            "---\nslug: elsewhere\ndate: 2020-01-01\n---\n",
        )
        .unwrap();
        let manifest = scan_fixtures(tmp.path());
        let lines = format_scan_output(&manifest, tmp.path());
        assert!(lines.contains(&"    Output: elsewhere.html".to_string()));
    }

    // =========================================================================
    // Generate
    // =========================================================================

    #[test]
    fn generate_output_lists_pages() {
        let report = GenerateReport {
            pages: vec![
                page(PageKind::Post, "Hello World", "hello-world.html"),
                page(PageKind::Post, "Rust Tips", "rust-tips.html"),
                page(PageKind::Index, "Field Notes", "index.html"),
                page(PageKind::Archive, "Archive", "archives.html"),
            ],
            assets_copied: 2,
            about_preserved: true,
            ..Default::default()
        };
        let lines = format_generate_output(&report);

        assert_eq!(
            lines,
            vec![
                "Posts",
                "001 Hello World \u{2192} hello-world.html",
                "002 Rust Tips \u{2192} rust-tips.html",
                "",
                "Pages",
                "    Field Notes \u{2192} index.html",
                "    Archive \u{2192} archives.html",
                "    about.html kept (existing file)",
                "",
                "Generated 2 posts, 2 pages, 2 assets",
            ]
        );
    }

    #[test]
    fn generate_output_notes_overrides_and_undated() {
        let report = GenerateReport {
            templates_overridden: vec!["post.html".into()],
            undated_posts: vec!["someday.md".into()],
            ..Default::default()
        };
        let lines = format_generate_output(&report);
        assert!(lines.contains(&"Templates from project: post.html".to_string()));
        assert!(lines.contains(&"Not in archive (unrecognised date): someday.md".to_string()));
        assert_eq!(lines.last().unwrap(), "Generated 0 posts, 0 pages, 0 assets");
    }

    #[test]
    fn created_files_are_relative() {
        let root = Path::new("/tmp/blog");
        let lines = format_created_files(
            &[root.join("config.toml"), root.join("posts/a.md")],
            root,
        );
        assert_eq!(lines, vec!["Created config.toml", "Created posts/a.md"]);
    }
}
