//! Post discovery and manifest generation.
//!
//! Stage 1 of the build pipeline. Reads every Markdown file in the posts
//! directory, splits off front matter and applies metadata defaults, producing
//! a [`Manifest`] the generate stage consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! blog/                              # Project root
//! ├── config.toml                    # Site configuration (optional)
//! ├── about.md                       # About page source (optional)
//! ├── posts/
//! │   ├── 2024-03-01-spring-notes.md # Date taken from the prefix
//! │   ├── hello-world.md             # Date from front matter, else today
//! │   └── .scratch.md                # Hidden, ignored
//! ├── templates/                     # Template overrides (optional)
//! └── assets/                        # Copied verbatim (optional)
//! ```
//!
//! ## Defaults
//!
//! | Field  | Sources, first available wins                      |
//! |--------|----------------------------------------------------|
//! | title  | front matter → file name (`spring-notes` → "Spring Notes") |
//! | date   | front matter → `YYYY-MM-DD-` file-name prefix → today |
//! | author | front matter → `site.author`                       |
//! | id     | `slug` → file stem or slugified title (`posts.naming`) |
//!
//! ## Validation
//!
//! - The posts directory must exist
//! - No two posts may share an output name
//! - No post may take the name of a generated page (`index`, `archives`, `about`)
//!
//! Malformed front matter and unparseable dates are not errors: they are
//! logged and the post is kept with defaults.

use crate::config::{self, PostNaming, SiteConfig, SortOrder};
use crate::frontmatter::{self, FrontMatter};
use crate::generate;
use crate::metadata;
use crate::naming::{self, slugify};
use crate::types::{AboutPage, Post};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Posts directory not found: {0}")]
    MissingPostsDir(PathBuf),
    #[error("{first} and {second} both render to {id}.html")]
    DuplicateSlug {
        id: String,
        first: String,
        second: String,
    },
    #[error("{file} renders to {page}, which is a generated page; set a different slug")]
    ReservedName { file: String, page: String },
}

/// Manifest output from the scan stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Posts in index order.
    pub posts: Vec<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<AboutPage>,
    pub config: SiteConfig,
}

/// Per-run inputs that do not come from `config.toml`.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Date used for posts without any other date.
    pub today: NaiveDate,
    /// Include drafts even when `posts.drafts` is off.
    pub include_drafts: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
            include_drafts: false,
        }
    }
}

/// Scan a project root: load its config, then its posts and about page.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    scan_with_config(root, config, options)
}

/// Scan with an already-loaded config.
pub fn scan_with_config(
    root: &Path,
    config: SiteConfig,
    options: &ScanOptions,
) -> Result<Manifest, ScanError> {
    let posts_dir = root.join(&config.paths.posts);
    if !posts_dir.is_dir() {
        return Err(ScanError::MissingPostsDir(posts_dir));
    }

    let include_drafts = options.include_drafts || config.posts.drafts;
    let mut posts = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for path in collect_post_files(&posts_dir)? {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let content = fs::read_to_string(&path)?;
        let post = build_post(&source, &content, &config, options.today);

        if post.draft && !include_drafts {
            debug!(file = %source, "skipping draft");
            continue;
        }
        if generate::is_reserved_page(&post.file_name()) {
            return Err(ScanError::ReservedName {
                file: source,
                page: post.file_name(),
            });
        }
        if let Some(first) = seen.insert(post.id.clone(), source.clone()) {
            return Err(ScanError::DuplicateSlug {
                id: post.id,
                first,
                second: source,
            });
        }
        posts.push(post);
    }

    sort_posts(&mut posts, config.index.sort);

    let about = if config.about.enabled {
        load_about(root, &config)?
    } else {
        None
    };

    Ok(Manifest {
        posts,
        about,
        config,
    })
}

/// Markdown files directly inside the posts directory, sorted by file name.
fn collect_post_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && naming::is_markdown(p))
        .collect();
    files.sort();
    Ok(files)
}

/// Parse front matter, logging and defaulting when the block is malformed.
fn parse_source<'a>(source: &str, content: &'a str) -> (FrontMatter, &'a str) {
    match frontmatter::parse(content) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(file = %source, "{e}; using default metadata");
            (FrontMatter::default(), frontmatter::split(content).body)
        }
    }
}

/// Build a post record from one source file, applying every default.
pub fn build_post(source: &str, content: &str, config: &SiteConfig, today: NaiveDate) -> Post {
    let stem = Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = naming::parse_post_stem(&stem);
    let (fm, body) = parse_source(source, content);

    let title = metadata::resolve(&[fm.title.as_deref(), Some(parsed.display_title.as_str())])
        .unwrap_or_else(|| stem.clone());
    let date = metadata::resolve_date(fm.date.as_deref(), parsed.date, today);
    if date.published.is_none() {
        debug!(file = %source, date = %date.display, "unrecognised date");
    }
    let author = metadata::resolve(&[fm.author.as_deref(), Some(config.site.author.as_str())]);
    let id = output_id(fm.slug.as_deref(), &stem, &title, config.posts.naming);

    Post {
        id,
        source: source.to_string(),
        title,
        date: date.display,
        published: date.published,
        date_source: date.source,
        author,
        author_bio: fm.author_bio,
        author_image: fm.author_image,
        hero_image: fm.hero_image,
        summary: fm.summary,
        extra_head: fm.extra_head,
        tags: fm.tags,
        draft: fm.draft,
        extra: fm.extra,
        body: body.to_string(),
    }
}

/// Output file stem for a post. Falls back to the source stem when the
/// preferred name slugifies to nothing.
fn output_id(slug: Option<&str>, stem: &str, title: &str, naming: PostNaming) -> String {
    let candidate = match (slug, naming) {
        (Some(slug), _) => slugify(slug),
        (None, PostNaming::Stem) => return stem.to_string(),
        (None, PostNaming::Title) => slugify(title),
    };
    if candidate.is_empty() {
        stem.to_string()
    } else {
        candidate
    }
}

/// Order posts for the index.
///
/// Posts are first put in file-name order; the date sorts are stable, so
/// posts sharing a date keep that order. Posts without a parsed date go last.
pub fn sort_posts(posts: &mut [Post], order: SortOrder) {
    posts.sort_by(|a, b| a.source.cmp(&b.source));
    match order {
        SortOrder::Filename => {}
        SortOrder::DateDesc => posts.sort_by(|a, b| compare_dates(a, b, true)),
        SortOrder::DateAsc => posts.sort_by(|a, b| compare_dates(a, b, false)),
    }
}

fn compare_dates(a: &Post, b: &Post, newest_first: bool) -> Ordering {
    match (a.published, b.published) {
        (Some(x), Some(y)) if newest_first => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Load the about page source if the file exists.
///
/// Title: front matter → first `# ` heading → `about.title`.
fn load_about(root: &Path, config: &SiteConfig) -> Result<Option<AboutPage>, ScanError> {
    let path = root.join(&config.paths.about);
    if !path.is_file() {
        debug!(path = %path.display(), "no about page source");
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let (fm, body) = parse_source(&config.paths.about, &content);
    let heading = metadata::first_heading(body);
    let title = metadata::resolve(&[fm.title.as_deref(), heading.as_deref()])
        .unwrap_or_else(|| config.about.title.clone());

    Ok(Some(AboutPage {
        title,
        source: config.paths.about.clone(),
        body: body.to_string(),
        extra_head: fm.extra_head,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{find_post, post_ids as ids, setup_fixtures, today};
    use crate::types::DateSource;
    use tempfile::TempDir;

    fn options() -> ScanOptions {
        ScanOptions {
            today: today(),
            include_drafts: false,
        }
    }

    /// A project root with only the given posts.
    fn project(posts: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("posts");
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in posts {
            fs::write(dir.join(name), content).unwrap();
        }
        tmp
    }

    // =========================================================================
    // Fixture tests
    // =========================================================================

    #[test]
    fn scan_fixtures_finds_published_posts() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path(), &options()).unwrap();

        // 5 sources, one of them a draft; notes.txt is ignored
        assert_eq!(manifest.posts.len(), 4);
        assert!(manifest.posts.iter().all(|p| !p.draft));
    }

    #[test]
    fn fixtures_sorted_newest_first_with_bad_date_last() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(
            ids(&manifest),
            vec!["hello-world", "rust-tips", "2024-03-01-spring-notes", "someday"]
        );
        let spring = find_post(&manifest, "2024-03-01-spring-notes");
        assert_eq!(spring.title, "Spring Notes");
        assert_eq!(spring.date_source, DateSource::FileName);
        assert_eq!(find_post(&manifest, "someday").published, None);
    }

    #[test]
    fn fixtures_drafts_included_on_request() {
        let tmp = setup_fixtures();
        let opts = ScanOptions {
            include_drafts: true,
            ..options()
        };
        let manifest = scan(tmp.path(), &opts).unwrap();
        assert_eq!(manifest.posts.len(), 5);
        assert!(manifest.posts.iter().any(|p| p.draft));
    }

    #[test]
    fn fixtures_config_and_about_loaded() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path(), &options()).unwrap();

        assert_eq!(manifest.config.site.title, "Field Notes");
        let about = manifest.about.unwrap();
        assert_eq!(about.title, "About Field Notes");
        assert_eq!(about.source, "about.md");
    }

    // =========================================================================
    // Metadata defaults
    // =========================================================================

    #[test]
    fn no_front_matter_uses_file_name_and_today() {
        let tmp = project(&[("my-first_post.md", "Just text.")]);
        let manifest = scan(tmp.path(), &options()).unwrap();

        let post = &manifest.posts[0];
        assert_eq!(post.title, "My First Post");
        assert_eq!(post.date, today().format("%Y-%m-%d").to_string());
        assert_eq!(post.date_source, DateSource::Today);
        assert_eq!(post.author, None);
        assert!(post.tags.is_empty());
        assert_eq!(post.body, "Just text.");
        assert_eq!(post.id, "my-first_post");
    }

    #[test]
    fn date_prefix_supplies_date_and_title() {
        let tmp = project(&[("2023-07-04-fireworks.md", "Boom.")]);
        let manifest = scan(tmp.path(), &options()).unwrap();

        let post = &manifest.posts[0];
        assert_eq!(post.title, "Fireworks");
        assert_eq!(post.date, "2023-07-04");
        assert_eq!(post.date_source, DateSource::FileName);
        assert_eq!(post.id, "2023-07-04-fireworks");
    }

    #[test]
    fn front_matter_overrides_defaults() {
        let tmp = project(&[(
            "2023-07-04-fireworks.md",
            "---\ntitle: Night Sky\ndate: 2023-07-05\nauthor: Ana\ntags: [summer]\n---\nBody",
        )]);
        let manifest = scan(tmp.path(), &options()).unwrap();

        let post = &manifest.posts[0];
        assert_eq!(post.title, "Night Sky");
        assert_eq!(post.date, "2023-07-05");
        assert_eq!(post.date_source, DateSource::FrontMatter);
        assert_eq!(post.author.as_deref(), Some("Ana"));
        assert_eq!(post.tags, vec!["summer"]);
        assert_eq!(post.body, "Body");
    }

    #[test]
    fn site_author_is_default_author() {
        let mut config = SiteConfig::default();
        config.site.author = "Site Owner".into();
        let post = build_post("a.md", "text", &config, today());
        assert_eq!(post.author.as_deref(), Some("Site Owner"));

        let post = build_post("a.md", "---\nauthor: Guest\n---\n", &config, today());
        assert_eq!(post.author.as_deref(), Some("Guest"));
    }

    #[test]
    fn malformed_front_matter_falls_back_to_defaults() {
        let content = "---\ntitle: [unclosed\n---\nStill a post.";
        let post = build_post("broken-meta.md", content, &SiteConfig::default(), today());
        assert_eq!(post.title, "Broken Meta");
        assert_eq!(post.body, "Still a post.");
    }

    #[test]
    fn unparseable_date_kept_for_display() {
        let post = build_post(
            "x.md",
            "---\ndate: sometime soon\n---\n",
            &SiteConfig::default(),
            today(),
        );
        assert_eq!(post.date, "sometime soon");
        assert_eq!(post.published, None);
    }

    // =========================================================================
    // Output names
    // =========================================================================

    #[test]
    fn slug_front_matter_wins() {
        let post = build_post(
            "a.md",
            "---\nslug: Custom Name!\n---\n",
            &SiteConfig::default(),
            today(),
        );
        assert_eq!(post.id, "custom-name");
        assert_eq!(post.file_name(), "custom-name.html");
    }

    #[test]
    fn title_naming_slugifies_title() {
        let mut config = SiteConfig::default();
        config.posts.naming = PostNaming::Title;
        let post = build_post("a.md", "---\ntitle: Hello, World!\n---\n", &config, today());
        assert_eq!(post.id, "hello-world");

        // Title with nothing sluggable falls back to the stem
        let post = build_post("fallback.md", "---\ntitle: \"???\"\n---\n", &config, today());
        assert_eq!(post.id, "fallback");
    }

    #[test]
    fn duplicate_output_name_is_error() {
        let tmp = project(&[
            ("a.md", "---\nslug: same\n---\n"),
            ("b.md", "---\nslug: same\n---\n"),
        ]);
        let result = scan(tmp.path(), &options());
        assert!(matches!(
            result,
            Err(ScanError::DuplicateSlug { ref id, ref first, ref second })
                if id == "same" && first == "a.md" && second == "b.md"
        ));
    }

    #[test]
    fn skipped_draft_does_not_claim_its_name() {
        let tmp = project(&[
            ("a.md", "---\nslug: same\ndraft: true\n---\n"),
            ("b.md", "---\nslug: same\n---\n"),
        ]);
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(manifest.posts.len(), 1);
        assert_eq!(manifest.posts[0].source, "b.md");
    }

    #[test]
    fn post_cannot_take_a_generated_page_name() {
        for (name, page) in [("index.md", "index.html"), ("about.md", "about.html")] {
            let tmp = project(&[(name, "Post body")]);
            let result = scan(tmp.path(), &options());
            assert!(
                matches!(result, Err(ScanError::ReservedName { ref file, page: ref p }) if file == name && p == page),
                "{name}"
            );
        }
    }

    #[test]
    fn reserved_name_via_slug_is_rejected() {
        let tmp = project(&[("list.md", "---\nslug: Archives\n---\n")]);
        let result = scan(tmp.path(), &options());
        assert!(matches!(result, Err(ScanError::ReservedName { .. })));
    }

    #[test]
    fn draft_with_reserved_name_is_skipped_quietly() {
        let tmp = project(&[("index.md", "---\ndraft: true\n---\n")]);
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert!(manifest.posts.is_empty());
    }

    // =========================================================================
    // Discovery and sorting
    // =========================================================================

    #[test]
    fn only_visible_markdown_files_are_posts() {
        let tmp = project(&[
            ("a.md", "A"),
            ("b.markdown", "B"),
            (".hidden.md", "H"),
            ("notes.txt", "T"),
        ]);
        fs::create_dir_all(tmp.path().join("posts/sub.md")).unwrap();
        let manifest = scan(tmp.path(), &options()).unwrap();
        let sources: Vec<&str> = manifest.posts.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(sources, vec!["a.md", "b.markdown"]);
    }

    #[test]
    fn missing_posts_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan(tmp.path(), &options());
        assert!(matches!(result, Err(ScanError::MissingPostsDir(_))));
    }

    #[test]
    fn empty_posts_dir_is_fine() {
        let tmp = project(&[]);
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert!(manifest.posts.is_empty());
        assert!(manifest.about.is_none());
    }

    #[test]
    fn date_sort_is_stable_and_descending() {
        let tmp = project(&[
            ("c.md", "---\ndate: 2024-01-01\n---\n"),
            ("a.md", "---\ndate: 2024-01-01\n---\n"),
            ("b.md", "---\ndate: 2024-05-01\n---\n"),
            ("d.md", "---\ndate: whenever\n---\n"),
            ("e.md", "---\ndate: 2023-12-31\n---\n"),
        ]);
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(ids(&manifest), vec!["b", "a", "c", "e", "d"]);
    }

    #[test]
    fn ascending_and_filename_orders() {
        let tmp = project(&[
            ("a.md", "---\ndate: 2024-05-01\n---\n"),
            ("b.md", "---\ndate: 2023-01-01\n---\n"),
            ("c.md", "---\ndate: nope\n---\n"),
        ]);
        fs::write(tmp.path().join("config.toml"), "[index]\nsort = \"date-asc\"\n").unwrap();
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(ids(&manifest), vec!["b", "a", "c"]);

        fs::write(tmp.path().join("config.toml"), "[index]\nsort = \"filename\"\n").unwrap();
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(ids(&manifest), vec!["a", "b", "c"]);
    }

    #[test]
    fn configured_posts_dir() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("content/blog")).unwrap();
        fs::write(tmp.path().join("content/blog/x.md"), "X").unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[paths]\nposts = \"content/blog\"\n",
        )
        .unwrap();
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(ids(&manifest), vec!["x"]);
    }

    #[test]
    fn invalid_config_is_error() {
        let tmp = project(&[]);
        fs::write(tmp.path().join("config.toml"), "[site]\ntitel = \"typo\"\n").unwrap();
        let result = scan(tmp.path(), &options());
        assert!(matches!(result, Err(ScanError::Config(_))));
    }

    // =========================================================================
    // About page
    // =========================================================================

    #[test]
    fn about_title_sources() {
        let tmp = project(&[]);
        let about = tmp.path().join("about.md");

        fs::write(&about, "---\ntitle: Who\n---\n# Heading\n").unwrap();
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(manifest.about.unwrap().title, "Who");

        fs::write(&about, "# Heading\n\nText").unwrap();
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(manifest.about.unwrap().title, "Heading");

        fs::write(&about, "Just text").unwrap();
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert_eq!(manifest.about.unwrap().title, "About");
    }

    #[test]
    fn about_skipped_when_disabled() {
        let tmp = project(&[]);
        fs::write(tmp.path().join("about.md"), "# Me").unwrap();
        fs::write(tmp.path().join("config.toml"), "[about]\nenabled = false\n").unwrap();
        let manifest = scan(tmp.path(), &options()).unwrap();
        assert!(manifest.about.is_none());
    }

    #[test]
    fn manifest_survives_json() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path(), &options()).unwrap();
        let json = serde_json::to_string_pretty(&manifest).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(ids(&back), ids(&manifest));
        assert_eq!(back.config.site.title, manifest.config.site.title);
    }
}
