//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the scan manifest and writes the final
//! static site.
//!
//! ## Generated Pages
//!
//! - **Post pages** (`/{id}.html`): one per post, with TOC and author box
//! - **Index page** (`/index.html`): post cards in manifest order
//! - **Archive page** (`/archives.html`): posts grouped by year, then month
//! - **About page** (`/about.html`): from `about.md`, or a built-in default
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── archives.html
//! ├── about.html
//! ├── hello-world.html
//! ├── 2024-03-01-spring-notes.html
//! └── assets/                    # Copied verbatim from <root>/assets
//! ```
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time and inlined into every page
//! after the custom properties generated from `[colors]` and `[theme]`.
//!
//! ## Parallelism
//!
//! Posts are independent, so they are rendered and written on the rayon pool.
//! Results are collected in manifest order; the index and archive are built
//! only after every post is done.

use crate::config::{self, SiteConfig};
use crate::markdown::{MarkdownRenderer, truncate_summary};
use crate::scan::Manifest;
use crate::templates::{self, TemplateError, Templates};
use crate::types::{AboutPage, Post};
use chrono::{Datelike, Local, NaiveDate};
use maud::{Markup, html};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tera::Context;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Asset copy error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{file} would overwrite the generated {page}")]
    ReservedPage { file: String, page: String },
}

const CSS_STATIC: &str = include_str!("../static/style.css");

pub const INDEX_PAGE: &str = "index.html";
pub const ARCHIVE_PAGE: &str = "archives.html";
pub const ABOUT_PAGE: &str = "about.html";

/// Whether `file_name` is one of the pages generated besides posts.
pub fn is_reserved_page(file_name: &str) -> bool {
    [INDEX_PAGE, ARCHIVE_PAGE, ABOUT_PAGE].contains(&file_name)
}

/// Files never copied from the assets directory.
const IGNORED_FILES: &[&str] = &[".DS_Store"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Post,
    Index,
    Archive,
    About,
}

/// One written HTML file.
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub kind: PageKind,
    pub title: String,
    /// Path relative to the output directory.
    pub path: String,
}

/// What a generate run produced.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Posts first in manifest order, then index, archive and about.
    pub pages: Vec<GeneratedPage>,
    pub assets_copied: usize,
    /// Template names loaded from the project's templates directory.
    pub templates_overridden: Vec<String>,
    /// An existing `about.html` was kept instead of writing the default.
    pub about_preserved: bool,
    /// Posts left out of the archive because their date did not parse.
    pub undated_posts: Vec<String>,
}

impl GenerateReport {
    pub fn post_count(&self) -> usize {
        self.pages.iter().filter(|p| p.kind == PageKind::Post).count()
    }
}

/// Read a manifest written by the scan stage.
pub fn load_manifest(manifest_path: &Path) -> Result<Manifest, GenerateError> {
    let content = fs::read_to_string(manifest_path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Generate the site for `manifest` into `output_dir`.
///
/// `root` is the project root; templates and assets are resolved against it.
pub fn generate(
    manifest: &Manifest,
    root: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let config = &manifest.config;
    if let Some(post) = manifest.posts.iter().find(|p| is_reserved_page(&p.file_name())) {
        return Err(GenerateError::ReservedPage {
            file: post.source.clone(),
            page: post.file_name(),
        });
    }
    fs::create_dir_all(output_dir)?;

    let templates = Templates::load(&root.join(&config.paths.templates))?;
    let renderer = MarkdownRenderer::from_config(config);
    let base = base_context(config, &site_css(config), Local::now().year());
    let link_root = config.site.link_prefix();

    let mut report = GenerateReport {
        templates_overridden: templates.overridden().to_vec(),
        ..Default::default()
    };

    report.assets_copied = copy_assets(
        &root.join(&config.paths.assets),
        &output_dir.join(&config.paths.assets),
    )?;

    let summaries = manifest
        .posts
        .par_iter()
        .map(|post| write_post(post, config, &renderer, &templates, &base, output_dir))
        .collect::<Result<Vec<_>, _>>()?;

    for post in &manifest.posts {
        report.pages.push(GeneratedPage {
            kind: PageKind::Post,
            title: post.title.clone(),
            path: post.file_name(),
        });
    }

    let cards: Vec<PostView> = manifest
        .posts
        .iter()
        .zip(summaries)
        .map(|(post, summary)| PostView::new(post, summary, &link_root))
        .collect();

    for post in manifest.posts.iter().filter(|p| p.published.is_none()) {
        if config.archive.enabled {
            warn!(post = %post.source, date = %post.date, "date not recognised; sorted last and left out of the archive");
        } else {
            warn!(post = %post.source, date = %post.date, "date not recognised; sorted last");
        }
    }

    let mut ctx = base.clone();
    ctx.insert("posts", &cards);
    write_page(&templates, templates::INDEX, &ctx, &output_dir.join(INDEX_PAGE))?;
    report.pages.push(GeneratedPage {
        kind: PageKind::Index,
        title: config.site.title.clone(),
        path: INDEX_PAGE.to_string(),
    });

    if config.archive.enabled {
        let (years, undated) = group_archive(&manifest.posts, &config.archive.month_names);
        report.undated_posts = undated;

        let mut ctx = base.clone();
        ctx.insert("page_title", &config.labels.archive);
        ctx.insert("years", &years);
        write_page(&templates, templates::ARCHIVE, &ctx, &output_dir.join(ARCHIVE_PAGE))?;
        report.pages.push(GeneratedPage {
            kind: PageKind::Archive,
            title: config.labels.archive.clone(),
            path: ARCHIVE_PAGE.to_string(),
        });
    }

    if config.about.enabled {
        match write_about(manifest.about.as_ref(), config, &renderer, &templates, &base, output_dir)? {
            Some(page) => report.pages.push(page),
            None => report.about_preserved = true,
        }
    }

    info!(
        pages = report.pages.len(),
        assets = report.assets_copied,
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

/// Generated custom properties followed by the embedded stylesheet.
fn site_css(config: &SiteConfig) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        config::generate_color_css(&config.colors),
        config::generate_theme_css(&config.theme),
        CSS_STATIC
    )
}

#[derive(Serialize)]
struct NavFlags {
    archive: bool,
    about: bool,
}

/// Variables shared by every page.
fn base_context(config: &SiteConfig, css: &str, current_year: i32) -> Context {
    let mut ctx = Context::new();
    ctx.insert("site", &config.site);
    ctx.insert("labels", &config.labels);
    ctx.insert(
        "nav",
        &NavFlags {
            archive: config.archive.enabled,
            about: config.about.enabled,
        },
    );
    ctx.insert("root", &config.site.link_prefix());
    ctx.insert("css", css);
    ctx.insert("current_year", &current_year);
    ctx.insert("page_title", "");
    ctx.insert("extra_head", &Option::<String>::None);
    ctx
}

/// A post as templates see it.
#[derive(Debug, Serialize)]
struct PostView<'a> {
    id: &'a str,
    url: String,
    title: &'a str,
    date: &'a str,
    published: Option<NaiveDate>,
    author: Option<&'a str>,
    author_bio: Option<&'a str>,
    author_image: Option<String>,
    hero_image: Option<String>,
    summary: Option<String>,
    tags: &'a [String],
    extra: &'a BTreeMap<String, serde_json::Value>,
}

impl<'a> PostView<'a> {
    fn new(post: &'a Post, summary: Option<String>, root: &str) -> Self {
        Self {
            id: &post.id,
            url: post.file_name(),
            title: &post.title,
            date: &post.date,
            published: post.published,
            author: post.author.as_deref(),
            author_bio: post.author_bio.as_deref(),
            author_image: post.author_image.as_deref().map(|src| asset_url(root, src)),
            hero_image: post.hero_image.as_deref().map(|src| asset_url(root, src)),
            summary,
            tags: &post.tags,
            extra: &post.extra,
        }
    }
}

/// Prefix a relative asset path with the site root. Absolute paths, URLs
/// with a scheme and fragments are left as written.
fn asset_url(root: &str, src: &str) -> String {
    let keep = root.is_empty()
        || src.starts_with('/')
        || src.starts_with('#')
        || src.starts_with("data:")
        || src.contains("://");
    if keep {
        src.to_string()
    } else {
        format!("{root}{src}")
    }
}

/// Render one post page and write it. Returns the post's summary for the
/// index: front matter summary, else the first paragraph, truncated.
fn write_post(
    post: &Post,
    config: &SiteConfig,
    renderer: &MarkdownRenderer,
    templates: &Templates,
    base: &Context,
    output_dir: &Path,
) -> Result<Option<String>, GenerateError> {
    let rendered = renderer.render(&post.body);
    let summary = post
        .summary
        .as_deref()
        .or(rendered.first_paragraph.as_deref())
        .map(|s| truncate_summary(s, config.index.summary_length));

    let mut ctx = base.clone();
    ctx.insert("page_title", &post.title);
    ctx.insert("extra_head", &post.extra_head);
    ctx.insert("post", &PostView::new(post, summary.clone(), &config.site.link_prefix()));
    ctx.insert("content", &rendered.html);
    ctx.insert("toc", &rendered.toc_html());

    write_page(templates, templates::POST, &ctx, &output_dir.join(post.file_name()))?;
    debug!(post = %post.id, "wrote post");
    Ok(summary)
}

fn write_page(
    templates: &Templates,
    template: &str,
    ctx: &Context,
    path: &Path,
) -> Result<(), GenerateError> {
    let html = templates.render(template, ctx)?;
    fs::write(path, html)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct ArchiveYear<'a> {
    year: i32,
    months: Vec<ArchiveMonth<'a>>,
}

#[derive(Debug, Serialize)]
struct ArchiveMonth<'a> {
    month: u32,
    name: &'a str,
    posts: Vec<ArchiveEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ArchiveEntry<'a> {
    title: &'a str,
    url: String,
    date: &'a str,
}

/// Group posts by year and month, both newest first. Within a month posts
/// keep manifest order. Returns the groups and the sources of posts without
/// a parsed date.
fn group_archive<'a>(
    posts: &'a [Post],
    month_names: &'a [String],
) -> (Vec<ArchiveYear<'a>>, Vec<String>) {
    let mut grouped: BTreeMap<i32, BTreeMap<u32, Vec<&Post>>> = BTreeMap::new();
    let mut undated = Vec::new();

    for post in posts {
        match post.published {
            Some(date) => grouped
                .entry(date.year())
                .or_default()
                .entry(date.month())
                .or_default()
                .push(post),
            None => undated.push(post.source.clone()),
        }
    }

    let years = grouped
        .into_iter()
        .rev()
        .map(|(year, months)| ArchiveYear {
            year,
            months: months
                .into_iter()
                .rev()
                .map(|(month, posts)| ArchiveMonth {
                    month,
                    name: month_names
                        .get(month as usize - 1)
                        .map(String::as_str)
                        .unwrap_or_default(),
                    posts: posts
                        .into_iter()
                        .map(|p| ArchiveEntry {
                            title: &p.title,
                            url: p.file_name(),
                            date: &p.date,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    (years, undated)
}

/// Write `about.html`. Returns `None` when an existing page was preserved.
fn write_about(
    about: Option<&AboutPage>,
    config: &SiteConfig,
    renderer: &MarkdownRenderer,
    templates: &Templates,
    base: &Context,
    output_dir: &Path,
) -> Result<Option<GeneratedPage>, GenerateError> {
    let path = output_dir.join(ABOUT_PAGE);
    let (title, content, extra_head) = match about {
        Some(about) => (
            about.title.clone(),
            renderer.render(&about.body).html,
            about.extra_head.clone(),
        ),
        None if config.about.preserve_existing && path.exists() => {
            info!(path = %path.display(), "keeping existing about page");
            return Ok(None);
        }
        None => (
            config.about.title.clone(),
            default_about(config).into_string(),
            None,
        ),
    };

    let mut ctx = base.clone();
    ctx.insert("page_title", &title);
    ctx.insert("extra_head", &extra_head);
    ctx.insert("content", &content);
    write_page(templates, templates::ABOUT, &ctx, &path)?;

    Ok(Some(GeneratedPage {
        kind: PageKind::About,
        title,
        path: ABOUT_PAGE.to_string(),
    }))
}

/// About page body used when the project has no `about.md`.
fn default_about(config: &SiteConfig) -> Markup {
    html! {
        h1 { (config.about.title) }
        @if !config.site.description.is_empty() {
            p { (config.site.description) }
        }
        @if !config.site.author.is_empty() {
            p.about-author { (config.labels.author) " " (config.site.author) }
        }
    }
}

/// Copy the assets directory into the output, preserving layout.
/// Returns the number of files copied; a missing directory copies nothing.
fn copy_assets(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    if !src.is_dir() {
        debug!(path = %src.display(), "no assets directory");
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if IGNORED_FILES.contains(&entry.file_name().to_string_lossy().as_ref()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
