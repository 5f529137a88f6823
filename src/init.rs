//! Project scaffolding for the `init` and `new` commands.
//!
//! `init` lays out a working blog:
//!
//! ```text
//! <root>/
//! ├── config.toml            # stock config, every option documented
//! ├── about.md
//! ├── posts/
//! │   └── <date>-welcome.md
//! ├── templates/             # copies of the built-in templates
//! └── assets/
//! ```
//!
//! `new` adds a post with a front-matter skeleton to the posts directory.

use crate::config::{self, SiteConfig};
use crate::generate;
use crate::naming::slugify;
use crate::templates::{self, TemplateError};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum InitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0} already exists; refusing to overwrite")]
    AlreadyExists(PathBuf),
    #[error("title {0:?} has no characters usable in a file name")]
    InvalidTitle(String),
    #[error("{0}.html is a generated page; pick another title")]
    ReservedName(String),
}

const SAMPLE_BODY: &str = "\
Welcome to your new blog. This post was created by `simple-blog init`.

## Writing posts

Add Markdown files to the `posts/` directory. A block at the top of the file
sets the title, date, author and tags; everything is optional.

## Building

Run `simple-blog build` and open `dist/index.html`.
";

const SAMPLE_ABOUT: &str = "\
# About

Tell readers who you are and what this blog is about.
";

/// Front matter written at the top of new posts.
#[derive(Serialize)]
struct Skeleton<'a> {
    title: &'a str,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    tags: Vec<String>,
    draft: bool,
}

/// Create a new project in `root`. Refuses to run over an existing
/// `config.toml`. Returns every file written.
pub fn init_site(root: &Path, today: NaiveDate) -> Result<Vec<PathBuf>, InitError> {
    let config_path = root.join(config::CONFIG_FILE);
    if config_path.exists() {
        return Err(InitError::AlreadyExists(config_path));
    }

    let config = SiteConfig::default();
    let mut created = Vec::new();

    fs::create_dir_all(root)?;
    fs::write(&config_path, config::stock_config_toml())?;
    created.push(config_path);

    fs::create_dir_all(root.join(&config.paths.assets))?;
    created.extend(templates::write_default_templates(
        &root.join(&config.paths.templates),
        false,
    )?);

    let about = root.join(&config.paths.about);
    if !about.exists() {
        fs::write(&about, SAMPLE_ABOUT)?;
        created.push(about);
    }

    let posts_dir = root.join(&config.paths.posts);
    fs::create_dir_all(&posts_dir)?;
    let sample = posts_dir.join(format!("{}-welcome.md", today.format("%Y-%m-%d")));
    if !sample.exists() {
        fs::write(&sample, post_source("Welcome", &config, today, SAMPLE_BODY)?)?;
        created.push(sample);
    }

    debug!(root = %root.display(), files = created.len(), "initialized site");
    Ok(created)
}

/// Write `posts/<slug>.md` for a new post titled `title`.
pub fn new_post(
    root: &Path,
    config: &SiteConfig,
    title: &str,
    date: NaiveDate,
) -> Result<PathBuf, InitError> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(InitError::InvalidTitle(title.to_string()));
    }
    if generate::is_reserved_page(&format!("{slug}.html")) {
        return Err(InitError::ReservedName(slug));
    }

    let posts_dir = root.join(&config.paths.posts);
    fs::create_dir_all(&posts_dir)?;
    let path = posts_dir.join(format!("{slug}.md"));
    if path.exists() {
        return Err(InitError::AlreadyExists(path));
    }

    fs::write(&path, post_source(title.trim(), config, date, "")?)?;
    Ok(path)
}

fn post_source(
    title: &str,
    config: &SiteConfig,
    date: NaiveDate,
    body: &str,
) -> Result<String, InitError> {
    let skeleton = Skeleton {
        title,
        date: date.format("%Y-%m-%d").to_string(),
        author: Some(config.site.author.as_str()).filter(|a| !a.is_empty()),
        tags: Vec::new(),
        draft: false,
    };
    let yaml = serde_yaml::to_string(&skeleton)?;
    Ok(format!("---\n{yaml}---\n\n{body}"))
}
