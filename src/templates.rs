//! Page templates.
//!
//! Pages are rendered with [Tera](https://keats.github.io/tera/). Five
//! templates are compiled into the binary; `post`, `index`, `archive` and
//! `about` all extend `base.html`:
//!
//! ```text
//! base.html     document shell: <head>, header nav, footer
//! post.html     one post: hero image, meta, tags, TOC, body, author box
//! index.html    post cards in index order
//! archive.html  posts grouped by year and month
//! about.html    the about page
//! ```
//!
//! A file with the same name in the project's templates directory replaces
//! the built-in one. Missing files fall back to the built-ins, so a site can
//! override only `post.html` and keep everything else.
//!
//! Autoescaping is on for every template; values that already hold HTML
//! (`content`, `toc`, `css`, `extra_head`) are marked `| safe` in the
//! built-ins and must be in overrides too.

use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::debug;

pub const BASE: &str = "base.html";
pub const POST: &str = "post.html";
pub const INDEX: &str = "index.html";
pub const ARCHIVE: &str = "archive.html";
pub const ABOUT: &str = "about.html";

const BUILTIN: &[(&str, &str)] = &[
    (BASE, include_str!("../static/templates/base.html")),
    (POST, include_str!("../static/templates/post.html")),
    (INDEX, include_str!("../static/templates/index.html")),
    (ARCHIVE, include_str!("../static/templates/archive.html")),
    (ABOUT, include_str!("../static/templates/about.html")),
];

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template error: {}", error_chain(.0))]
    Tera(#[from] tera::Error),
}

/// Tera reports the useful detail (line, missing variable) in the source
/// chain, not the top-level message.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// The loaded template set.
pub struct Templates {
    tera: Tera,
    overridden: Vec<String>,
}

impl Templates {
    /// Built-in templates only.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::from_sources(
            BUILTIN
                .iter()
                .map(|(name, body)| (name.to_string(), body.to_string()))
                .collect(),
            Vec::new(),
        )
    }

    /// Built-in templates with overrides from `dir`, if it exists.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let mut sources = Vec::with_capacity(BUILTIN.len());
        let mut overridden = Vec::new();
        for (name, builtin) in BUILTIN {
            let path = dir.join(name);
            if path.is_file() {
                debug!(template = name, path = %path.display(), "using template override");
                sources.push((name.to_string(), fs::read_to_string(&path)?));
                overridden.push(name.to_string());
            } else {
                sources.push((name.to_string(), builtin.to_string()));
            }
        }
        Self::from_sources(sources, overridden)
    }

    fn from_sources(
        sources: Vec<(String, String)>,
        overridden: Vec<String>,
    ) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        // All at once so `{% extends %}` resolves regardless of order
        tera.add_raw_templates(sources)?;
        Ok(Self { tera, overridden })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(self.tera.render(name, context)?)
    }

    /// Names of templates loaded from the templates directory.
    pub fn overridden(&self) -> &[String] {
        &self.overridden
    }
}

/// Source of a built-in template by file name.
#[cfg(test)]
fn builtin_template(name: &str) -> Option<&'static str> {
    BUILTIN
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, body)| *body)
}

/// Write the built-in templates into `dir` as a starting point for overrides.
///
/// Existing files are left alone unless `force` is set. Returns the paths
/// that were written.
pub fn write_default_templates(dir: &Path, force: bool) -> Result<Vec<PathBuf>, TemplateError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (name, body) in BUILTIN {
        let path = dir.join(name);
        if path.exists() && !force {
            debug!(path = %path.display(), "template exists, skipping");
            continue;
        }
        fs::write(&path, body)?;
        written.push(path);
    }
    Ok(written)
}
