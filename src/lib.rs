//! # Simple Blog
//!
//! A small static site generator for Markdown blogs. Posts are Markdown files
//! with optional front matter; the output is plain HTML: one page per post,
//! an index, an archive grouped by year and month, and an about page.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      posts/    →  manifest.json    (files → structured data)
//! 2. Generate  manifest  →  dist/            (final HTML site)
//! ```
//!
//! The manifest is human-readable JSON, so the stages can be run and inspected
//! separately (`scan`, then `generate`) or together (`build`). Every metadata
//! default is applied during the scan; generation only renders.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: reads posts and `about.md`, applies defaults, produces the manifest |
//! | [`generate`] | Stage 2: renders posts, index, archive and about page; copies assets |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`frontmatter`] | YAML (`---`) and TOML (`+++`) metadata blocks |
//! | [`markdown`] | pulldown-cmark rendering, heading ids, table of contents, summaries |
//! | [`templates`] | Built-in Tera templates and project overrides |
//! | [`types`] | Shared types serialized between stages (`Post`, `AboutPage`) |
//! | [`naming`] | `YYYY-MM-DD-name` file-name convention and slugs |
//! | [`metadata`] | Per-field metadata resolution and date parsing |
//! | [`init`] | Project and post scaffolding |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Tera for Pages, Maud for Fragments
//!
//! Page layouts are Tera templates so a site can restyle itself by dropping a
//! `post.html` into `templates/` without recompiling. Small fragments built
//! from data (the table of contents, the default about page) are generated
//! with [Maud](https://maud.lambda.xyz/) and handed to templates as HTML.
//!
//! ## Lenient Content, Strict Structure
//!
//! A post with broken front matter or an odd date is still published with
//! defaults and a warning. Structural mistakes (a missing posts directory,
//! two posts claiming the same output name, an unknown config key, a template
//! that does not parse) stop the build.

pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod init;
pub mod markdown;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
