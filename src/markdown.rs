//! Markdown to HTML conversion.
//!
//! Wraps pulldown-cmark with the extensions a blog post needs and a small
//! event pass over headings:
//!
//! - heading levels are shifted so that `#` renders at `toc.base_level`
//! - every heading gets an `id` (explicit `{#id}` attribute, else the
//!   slugified heading text, de-duplicated with `-1`, `-2`, ...)
//! - optionally a `#` permalink is appended inside each heading
//!
//! The same pass collects the headings into a nested table of contents and
//! the first paragraph's text as a fallback summary.

use crate::config::{MarkdownConfig, SiteConfig, TocConfig};
use crate::naming::slugify;
use maud::{Markup, html};
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html};
use serde::Serialize;
use std::collections::HashSet;

/// Markdown renderer configured from `[markdown]` and `[toc]`.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    level_shift: u8,
    heading_anchors: bool,
    toc_enabled: bool,
    toc_max_level: u8,
}

/// Output of rendering one Markdown document.
#[derive(Debug, Clone, Default)]
pub struct RenderedMarkdown {
    pub html: String,
    /// Nested table of contents. Empty when disabled or without headings.
    pub toc: Vec<TocEntry>,
    /// Plain text of the first non-empty paragraph.
    pub first_paragraph: Option<String>,
}

impl RenderedMarkdown {
    /// Table of contents as HTML, or an empty string when there is none.
    pub fn toc_html(&self) -> String {
        if self.toc.is_empty() {
            String::new()
        } else {
            render_toc(&self.toc).into_string()
        }
    }
}

/// One heading in the table of contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocEntry {
    /// Rendered heading level (after shifting), 1-6.
    pub level: u8,
    pub title: String,
    pub id: String,
    pub children: Vec<TocEntry>,
}

impl MarkdownRenderer {
    pub fn new(markdown: &MarkdownConfig, toc: &TocConfig) -> Self {
        let mut options = Options::ENABLE_HEADING_ATTRIBUTES;
        options.set(Options::ENABLE_TABLES, markdown.tables);
        options.set(Options::ENABLE_FOOTNOTES, markdown.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, markdown.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, markdown.tasklists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, markdown.smart_punctuation);

        Self {
            options,
            level_shift: toc.base_level.saturating_sub(1),
            heading_anchors: markdown.heading_anchors,
            toc_enabled: toc.enabled,
            toc_max_level: toc.max_level,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(&config.markdown, &config.toc)
    }

    /// Convert a Markdown body to HTML, collecting headings and the summary.
    pub fn render(&self, markdown: &str) -> RenderedMarkdown {
        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();

        let headings = collect_headings(&events, self.level_shift);
        let first_paragraph = first_paragraph_text(&events);
        let events = self.rewrite_headings(events, &headings);

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        md_html::push_html(&mut html, events.into_iter());

        let toc = if self.toc_enabled {
            build_toc(
                headings
                    .into_iter()
                    .filter(|h| h.level <= self.toc_max_level)
                    .collect(),
            )
        } else {
            Vec::new()
        };

        RenderedMarkdown {
            html,
            toc,
            first_paragraph,
        }
    }

    /// Apply shifted levels and ids to heading events, in document order.
    fn rewrite_headings<'a>(&self, events: Vec<Event<'a>>, headings: &[Heading]) -> Vec<Event<'a>> {
        let mut heading_iter = headings.iter();
        let mut current_id: Option<String> = None;
        let mut result = Vec::with_capacity(events.len() + headings.len());

        for event in events {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    id: _,
                    classes,
                    attrs,
                }) => {
                    let id = heading_iter.next().map(|h| h.id.clone());
                    current_id = id.clone();
                    result.push(Event::Start(Tag::Heading {
                        level: shift_level(level, self.level_shift),
                        id: id.map(|id| CowStr::Boxed(id.into_boxed_str())),
                        classes,
                        attrs,
                    }));
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(id) = current_id.take()
                        && self.heading_anchors
                    {
                        let anchor = html! {
                            " "
                            a.heading-anchor href={ "#" (id) } aria-hidden="true" { "#" }
                        };
                        result.push(Event::InlineHtml(CowStr::Boxed(
                            anchor.into_string().into_boxed_str(),
                        )));
                    }
                    result.push(Event::End(TagEnd::Heading(shift_level(
                        level,
                        self.level_shift,
                    ))));
                }
                other => result.push(other),
            }
        }
        result
    }
}

/// A heading as found in the document, before nesting.
#[derive(Debug, Clone, PartialEq)]
struct Heading {
    level: u8,
    title: String,
    id: String,
}

fn collect_headings(events: &[Event], level_shift: u8) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut used_ids = HashSet::new();
    let mut current: Option<(u8, Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                let level = shift_level(*level, level_shift) as u8;
                current = Some((level, id.as_ref().map(|s| s.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, title)) = current.as_mut() {
                    title.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit_id, title)) = current.take() {
                    let title = title.trim().to_string();
                    let base = explicit_id.unwrap_or_else(|| slugify(&title));
                    let id = unique_id(&base, &mut used_ids);
                    headings.push(Heading { level, title, id });
                }
            }
            _ => {}
        }
    }
    headings
}

fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let base = if base.is_empty() { "section" } else { base };
    let mut candidate = base.to_string();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn shift_level(level: HeadingLevel, shift: u8) -> HeadingLevel {
    match (level as usize + shift as usize).min(6) {
        1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        3 => HeadingLevel::H3,
        4 => HeadingLevel::H4,
        5 => HeadingLevel::H5,
        _ => HeadingLevel::H6,
    }
}

/// Nest a flat heading list: each heading becomes a child of the closest
/// preceding heading with a lower level.
fn build_toc(headings: Vec<Heading>) -> Vec<TocEntry> {
    let mut roots = Vec::new();
    for h in headings {
        insert_toc_entry(
            &mut roots,
            TocEntry {
                level: h.level,
                title: h.title,
                id: h.id,
                children: Vec::new(),
            },
        );
    }
    roots
}

fn insert_toc_entry(siblings: &mut Vec<TocEntry>, entry: TocEntry) {
    match siblings.last_mut() {
        Some(last) if last.level < entry.level => insert_toc_entry(&mut last.children, entry),
        _ => siblings.push(entry),
    }
}

/// Render a table of contents as nested lists inside `<nav class="toc">`.
pub fn render_toc(entries: &[TocEntry]) -> Markup {
    html! {
        nav.toc {
            (toc_list(entries))
        }
    }
}

fn toc_list(entries: &[TocEntry]) -> Markup {
    html! {
        ul {
            @for entry in entries {
                li {
                    a href={ "#" (entry.id) } { (entry.title) }
                    @if !entry.children.is_empty() {
                        (toc_list(&entry.children))
                    }
                }
            }
        }
    }
}

fn first_paragraph_text(events: &[Event]) -> Option<String> {
    let mut in_paragraph = false;
    let mut image_depth = 0usize;
    let mut text = String::new();
    for event in events {
        match event {
            Event::Start(Tag::Paragraph) => {
                in_paragraph = true;
                text.clear();
            }
            // Alt text is not prose
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            Event::Text(t) | Event::Code(t) if in_paragraph && image_depth == 0 => {
                text.push_str(t)
            }
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            Event::End(TagEnd::Paragraph) => {
                in_paragraph = false;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Cut `text` to at most `max` characters, appending `...` when cut.
pub fn truncate_summary(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}
