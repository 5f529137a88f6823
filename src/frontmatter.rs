//! Front matter parsing.
//!
//! A post may start with a metadata block fenced by `---` (YAML) or `+++`
//! (TOML) lines:
//!
//! ```text
//! ---
//! title: Spring Notes
//! date: 2024-03-01
//! tags: [garden, notes]
//! ---
//! Body text...
//! ```
//!
//! Recognised keys are lifted into [`FrontMatter`]; anything else is kept in
//! [`FrontMatter::extra`] and exposed to templates as `post.extra`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("front matter must be a set of key/value pairs")]
    NotATable,
    #[error("front matter field `{0}` has an unsupported type")]
    InvalidField(String),
}

/// Syntax of a front matter block, chosen by its fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn from_fence(line: &str) -> Option<Self> {
        match line {
            "---" => Some(Format::Yaml),
            "+++" => Some(Format::Toml),
            _ => None,
        }
    }
}

/// A source file split into its raw metadata block and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<'a> {
    pub block: Option<(Format, &'a str)>,
    pub body: &'a str,
}

/// Post metadata. Every field is optional; defaults are applied by the scanner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Date as written. Parsed later so unparseable values can still be shown.
    pub date: Option<String>,
    pub author: Option<String>,
    pub author_bio: Option<String>,
    pub author_image: Option<String>,
    pub hero_image: Option<String>,
    pub summary: Option<String>,
    /// Raw HTML injected into `<head>`.
    pub extra_head: Option<String>,
    /// Explicit output name; slugified by the scanner.
    pub slug: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub extra: BTreeMap<String, Value>,
}

/// Separate a leading front matter block from the body.
///
/// The opening fence must be the first line (a UTF-8 BOM is ignored) and the
/// block ends at the next line holding the same fence. Without a closing
/// fence the whole input is body.
pub fn split(content: &str) -> Split<'_> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let no_block = Split {
        block: None,
        body: content,
    };

    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return no_block;
    };
    let Some(format) = Format::from_fence(first.trim_end()) else {
        return no_block;
    };

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if Format::from_fence(line.trim_end()) == Some(format) {
            return Split {
                block: Some((format, &content[block_start..offset])),
                body: &content[offset + line.len()..],
            };
        }
        offset += line.len();
    }
    no_block
}

/// Parse a source file into front matter and body.
///
/// Files without a block get default front matter and their full text as
/// body. A block that fails to parse is an error; callers that want to carry
/// on can fall back to [`split`] for the body.
pub fn parse(content: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let Split { block, body } = split(content);
    let front_matter = match block {
        None => FrontMatter::default(),
        Some((format, raw)) => from_table(parse_table(format, raw)?)?,
    };
    Ok((front_matter, body))
}

fn parse_table(format: Format, raw: &str) -> Result<Map<String, Value>, FrontMatterError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    let value = match format {
        Format::Yaml => serde_yaml::from_str::<Value>(raw)?,
        Format::Toml => toml_to_json(toml::from_str::<toml::Value>(raw)?),
    };
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(FrontMatterError::NotATable),
    }
}

/// TOML datetimes have no JSON counterpart; they become their string form.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn from_table(mut map: Map<String, Value>) -> Result<FrontMatter, FrontMatterError> {
    let mut text = |key: &str| scalar_field(key, map.remove(key));
    let title = text("title")?;
    let date = text("date")?;
    let author = text("author")?;
    let author_bio = text("author_bio")?;
    let author_image = text("author_image")?;
    let hero_image = text("hero_image")?;
    let summary = text("summary")?;
    let extra_head = text("extra_head")?;
    let slug = text("slug")?;
    let tags = tags_field(map.remove("tags"))?;
    let draft = match map.remove("draft") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
        Some(_) => return Err(FrontMatterError::InvalidField("draft".into())),
    };

    Ok(FrontMatter {
        title,
        date,
        author,
        author_bio,
        author_image,
        hero_image,
        summary,
        extra_head,
        slug,
        tags,
        draft,
        extra: map.into_iter().collect(),
    })
}

/// Read a scalar as text. Empty strings and nulls count as absent.
fn scalar_field(key: &str, value: Option<Value>) -> Result<Option<String>, FrontMatterError> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(_) => return Err(FrontMatterError::InvalidField(key.to_string())),
    };
    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Tags come as a list or as one comma-separated string.
fn tags_field(value: Option<Value>) -> Result<Vec<String>, FrontMatterError> {
    let raw: Vec<String> = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| scalar_field("tags", Some(item)).map(Option::unwrap_or_default))
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(FrontMatterError::InvalidField("tags".into())),
    };
    Ok(raw
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect())
}
