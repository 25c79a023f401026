//! Blog post index: reads `.mdx` files with YAML front-matter from a directory.
//!
//! The output matches the JSON served to the site's blog page: one entry per
//! post, newest first, with the raw markdown body in `content`. Recognised
//! dates are emitted as UTC timestamps with milliseconds; others pass through.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const POST_EXTENSION: &str = "mdx";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<String>,
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter {
    title: Option<String>,
    date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    reading_time: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("failed to read blog directory {}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read post {}", .path.display())]
    ReadPost {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid front-matter in {}", .path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Load every post in `dir` (non-recursive), newest first.
pub fn load_posts(dir: &Path) -> Result<Vec<BlogPost>, BlogError> {
    info!(dir = %dir.display(), "Loading blog posts");
    let read_dir_err = |source: std::io::Error| BlogError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut posts = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(POST_EXTENSION) {
            debug!(path = %path.display(), "Skipping non-post entry");
            continue;
        }
        posts.push(load_post(&path)?);
    }

    // Unparseable dates compare as None, which sorts after every real date here.
    posts.sort_by_key(|post| Reverse(parse_date(&post.date)));

    info!(count = posts.len(), "Loaded blog posts");
    Ok(posts)
}

fn load_post(path: &Path) -> Result<BlogPost, BlogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| BlogError::ReadPost {
        path: path.to_path_buf(),
        source,
    })?;
    let slug = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (front, content) = split_front_matter(&raw);
    let front: FrontMatter = match front {
        Some(yaml) if !yaml.trim().is_empty() => {
            serde_yaml::from_str(yaml).map_err(|source| BlogError::FrontMatter {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => FrontMatter::default(),
    };

    let date = match front.date {
        Some(raw) => match parse_date(&raw) {
            Some(parsed) => iso_timestamp(parsed),
            None => {
                warn!(slug = %slug, date = %raw, "Unrecognised post date, sorting it last");
                raw
            }
        },
        None => iso_timestamp(Utc::now()),
    };

    Ok(BlogPost {
        slug,
        title: front.title,
        date,
        description: front.description,
        tags: front.tags,
        reading_time: front.reading_time,
        content: content.to_owned(),
    })
}

/// Split `---\n<yaml>\n---\n<body>` into its parts. Text without a leading
/// delimiter line has no front-matter.
pub fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some(rest) = strip_delimiter_line(raw) else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            return (Some(yaml), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, raw)
}

fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

/// UTC with millisecond precision, e.g. `2024-01-15T00:00:00.000Z`.
fn iso_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
