use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod bibtex;
pub mod config_file;
pub mod facets;
pub mod filter;
pub mod pager;
pub mod session;
pub mod shard;
pub mod source;
pub mod store;
pub mod taxonomy;
pub mod view;

// Re-export for convenience
pub use bibtex::{ExportError, Selection, cite_key, export_bibtex};
pub use facets::{FacetCount, FacetCounts, compute_facets};
pub use filter::{DateRange, FilterState, SortOrder, compute_results};
pub use pager::{Batch, Pager, Sentinel};
pub use session::Session;
pub use source::{ShardSource, from_location};
pub use store::{CatalogStore, LoadReport, MonthSelection};
pub use taxonomy::{Category, ResearchField};
pub use view::{PaperView, VenueBadge};

/// A single paper record as stored in a month shard.
///
/// Shards are produced by an external pipeline, so every optional field is
/// read leniently: `null`, a missing key, or a value of the wrong JSON type
/// all become the empty value instead of failing the whole shard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// Comma-joined names. Ingested shards may carry a JSON list instead.
    #[serde(default, deserialize_with = "lenient_names")]
    pub authors: String,
    /// ISO date (`YYYY-MM-DD`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub published: String,
    #[serde(rename = "abstract", default, deserialize_with = "lenient_string")]
    pub abstract_text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub conference: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub code_link: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub tags: Vec<String>,
    /// Classification categories (`Empirical`, `Survey`, ...). The shard key is
    /// singular even though the value is a list.
    #[serde(rename = "category", default, deserialize_with = "lenient_string_list")]
    pub categories: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub field: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub task: Option<String>,

    // Passthrough metadata from the ingestion pipeline; display only.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_author: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub arxiv_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub pdf_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub update_time: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub quality: Option<String>,
}

impl Paper {
    /// Publication status is derived from the venue, never stored.
    pub fn status(&self) -> PublicationStatus {
        match self.conference.as_deref() {
            Some(venue) if !venue.is_empty() => PublicationStatus::Published,
            _ => PublicationStatus::Preprint,
        }
    }

    /// Venue name when the paper is published.
    pub fn venue(&self) -> Option<&str> {
        self.conference.as_deref().filter(|v| !v.is_empty())
    }

    pub fn task(&self) -> Option<&str> {
        self.task.as_deref().filter(|t| !t.is_empty())
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref().filter(|f| !f.is_empty())
    }

    /// Lower-cased `title authors abstract`, the haystack for free-text search.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.authors, self.abstract_text).to_lowercase()
    }

    /// First four characters of `published`.
    pub fn year(&self) -> &str {
        prefix(&self.published, 4)
    }

    /// `YYYY-MM` prefix of `published`, if the date is long enough to have one.
    pub fn month_key(&self) -> Option<&str> {
        let key = prefix(&self.published, 7);
        is_month_key(key).then_some(key)
    }
}

fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Whether `s` has the `YYYY-MM` shape used for shard keys.
pub fn is_month_key(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 7
        && b[4] == b'-'
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[5..].iter().all(u8::is_ascii_digit)
        && matches!(&s[5..], "01" | "02" | "03" | "04" | "05" | "06" | "07" | "08" | "09" | "10" | "11" | "12")
}

/// One entry of `index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthEntry {
    pub month: String,
}

/// Derived publication status of a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicationStatus {
    Published,
    Preprint,
}

impl PublicationStatus {
    pub fn all() -> &'static [PublicationStatus] {
        &[PublicationStatus::Published, PublicationStatus::Preprint]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Preprint => "preprint",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "published" => Some(Self::Published),
            "preprint" => Some(Self::Preprint),
            _ => None,
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid month key {0:?} (expected YYYY-MM)")]
    InvalidMonth(String),
    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("date range spans {months} months without an index (limit {limit})")]
    RangeTooWide { months: usize, limit: usize },
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(scalar_to_string(Option::<serde_json::Value>::deserialize(d)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_to_string(Option::<serde_json::Value>::deserialize(d)?))
}

fn lenient_names<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    use serde_json::Value;
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| scalar_to_string(Some(v)))
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_to_string(other).unwrap_or_default(),
    })
}

fn lenient_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    use serde_json::Value;
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| scalar_to_string(Some(v)))
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn scalar_to_string(v: Option<serde_json::Value>) -> Option<String> {
    use serde_json::Value;
    match v? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
