//! Build month shards and `index.json` from the append-only JSONL metadata file.

use std::collections::{BTreeMap, HashSet};
use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::source::INDEX_FILE;
use crate::{MonthEntry, Paper};

static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"v\d+$").unwrap());

#[derive(Error, Debug)]
pub enum ShardBuildError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardSummary {
    pub months: usize,
    pub papers: usize,
    pub duplicates: usize,
    /// Non-blank lines that could not be used (bad JSON or no month).
    pub skipped: usize,
}

/// Strip an arXiv version suffix: `2401.01234v2` → `2401.01234`.
pub fn normalize_id(id: &str) -> String {
    VERSION_SUFFIX.replace(id.trim(), "").into_owned()
}

/// Read `jsonl` and write one `{YYYY-MM}.json` per month plus `index.json`
/// into `out_dir`. The first record seen for an id wins.
pub fn build_shards(jsonl: &Path, out_dir: &Path) -> Result<ShardSummary, ShardBuildError> {
    let file = std::fs::File::open(jsonl).map_err(|e| io_err(jsonl, e))?;
    let mut summary = ShardSummary::default();
    let mut seen = HashSet::new();
    let mut months: BTreeMap<String, Vec<Paper>> = BTreeMap::new();

    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| io_err(jsonl, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let mut paper: Paper = match serde_json::from_str(&line) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(line = lineno + 1, error = %e, "skipping unparsable line");
                summary.skipped += 1;
                continue;
            }
        };
        paper.id = normalize_id(&paper.id);
        if !seen.insert(paper.id.clone()) {
            summary.duplicates += 1;
            continue;
        }
        let Some(month) = paper.month_key().map(String::from) else {
            tracing::warn!(id = %paper.id, published = %paper.published, "skipping record without a month");
            summary.skipped += 1;
            continue;
        };
        months.entry(month).or_default().push(paper);
    }

    std::fs::create_dir_all(out_dir).map_err(|e| io_err(out_dir, e))?;

    for (month, papers) in months.iter_mut() {
        papers.sort_by(|a, b| b.published.cmp(&a.published));
        write_json(&out_dir.join(format!("{month}.json")), papers)?;
        summary.papers += papers.len();
    }

    let index: Vec<MonthEntry> = months
        .keys()
        .rev()
        .map(|m| MonthEntry { month: m.clone() })
        .collect();
    write_json(&out_dir.join(INDEX_FILE), &index)?;
    summary.months = index.len();

    tracing::info!(
        months = summary.months,
        papers = summary.papers,
        duplicates = summary.duplicates,
        skipped = summary.skipped,
        out = %out_dir.display(),
        "built shards"
    );
    Ok(summary)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ShardBuildError> {
    let bytes = serde_json::to_vec(value).map_err(|e| ShardBuildError::Serialize {
        path: path.display().to_string(),
        source: e,
    })?;
    std::fs::write(path, bytes).map_err(|e| io_err(path, e))
}

fn io_err(path: &Path, source: std::io::Error) -> ShardBuildError {
    ShardBuildError::Io {
        path: path.display().to_string(),
        source,
    }
}
