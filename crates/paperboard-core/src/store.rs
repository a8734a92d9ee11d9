//! Month-keyed shard cache and the flattened working set built from it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;

use crate::source::{INDEX_FILE, ShardSource, month_file};
use crate::{CatalogError, MonthEntry, Paper, is_month_key};

/// Most calendar months a range may cover when there is no index to bound it.
pub const MAX_UNINDEXED_MONTHS: usize = 240;

/// Which shards make up the working set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MonthSelection {
    /// Every month in the index.
    #[default]
    All,
    /// A single month; the working set is that shard alone.
    Month(String),
}

impl MonthSelection {
    pub fn label(&self) -> &str {
        match self {
            Self::All => "all months",
            Self::Month(m) => m,
        }
    }
}

/// Outcome of a multi-month load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Months fetched by this call.
    pub fetched: Vec<String>,
    /// Months that were already cached and skipped.
    pub cached: usize,
    /// Months that failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cache of month shards plus the working set the filter engine reads.
///
/// Shards are fetched at most once per store. A failed month is left absent;
/// nothing is retried or rolled back.
pub struct CatalogStore {
    source: Arc<dyn ShardSource>,
    index: Vec<String>,
    shards: HashMap<String, Vec<Arc<Paper>>>,
    /// Months in the order their shards arrived.
    load_order: Vec<String>,
    working: Vec<Arc<Paper>>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn ShardSource>) -> Self {
        Self {
            source,
            index: Vec::new(),
            shards: HashMap::new(),
            load_order: Vec::new(),
            working: Vec::new(),
        }
    }

    pub fn source(&self) -> Arc<dyn ShardSource> {
        Arc::clone(&self.source)
    }

    /// Month keys from `index.json`, element 0 being the latest.
    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn working_set(&self) -> &[Arc<Paper>] {
        &self.working
    }

    pub fn is_cached(&self, month: &str) -> bool {
        self.shards.contains_key(month)
    }

    pub fn cached_months(&self) -> usize {
        self.shards.len()
    }

    pub fn shard(&self, month: &str) -> Option<&[Arc<Paper>]> {
        self.shards.get(month).map(Vec::as_slice)
    }

    /// Fetch `index.json`. Errors are logged and leave the index empty.
    pub async fn load_index(&mut self) {
        match self.fetch_index().await {
            Ok(months) => {
                tracing::info!(
                    source = %self.source.describe(),
                    months = months.len(),
                    "loaded month index"
                );
                self.index = months;
            }
            Err(e) => {
                tracing::warn!(source = %self.source.describe(), error = %e, "failed to load month index");
                self.index.clear();
            }
        }
    }

    async fn fetch_index(&self) -> Result<Vec<String>, CatalogError> {
        fetch_index(self.source.as_ref()).await
    }

    /// Install an index fetched elsewhere (the TUI backend fetches off the UI task).
    pub fn set_index(&mut self, months: Vec<String>) {
        self.index = months;
    }

    /// Fetch and cache one month, appending it to the working set.
    ///
    /// Returns `Ok(false)` without fetching when the month is already cached.
    pub async fn load_month(&mut self, month: &str) -> Result<bool, CatalogError> {
        if self.is_cached(month) {
            return Ok(false);
        }
        let papers = match fetch_shard(self.source.as_ref(), month).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(month = %month, error = %e, "failed to load month");
                return Err(e);
            }
        };
        self.insert_shard(month, papers);
        if let Some(shard) = self.shards.get(month) {
            self.working.extend(shard.iter().cloned());
        }
        Ok(true)
    }

    /// Apply a month-selection mode to the working set.
    pub async fn select(&mut self, selection: &MonthSelection) -> Result<LoadReport, CatalogError> {
        match selection {
            MonthSelection::All => Ok(self.load_all().await),
            MonthSelection::Month(month) => {
                let fetched = self.load_month(month).await?;
                self.focus_month(month);
                Ok(LoadReport {
                    fetched: if fetched { vec![month.clone()] } else { Vec::new() },
                    cached: usize::from(!fetched),
                    failed: Vec::new(),
                })
            }
        }
    }

    /// Load every index month sequentially, in index order.
    pub async fn load_all(&mut self) -> LoadReport {
        self.load_all_with(|_, _, _| {}).await
    }

    /// [`load_all`](Self::load_all) with a callback after each month:
    /// `(month, done, total)`.
    pub async fn load_all_with<F>(&mut self, mut on_month: F) -> LoadReport
    where
        F: FnMut(&str, usize, usize),
    {
        let months = self.index.clone();
        let total = months.len();
        let mut report = LoadReport::default();

        for (i, month) in months.iter().enumerate() {
            if self.is_cached(month) {
                report.cached += 1;
            } else {
                match fetch_shard(self.source.as_ref(), month).await {
                    Ok(papers) => {
                        self.insert_shard(month, papers);
                        report.fetched.push(month.clone());
                    }
                    Err(e) => {
                        tracing::warn!(month = %month, error = %e, "skipping month");
                        report.failed.push((month.clone(), e.to_string()));
                    }
                }
            }
            on_month(month, i + 1, total);
        }

        self.rebuild_working_set();
        report
    }

    /// Make sure every month overlapping `[start, end]` (ISO dates) is cached,
    /// fetching the missing ones concurrently, then rebuild the working set
    /// from all cached shards.
    pub async fn ensure_range(&mut self, start: &str, end: &str) -> Result<LoadReport, CatalogError> {
        let candidates = self.range_months(start, end)?;
        let missing: Vec<String> = candidates
            .iter()
            .filter(|m| !self.is_cached(m))
            .cloned()
            .collect();
        let mut report = LoadReport {
            cached: candidates.len() - missing.len(),
            ..Default::default()
        };

        let source = Arc::clone(&self.source);
        let results = join_all(
            missing
                .iter()
                .map(|m| fetch_shard(source.as_ref(), m)),
        )
        .await;

        for (month, result) in missing.into_iter().zip(results) {
            match result {
                Ok(papers) => {
                    self.insert_shard(&month, papers);
                    report.fetched.push(month);
                }
                Err(e) => {
                    tracing::warn!(month = %month, error = %e, "failed to load month in range");
                    report.failed.push((month, e.to_string()));
                }
            }
        }

        self.rebuild_working_set();
        tracing::debug!(
            start = %start,
            end = %end,
            fetched = report.fetched.len(),
            papers = self.working.len(),
            "range ensured"
        );
        Ok(report)
    }

    /// Months overlapping `[start, end]` that are not cached yet.
    pub fn missing_months(&self, start: &str, end: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .range_months(start, end)?
            .into_iter()
            .filter(|m| !self.is_cached(m))
            .collect())
    }

    /// Index months that are not cached yet, in index order.
    pub fn missing_index_months(&self) -> Vec<String> {
        self.index
            .iter()
            .filter(|m| !self.is_cached(m))
            .cloned()
            .collect()
    }

    fn range_months(&self, start: &str, end: &str) -> Result<Vec<String>, CatalogError> {
        let lo = date_month(start)?;
        let hi = date_month(end)?;
        if self.index.is_empty() {
            let span = month_span(lo, hi);
            if span > MAX_UNINDEXED_MONTHS {
                tracing::warn!(start = %start, end = %end, months = span, "refusing unbounded range");
                return Err(CatalogError::RangeTooWide {
                    months: span,
                    limit: MAX_UNINDEXED_MONTHS,
                });
            }
            return Ok(calendar_months(lo, hi));
        }
        Ok(self
            .index
            .iter()
            .filter(|m| m.as_str() >= lo && m.as_str() <= hi)
            .cloned()
            .collect())
    }

    /// Cache a fetched shard. Returns `false` (and changes nothing) if the
    /// month is already cached.
    pub fn insert_shard(&mut self, month: &str, papers: Vec<Paper>) -> bool {
        if self.is_cached(month) {
            return false;
        }
        tracing::info!(month = %month, papers = papers.len(), "loaded month");
        self.shards
            .insert(month.to_string(), papers.into_iter().map(Arc::new).collect());
        self.load_order.push(month.to_string());
        true
    }

    /// Set the working set to every cached shard: index order first, then
    /// load order for months missing from the index.
    pub fn rebuild_working_set(&mut self) {
        self.working = self
            .catalog_months()
            .iter()
            .filter_map(|m| self.shards.get(m))
            .flat_map(|shard| shard.iter().cloned())
            .collect();
    }

    /// Set the working set to one cached shard (empty if not cached).
    pub fn focus_month(&mut self, month: &str) {
        self.working = self.shards.get(month).cloned().unwrap_or_default();
    }

    fn catalog_months(&self) -> Vec<String> {
        let in_index: HashSet<&str> = self.index.iter().map(String::as_str).collect();
        self.index
            .iter()
            .filter(|m| self.shards.contains_key(*m))
            .chain(self.load_order.iter().filter(|m| !in_index.contains(m.as_str())))
            .cloned()
            .collect()
    }

    /// Every cached paper in catalog order, de-duplicated by id. This is the
    /// full catalog regardless of the current month selection.
    pub fn catalog(&self) -> Vec<Arc<Paper>> {
        let mut seen = HashSet::new();
        self.catalog_months()
            .iter()
            .filter_map(|m| self.shards.get(m))
            .flat_map(|shard| shard.iter())
            .filter(|p| seen.insert(p.id.clone()))
            .cloned()
            .collect()
    }
}

/// Fetch and decode `index.json`.
pub async fn fetch_index(source: &dyn ShardSource) -> Result<Vec<String>, CatalogError> {
    let bytes = source.fetch(INDEX_FILE).await?;
    decode_index(&bytes)
}

/// Fetch and decode one month shard.
pub async fn fetch_shard(source: &dyn ShardSource, month: &str) -> Result<Vec<Paper>, CatalogError> {
    let file = month_file(month)?;
    let bytes = source.fetch(&file).await?;
    decode_shard(&file, &bytes)
}

/// Decode `index.json`. Entries whose key is not `YYYY-MM` are dropped.
pub fn decode_index(bytes: &[u8]) -> Result<Vec<String>, CatalogError> {
    let entries: Vec<MonthEntry> = serde_json::from_slice(bytes).map_err(|e| CatalogError::Json {
        what: INDEX_FILE.to_string(),
        source: e,
    })?;
    Ok(entries
        .into_iter()
        .filter_map(|e| {
            if is_month_key(&e.month) {
                Some(e.month)
            } else {
                tracing::warn!(month = %e.month, "ignoring malformed index entry");
                None
            }
        })
        .collect())
}

/// Decode a shard. The outer value must be a JSON array; individual records
/// that cannot be read (e.g. no `id`) are skipped.
pub fn decode_shard(what: &str, bytes: &[u8]) -> Result<Vec<Paper>, CatalogError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_slice(bytes).map_err(|e| CatalogError::Json {
            what: what.to_string(),
            source: e,
        })?;
    let mut papers = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Paper>(value) {
            Ok(p) => papers.push(p),
            Err(e) => tracing::warn!(file = %what, record = i, error = %e, "skipping unreadable record"),
        }
    }
    Ok(papers)
}

fn date_month(date: &str) -> Result<&str, CatalogError> {
    match date.get(..7) {
        Some(m) if is_month_key(m) => Ok(m),
        _ => Err(CatalogError::InvalidDate(date.to_string())),
    }
}

fn parse_month(m: &str) -> Option<(i32, u32)> {
    Some((m.get(..4)?.parse().ok()?, m.get(5..)?.parse().ok()?))
}

/// Number of calendar months in `[lo, hi]`; zero when `lo > hi`.
fn month_span(lo: &str, hi: &str) -> usize {
    let (Some((ly, lm)), Some((hy, hm))) = (parse_month(lo), parse_month(hi)) else {
        return 0;
    };
    let months = (hy - ly) as i64 * 12 + hm as i64 - lm as i64 + 1;
    months.max(0) as usize
}

/// Calendar months from `lo` to `hi` inclusive; empty when `lo > hi`.
fn calendar_months(lo: &str, hi: &str) -> Vec<String> {
    let (Some((mut y, mut mo)), Some((hy, hm))) = (parse_month(lo), parse_month(hi)) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    while (y, mo) <= (hy, hm) {
        out.push(format!("{y:04}-{mo:02}"));
        mo += 1;
        if mo > 12 {
            mo = 1;
            y += 1;
        }
    }
    out
}
