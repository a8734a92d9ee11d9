//! In-memory shard source for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{INDEX_FILE, ShardSource, SourceFuture};
use crate::{CatalogError, MonthEntry, Paper};

/// A hand-rolled mock implementing [`ShardSource`] for tests.
///
/// Supports:
/// - Canned files (index and month shards, or raw bytes).
/// - Injected failures per file name.
/// - Optional per-call latency.
/// - Call counting, in total and per file.
#[derive(Default)]
pub struct MockSource {
    files: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `index.json` listing `months` in the given order.
    pub fn with_index(self, months: &[&str]) -> Self {
        let entries: Vec<MonthEntry> = months
            .iter()
            .map(|m| MonthEntry {
                month: m.to_string(),
            })
            .collect();
        let bytes = serde_json::to_vec(&entries).unwrap_or_default();
        self.with_file(INDEX_FILE, bytes)
    }

    /// Serve `{month}.json` containing `papers`.
    pub fn with_month(self, month: &str, papers: Vec<Paper>) -> Self {
        let bytes = serde_json::to_vec(&papers).unwrap_or_default();
        self.with_file(&format!("{month}.json"), bytes)
    }

    /// Serve arbitrary bytes under `file`.
    pub fn with_file(mut self, file: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(file.to_string(), bytes.into());
        self
    }

    /// Make every fetch of `file` fail with an HTTP 500.
    pub fn failing(mut self, file: &str) -> Self {
        self.failing.insert(file.to_string());
        self
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `fetch()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// How many times `file` has been requested.
    pub fn fetch_count(&self, file: &str) -> usize {
        self.fetches
            .lock()
            .map(|m| m.get(file).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl ShardSource for MockSource {
    fn describe(&self) -> String {
        "mock".to_string()
    }

    fn fetch<'a>(&'a self, file: &'a str) -> SourceFuture<'a, Vec<u8>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut fetches) = self.fetches.lock() {
            *fetches.entry(file.to_string()).or_insert(0) += 1;
        }
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            let url = format!("mock://{file}");
            if self.failing.contains(file) {
                return Err(CatalogError::Status { url, status: 500 });
            }
            self.files
                .get(file)
                .cloned()
                .ok_or(CatalogError::Status { url, status: 404 })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_canned_files_and_counts() {
        let src = MockSource::new()
            .with_index(&["2024-02", "2024-01"])
            .failing("2024-01.json");

        let index = src.fetch("index.json").await.unwrap();
        let parsed: Vec<MonthEntry> = serde_json::from_slice(&index).unwrap();
        assert_eq!(parsed[0].month, "2024-02");

        assert!(matches!(
            src.fetch("2024-01.json").await,
            Err(CatalogError::Status { status: 500, .. })
        ));
        assert!(matches!(
            src.fetch("2023-12.json").await,
            Err(CatalogError::Status { status: 404, .. })
        ));

        assert_eq!(src.call_count(), 3);
        assert_eq!(src.fetch_count("index.json"), 1);
        assert_eq!(src.fetch_count("2023-12.json"), 1);
        assert_eq!(src.fetch_count("never.json"), 0);
    }
}
