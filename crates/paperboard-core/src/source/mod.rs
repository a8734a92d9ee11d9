//! Shard sources: where `index.json` and the `YYYY-MM.json` month shards are read from.

pub mod dir;
pub mod http;
pub mod mock;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub use dir::DirSource;
pub use http::HttpSource;
pub use mock::MockSource;

use crate::{CatalogError, is_month_key};

/// Boxed future returned by [`ShardSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Name of the month index file.
pub const INDEX_FILE: &str = "index.json";

/// A read-only store of static catalog files.
pub trait ShardSource: Send + Sync {
    /// Human-readable location (base URL or directory), for logs.
    fn describe(&self) -> String;

    /// Read one file relative to the catalog root.
    fn fetch<'a>(&'a self, file: &'a str) -> SourceFuture<'a, Vec<u8>>;
}

/// File name of the shard for `month`. Rejects anything that is not `YYYY-MM`.
pub fn month_file(month: &str) -> Result<String, CatalogError> {
    if !is_month_key(month) {
        return Err(CatalogError::InvalidMonth(month.to_string()));
    }
    Ok(format!("{month}.json"))
}

/// Pick a source for `location`: HTTP(S) base URLs go through [`HttpSource`],
/// anything else is treated as a local directory.
pub fn from_location(
    location: &str,
    timeout: Option<Duration>,
) -> Result<Arc<dyn ShardSource>, CatalogError> {
    let lower = location.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Arc::new(DirSource::new(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_file_validates_key() {
        assert_eq!(month_file("2024-03").unwrap(), "2024-03.json");
        assert!(matches!(
            month_file("2024-3"),
            Err(CatalogError::InvalidMonth(_))
        ));
        assert!(matches!(
            month_file("../../etc/passwd"),
            Err(CatalogError::InvalidMonth(_))
        ));
    }

    #[test]
    fn from_location_picks_backend() {
        let http = from_location("https://example.org/data", None).unwrap();
        assert!(http.describe().starts_with("https://example.org/data"));

        let dir = from_location("docs/data", None).unwrap();
        assert!(dir.describe().contains("docs/data"));
    }
}
