use std::path::{Path, PathBuf};

use super::{ShardSource, SourceFuture};
use crate::CatalogError;

/// Reads catalog files from a local directory (e.g. a checkout of the site's `data/`).
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ShardSource for DirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn fetch<'a>(&'a self, file: &'a str) -> SourceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let path = self.root.join(file);
            tokio::fs::read(&path).await.map_err(|e| CatalogError::Io {
                path: path.display().to_string(),
                source: e,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_file_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.json"), br#"[{"month":"2024-01"}]"#).unwrap();

        let src = DirSource::new(dir.path());
        let bytes = src.fetch("index.json").await.unwrap();
        assert_eq!(bytes, br#"[{"month":"2024-01"}]"#);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = DirSource::new(dir.path());
        let err = src.fetch("2024-01.json").await.unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(err.to_string().contains("2024-01.json"));
    }
}
