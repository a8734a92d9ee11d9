use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pager::{BATCH, INITIAL_BATCH};

/// Environment variable naming the data location (directory or base URL).
pub const DATA_ENV: &str = "PAPERBOARD_DATA";

/// Data location used when nothing else is configured.
pub const DEFAULT_LOCATION: &str = "data";

/// Rows of look-ahead before the sentinel row counts as visible.
pub const DEFAULT_LOOKAHEAD_ROWS: usize = 3;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub source: Option<SourceConfig>,
    pub paging: Option<PagingConfig>,
    pub display: Option<DisplayConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory or `http(s)://` base URL holding `index.json`.
    pub location: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagingConfig {
    pub initial_batch: Option<usize>,
    pub batch: Option<usize>,
    pub lookahead_rows: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub path: Option<String>,
}

impl ConfigFile {
    /// Data location: `cli` > `PAPERBOARD_DATA` > config file > `data`.
    pub fn resolve_location(&self, cli: Option<&str>) -> String {
        cli.map(String::from)
            .or_else(|| std::env::var(DATA_ENV).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.source.as_ref().and_then(|s| s.location.clone()))
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
    }

    /// HTTP timeout; `None` (the default) means no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.source
            .as_ref()
            .and_then(|s| s.timeout_secs)
            .filter(|&s| s > 0)
            .map(Duration::from_secs)
    }

    pub fn initial_batch(&self) -> usize {
        self.paging
            .as_ref()
            .and_then(|p| p.initial_batch)
            .unwrap_or(INITIAL_BATCH)
    }

    pub fn batch(&self) -> usize {
        self.paging.as_ref().and_then(|p| p.batch).unwrap_or(BATCH)
    }

    pub fn lookahead_rows(&self) -> usize {
        self.paging
            .as_ref()
            .and_then(|p| p.lookahead_rows)
            .unwrap_or(DEFAULT_LOOKAHEAD_ROWS)
    }

    pub fn theme(&self) -> Option<&str> {
        self.display.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn export_path(&self) -> Option<&str> {
        self.export.as_ref().and_then(|e| e.path.as_deref())
    }
}

/// Platform config directory path: `<config_dir>/paperboard/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paperboard").join("config.toml"))
}

/// Load config by cascading CWD `.paperboard.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".paperboard.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        source: Some(SourceConfig {
            location: overlay
                .source
                .as_ref()
                .and_then(|s| s.location.clone())
                .or_else(|| base.source.as_ref().and_then(|s| s.location.clone())),
            timeout_secs: overlay
                .source
                .as_ref()
                .and_then(|s| s.timeout_secs)
                .or_else(|| base.source.as_ref().and_then(|s| s.timeout_secs)),
        }),
        paging: Some(PagingConfig {
            initial_batch: overlay
                .paging
                .as_ref()
                .and_then(|p| p.initial_batch)
                .or_else(|| base.paging.as_ref().and_then(|p| p.initial_batch)),
            batch: overlay
                .paging
                .as_ref()
                .and_then(|p| p.batch)
                .or_else(|| base.paging.as_ref().and_then(|p| p.batch)),
            lookahead_rows: overlay
                .paging
                .as_ref()
                .and_then(|p| p.lookahead_rows)
                .or_else(|| base.paging.as_ref().and_then(|p| p.lookahead_rows)),
        }),
        display: Some(DisplayConfig {
            theme: overlay
                .display
                .as_ref()
                .and_then(|d| d.theme.clone())
                .or_else(|| base.display.as_ref().and_then(|d| d.theme.clone())),
        }),
        export: Some(ExportConfig {
            path: overlay
                .export
                .as_ref()
                .and_then(|e| e.path.clone())
                .or_else(|| base.export.as_ref().and_then(|e| e.path.clone())),
        }),
    }
}

/// Save the current config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    save_to_path(config, &path)?;
    Ok(path)
}

/// Write `config` as TOML to `path`, creating parent directories.
pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_round_trip_toml() {
        let config = ConfigFile {
            paging: Some(PagingConfig {
                initial_batch: Some(40),
                lookahead_rows: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.initial_batch(), 40);
        assert_eq!(parsed.batch(), BATCH);
        assert_eq!(parsed.lookahead_rows(), 5);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let parsed: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(parsed.initial_batch(), 20);
        assert_eq!(parsed.batch(), 10);
        assert!(parsed.timeout().is_none());
        assert!(parsed.theme().is_none());
    }

    #[test]
    fn zero_timeout_means_none() {
        let parsed: ConfigFile = toml::from_str("[source]\ntimeout_secs = 0\n").unwrap();
        assert!(parsed.timeout().is_none());
        let parsed: ConfigFile = toml::from_str("[source]\ntimeout_secs = 15\n").unwrap();
        assert_eq!(parsed.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            source: Some(SourceConfig {
                location: Some("/base/data".to_string()),
                timeout_secs: Some(10),
            }),
            display: Some(DisplayConfig {
                theme: Some("hacker".to_string()),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            source: Some(SourceConfig {
                location: Some("https://example.org/data".to_string()),
                timeout_secs: None,
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let source = merged.source.as_ref().unwrap();
        assert_eq!(source.location.as_deref(), Some("https://example.org/data"));
        assert_eq!(source.timeout_secs, Some(10));
        assert_eq!(merged.theme(), Some("hacker"));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            export: Some(ExportConfig {
                path: Some("refs.bib".to_string()),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.export_path(), Some("refs.bib"));
    }

    #[test]
    fn cli_location_beats_config() {
        let config = ConfigFile {
            source: Some(SourceConfig {
                location: Some("/from/config".to_string()),
                timeout_secs: None,
            }),
            ..Default::default()
        };
        assert_eq!(config.resolve_location(Some("/from/cli")), "/from/cli");
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ConfigFile {
            display: Some(DisplayConfig {
                theme: Some("modern".to_string()),
            }),
            ..Default::default()
        };
        save_to_path(&config, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.theme(), Some("modern"));
    }

    #[test]
    fn unparsable_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[paging\ninitial_batch = ").unwrap();
        assert!(load_from_path(&path).is_none());
    }
}
