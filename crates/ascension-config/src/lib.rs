//! Engine-wide tunables: undo history depth, search-history length and the
//! default whole-match granularity, loaded from an optional
//! `ascension.toml` (spec's ambient config layer, grounded on
//! `core-config`'s `ConfigFile`/`discover`/`load_from` pattern).

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

/// Whole-match granularity a fresh `TextSearcher` defaults to (spec §7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchGranularity {
    CodeUnit,
    GraphemeCluster,
    Word,
}

impl Default for MatchGranularity {
    fn default() -> Self {
        MatchGranularity::GraphemeCluster
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    #[serde(default = "DocumentConfig::default_undo_history_depth")]
    pub undo_history_depth: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            undo_history_depth: Self::default_undo_history_depth(),
        }
    }
}

impl DocumentConfig {
    const fn default_undo_history_depth() -> usize {
        1000
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "SearchConfig::default_history_length")]
    pub history_length: usize,
    #[serde(default)]
    pub default_granularity: MatchGranularity,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            history_length: Self::default_history_length(),
            default_granularity: MatchGranularity::default(),
        }
    }
}

impl SearchConfig {
    const fn default_history_length() -> usize {
        16
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// The minimum any "depth"/"length" tunable is allowed to clamp down to:
/// a value of zero would make undo or search history useless, so the
/// engine treats it as "not configured" instead.
const MIN_HISTORY_DEPTH: usize = 1;
/// Upper bound past which a misconfigured file can't make the engine
/// retain unbounded history.
const MAX_HISTORY_DEPTH: usize = 100_000;

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

impl EngineConfig {
    /// Clamp tunables to the sane range, logging when a configured value
    /// was out of bounds (mirrors `core-config`'s clamp-and-log pattern).
    pub fn clamp(&mut self) {
        let depth = self.file.document.undo_history_depth;
        let clamped_depth = depth.clamp(MIN_HISTORY_DEPTH, MAX_HISTORY_DEPTH);
        if clamped_depth != depth {
            info!(
                target: "config",
                raw = depth,
                clamped = clamped_depth,
                "undo_history_depth_clamped"
            );
            self.file.document.undo_history_depth = clamped_depth;
        }

        let history = self.file.search.history_length;
        let clamped_history = history.clamp(MIN_HISTORY_DEPTH, MAX_HISTORY_DEPTH);
        if clamped_history != history {
            info!(
                target: "config",
                raw = history,
                clamped = clamped_history,
                "search_history_length_clamped"
            );
            self.file.search.history_length = clamped_history;
        }
    }
}

/// Best-effort config path: a local `ascension.toml` takes priority over
/// the platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("ascension.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("ascension").join("ascension.toml");
    }
    PathBuf::from("ascension.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<EngineConfig> {
    let path = path.unwrap_or_else(discover);
    let mut config = if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => EngineConfig {
                raw: Some(content),
                file,
            },
            Err(error) => {
                tracing::warn!(target: "config", %error, path = %path.display(), "config_parse_failed_using_defaults");
                EngineConfig::default()
            }
        }
    } else {
        EngineConfig::default()
    };
    config.clamp();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_ascension__.toml"))).unwrap();
        assert_eq!(cfg.file.document.undo_history_depth, 1000);
        assert_eq!(cfg.file.search.history_length, 16);
        assert_eq!(cfg.file.search.default_granularity, MatchGranularity::GraphemeCluster);
    }

    #[test]
    fn parses_overrides() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[document]\nundo-history-depth = 50\n[search]\nhistory-length = 4\ndefault-granularity = \"word\"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.document.undo_history_depth, 50);
        assert_eq!(cfg.file.search.history_length, 4);
        assert_eq!(cfg.file.search.default_granularity, MatchGranularity::Word);
    }

    #[test]
    fn clamps_absurd_depth_to_maximum() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[document]\nundo-history-depth = 999999999\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.document.undo_history_depth, MAX_HISTORY_DEPTH);
    }
}
