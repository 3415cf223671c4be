//! Typed paths into a data directory.
use crate::config::EnrichConfig;
use crate::passes::PassKind;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "enrich.json";
pub const DEFAULT_DATASET_REL: &str = "words_processed.json";
pub const DEFAULT_PROGRESS_REL: &str = "progress";
const HISTORY_FILE: &str = "history.jsonl";
const API_KEY_FILE: &str = "api_key.txt";

#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
    dataset_rel: PathBuf,
    progress_rel: PathBuf,
}

impl DataPaths {
    /// Paths with the default layout under `root`.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            dataset_rel: PathBuf::from(DEFAULT_DATASET_REL),
            progress_rel: PathBuf::from(DEFAULT_PROGRESS_REL),
        }
    }

    /// Paths with the layout a config overrides.
    pub fn with_config(root: PathBuf, config: &EnrichConfig) -> Self {
        Self {
            root,
            dataset_rel: PathBuf::from(&config.dataset),
            progress_rel: PathBuf::from(&config.progress_dir),
        }
    }

    /// Return the `enrich.json` path.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.root.join(&self.dataset_rel)
    }

    pub fn progress_dir(&self) -> PathBuf {
        self.root.join(&self.progress_rel)
    }

    /// Return the `progress/<pass>.json` ledger path.
    pub fn ledger_path(&self, pass: PassKind) -> PathBuf {
        self.progress_dir().join(format!("{}.json", pass.as_str()))
    }

    pub fn history_path(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    pub fn api_key_path(&self) -> PathBuf {
        self.root.join(API_KEY_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_paths_are_per_pass() {
        let paths = DataPaths::new(PathBuf::from("/data"));
        assert_eq!(
            paths.ledger_path(PassKind::PassageRepair),
            PathBuf::from("/data/progress/passage-repair.json")
        );
        assert_eq!(
            paths.dataset_path(),
            PathBuf::from("/data/words_processed.json")
        );
    }

    #[test]
    fn config_overrides_layout() {
        let config = EnrichConfig {
            dataset: "out/words.json".to_string(),
            progress_dir: "state".to_string(),
            ..EnrichConfig::default()
        };
        let paths = DataPaths::with_config(PathBuf::from("/data"), &config);
        assert_eq!(paths.dataset_path(), PathBuf::from("/data/out/words.json"));
        assert_eq!(
            paths.ledger_path(PassKind::Examples),
            PathBuf::from("/data/state/examples.json")
        );
        assert_eq!(paths.config_path(), PathBuf::from("/data/enrich.json"));
    }
}
