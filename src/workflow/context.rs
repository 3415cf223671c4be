use crate::config::{load_config_for, EnrichConfig};
use crate::ledger::ProgressLedger;
use crate::passes::PassKind;
use crate::paths::DataPaths;
use crate::record::RecordStore;
use anyhow::Result;
use std::path::Path;

/// Resolved data directory plus the config that shapes it.
pub(crate) struct DataContext {
    pub(crate) paths: DataPaths,
    pub(crate) config: EnrichConfig,
}

impl DataContext {
    pub(crate) fn load(data_dir: &Path, config_path: Option<&Path>) -> Result<Self> {
        let defaults = DataPaths::new(data_dir.to_path_buf());
        let config = load_config_for(&defaults, config_path)?;
        let paths = DataPaths::with_config(data_dir.to_path_buf(), &config);
        Ok(Self { paths, config })
    }

    /// Load the dataset. A missing dataset is as fatal as a malformed one.
    pub(crate) fn load_store(&self) -> Result<RecordStore> {
        RecordStore::load(&self.paths.dataset_path())
    }

    pub(crate) fn load_ledger(&self, pass: PassKind) -> Result<ProgressLedger> {
        ProgressLedger::load(&self.paths.ledger_path(pass), pass.as_str())
    }
}
