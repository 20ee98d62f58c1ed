use serde::Deserialize;
use std::path::PathBuf;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct StorageConfig {
    #[validate(length(min = 1))]
    pub data_dir: String,
    #[validate(length(min = 1))]
    pub file_name: String,
    // false keeps the record in memory only
    pub enabled: bool,
    // report failed snapshots to the client as 500
    pub strict: bool,
    // start empty instead of aborting on a bad record
    pub discard_malformed: bool,
}

impl StorageConfig {
    pub fn record_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.file_name)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".into(),
            file_name: "BloomFilter.txt".into(),
            enabled: true,
            strict: false,
            discard_malformed: false,
        }
    }
}
