use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use crate::config::storage::StorageConfig;
use crate::errors::AppError;
use super::Storage;

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.record_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        match fs::read_to_string(&self.path).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn save(&self, record: &str) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }
        // the rename replaces the whole record, so readers never see a half-written file
        let tmp = self.temp_path();
        fs::write(&tmp, record.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!("Wrote filter record to {} ({} bytes)", self.path.display(), record.len());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
