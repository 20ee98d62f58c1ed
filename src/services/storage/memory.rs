use async_trait::async_trait;
use parking_lot::Mutex;
use crate::errors::AppError;
use super::Storage;

// Keeps the record in process memory; used when persistence is disabled and in tests.
#[derive(Default)]
pub struct MemoryStorage {
    record: Mutex<Option<String>>,
    saves: Mutex<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
            saves: Mutex::new(0),
        }
    }

    pub fn record(&self) -> Option<String> {
        self.record.lock().clone()
    }

    pub fn save_count(&self) -> u64 {
        *self.saves.lock()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.record.lock().clone())
    }

    async fn save(&self, record: &str) -> Result<(), AppError> {
        *self.record.lock() = Some(record.to_string());
        *self.saves.lock() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
