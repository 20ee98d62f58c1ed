pub mod file;
pub mod memory;

use async_trait::async_trait;
use crate::errors::AppError;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Durable home of the filter record. Each `save` replaces the whole record.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns `None` when no record has been written yet.
    async fn load(&self) -> Result<Option<String>, AppError>;
    async fn save(&self, record: &str) -> Result<(), AppError>;
    fn describe(&self) -> String;
}
