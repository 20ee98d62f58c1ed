pub mod add;
pub mod delete;
pub mod query;

use std::sync::Arc;
use tracing::error;
use crate::{config::settings::Settings, errors::AppError, services::{bloom::SharedFilter, metrics}};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub filter: Arc<SharedFilter>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, filter: Arc<SharedFilter>) -> Self {
        Self { settings, filter }
    }
}

/// Snapshots the filter after a successful mutation.
///
/// A failed snapshot is logged and counted; it only reaches the client when
/// `storage.strict` is set, since the in-memory filter stays authoritative.
pub(crate) async fn persist_mutation(state: &AppState) -> Result<(), AppError> {
    match state.filter.persist().await {
        Ok(()) => Ok(()),
        Err(e) => {
            metrics::record_persist_error();
            error!("Failed to persist filter: {}", e);
            if state.settings.storage.strict {
                Err(AppError::Internal(format!("snapshot failed: {}", e)))
            } else {
                Ok(())
            }
        }
    }
}
