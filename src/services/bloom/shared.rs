//! The one filter instance every connection works against.
//!
//! Filter operations hold a synchronous lock for their whole duration and
//! never await while holding it. Snapshots are serialized by a second, async
//! lock: the state is copied under the filter lock after the snapshot lock is
//! taken, so files are written in the same order the state changed.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use super::codec;
use super::filter::BloomFilterCore;
use crate::errors::AppError;
use crate::services::metrics;
use crate::services::storage::Storage;
use crate::types::Membership;

pub struct SharedFilter {
    core: Mutex<BloomFilterCore>,
    storage: Arc<dyn Storage>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl SharedFilter {
    pub fn new(core: BloomFilterCore, storage: Arc<dyn Storage>) -> Self {
        metrics::set_blacklist_size(core.len());
        Self {
            core: Mutex::new(core),
            storage,
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Replaces the in-memory state with the stored record, if one exists.
    ///
    /// Returns `true` when a record was loaded.
    ///
    /// # Errors
    /// Returns [`AppError::MalformedRecord`] for an unreadable record and
    /// storage errors as-is. The in-memory state is untouched on error.
    pub async fn restore(&self) -> Result<bool, AppError> {
        let Some(record) = self.storage.load().await? else {
            return Ok(false);
        };
        let state = codec::decode(&record)?;
        let members = state.members.len();
        {
            let mut core = self.core.lock();
            core.reset(state)?;
        }
        metrics::set_blacklist_size(members);
        info!("Restored {} blacklisted items from {}", members, self.storage.describe());
        Ok(true)
    }

    /// Returns `true` when `item` was not yet blacklisted.
    pub fn add(&self, item: &str) -> bool {
        let mut core = self.core.lock();
        let inserted = core.add(item);
        metrics::set_blacklist_size(core.len());
        inserted
    }

    /// Membership check and removal happen under one lock acquisition.
    /// Returns `false` when `item` was not blacklisted.
    pub fn remove(&self, item: &str) -> bool {
        let mut core = self.core.lock();
        let removed = core.remove(item);
        if removed {
            metrics::set_blacklist_size(core.len());
        }
        removed
    }

    pub fn query(&self, item: &str) -> Membership {
        self.core.lock().query(item)
    }

    pub fn snapshot(&self) -> BloomFilterCore {
        self.core.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.core.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.lock().is_empty()
    }

    /// Writes the current state to storage.
    ///
    /// # Errors
    /// Propagates the storage error. The in-memory state stays as it is.
    pub async fn persist(&self) -> Result<(), AppError> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.snapshot();
        let record = codec::encode(&snapshot);
        if let Err(e) = self.storage.save(&record).await {
            warn!("Snapshot to {} failed: {}", self.storage.describe(), e);
            return Err(e);
        }
        Ok(())
    }
}
