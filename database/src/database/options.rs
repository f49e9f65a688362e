use std::{path::PathBuf, time::Duration};

use crate::persistence::{storage::StorageEngine, transaction::TransactionWriteMode};

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub restore: bool,
    pub write_mode: TransactionWriteMode,
    pub storage_engine: StorageEngine,
    pub request_timeout: Duration,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    /// Defines whether we should replay the transaction log on startup
    pub fn set_restore(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }

    /// Defines whether we should sync the file write to disk before marking the
    /// transaction as committed. This is useful for durability but can be slow ~3ms per sync
    pub fn set_sync_file_write(mut self, write_mode: TransactionWriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn set_storage_engine(mut self, storage_engine: StorageEngine) -> Self {
        self.storage_engine = storage_engine;
        self
    }

    /// How long a request manager waits for the database to answer a request
    pub fn set_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        // Defaults to $CWD/data
        Self {
            write_mode: TransactionWriteMode::Sync,
            storage_engine: StorageEngine::File(PathBuf::from("data")),
            restore: true,
            request_timeout: Duration::from_secs(2),
        }
    }
}

impl DatabaseOptions {
    /// In memory database, nothing survives a restart
    pub fn new_in_memory() -> Self {
        DatabaseOptions::default()
            .set_storage_engine(StorageEngine::InMemory)
            .set_restore(false)
            .set_sync_file_write(TransactionWriteMode::OSBuffered)
    }
}
