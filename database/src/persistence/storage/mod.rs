use std::path::PathBuf;

use thiserror::Error;

use self::{file::FileStorage, memory::MemoryStorage};

pub mod file;
pub mod memory;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unable to initialize persistence: {0}")]
    UnableToInitializePersistence(anyhow::Error),

    #[error("Unable to write transaction: {0}")]
    UnableToWriteTransaction(anyhow::Error),

    #[error("Unable to sync transaction buffer to persistent storage: {0}")]
    UnableToSyncTransactionBufferToPersistentStorage(anyhow::Error),

    #[error("Unable to load previous transactions: {0}")]
    UnableToLoadPreviousTransactions(anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub fn io_to_generic_error(error: std::io::Error) -> anyhow::Error {
    anyhow::Error::new(error)
}

/// Where the transaction log lives
pub trait Storage {
    /// Called on database start-up, should be idempotent
    fn init(&mut self) -> StorageResult<()>;

    /// Buffered append of one or more serialized transactions
    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()>;

    /// Makes every previous write durable
    fn transaction_sync(&mut self) -> StorageResult<()>;

    /// Full contents of the log, empty when nothing was written yet
    fn transaction_load(&mut self) -> StorageResult<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageEngine {
    /// Transaction log is written to `<dir>/transaction_log.json`
    File(PathBuf),
    /// Transaction log is kept in memory, lost when the database stops
    InMemory,
}

impl StorageEngine {
    pub fn get_engine(&self) -> Box<dyn Storage + Send> {
        match self {
            StorageEngine::File(path) => Box::new(FileStorage::new(path.clone())),
            StorageEngine::InMemory => Box::new(MemoryStorage::default()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StorageEngine::File(path) => format!("File [{}]", path.display()),
            StorageEngine::InMemory => "InMemory".to_string(),
        }
    }
}
