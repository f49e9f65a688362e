use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::consts::TransactionId;
use crate::model::statement::Statement;

use super::storage::{Storage, StorageError, StorageResult};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub enum TransactionStatus {
    Committed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionWriteMode {
    /// Writes the transaction and performs an fsync before the commit is acknowledged
    Sync,
    /// Writes the transaction, lets the OS buffer the writes
    OSBuffered,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub statement: Statement,
    pub status: TransactionStatus,
}

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Transaction log is corrupt at line {line}: {source}")]
    CorruptTransaction {
        line: usize,
        source: serde_json::Error,
    },
}

pub struct TransactionWAL {
    storage: Box<dyn Storage + Send>,
    write_mode: TransactionWriteMode,
    current_transaction_id: TransactionId,
}

impl TransactionWAL {
    pub fn new(storage: Box<dyn Storage + Send>, write_mode: TransactionWriteMode) -> Self {
        Self {
            storage,
            write_mode,
            current_transaction_id: TransactionId::new_first_transaction(),
        }
    }

    pub fn init(&mut self) -> StorageResult<()> {
        self.storage.init()
    }

    pub fn get_current_transaction_id(&self) -> &TransactionId {
        &self.current_transaction_id
    }

    pub fn set_current_transaction_id(&mut self, transaction_id: TransactionId) {
        self.current_transaction_id = transaction_id;
    }

    /// Appends the statement to the log. The transaction id only moves forward once the
    /// write (and the sync, when enabled) succeeded.
    pub fn commit(&mut self, statement: &Statement) -> StorageResult<TransactionId> {
        let applying_transaction_id = self.current_transaction_id.increment();

        let transaction_json_line = format!(
            "{}\n",
            serde_json::to_string(&TransactionRef {
                id: &applying_transaction_id,
                statement,
                status: TransactionStatus::Committed,
            })
            .map_err(|e| StorageError::UnableToWriteTransaction(anyhow::Error::new(e)))?
        );

        self.storage
            .transaction_write(transaction_json_line.as_bytes())?;

        // Performs an fsync on the transaction log, ensuring that the transaction is durable
        // https://www.postgresql.org/docs/current/wal-reliability.html
        if self.write_mode == TransactionWriteMode::Sync {
            self.storage.transaction_sync()?;
        }

        self.current_transaction_id = applying_transaction_id.clone();

        Ok(applying_transaction_id)
    }

    pub fn restore(&mut self) -> Result<Vec<Transaction>, RestoreError> {
        let transactions_data = self.storage.transaction_load()?;

        let mut transactions: Vec<Transaction> = vec![];

        for (index, transaction_string) in transactions_data.split('\n').enumerate() {
            if transaction_string.is_empty() {
                continue;
            }

            let transaction = serde_json::from_str(transaction_string).map_err(|source| {
                RestoreError::CorruptTransaction {
                    line: index + 1,
                    source,
                }
            })?;

            transactions.push(transaction);
        }

        Ok(transactions)
    }
}

/// Borrowed form of [`Transaction`], avoids cloning the statement just to serialize it
#[derive(Serialize)]
struct TransactionRef<'a> {
    id: &'a TransactionId,
    statement: &'a Statement,
    status: TransactionStatus,
}
