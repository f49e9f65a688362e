use std::{io, thread, time::Instant};

use num_format::{Locale, ToFormattedString};
use thiserror::Error;

use crate::{
    consts::consts::TransactionId,
    model::statement::Statement,
    persistence::{
        storage::StorageError,
        transaction::{RestoreError, TransactionWAL},
    },
};

use super::{
    commands::{Control, DatabaseCommand, DatabaseCommandRequest, DatabaseCommandResponse},
    options::DatabaseOptions,
    request_manager::RequestManager,
    table::table::{ApplyErrors, PersonTable},
};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Unable to initialize storage: {0}")]
    Init(StorageError),

    #[error("Unable to restore transaction log: {0}")]
    Restore(#[from] RestoreError),

    #[error("Transaction {transaction_id} could not be replayed: {source}")]
    Replay {
        transaction_id: TransactionId,
        source: ApplyErrors,
    },

    #[error("Unable to start database thread: {0}")]
    Spawn(io::Error),
}

pub struct Database {
    person_table: PersonTable,
    transaction_wal: TransactionWAL,
    database_options: DatabaseOptions,
}

impl Database {
    pub fn new(database_options: DatabaseOptions) -> Self {
        let storage = database_options.storage_engine.get_engine();

        Self {
            person_table: PersonTable::new(),
            transaction_wal: TransactionWAL::new(storage, database_options.write_mode.clone()),
            database_options,
        }
    }

    /// Restores the database from the transaction log, then hands the database over to its own thread.
    /// The returned request manager is the only way to talk to the database from then on.
    pub fn run(mut self) -> Result<RequestManager, DatabaseError> {
        self.transaction_wal.init().map_err(DatabaseError::Init)?;

        if self.database_options.restore {
            self.restore()?;
        }

        let (database_sender, database_receiver) = flume::unbounded::<DatabaseCommandRequest>();

        let request_timeout = self.database_options.request_timeout;

        thread::Builder::new()
            .name("Database".to_string())
            .spawn(move || self.process_commands(database_receiver))
            .map_err(DatabaseError::Spawn)?;

        Ok(RequestManager::new(database_sender, request_timeout))
    }

    fn restore(&mut self) -> Result<usize, DatabaseError> {
        log::info!(
            "Transaction Log Location: [{}]",
            self.database_options.storage_engine.describe()
        );

        let now = Instant::now();

        let restored_transactions = self.transaction_wal.restore()?;
        let restored_transaction_count = restored_transactions.len();

        for transaction in restored_transactions {
            self.person_table
                .apply(transaction.statement)
                .map_err(|source| DatabaseError::Replay {
                    transaction_id: transaction.id.clone(),
                    source,
                })?;

            self.transaction_wal
                .set_current_transaction_id(transaction.id);
        }

        log::info!(
            "✅ Successful Restore [Duration: {}ms]",
            now.elapsed().as_millis(),
        );

        log::info!(
            "📀 Data               [Rows: {}, TransactionsApplied: {}, CurrentTxId: {}]",
            self.person_table.len().to_formatted_string(&Locale::en),
            restored_transaction_count.to_formatted_string(&Locale::en),
            self.transaction_wal
                .get_current_transaction_id()
                .to_number()
                .to_formatted_string(&Locale::en)
        );

        Ok(restored_transaction_count)
    }

    /// Process incoming requests from the channel, one at a time, in arrival order
    fn process_commands(mut self, database_receiver: flume::Receiver<DatabaseCommandRequest>) {
        while let Ok(DatabaseCommandRequest { resolver, command }) = database_receiver.recv() {
            log::debug!("Received request: {}", command.log_format());

            match command {
                DatabaseCommand::Statement(statement) => {
                    let response = self.process_statement(statement);

                    // The caller may have timed out and dropped its receiver
                    let _ = resolver.send(response);
                }
                DatabaseCommand::Control(Control::Shutdown) => {
                    let _ = resolver.send(DatabaseCommandResponse::ControlSuccess(
                        "Successfully shutdown database".to_string(),
                    ));

                    break;
                }
            }
        }

        log::info!("Database thread stopped");
    }

    pub fn process_statement(&mut self, statement: Statement) -> DatabaseCommandResponse {
        if let Err(err) = self.person_table.verify(&statement) {
            log::info!("⚠️  Rolled back: {}", err);

            return DatabaseCommandResponse::Rejected(err);
        }

        if statement.is_mutation() {
            match self.transaction_wal.commit(&statement) {
                Ok(transaction_id) => log::info!("✅ Committed: [TX: {}]", transaction_id),
                Err(err) => {
                    log::error!("Unable to commit transaction: {}", err);

                    return DatabaseCommandResponse::CommitFailed(err.to_string());
                }
            }
        }

        match self.person_table.apply(statement) {
            Ok(statement_result) => DatabaseCommandResponse::Applied(statement_result),
            Err(err) => DatabaseCommandResponse::Rejected(err),
        }
    }
}
