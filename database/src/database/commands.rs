use crate::model::statement::{Statement, StatementResult};

use super::table::table::ApplyErrors;

/// Database commands are how we interact with the database, they are how we ask the database to run a statement, shutdown, etc
///
/// The majority of interactions happen via statements (e.g. add, update, remove, etc), but there are also commands that are used
/// to control the database (e.g. shutdown).
#[derive(Debug)]
pub enum DatabaseCommand {
    /// Sends a single statement to the database and returns its result
    Statement(Statement),

    /// Commands that control the database
    Control(Control),
}

impl DatabaseCommand {
    /// Prints complex logs in a more readable format
    pub fn log_format(&self) -> String {
        match self {
            DatabaseCommand::Statement(Statement::List) => "List".to_string(),
            DatabaseCommand::Statement(statement) => format!("{:?}", statement),
            DatabaseCommand::Control(control) => format!("Control({:?})", control),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Control {
    /// Requests before the shutdown are committed, the database thread exits afterwards
    Shutdown,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseCommandResponse {
    /// Statement was applied, mutations have been written to the transaction log
    Applied(StatementResult),
    /// Statement broke a table constraint, nothing was written
    Rejected(ApplyErrors),
    /// Transaction log could not be written, the statement was not applied
    CommitFailed(String),
    /// Successfully performed the control
    ControlSuccess(String),
}

pub struct DatabaseCommandRequest {
    pub resolver: oneshot::Sender<DatabaseCommandResponse>,
    pub command: DatabaseCommand,
}
