use std::time::Duration;

use thiserror::Error;

use crate::{
    consts::consts::EntityId,
    model::{
        person::{Person, PersonData},
        statement::{Statement, StatementResult},
    },
};

use super::{
    commands::{Control, DatabaseCommand, DatabaseCommandRequest, DatabaseCommandResponse},
    table::{row::UpdatePersonData, table::ApplyErrors},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestManagerError {
    #[error("Database took too long to respond to request")]
    DatabaseTimeout,
    #[error("Database is not running")]
    DatabaseUnavailable,
    #[error("{0}")]
    Rejected(ApplyErrors),
    #[error("Unable to commit transaction: {0}")]
    CommitFailed(String),
    #[error("Unexpected response from database: {0}")]
    UnexpectedResponse(String),
}

/// Goal of the request manager is to provide a simple interface for interacting with the database
///
/// The request manager provides the following APIs, sorted by the easiest to use to the most complex
/// 1. CRUD operations on a single person -- these are completely type safe
/// 2. Statement based API -- not type safe because you need to know which StatementResult a Statement maps to
///
/// Request managers are cheap to clone, every clone talks to the same database thread.
#[derive(Clone)]
pub struct RequestManager {
    database_sender: flume::Sender<DatabaseCommandRequest>,
    request_timeout: Duration,
}

impl RequestManager {
    pub fn new(
        database_sender: flume::Sender<DatabaseCommandRequest>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            database_sender,
            request_timeout,
        }
    }

    /// Stores a new person, the id is generated here so the database never has to
    pub async fn send_add(&self, person_data: PersonData) -> Result<Person, RequestManagerError> {
        match self
            .send_statement(Statement::Add(Person::new(person_data)))
            .await?
        {
            StatementResult::Single(person) => Ok(person),
            other => Err(unexpected(other)),
        }
    }

    pub async fn send_update(
        &self,
        id: EntityId,
        person_update: UpdatePersonData,
    ) -> Result<Option<Person>, RequestManagerError> {
        match self
            .send_statement(Statement::Update(id, person_update))
            .await?
        {
            StatementResult::Optional(person) => Ok(person),
            other => Err(unexpected(other)),
        }
    }

    pub async fn send_remove(&self, id: EntityId) -> Result<Option<Person>, RequestManagerError> {
        match self.send_statement(Statement::Remove(id)).await? {
            StatementResult::Optional(person) => Ok(person),
            other => Err(unexpected(other)),
        }
    }

    pub async fn send_list(&self) -> Result<Vec<Person>, RequestManagerError> {
        match self.send_statement(Statement::List).await? {
            StatementResult::List(people) => Ok(people),
            other => Err(unexpected(other)),
        }
    }

    /// Sends a shutdown request to the database and returns the database's response
    pub async fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        match self
            .send_command(DatabaseCommand::Control(Control::Shutdown))
            .await?
        {
            DatabaseCommandResponse::ControlSuccess(message) => Ok(message),
            other => Err(RequestManagerError::UnexpectedResponse(format!(
                "{:?}",
                other
            ))),
        }
    }

    /// Sends a single statement to the database and returns a single statement result
    pub async fn send_statement(
        &self,
        statement: Statement,
    ) -> Result<StatementResult, RequestManagerError> {
        match self
            .send_command(DatabaseCommand::Statement(statement))
            .await?
        {
            DatabaseCommandResponse::Applied(statement_result) => Ok(statement_result),
            DatabaseCommandResponse::Rejected(err) => Err(RequestManagerError::Rejected(err)),
            DatabaseCommandResponse::CommitFailed(message) => {
                Err(RequestManagerError::CommitFailed(message))
            }
            DatabaseCommandResponse::ControlSuccess(message) => {
                Err(RequestManagerError::UnexpectedResponse(message))
            }
        }
    }

    async fn send_command(
        &self,
        command: DatabaseCommand,
    ) -> Result<DatabaseCommandResponse, RequestManagerError> {
        let (resolver, response_receiver) = oneshot::channel::<DatabaseCommandResponse>();

        let request = DatabaseCommandRequest { resolver, command };

        // Sends the request to the database thread, the database will respond
        //  on the response_receiver once it's finished processing the request
        self.database_sender
            .send_async(request)
            .await
            .map_err(|_| RequestManagerError::DatabaseUnavailable)?;

        match tokio::time::timeout(self.request_timeout, response_receiver).await {
            Ok(Ok(response)) => Ok(response),
            // Resolver was dropped without an answer, the database thread has exited
            Ok(Err(oneshot::RecvError)) => Err(RequestManagerError::DatabaseUnavailable),
            Err(_) => Err(RequestManagerError::DatabaseTimeout),
        }
    }
}

fn unexpected(statement_result: StatementResult) -> RequestManagerError {
    RequestManagerError::UnexpectedResponse(format!("{:?}", statement_result))
}
