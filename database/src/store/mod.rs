use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::{
    database::{
        database::DatabaseError, options::DatabaseOptions, request_manager::RequestManagerError,
        table::row::UpdatePersonData,
    },
    model::person::{Person, PersonData, PersonFieldError},
    persistence::storage::StorageEngine,
};

use self::{embedded::EmbeddedPeopleStore, mongo::MongoPeopleStore};

pub mod embedded;
pub mod mongo;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cast to {kind} failed for value \"{value}\" at path \"{path}\"")]
    InvalidId {
        kind: &'static str,
        path: &'static str,
        value: String,
    },

    #[error(transparent)]
    Field(#[from] PersonFieldError),

    #[error(transparent)]
    Database(#[from] RequestManagerError),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("Unable to encode document: {0}")]
    Encode(String),

    #[error("Unable to decode document: {0}")]
    Decode(String),

    #[error("Unable to start embedded database: {0}")]
    Startup(#[from] DatabaseError),

    #[error("Unsupported database url, expected mongodb://, mongodb+srv://, file:// or memory://, got: {0}")]
    UnsupportedUrl(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// JSON shape of a store error as clients see it. It carries the store's own message,
/// nothing is sanitized.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub name: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl StoreError {
    pub fn name(&self) -> &'static str {
        match self {
            StoreError::InvalidId { .. } | StoreError::Field(_) => "CastError",
            StoreError::Database(RequestManagerError::Rejected(_)) => "ConflictError",
            StoreError::Database(RequestManagerError::DatabaseTimeout) => "TimeoutError",
            StoreError::Mongo(_) => "MongoError",
            StoreError::Database(_)
            | StoreError::Encode(_)
            | StoreError::Decode(_)
            | StoreError::Startup(_)
            | StoreError::UnsupportedUrl(_) => "DatabaseError",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            name: self.name(),
            message: self.to_string(),
            kind: None,
            path: None,
            value: None,
        };

        match self {
            StoreError::InvalidId { kind, path, value } => {
                body.kind = Some(kind.to_string());
                body.path = Some(path.to_string());
                body.value = Some(Value::String(value.clone()));
            }
            StoreError::Field(field_error) => {
                body.kind = Some("string".to_string());
                body.path = Some(field_error.path().to_string());
                body.value = Some(field_error.value().clone());
            }
            _ => {}
        }

        body
    }
}

impl Serialize for StoreError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_body().serialize(serializer)
    }
}

/// The document store the people service reads and writes. Every method is exactly one
/// store operation, none of them retries.
#[async_trait]
pub trait PeopleStore: Send + Sync {
    /// Every person, in insertion order
    async fn find_all(&self) -> StoreResult<Vec<Person>>;

    /// Stores a new person, the store assigns the id
    async fn insert(&self, person_data: PersonData) -> StoreResult<Person>;

    /// Returns the person after the update, `None` when no person has this id
    async fn find_by_id_and_update(
        &self,
        id: &str,
        update: UpdatePersonData,
    ) -> StoreResult<Option<Person>>;

    /// Returns the person as it was before removal, `None` when no person has this id
    async fn find_by_id_and_delete(&self, id: &str) -> StoreResult<Option<Person>>;

    /// Releases the store once nothing will use it anymore
    async fn shutdown(&self) -> StoreResult<String>;
}

/// Picks the store from the connection string's scheme. `options` only apply to the embedded
/// database.
pub async fn connect(
    database_url: &str,
    options: DatabaseOptions,
) -> StoreResult<Arc<dyn PeopleStore>> {
    let (scheme, location) = database_url
        .split_once("://")
        .ok_or_else(|| StoreError::UnsupportedUrl(database_url.to_string()))?;

    match scheme {
        "mongodb" | "mongodb+srv" => {
            log::info!("Using MongoDB people store");

            Ok(Arc::new(MongoPeopleStore::connect(database_url).await?))
        }
        "file" => {
            log::info!("Using embedded people store [Directory: {}]", location);

            let options = options.set_storage_engine(StorageEngine::File(PathBuf::from(location)));

            Ok(Arc::new(EmbeddedPeopleStore::start(options)?))
        }
        "memory" => {
            log::info!("Using in memory people store, data is lost on shutdown");

            let options = options
                .set_storage_engine(StorageEngine::InMemory)
                .set_restore(false);

            Ok(Arc::new(EmbeddedPeopleStore::start(options)?))
        }
        _ => Err(StoreError::UnsupportedUrl(database_url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::database::table::table::ApplyErrors;
    use crate::consts::consts::EntityId;

    mod connect {
        use super::*;

        #[tokio::test]
        async fn memory_url_starts_an_embedded_store() {
            let store = connect("memory://", DatabaseOptions::default())
                .await
                .expect("should start");

            assert_eq!(store.find_all().await.unwrap(), vec![]);
        }

        #[tokio::test]
        async fn unknown_scheme_is_rejected() {
            let result = connect("postgres://localhost/people", DatabaseOptions::default()).await;

            assert!(matches!(result, Err(StoreError::UnsupportedUrl(_))));
        }

        #[tokio::test]
        async fn url_without_scheme_is_rejected() {
            let result = connect("data", DatabaseOptions::default()).await;

            assert!(matches!(result, Err(StoreError::UnsupportedUrl(_))));
        }
    }

    mod error_body {
        use super::*;

        #[test]
        fn invalid_id_is_a_cast_error() {
            let error = StoreError::InvalidId {
                kind: "ObjectId",
                path: "_id",
                value: "abc".to_string(),
            };

            assert_eq!(
                serde_json::to_value(&error).unwrap(),
                json!({
                    "name": "CastError",
                    "message": "Cast to ObjectId failed for value \"abc\" at path \"_id\"",
                    "kind": "ObjectId",
                    "path": "_id",
                    "value": "abc"
                })
            );
        }

        #[test]
        fn field_error_names_the_field() {
            let error = StoreError::from(PersonFieldError::NotAString {
                path: "name".to_string(),
                value: json!(42),
            });

            let body = error.to_body();

            assert_eq!(body.name, "CastError");
            assert_eq!(body.path.as_deref(), Some("name"));
            assert_eq!(body.value, Some(json!(42)));
        }

        #[test]
        fn database_errors_only_carry_a_message() {
            let error = StoreError::from(RequestManagerError::Rejected(
                ApplyErrors::CannotCreateWhenAlreadyExists(EntityId("1".to_string())),
            ));

            assert_eq!(
                serde_json::to_value(&error).unwrap(),
                json!({
                    "name": "ConflictError",
                    "message": "Cannot create, record already exists: 1"
                })
            );
        }

        #[test]
        fn timeouts_are_named() {
            let error = StoreError::from(RequestManagerError::DatabaseTimeout);

            assert_eq!(error.name(), "TimeoutError");
        }
    }
}
