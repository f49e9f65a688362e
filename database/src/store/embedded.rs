use async_trait::async_trait;

use crate::{
    consts::consts::{EntityId, EntityIdParseError},
    database::{
        database::Database, options::DatabaseOptions, request_manager::RequestManager,
        table::row::UpdatePersonData,
    },
    model::person::{Person, PersonData},
};

use super::{PeopleStore, StoreError, StoreResult};

/// People store backed by the in-process database thread
pub struct EmbeddedPeopleStore {
    request_manager: RequestManager,
}

impl EmbeddedPeopleStore {
    /// Restores the database (when enabled) and starts its thread
    pub fn start(options: DatabaseOptions) -> StoreResult<Self> {
        let request_manager = Database::new(options).run()?;

        Ok(Self { request_manager })
    }
}

fn parse_id(id: &str) -> StoreResult<EntityId> {
    id.parse()
        .map_err(|EntityIdParseError(value)| StoreError::InvalidId {
            kind: "UUID",
            path: "id",
            value,
        })
}

#[async_trait]
impl PeopleStore for EmbeddedPeopleStore {
    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<Person>> {
        Ok(self.request_manager.send_list().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, person_data: PersonData) -> StoreResult<Person> {
        Ok(self.request_manager.send_add(person_data).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id_and_update(
        &self,
        id: &str,
        update: UpdatePersonData,
    ) -> StoreResult<Option<Person>> {
        let id = parse_id(id)?;

        Ok(self.request_manager.send_update(id, update).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id_and_delete(&self, id: &str) -> StoreResult<Option<Person>> {
        let id = parse_id(id)?;

        Ok(self.request_manager.send_remove(id).await?)
    }

    async fn shutdown(&self) -> StoreResult<String> {
        Ok(self.request_manager.send_shutdown_request().await?)
    }
}
