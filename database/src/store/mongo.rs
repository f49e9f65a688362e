use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client, Collection,
};
use serde_json::Value;

use crate::{
    consts::consts::{EntityId, DEFAULT_MONGO_DATABASE, PEOPLE_COLLECTION},
    database::table::row::{UpdatePersonData, UpdateStatement},
    model::person::{Person, PersonData},
};

use super::{PeopleStore, StoreError, StoreResult};

/// Key Mongoose adds to every document it creates, not part of a person
const VERSION_KEY: &str = "__v";

/// People store backed by the `peoples` collection of a MongoDB database
pub struct MongoPeopleStore {
    collection: Collection<Document>,
}

impl MongoPeopleStore {
    /// Connects and pings the server, so a bad connection string fails at startup rather than on
    /// the first request
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(database_url).await?;

        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_MONGO_DATABASE));

        database.run_command(doc! { "ping": 1 }, None).await?;

        log::info!("You are connected to MongoDB [Database: {}]", database.name());

        Ok(Self {
            collection: database.collection::<Document>(PEOPLE_COLLECTION),
        })
    }
}

fn object_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId {
        kind: "ObjectId",
        path: "_id",
        value: id.to_string(),
    })
}

fn id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

pub(crate) fn person_data_to_document(person_data: &PersonData) -> StoreResult<Document> {
    mongodb::bson::to_document(person_data).map_err(|e| StoreError::Encode(e.to_string()))
}

pub(crate) fn document_to_person(mut document: Document) -> StoreResult<Person> {
    let id = document
        .remove("_id")
        .map(id_to_string)
        .ok_or_else(|| StoreError::Decode("document has no _id".to_string()))?;

    document.remove(VERSION_KEY);

    let fields = match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(fields) => fields,
        other => {
            return Err(StoreError::Decode(format!(
                "expected a document, got: {}",
                other
            )))
        }
    };

    Ok(Person {
        id: EntityId(id),
        data: PersonData::from_fields(fields)?,
    })
}

/// `$set` / `$unset` modifications for an update, `None` when there is nothing to change
pub(crate) fn update_to_document(update: &UpdatePersonData) -> StoreResult<Option<Document>> {
    let mut set = Document::new();
    let mut unset = Document::new();

    for (path, statement) in [
        ("name", &update.name),
        ("image", &update.image),
        ("title", &update.title),
    ] {
        match statement {
            UpdateStatement::Set(value) => {
                set.insert(path, value.clone());
            }
            UpdateStatement::Unset => {
                unset.insert(path, "");
            }
            UpdateStatement::NoChanges => {}
        }
    }

    for (key, value) in &update.extra {
        let value = mongodb::bson::to_bson(value).map_err(|e| StoreError::Encode(e.to_string()))?;

        set.insert(key.clone(), value);
    }

    let mut modifications = Document::new();

    if !set.is_empty() {
        modifications.insert("$set", set);
    }

    if !unset.is_empty() {
        modifications.insert("$unset", unset);
    }

    if modifications.is_empty() {
        return Ok(None);
    }

    Ok(Some(modifications))
}

#[async_trait]
impl PeopleStore for MongoPeopleStore {
    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<Person>> {
        let documents: Vec<Document> = self
            .collection
            .find(doc! {}, None)
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(document_to_person).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, person_data: PersonData) -> StoreResult<Person> {
        let document = person_data_to_document(&person_data)?;

        let inserted = self.collection.insert_one(document, None).await?;

        Ok(Person {
            id: EntityId(id_to_string(inserted.inserted_id)),
            data: person_data,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id_and_update(
        &self,
        id: &str,
        update: UpdatePersonData,
    ) -> StoreResult<Option<Person>> {
        let filter = doc! { "_id": object_id(id)? };

        let document = match update_to_document(&update)? {
            Some(modifications) => {
                let options = FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build();

                self.collection
                    .find_one_and_update(filter, modifications, options)
                    .await?
            }
            // MongoDB refuses an empty update, an update without changes is a lookup
            None => self.collection.find_one(filter, None).await?,
        };

        document.map(document_to_person).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id_and_delete(&self, id: &str) -> StoreResult<Option<Person>> {
        let filter = doc! { "_id": object_id(id)? };

        let document = self.collection.find_one_and_delete(filter, None).await?;

        document.map(document_to_person).transpose()
    }

    async fn shutdown(&self) -> StoreResult<String> {
        // The driver's connection pool is reclaimed when the process exits
        Ok("MongoDB connection left to close at process exit".to_string())
    }
}
