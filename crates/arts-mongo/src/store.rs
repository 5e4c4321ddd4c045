//! # MongoDB Store
//!
//! One long-lived client, opened and pinged once at startup and held for
//! the life of the process. The driver pools connections internally, so
//! the collection handles are shared freely across requests.

use crate::config::MongoConfig;
use arts_core::{
    ArtsError, ArtsResult, BoxedCollection, Collections, DeleteAck, DocumentCollection,
    InsertAck, UpdateAck, CARTS, CLASSES, USERS,
};
use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Connected document store
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Open the client with the Stable API v1 settings
    #[instrument(skip(config), fields(database = %config.database))]
    pub async fn connect(config: &MongoConfig) -> ArtsResult<Self> {
        let mut options = ClientOptions::parse(config.uri())
            .await
            .map_err(|e| ArtsError::Configuration(format!("Invalid store URI: {}", e)))?;

        options.app_name = Some("fine-arts".to_string());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(options)
            .map_err(|e| ArtsError::Configuration(format!("Failed to create store client: {}", e)))?;
        let database = client.database(&config.database);

        Ok(Self { client, database })
    }

    /// Connect from environment and confirm the deployment answers
    pub async fn from_env() -> ArtsResult<Self> {
        let config = MongoConfig::from_env()?;
        let store = Self::connect(&config).await?;
        store.ping().await?;
        Ok(store)
    }

    /// One-time reachability check against the admin database
    pub async fn ping(&self) -> ArtsResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ArtsError::store("admin", e))?;
        info!("Pinged your deployment. Connected to the document store");
        Ok(())
    }

    /// Handles for the users, classes and carts collections
    pub fn collections(&self) -> Collections {
        Collections::new(
            Arc::new(MongoCollection::new(&self.database, USERS)) as BoxedCollection,
            Arc::new(MongoCollection::new(&self.database, CLASSES)) as BoxedCollection,
            Arc::new(MongoCollection::new(&self.database, CARTS)) as BoxedCollection,
        )
    }
}

/// `DocumentCollection` over a driver collection handle
pub struct MongoCollection {
    inner: Collection<Document>,
}

impl MongoCollection {
    pub fn new(database: &Database, name: &str) -> Self {
        Self {
            inner: database.collection::<Document>(name),
        }
    }

    fn error(&self, err: mongodb::error::Error) -> ArtsError {
        ArtsError::store(self.inner.name(), err)
    }
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find(&self, filter: Document) -> ArtsResult<Vec<Document>> {
        debug!(collection = self.name(), ?filter, "find");
        let cursor = self.inner.find(filter).await.map_err(|e| self.error(e))?;
        cursor.try_collect().await.map_err(|e| self.error(e))
    }

    async fn find_one(&self, filter: Document) -> ArtsResult<Option<Document>> {
        debug!(collection = self.name(), ?filter, "find_one");
        self.inner.find_one(filter).await.map_err(|e| self.error(e))
    }

    async fn insert_one(&self, doc: Document) -> ArtsResult<InsertAck> {
        let result = self.inner.insert_one(doc).await.map_err(|e| self.error(e))?;
        Ok(InsertAck::new(result.inserted_id))
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> ArtsResult<UpdateAck> {
        debug!(collection = self.name(), ?filter, ?update, upsert, "update_one");
        let result = self
            .inner
            .update_one(filter, update)
            .upsert(upsert)
            .await
            .map_err(|e| self.error(e))?;
        Ok(UpdateAck::new(
            result.matched_count,
            result.modified_count,
            result.upserted_id,
        ))
    }

    async fn delete_one(&self, filter: Document) -> ArtsResult<DeleteAck> {
        debug!(collection = self.name(), ?filter, "delete_one");
        let result = self.inner.delete_one(filter).await.map_err(|e| self.error(e))?;
        Ok(DeleteAck::new(result.deleted_count))
    }
}
