//! # Document Store Trait
//!
//! The handle surface the HTTP layer talks to. A backend exposes three named
//! collections; callers build filter and update documents themselves.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                DocumentCollection (trait)                   │
//! │  ├── find() / find_one()                                    │
//! │  ├── insert_one()                                           │
//! │  ├── update_one()                                           │
//! │  └── delete_one()                                           │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │                   │
//!          ┌───────┴───────┐   ┌───────┴───────┐
//!          │MongoCollection│   │MemoryCollection│
//!          │  (arts-mongo) │   │   (tests)      │
//!          └───────────────┘   └────────────────┘
//! ```

use crate::document::bson_to_json;
use crate::error::ArtsResult;
use async_trait::async_trait;
use bson::{Bson, Document};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Collection holding user profiles
pub const USERS: &str = "users";
/// Collection holding class listings
pub const CLASSES: &str = "classes";
/// Collection holding cart items
pub const CARTS: &str = "carts";

/// One named collection of schema-free documents.
///
/// Filters are exact-match equality documents. Updates use the `$set` and
/// `$push` operators.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Collection name (for logging and error context)
    fn name(&self) -> &str;

    /// All documents matching `filter`, in store order
    async fn find(&self, filter: Document) -> ArtsResult<Vec<Document>>;

    /// First document matching `filter`
    async fn find_one(&self, filter: Document) -> ArtsResult<Option<Document>>;

    /// Insert a document; the store assigns `_id` when absent
    async fn insert_one(&self, doc: Document) -> ArtsResult<InsertAck>;

    /// Apply `update` to the first match, optionally inserting when nothing matches
    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> ArtsResult<UpdateAck>;

    /// Delete the first match
    async fn delete_one(&self, filter: Document) -> ArtsResult<DeleteAck>;
}

/// Type alias for a shared collection handle (dynamic dispatch)
pub type BoxedCollection = Arc<dyn DocumentCollection>;

/// The three collections the API serves
#[derive(Clone)]
pub struct Collections {
    pub users: BoxedCollection,
    pub classes: BoxedCollection,
    pub carts: BoxedCollection,
}

impl Collections {
    pub fn new(users: BoxedCollection, classes: BoxedCollection, carts: BoxedCollection) -> Self {
        Self {
            users,
            classes,
            carts,
        }
    }
}

/// Acknowledgement of an insert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Value,
}

impl InsertAck {
    pub fn new(inserted_id: Bson) -> Self {
        Self {
            acknowledged: true,
            inserted_id: bson_to_json(inserted_id),
        }
    }
}

/// Acknowledgement of an update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Value>,
}

impl UpdateAck {
    pub fn new(matched_count: u64, modified_count: u64, upserted_id: Option<Bson>) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id: upserted_id.map(bson_to_json),
        }
    }
}

/// Acknowledgement of a delete
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}
