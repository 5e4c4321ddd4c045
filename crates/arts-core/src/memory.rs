//! # In-Memory Store
//!
//! A `DocumentCollection` backed by a vector of documents. Supports the
//! subset of document-store semantics the API relies on: exact-match
//! filters, `$set`, `$push` and upsert. Used by tests and local runs
//! without a database.

use crate::error::{ArtsError, ArtsResult};
use crate::store::{
    BoxedCollection, Collections, DeleteAck, DocumentCollection, InsertAck, UpdateAck, CARTS,
    CLASSES, USERS,
};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One in-memory collection
pub struct MemoryCollection {
    name: String,
    docs: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    fn error(&self, message: impl ToString) -> ArtsError {
        ArtsError::store(self.name.clone(), message)
    }

    /// Apply an update document in place; returns whether anything changed
    fn apply_update(&self, target: &mut Document, update: &Document) -> ArtsResult<bool> {
        let mut modified = false;

        for (op, operand) in update {
            let fields = operand
                .as_document()
                .ok_or_else(|| self.error(format!("operand of {} must be a document", op)))?;

            match op.as_str() {
                "$set" => {
                    for (key, value) in fields {
                        if target.get(key) != Some(value) {
                            target.insert(key.clone(), value.clone());
                            modified = true;
                        }
                    }
                }
                "$push" => {
                    for (key, value) in fields {
                        match target.get_mut(key) {
                            Some(Bson::Array(items)) => items.push(value.clone()),
                            Some(_) => {
                                return Err(self.error(format!(
                                    "The field '{}' must be an array",
                                    key
                                )))
                            }
                            None => {
                                target.insert(key.clone(), Bson::Array(vec![value.clone()]));
                            }
                        }
                        modified = true;
                    }
                }
                other => return Err(self.error(format!("Unsupported update operator: {}", other))),
            }
        }

        Ok(modified)
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

/// Prepend a fresh `_id` unless the document already carries one
fn with_id(doc: Document) -> (Bson, Document) {
    if let Some(id) = doc.get("_id") {
        return (id.clone(), doc);
    }
    let id = Bson::ObjectId(ObjectId::new());
    let mut out = doc! { "_id": id.clone() };
    for (key, value) in doc {
        out.insert(key, value);
    }
    (id, out)
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, filter: Document) -> ArtsResult<Vec<Document>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
    }

    async fn find_one(&self, filter: Document) -> ArtsResult<Option<Document>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| matches(d, &filter)).cloned())
    }

    async fn insert_one(&self, doc: Document) -> ArtsResult<InsertAck> {
        let (id, doc) = with_id(doc);
        let mut docs = self.docs.write().await;
        if docs.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(self.error(format!("duplicate key _id: {}", id)));
        }
        docs.push(doc);
        Ok(InsertAck::new(id))
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> ArtsResult<UpdateAck> {
        let mut docs = self.docs.write().await;

        if let Some(existing) = docs.iter_mut().find(|d| matches(d, &filter)) {
            let modified = self.apply_update(existing, &update)?;
            return Ok(UpdateAck::new(1, u64::from(modified), None));
        }

        if !upsert {
            return Ok(UpdateAck::new(0, 0, None));
        }

        // Equality fields from the filter seed the inserted document
        let mut seeded = filter.clone();
        self.apply_update(&mut seeded, &update)?;
        let (id, seeded) = with_id(seeded);
        docs.push(seeded);
        Ok(UpdateAck::new(0, 0, Some(id)))
    }

    async fn delete_one(&self, filter: Document) -> ArtsResult<DeleteAck> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(DeleteAck::new(1))
            }
            None => Ok(DeleteAck::new(0)),
        }
    }
}

/// Fresh, empty users/classes/carts collections
pub fn in_memory_collections() -> Collections {
    Collections::new(
        Arc::new(MemoryCollection::new(USERS)) as BoxedCollection,
        Arc::new(MemoryCollection::new(CLASSES)) as BoxedCollection,
        Arc::new(MemoryCollection::new(CARTS)) as BoxedCollection,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_id_and_find_matches() {
        let carts = MemoryCollection::new(CARTS);
        let ack = carts
            .insert_one(doc! { "uid": "u1", "price": 40 })
            .await
            .unwrap();
        assert!(ack.acknowledged);
        assert!(ack.inserted_id.is_string());

        carts.insert_one(doc! { "uid": "u2", "price": 10 }).await.unwrap();

        let found = carts.find(doc! { "uid": "u1" }).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].get_object_id("_id").is_ok());
        assert_eq!(carts.find(Document::new()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_set_and_upsert() {
        let classes = MemoryCollection::new(CLASSES);
        let id = ObjectId::new();

        let ack = classes
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": "pending" } }, false)
            .await
            .unwrap();
        assert_eq!(ack.matched_count, 0);
        assert!(classes.is_empty().await);

        let ack = classes
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": "pending" } }, true)
            .await
            .unwrap();
        assert_eq!(ack.upserted_count, 1);
        assert_eq!(ack.upserted_id, Some(serde_json::json!(id.to_hex())));

        let ack = classes
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": "approved" } }, true)
            .await
            .unwrap();
        assert_eq!((ack.matched_count, ack.modified_count), (1, 1));

        let ack = classes
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": "approved" } }, true)
            .await
            .unwrap();
        assert_eq!((ack.matched_count, ack.modified_count), (1, 0));

        let stored = classes.find_one(doc! { "_id": id }).await.unwrap().unwrap();
        assert_eq!(stored.get_str("status").unwrap(), "approved");
        assert_eq!(classes.len().await, 1);
    }

    #[tokio::test]
    async fn test_push_appends_in_order() {
        let users = MemoryCollection::new(USERS);
        users.insert_one(doc! { "uid": "u1" }).await.unwrap();

        for course in ["Sketching", "Pottery", "Oil Painting"] {
            users
                .update_one(
                    doc! { "uid": "u1" },
                    doc! { "$push": { "number_of_courses": { "name": course } } },
                    false,
                )
                .await
                .unwrap();
        }

        let user = users.find_one(doc! { "uid": "u1" }).await.unwrap().unwrap();
        let courses = user.get_array("number_of_courses").unwrap();
        assert_eq!(courses.len(), 3);
        assert_eq!(
            courses[2].as_document().unwrap().get_str("name").unwrap(),
            "Oil Painting"
        );
    }

    #[tokio::test]
    async fn test_push_onto_scalar_fails() {
        let users = MemoryCollection::new(USERS);
        users
            .insert_one(doc! { "uid": "u1", "number_of_courses": 3 })
            .await
            .unwrap();
        let result = users
            .update_one(
                doc! { "uid": "u1" },
                doc! { "$push": { "number_of_courses": "x" } },
                false,
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_one() {
        let carts = MemoryCollection::new(CARTS);
        carts.insert_one(doc! { "uid": "u1" }).await.unwrap();
        let item = carts.find_one(doc! { "uid": "u1" }).await.unwrap().unwrap();
        let id = item.get_object_id("_id").unwrap();

        assert_eq!(carts.delete_one(doc! { "_id": id }).await.unwrap().deleted_count, 1);
        assert_eq!(carts.delete_one(doc! { "_id": id }).await.unwrap().deleted_count, 0);
        assert!(carts.find_one(doc! { "_id": id }).await.unwrap().is_none());
    }
}
