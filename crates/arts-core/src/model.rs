//! # Queries and Updates
//!
//! Filter and update documents for the users, classes and carts collections.
//! Documents themselves stay schema-free; only the fields the API writes
//! are typed here.

use crate::document::{bson_as_f64, is_truthy, json_to_bson, parse_object_id};
use crate::error::{ArtsError, ArtsResult};
use bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Filter on the owner's external identity
pub fn by_uid(uid: &str) -> Document {
    doc! { "uid": uid }
}

/// Filter on the store-assigned id
pub fn by_id(id: &str) -> ArtsResult<Document> {
    Ok(doc! { "_id": parse_object_id(id)? })
}

/// Replacement values for a class listing.
///
/// Exactly these six fields are written, each stored as sent. A field
/// missing from the request is written as `null`; every other field on the
/// document is left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassDetails {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub total_seats: Option<Value>,
    #[serde(default)]
    pub available_seats: Option<Value>,
    #[serde(default)]
    pub number_of_classes: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
}

impl ClassDetails {
    const FIELDS: [&'static str; 6] = [
        "name",
        "image",
        "total_seats",
        "available_seats",
        "number_of_classes",
        "price",
    ];

    fn values(&self) -> [&Option<Value>; 6] {
        [
            &self.name,
            &self.image,
            &self.total_seats,
            &self.available_seats,
            &self.number_of_classes,
            &self.price,
        ]
    }

    /// `$set` update for the six listing fields
    pub fn to_update(&self) -> ArtsResult<Document> {
        let mut set = Document::new();
        for (field, value) in Self::FIELDS.iter().zip(self.values()) {
            let value = match value {
                Some(v) => json_to_bson(v)?,
                None => Bson::Null,
            };
            set.insert(*field, value);
        }
        Ok(doc! { "$set": set })
    }
}

/// Moderation change to a class: approval state or reviewer feedback, never both
#[derive(Debug, Clone, PartialEq)]
pub enum ClassPatch {
    Status(Value),
    Feedback(Value),
}

impl ClassPatch {
    pub fn from_body(body: &Value) -> ArtsResult<Self> {
        let status = body.get("status").filter(|v| is_truthy(Some(*v)));
        let feedback = body.get("feedback").filter(|v| is_truthy(Some(*v)));

        match (status, feedback) {
            (Some(status), None) => Ok(ClassPatch::Status(status.clone())),
            (None, Some(feedback)) => Ok(ClassPatch::Feedback(feedback.clone())),
            (Some(_), Some(_)) => Err(ArtsError::InvalidRequest(
                "Provide either 'status' or 'feedback', not both".to_string(),
            )),
            (None, None) => Err(ArtsError::InvalidRequest(
                "Nothing to update: expected 'status' or 'feedback'".to_string(),
            )),
        }
    }

    /// Name of the field this patch writes
    pub fn field(&self) -> &'static str {
        match self {
            ClassPatch::Status(_) => "status",
            ClassPatch::Feedback(_) => "feedback",
        }
    }

    pub fn to_update(&self) -> ArtsResult<Document> {
        let value = match self {
            ClassPatch::Status(v) | ClassPatch::Feedback(v) => json_to_bson(v)?,
        };
        let mut set = Document::new();
        set.insert(self.field(), value);
        Ok(doc! { "$set": set })
    }
}

/// Administrative change to a user's account classification
#[derive(Debug, Clone, PartialEq)]
pub struct AccountTypePatch(pub Value);

impl AccountTypePatch {
    pub fn from_body(body: &Value) -> ArtsResult<Self> {
        body.get("account_type")
            .filter(|v| is_truthy(Some(*v)))
            .map(|v| AccountTypePatch(v.clone()))
            .ok_or_else(|| {
                ArtsError::InvalidRequest("Nothing to update: expected 'account_type'".to_string())
            })
    }

    pub fn to_update(&self) -> ArtsResult<Document> {
        Ok(doc! { "$set": { "account_type": json_to_bson(&self.0)? } })
    }
}

/// `$push` update appending one enrollment record to a user
pub fn push_enrollment(record: &Value) -> ArtsResult<Document> {
    Ok(doc! { "$push": { "number_of_courses": json_to_bson(record)? } })
}

/// Cart subtotal response
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Subtotal {
    pub subtotal: f64,
}

/// Sum of `price` over a set of cart items.
///
/// Items without a numeric price count as zero.
pub fn subtotal(items: &[Document]) -> Subtotal {
    let subtotal = items
        .iter()
        .fold(0.0, |total, item| match item.get("price").and_then(bson_as_f64) {
            Some(price) => total + price,
            None => {
                warn!(item = ?item.get("_id"), "Cart item has no numeric price");
                total
            }
        });
    Subtotal { subtotal }
}
