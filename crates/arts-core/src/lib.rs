//! # arts-core
//!
//! Core types and traits for the fine-arts enrollment API.
//!
//! This crate provides:
//! - `DocumentCollection` trait and the `Collections` handle set
//! - Filter and update builders for users, classes and carts
//! - JSON/BSON document conversion
//! - `PaymentIntentStrategy` trait and `Currency` arithmetic
//! - `ArtsError` for typed error handling
//! - An in-memory store for tests and local runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use arts_core::{by_uid, subtotal, Collections};
//!
//! let items = collections.carts.find(by_uid("firebase-uid")).await?;
//! let total = subtotal(&items);
//! ```

pub mod currency;
pub mod document;
pub mod error;
pub mod memory;
pub mod model;
pub mod store;
pub mod strategy;

// Re-exports for convenience
pub use currency::{decimal_amount, Currency};
pub use document::{bson_to_json, document_to_json, json_to_document, parse_object_id};
pub use error::{ArtsError, ArtsResult};
pub use memory::{in_memory_collections, MemoryCollection};
pub use model::{
    by_id, by_uid, push_enrollment, subtotal, AccountTypePatch, ClassDetails, ClassPatch,
    Subtotal,
};
pub use store::{
    BoxedCollection, Collections, DeleteAck, DocumentCollection, InsertAck, UpdateAck, CARTS,
    CLASSES, USERS,
};
pub use strategy::{BoxedPaymentStrategy, PaymentIntent, PaymentIntentStrategy};
