//! # arts-mongo
//!
//! MongoDB document store adapter for the fine-arts API.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arts_mongo::MongoStore;
//!
//! // Connect from DB_USER / DB_PASS (or MONGODB_URI) and ping once
//! let store = MongoStore::from_env().await?;
//! let collections = store.collections();
//! ```

pub mod config;
pub mod store;

// Re-exports
pub use config::MongoConfig;
pub use store::{MongoCollection, MongoStore};
