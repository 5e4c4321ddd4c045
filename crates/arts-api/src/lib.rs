//! # arts-api
//!
//! HTTP API layer for the fine-arts enrollment platform.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for users, classes and carts
//! - Stripe payment intent creation
//! - Bearer token issuance and an attachable verification gate
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Liveness |
//! | POST | `/jwt` | Issue token |
//! | GET | `/carts?uid=` | Cart items for owner |
//! | GET | `/carts/subtotal/{uid}` | Cart subtotal |
//! | GET | `/classes/by-id/{id}` | Class by id |
//! | GET | `/classes/by-owner/{uid}` | Classes by instructor |
//! | PUT | `/updateclass/{id}` | Replace class listing |
//! | PUT | `/manageclass/{id}` | Set status or feedback |
//! | POST | `/create-payment-intent` | Stripe payment intent |
//!
//! See [`routes::create_router`] for the full table.

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::{Claims, TokenGate};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
