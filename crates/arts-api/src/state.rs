//! # Application State
//!
//! Shared state for the Axum application.
//! Owns the store handles, the payment strategy and the token gate. Every
//! handle is opened once at startup and lives for the life of the process.

use crate::auth::TokenGate;
use arts_core::{BoxedPaymentStrategy, Collections};
use arts_mongo::MongoStore;
use arts_stripe::StripeIntentStrategy;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Attach the token gate to mutating routes
    pub require_auth: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            require_auth: std::env::var("REQUIRE_AUTH")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Users, classes and carts collections
    pub store: Collections,
    /// Payment processor
    pub payments: BoxedPaymentStrategy,
    /// Bearer token signer/verifier
    pub tokens: TokenGate,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Connect to the document store and payment processor from the environment
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let store = MongoStore::from_env()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to document store: {}", e))?;

        let payments = StripeIntentStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let tokens = TokenGate::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize token gate: {}", e))?;

        Ok(Self::from_parts(
            config,
            store.collections(),
            Arc::new(payments),
            tokens,
        ))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: AppConfig,
        store: Collections,
        payments: BoxedPaymentStrategy,
        tokens: TokenGate,
    ) -> Self {
        Self {
            store,
            payments,
            tokens,
            config,
        }
    }
}
