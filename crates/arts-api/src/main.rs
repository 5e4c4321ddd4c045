//! # FineArts API
//!
//! Enrollment backend for the fine-arts class platform.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export DB_USER=...
//! export DB_PASS=...
//! export ACCESS_TOKEN_SECRET=...
//! export PAYMENT_SK=sk_test_...
//!
//! # Run the server
//! fine-arts
//! ```

use arts_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Connects to the store and pings it once; the handle lives until exit
    let state = AppState::new().await?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.payments.provider_name());
    info!("Token gate on mutating routes: {}", state.config.require_auth);

    // Create router
    let app = routes::create_router(state);

    info!("FineArts is running on http://{}", addr);

    if !is_prod {
        info!("Liveness: GET http://{}/", addr);
        info!("Classes: GET http://{}/classes", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
