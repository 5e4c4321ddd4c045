//! # arts-stripe
//!
//! Stripe payment intents for the fine-arts API.
//!
//! The API creates a card payment intent for the cart total and returns
//! only the client secret; the browser finishes payment with Stripe.js.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arts_core::{Currency, PaymentIntentStrategy};
//! use arts_stripe::StripeIntentStrategy;
//!
//! // Create strategy from PAYMENT_SK
//! let strategy = StripeIntentStrategy::from_env()?;
//!
//! let amount = Currency::USD.to_smallest_unit(19.99);
//! let intent = strategy.create_intent(amount, Currency::USD).await?;
//!
//! // Send intent.client_secret to the browser
//! ```

pub mod config;
pub mod intent;

// Re-exports
pub use config::StripeConfig;
pub use intent::StripeIntentStrategy;
