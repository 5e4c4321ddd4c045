//! # Payment Strategy Trait
//!
//! Seam between the HTTP layer and the payment processor. The API only
//! needs one operation: create a card payment intent and hand the client
//! secret back to the browser, which completes payment itself.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               PaymentIntentStrategy (trait)                 │
//! │  ├── create_intent()                                        │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │ StripeIntent  │
//!                    │   Strategy    │
//!                    └───────────────┘
//! ```

use crate::currency::Currency;
use crate::error::ArtsResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A payment intent created at the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Processor-side id (pi_...)
    pub id: String,
    /// Secret the browser uses to confirm the payment
    pub client_secret: String,
    /// Amount in smallest currency unit
    pub amount: i64,
    pub currency: Currency,
}

/// Core trait for payment processor implementations.
#[async_trait]
pub trait PaymentIntentStrategy: Send + Sync {
    /// Create a single-use card payment intent.
    ///
    /// # Arguments
    /// * `amount` - Amount in the currency's smallest unit
    /// * `currency` - Currency to charge in
    async fn create_intent(&self, amount: i64, currency: Currency) -> ArtsResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentIntentStrategy>;
