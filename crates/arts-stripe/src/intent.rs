//! # Stripe Payment Intents
//!
//! Implementation of the Stripe Payment Intents API.
//! The server creates the intent; the browser confirms it with the
//! returned client secret, so card data never touches this service.

use crate::config::StripeConfig;
use arts_core::{ArtsError, ArtsResult, Currency, PaymentIntent, PaymentIntentStrategy};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Stripe Payment Intent strategy
pub struct StripeIntentStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeIntentStrategy {
    /// Create a new Stripe payment intent strategy
    pub fn new(config: StripeConfig) -> ArtsResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ArtsError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ArtsResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    /// Form body for `POST /v1/payment_intents`
    fn form_params(amount: i64, currency: Currency) -> Vec<(&'static str, String)> {
        vec![
            ("amount", amount.to_string()),
            ("currency", currency.as_str().to_string()),
            ("payment_method_types[]", "card".to_string()),
        ]
    }
}

#[async_trait]
impl PaymentIntentStrategy for StripeIntentStrategy {
    #[instrument(skip(self), fields(currency = %currency))]
    async fn create_intent(&self, amount: i64, currency: Currency) -> ArtsResult<PaymentIntent> {
        debug!("Creating Stripe payment intent: amount={}", amount);

        let url = format!("{}/v1/payment_intents", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&Self::form_params(amount, currency))
            .send()
            .await
            .map_err(|e| ArtsError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ArtsError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            // Parse Stripe error
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(ArtsError::ProviderError {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(ArtsError::ProviderError {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let intent: StripePaymentIntentResponse = serde_json::from_str(&body).map_err(|e| {
            ArtsError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        let client_secret = intent.client_secret.ok_or_else(|| ArtsError::ProviderError {
            provider: "stripe".to_string(),
            message: format!("Payment intent {} has no client secret", intent.id),
        })?;

        info!("Created Stripe payment intent: id={}", intent.id);

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
            amount: intent.amount,
            currency,
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    amount: i64,
    #[serde(default)]
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
