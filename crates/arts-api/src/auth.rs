//! # Token Gate
//!
//! Stateless bearer tokens. `POST /jwt` signs whatever identity payload the
//! client submits with a one-hour expiry. `require_bearer` is the matching
//! middleware: it verifies `Authorization: Bearer <token>` and exposes the
//! decoded [`Claims`] to the downstream handler through request extensions.
//!
//! The gate is attached per route in `routes::create_router`.

use arts_core::{ArtsError, ArtsResult};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Token lifetime in seconds
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Claims the gate writes itself
const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Decoded token claims: the signed identity payload plus `iat`/`exp`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims(pub Map<String, Value>);

impl Claims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Signs and verifies bearer tokens with a server-held secret
#[derive(Clone)]
pub struct TokenGate {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenGate {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: TOKEN_TTL_SECS,
        }
    }

    /// Load the signing secret from `ACCESS_TOKEN_SECRET`
    pub fn from_env() -> ArtsResult<Self> {
        dotenvy::dotenv().ok();
        let secret = std::env::var("ACCESS_TOKEN_SECRET")
            .map_err(|_| ArtsError::Configuration("ACCESS_TOKEN_SECRET not set".to_string()))?;
        Ok(Self::new(&secret))
    }

    /// Builder: override the token lifetime
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Sign an identity payload.
    ///
    /// The payload must be a JSON object. `iat` and `exp` are set by the
    /// gate, so a payload that already carries either is rejected.
    pub fn issue(&self, payload: Value) -> ArtsResult<String> {
        let Value::Object(mut claims) = payload else {
            return Err(ArtsError::InvalidRequest(
                "Token payload must be a JSON object".to_string(),
            ));
        };

        if let Some(reserved) = RESERVED_CLAIMS.iter().find(|c| claims.contains_key(**c)) {
            return Err(ArtsError::InvalidRequest(format!(
                "Token payload must not set '{}'",
                reserved
            )));
        }

        let iat = Utc::now().timestamp();
        claims.insert("iat".to_string(), Value::from(iat));
        claims.insert("exp".to_string(), Value::from(iat + self.ttl_secs));

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ArtsError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify an `Authorization` header value of the form `Bearer <token>`
    pub fn verify(&self, authorization: Option<&str>) -> ArtsResult<Claims> {
        let token = authorization
            .and_then(|h| h.split(' ').nth(1))
            .filter(|t| !t.is_empty())
            .ok_or(ArtsError::Unauthorized)?;

        let data = decode::<Map<String, Value>>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            debug!("Token rejected: {}", e);
            ArtsError::Unauthorized
        })?;

        Ok(Claims(data.claims))
    }
}

/// 401 response for requests that fail the gate
#[derive(Debug, Clone, Copy)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": true, "message": "Unauthorized access" })),
        )
            .into_response()
    }
}

/// Middleware that rejects requests without a valid bearer token
pub async fn require_bearer(
    State(gate): State<TokenGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let claims = gate.verify(authorization).map_err(|_| AuthRejection)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
