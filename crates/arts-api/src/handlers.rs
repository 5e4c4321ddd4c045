//! # Request Handlers
//!
//! Axum request handlers for the enrollment API. Each handler builds one
//! filter/update document, performs a single store call and returns the
//! store's result.

use crate::state::AppState;
use arts_core::{
    by_id, by_uid, decimal_amount, document_to_json, json_to_document, push_enrollment, subtotal,
    AccountTypePatch, ArtsError, BoxedCollection, ClassDetails, ClassPatch, Currency, DeleteAck,
    InsertAck, Subtotal, UpdateAck,
};
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use bson::Document;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Optional owner filter for `GET /carts`
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    #[serde(default)]
    pub uid: Option<String>,
}

/// Create payment intent request
#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Decimal amount in dollars, as a number or numeric string
    #[serde(default)]
    pub price: Value,
}

/// Create payment intent response
#[derive(Debug, Serialize)]
pub struct CreatePaymentIntentResponse {
    #[serde(rename = "ClientSecret")]
    pub client_secret: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);
type HandlerResult<T> = Result<T, HandlerError>;

fn error_to_response(err: ArtsError) -> HandlerError {
    let code = err.status_code();
    if code >= 500 {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn rejection_to_response(status: StatusCode, message: String) -> HandlerError {
    warn!("Request rejected: {}", message);
    (status, Json(ErrorResponse::new(message, status.as_u16())))
}

// =============================================================================
// Extractors
// =============================================================================

/// `Json` extractor whose rejections use the `ErrorResponse` body
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_response(rejection.status(), rejection.body_text())),
        }
    }
}

/// `Query` extractor whose rejections use the `ErrorResponse` body
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_response(rejection.status(), rejection.body_text())),
        }
    }
}

// =============================================================================
// Shared store calls
// =============================================================================

async fn find_many(collection: &BoxedCollection, filter: Document) -> HandlerResult<Json<Vec<Value>>> {
    let docs = collection.find(filter).await.map_err(error_to_response)?;
    Ok(Json(docs.into_iter().map(document_to_json).collect()))
}

async fn find_single(collection: &BoxedCollection, filter: Document) -> HandlerResult<Json<Option<Value>>> {
    let doc = collection.find_one(filter).await.map_err(error_to_response)?;
    Ok(Json(doc.map(document_to_json)))
}

async fn insert(collection: &BoxedCollection, body: Value) -> HandlerResult<Json<InsertAck>> {
    let doc = json_to_document(body).map_err(error_to_response)?;
    let ack = collection.insert_one(doc).await.map_err(error_to_response)?;
    info!("Inserted into {}: {}", collection.name(), ack.inserted_id);
    Ok(Json(ack))
}

async fn update(
    collection: &BoxedCollection,
    filter: Document,
    update: Document,
    upsert: bool,
) -> HandlerResult<Json<UpdateAck>> {
    let ack = collection
        .update_one(filter, update, upsert)
        .await
        .map_err(error_to_response)?;
    Ok(Json(ack))
}

async fn remove(collection: &BoxedCollection, id: &str) -> HandlerResult<Json<DeleteAck>> {
    let filter = by_id(id).map_err(error_to_response)?;
    let ack = collection.delete_one(filter).await.map_err(error_to_response)?;
    Ok(Json(ack))
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness text
pub async fn root() -> &'static str {
    "FineArts server is up"
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "fine-arts",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Sign the submitted identity payload into a one-hour bearer token
#[instrument(skip(state, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> HandlerResult<String> {
    state.tokens.issue(payload).map_err(error_to_response)
}

/// Cart items for `?uid=`; empty when no owner is given
#[instrument(skip(state))]
pub async fn list_carts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<OwnerQuery>,
) -> HandlerResult<Json<Vec<Value>>> {
    match query.uid.filter(|uid| !uid.is_empty()) {
        Some(uid) => find_many(&state.store.carts, by_uid(&uid)).await,
        None => Ok(Json(Vec::new())),
    }
}

/// Cart items owned by `uid`
#[instrument(skip(state))]
pub async fn list_carts_by_owner(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> HandlerResult<Json<Vec<Value>>> {
    info!("Carts based on uid {}", uid);
    find_many(&state.store.carts, by_uid(&uid)).await
}

/// Sum of `price` across the owner's cart
#[instrument(skip(state))]
pub async fn cart_subtotal(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> HandlerResult<Json<Subtotal>> {
    let items = state
        .store
        .carts
        .find(by_uid(&uid))
        .await
        .map_err(error_to_response)?;

    let total = subtotal(&items);
    info!("Cart subtotal for {}: {} over {} items", uid, total.subtotal, items.len());
    Ok(Json(total))
}

/// Every user
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> HandlerResult<Json<Vec<Value>>> {
    find_many(&state.store.users, Document::new()).await
}

/// Every class
#[instrument(skip(state))]
pub async fn list_classes(State(state): State<AppState>) -> HandlerResult<Json<Vec<Value>>> {
    find_many(&state.store.classes, Document::new()).await
}

/// Classes created by instructor `uid`
#[instrument(skip(state))]
pub async fn list_classes_by_owner(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> HandlerResult<Json<Vec<Value>>> {
    find_many(&state.store.classes, by_uid(&uid)).await
}

/// Single class by store id, or `null`
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Json<Option<Value>>> {
    let filter = by_id(&id).map_err(error_to_response)?;
    find_single(&state.store.classes, filter).await
}

/// Single user by external identity, or `null`
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Json<Option<Value>>> {
    find_single(&state.store.users, by_uid(&id)).await
}

#[instrument(skip(state, body))]
pub async fn add_cart_item(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> HandlerResult<Json<InsertAck>> {
    info!("New cart item: {}", body);
    insert(&state.store.carts, body).await
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> HandlerResult<Json<InsertAck>> {
    info!("New user: {}", body);
    insert(&state.store.users, body).await
}

#[instrument(skip(state, body))]
pub async fn create_class(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> HandlerResult<Json<InsertAck>> {
    info!("New class: {}", body);
    insert(&state.store.classes, body).await
}

/// Replace the six listing fields of a class, creating it when absent
#[instrument(skip(state, details))]
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(details): JsonBody<ClassDetails>,
) -> HandlerResult<Json<UpdateAck>> {
    info!("Update class body: {:?}", details);
    let filter = by_id(&id).map_err(error_to_response)?;
    let doc = details.to_update().map_err(error_to_response)?;
    update(&state.store.classes, filter, doc, true).await
}

/// Set a class's `status` or `feedback`
#[instrument(skip(state, body))]
pub async fn manage_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> HandlerResult<Json<UpdateAck>> {
    info!("Manage class body: {}", body);
    let filter = by_id(&id).map_err(error_to_response)?;
    let patch = ClassPatch::from_body(&body).map_err(error_to_response)?;
    let doc = patch.to_update().map_err(error_to_response)?;
    update(&state.store.classes, filter, doc, true).await
}

/// Set a user's `account_type`
#[instrument(skip(state, body))]
pub async fn manage_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> HandlerResult<Json<UpdateAck>> {
    info!("Manage user body: {}", body);
    let filter = by_id(&id).map_err(error_to_response)?;
    let patch = AccountTypePatch::from_body(&body).map_err(error_to_response)?;
    let doc = patch.to_update().map_err(error_to_response)?;
    update(&state.store.users, filter, doc, true).await
}

/// Append one enrollment record to the user's `number_of_courses`
#[instrument(skip(state, body))]
pub async fn append_enrollment(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> HandlerResult<Json<UpdateAck>> {
    info!("Enrollment for {}: {}", uid, body);
    let doc = push_enrollment(&body).map_err(error_to_response)?;
    update(&state.store.users, by_uid(&uid), doc, false).await
}

#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Json<DeleteAck>> {
    info!("Class delete id {}", id);
    remove(&state.store.classes, &id).await
}

#[instrument(skip(state))]
pub async fn delete_cart_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Json<DeleteAck>> {
    info!("Cart delete id {}", id);
    remove(&state.store.carts, &id).await
}

/// Create a card payment intent for `price` dollars and return its client secret
#[instrument(skip(state, request), fields(price = %request.price))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreatePaymentIntentRequest>,
) -> HandlerResult<Json<CreatePaymentIntentResponse>> {
    let currency = Currency::USD;
    let price = decimal_amount(&request.price).map_err(error_to_response)?;
    let amount = currency.to_smallest_unit(price);
    info!(
        "Creating payment intent: provider={}, amount={}",
        state.payments.provider_name(),
        amount
    );

    let intent = state
        .payments
        .create_intent(amount, currency)
        .await
        .map_err(error_to_response)?;

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let body = serde_json::to_value(ErrorResponse::new("Test error", 400)).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Test error", "code": 400 }));
    }

    #[test]
    fn test_arts_error_conversion() {
        let (status, _json) = error_to_response(ArtsError::InvalidId { id: "x".to_string() });
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _json) = error_to_response(ArtsError::store("classes", "timeout"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_secret_wire_name() {
        let body = serde_json::to_value(CreatePaymentIntentResponse {
            client_secret: "pi_1_secret_2".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "ClientSecret": "pi_1_secret_2" }));
    }
}
