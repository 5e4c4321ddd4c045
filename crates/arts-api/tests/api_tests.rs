//! End-to-end tests for the HTTP surface, backed by the in-memory store.

use arts_api::{create_router, AppConfig, AppState, TokenGate};
use arts_core::{in_memory_collections, ArtsResult, Currency, PaymentIntent, PaymentIntentStrategy};
use async_trait::async_trait;
use axum::{body::Bytes, http::StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const SECRET: &str = "integration-secret";

/// Records every intent request instead of calling Stripe
#[derive(Default)]
struct RecordingPayments {
    requests: Mutex<Vec<(i64, Currency)>>,
}

#[async_trait]
impl PaymentIntentStrategy for RecordingPayments {
    async fn create_intent(&self, amount: i64, currency: Currency) -> ArtsResult<PaymentIntent> {
        self.requests.lock().unwrap().push((amount, currency));
        Ok(PaymentIntent {
            id: "pi_test".to_string(),
            client_secret: format!("pi_test_secret_{}", amount),
            amount,
            currency,
        })
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

fn config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        require_auth: false,
    }
}

fn server_with(payments: Arc<RecordingPayments>) -> TestServer {
    let state = AppState::from_parts(
        config(),
        in_memory_collections(),
        payments,
        TokenGate::new(SECRET),
    );
    TestServer::new(create_router(state)).unwrap()
}

fn server() -> TestServer {
    server_with(Arc::new(RecordingPayments::default()))
}

async fn insert(server: &TestServer, path: &str, body: Value) -> String {
    let response = server.post(path).json(&body).await;
    response.assert_status_ok();
    let ack: Value = response.json();
    assert_eq!(ack["acknowledged"], json!(true));
    ack["insertedId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_liveness() {
    let server = server();
    let response = server.get("/").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "FineArts server is up");

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["status"], json!("healthy"));
}

#[tokio::test]
async fn test_cart_listing_and_subtotal() {
    let server = server();
    insert(&server, "/carts", json!({ "uid": "u1", "name": "Oil Painting", "price": 40 })).await;
    insert(&server, "/carts", json!({ "uid": "u1", "name": "Pottery", "price": 19.99 })).await;
    insert(&server, "/carts", json!({ "uid": "u2", "name": "Sketching", "price": 12 })).await;

    // No owner given: empty list, not an error
    let empty: Vec<Value> = server.get("/carts").await.json();
    assert!(empty.is_empty());

    let by_query: Vec<Value> = server.get("/carts").add_query_param("uid", "u1").await.json();
    let by_path: Vec<Value> = server.get("/carts/u1").await.json();
    assert_eq!(by_query.len(), 2);
    assert_eq!(by_query, by_path);

    let expected = by_path
        .iter()
        .fold(0.0, |total, item| total + item["price"].as_f64().unwrap());
    let subtotal: Value = server.get("/carts/subtotal/u1").await.json();
    assert_eq!(subtotal["subtotal"].as_f64().unwrap(), expected);

    let nobody: Value = server.get("/carts/subtotal/nobody").await.json();
    assert_eq!(nobody, json!({ "subtotal": 0.0 }));
}

#[tokio::test]
async fn test_delete_cart_item() {
    let server = server();
    let id = insert(&server, "/carts", json!({ "uid": "u1", "price": 40 })).await;

    let ack: Value = server.delete(&format!("/carts/{}", id)).await.json();
    assert_eq!(ack["deletedCount"], json!(1));

    let remaining: Vec<Value> = server.get("/carts/u1").await.json();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_class_lifecycle() {
    let server = server();
    let class = json!({
        "name": "Oil Painting",
        "price": 40,
        "total_seats": 10,
        "available_seats": 10,
        "number_of_classes": 1,
        "uid": "instructor-1"
    });
    let id = insert(&server, "/classes", class.clone()).await;

    let fetched: Value = server.get(&format!("/classes/by-id/{}", id)).await.json();
    assert_eq!(fetched["_id"], json!(id));
    for field in ["name", "price", "total_seats", "available_seats", "number_of_classes"] {
        assert_eq!(fetched[field], class[field], "field {}", field);
    }

    let for_edit: Value = server.get(&format!("/updateclass/{}", id)).await.json();
    assert_eq!(for_edit, fetched);

    let owned: Vec<Value> = server.get("/classes/by-owner/instructor-1").await.json();
    assert_eq!(owned.len(), 1);
    let all: Vec<Value> = server.get("/classes").await.json();
    assert_eq!(all.len(), 1);

    let ack: Value = server.delete(&format!("/classes/{}", id)).await.json();
    assert_eq!(ack["deletedCount"], json!(1));

    let gone = server.get(&format!("/classes/by-id/{}", id)).await;
    gone.assert_status_ok();
    assert_eq!(gone.json::<Value>(), Value::Null);
}

#[tokio::test]
async fn test_full_class_update_leaves_other_fields() {
    let server = server();
    let id = insert(
        &server,
        "/classes",
        json!({ "name": "Watercolor", "price": 30, "status": "approved", "feedback": "Great" }),
    )
    .await;

    let ack: Value = server
        .put(&format!("/updateclass/{}", id))
        .json(&json!({
            "name": "Watercolor II",
            "image": "https://img.example/wc.png",
            "total_seats": 12,
            "available_seats": 8,
            "number_of_classes": 4,
            "price": 35.5
        }))
        .await
        .json();
    assert_eq!(ack["matchedCount"], json!(1));

    let class: Value = server.get(&format!("/classes/by-id/{}", id)).await.json();
    assert_eq!(class["name"], json!("Watercolor II"));
    assert_eq!(class["available_seats"], json!(8));
    assert_eq!(class["price"], json!(35.5));
    assert_eq!(class["status"], json!("approved"));
    assert_eq!(class["feedback"], json!("Great"));
}

#[tokio::test]
async fn test_full_class_update_upserts() {
    let server = server();
    let id = "64b7f0c2a1b2c3d4e5f60718";

    let ack: Value = server
        .put(&format!("/updateclass/{}", id))
        .json(&json!({
            "name": "Ceramics",
            "image": "c.png",
            "total_seats": 5,
            "available_seats": 5,
            "number_of_classes": 2,
            "price": 50
        }))
        .await
        .json();
    assert_eq!(ack["upsertedCount"], json!(1));
    assert_eq!(ack["upsertedId"], json!(id));

    let class: Value = server.get(&format!("/classes/by-id/{}", id)).await.json();
    let fields = class.as_object().unwrap();
    assert_eq!(fields.len(), 7);
    assert_eq!(class["name"], json!("Ceramics"));
}

#[tokio::test]
async fn test_full_class_update_stores_values_as_sent() {
    let server = server();
    let id = insert(&server, "/classes", json!({ "name": "Etching" })).await;

    server
        .put(&format!("/updateclass/{}", id))
        .json(&json!({
            "name": "Etching",
            "image": "e.png",
            "total_seats": "10",
            "available_seats": 10.0,
            "number_of_classes": 3,
            "price": 40
        }))
        .await
        .assert_status_ok();

    let class: Value = server.get(&format!("/classes/by-id/{}", id)).await.json();
    assert_eq!(class["total_seats"], json!("10"));
    assert_eq!(class["available_seats"], json!(10.0));
    assert_eq!(class["number_of_classes"], json!(3));
    assert!(class["price"].is_i64());
    assert_eq!(class["price"], json!(40));
}

#[tokio::test]
async fn test_manage_class_sets_one_field() {
    let server = server();
    let id = insert(&server, "/classes", json!({ "name": "Pottery", "status": "pending" })).await;
    let path = format!("/manageclass/{}", id);

    server.put(&path).json(&json!({ "status": "approved" })).await.assert_status_ok();
    let class: Value = server.get(&format!("/classes/by-id/{}", id)).await.json();
    assert_eq!(class["status"], json!("approved"));
    assert!(class.get("feedback").is_none());

    server
        .put(&path)
        .json(&json!({ "feedback": "Please add a syllabus" }))
        .await
        .assert_status_ok();
    let class: Value = server.get(&format!("/classes/by-id/{}", id)).await.json();
    assert_eq!(class["status"], json!("approved"));
    assert_eq!(class["feedback"], json!("Please add a syllabus"));

    // Unrecognized body always gets a terminal response
    let response = server.put(&path).json(&json!({ "color": "blue" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], json!(400));

    server
        .put(&path)
        .json(&json!({ "status": "denied", "feedback": "No" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_lookup_and_account_type() {
    let server = server();
    let id = insert(
        &server,
        "/users",
        json!({ "uid": "firebase-42", "name": "Ada", "account_type": "student" }),
    )
    .await;

    let user: Value = server.get("/users/firebase-42").await.json();
    assert_eq!(user["name"], json!("Ada"));
    let missing: Value = server.get("/users/nobody").await.json();
    assert!(missing.is_null());

    server
        .put(&format!("/manageuser/{}", id))
        .json(&json!({ "account_type": "instructor" }))
        .await
        .assert_status_ok();
    let user: Value = server.get("/users/firebase-42").await.json();
    assert_eq!(user["account_type"], json!("instructor"));

    server
        .put(&format!("/manageuser/{}", id))
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let users: Vec<Value> = server.get("/users").await.json();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_enrollment_appends_in_order() {
    let server = server();
    insert(&server, "/users", json!({ "uid": "firebase-7" })).await;

    let courses = ["Sketching", "Pottery", "Oil Painting"];
    for name in courses {
        let ack: Value = server
            .put("/users/firebase-7")
            .json(&json!({ "name": name }))
            .await
            .json();
        assert_eq!(ack["modifiedCount"], json!(1));
    }

    let user: Value = server.get("/users/firebase-7").await.json();
    let enrolled: Vec<&str> = user["number_of_courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(enrolled, courses);
}

#[tokio::test]
async fn test_enrollment_for_missing_user_creates_nothing() {
    let server = server();

    let ack: Value = server
        .put("/users/ghost")
        .json(&json!({ "name": "Pottery" }))
        .await
        .json();
    assert_eq!(ack["matchedCount"], json!(0));
    assert_eq!(ack["upsertedCount"], json!(0));

    let users: Vec<Value> = server.get("/users").await.json();
    assert!(users.is_empty());
    let ghost: Value = server.get("/users/ghost").await.json();
    assert!(ghost.is_null());
}

#[tokio::test]
async fn test_body_rejections_use_error_shape() {
    let server = server();

    let response = server.post("/carts").text("uid=u1").await;
    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let error: Value = response.json();
    assert_eq!(error["code"], json!(415));
    assert!(error["error"].is_string());

    let response = server
        .post("/classes")
        .bytes(Bytes::from_static(b"{\"name\": "))
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], json!(400));
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let server = server();
    server
        .get("/classes/by-id/not-an-object-id")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .delete("/carts/42")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_intent_amount_in_cents() {
    let payments = Arc::new(RecordingPayments::default());
    let server = server_with(payments.clone());

    let response = server
        .post("/create-payment-intent")
        .json(&json!({ "price": 19.99 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body, json!({ "ClientSecret": "pi_test_secret_1999" }));
    assert_eq!(
        payments.requests.lock().unwrap().as_slice(),
        &[(1999, Currency::USD)]
    );
}

#[tokio::test]
async fn test_payment_intent_accepts_numeric_string() {
    let payments = Arc::new(RecordingPayments::default());
    let server = server_with(payments.clone());

    let body: Value = server
        .post("/create-payment-intent")
        .json(&json!({ "price": "19.99" }))
        .await
        .json();
    assert_eq!(body["ClientSecret"], json!("pi_test_secret_1999"));

    let response = server
        .post("/create-payment-intent")
        .json(&json!({ "price": "free" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], json!(400));

    server
        .post("/create-payment-intent")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(
        payments.requests.lock().unwrap().as_slice(),
        &[(1999, Currency::USD)]
    );
}

#[tokio::test]
async fn test_jwt_issue() {
    let server = server();
    let response = server.post("/jwt").json(&json!({ "email": "ada@example.com" })).await;
    response.assert_status_ok();

    let token = response.text();
    let claims = TokenGate::new(SECRET)
        .verify(Some(format!("Bearer {}", token).as_str()))
        .unwrap();
    assert_eq!(claims.get("email"), Some(&json!("ada@example.com")));

    server
        .post("/jwt")
        .json(&json!(["not", "an", "object"]))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/jwt")
        .json(&json!({ "email": "ada@example.com", "exp": 4102444800_i64 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
