//! # Routes
//!
//! Axum router configuration for the enrollment API.
//!
//! Class lookups use disjoint prefixes (`/classes/by-id/{id}` and
//! `/classes/by-owner/{uid}`) so a store id and an instructor uid can never
//! be routed to the wrong handler.

use crate::auth;
use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Attach the token gate to a mutating route when `REQUIRE_AUTH` is on
fn guarded(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    if state.config.require_auth {
        route.route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth::require_bearer,
        ))
    } else {
        route
    }
}

/// Create the main application router
///
/// Routes:
/// - Service:
///   - GET  / - Liveness text
///   - GET  /health - Health check
///   - POST /jwt - Issue bearer token
///   - POST /create-payment-intent - Stripe payment intent
///
/// - Carts:
///   - GET    /carts?uid= - Cart items for owner
///   - GET    /carts/{uid} - Cart items for owner
///   - GET    /carts/subtotal/{uid} - Cart subtotal for owner
///   - POST   /carts - Add cart item
///   - DELETE /carts/{id} - Remove cart item
///
/// - Users:
///   - GET  /users - All users
///   - GET  /users/{uid} - User by external id
///   - POST /users - Create user
///   - PUT  /users/{uid} - Append enrollment
///   - PUT  /manageuser/{id} - Set account type
///
/// - Classes:
///   - GET    /classes - All classes
///   - GET    /classes/by-id/{id} - Class by store id
///   - GET    /classes/by-owner/{uid} - Classes by instructor
///   - POST   /classes - Create class
///   - DELETE /classes/{id} - Delete class
///   - GET    /updateclass/{id} - Class by store id
///   - PUT    /updateclass/{id} - Replace listing fields
///   - PUT    /manageclass/{id} - Set status or feedback
pub fn create_router(state: AppState) -> Router {
    // Browser clients are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let service_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/jwt", post(handlers::issue_token))
        .route(
            "/create-payment-intent",
            guarded(&state, post(handlers::create_payment_intent)),
        );

    let cart_routes = Router::new()
        .route(
            "/carts",
            get(handlers::list_carts).merge(guarded(&state, post(handlers::add_cart_item))),
        )
        .route("/carts/subtotal/{uid}", get(handlers::cart_subtotal))
        .route(
            "/carts/{id}",
            get(handlers::list_carts_by_owner)
                .merge(guarded(&state, delete(handlers::delete_cart_item))),
        );

    let user_routes = Router::new()
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user).merge(guarded(&state, put(handlers::append_enrollment))),
        )
        .route("/manageuser/{id}", guarded(&state, put(handlers::manage_user)));

    let class_routes = Router::new()
        .route(
            "/classes",
            get(handlers::list_classes).merge(guarded(&state, post(handlers::create_class))),
        )
        .route("/classes/by-id/{id}", get(handlers::get_class))
        .route("/classes/by-owner/{uid}", get(handlers::list_classes_by_owner))
        .route("/classes/{id}", guarded(&state, delete(handlers::delete_class)))
        .route(
            "/updateclass/{id}",
            get(handlers::get_class).merge(guarded(&state, put(handlers::update_class))),
        )
        .route("/manageclass/{id}", guarded(&state, put(handlers::manage_class)));

    Router::new()
        .merge(service_routes)
        .merge(cart_routes)
        .merge(user_routes)
        .merge(class_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
