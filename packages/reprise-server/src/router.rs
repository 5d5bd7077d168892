//! HTTP router setup.

use crate::handlers;
use crate::middleware;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Requests running longer than `secs` (at least 1) get a 408.
fn timeout_layer(secs: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(secs.max(1)),
    )
}

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    let timeout = timeout_layer(state.config.request_timeout_secs);

    let api = Router::new()
        .route("/offers", get(handlers::list_offers))
        .route("/address/search", post(handlers::search_addresses))
        .route("/reprise-orders", post(handlers::create_order))
        .route(
            "/reprise-orders/negotiation/{order_id}",
            get(handlers::negotiation),
        )
        .route("/reprise-orders/{order_id}/accept", post(handlers::accept))
        .route("/reprise-orders/{order_id}/propose", post(handlers::propose))
        .route("/reprise-orders/{order_id}/delivery", post(handlers::delivery))
        .route(
            "/reprise-orders/received-orders-on-my-offers",
            get(handlers::received_orders),
        )
        .route(
            "/reprise-orders/sended-orders-on-my-offers",
            get(handlers::sent_orders),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .nest("/api", api)
        .layer(axum::middleware::from_fn(middleware::identify_caller))
        .layer(axum::middleware::from_fn(middleware::inject_request_id))
        .layer(timeout)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
