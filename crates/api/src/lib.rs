//! HTTP API server with observability for the sales cart service.
//!
//! Provides REST endpoints for cart commands and queries, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{CartService, EmptyCartPolicy, NotificationDispatcher};
use metrics_exporter_prometheus::PrometheusHandle;
use queries::CartQueries;
use sale_store::SaleStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::carts::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: SaleStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/carts",
            post(routes::carts::create::<S>).get(routes::carts::search::<S>),
        )
        .route("/carts/{id}", get(routes::carts::get::<S>))
        .route("/carts/{id}/items", post(routes::carts::add_item::<S>))
        .route(
            "/carts/{id}/items/{product_id}",
            put(routes::carts::update_item::<S>).delete(routes::carts::remove_item::<S>),
        )
        .route("/carts/{id}/complete", post(routes::carts::complete::<S>))
        .route("/carts/{id}/cancel", post(routes::carts::cancel::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state from a store, a dispatcher and an empty cart policy.
pub fn create_state<S: SaleStore + Clone + 'static>(
    store: S,
    dispatcher: NotificationDispatcher,
    empty_cart_policy: EmptyCartPolicy,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        carts: CartService::new(store.clone(), dispatcher)
            .with_empty_cart_policy(empty_cart_policy),
        queries: CartQueries::new(store),
    })
}

/// Creates the default application state: customer email notifications and
/// auto-cancel of emptied carts.
pub fn create_default_state<S: SaleStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    create_state(
        store,
        NotificationDispatcher::with_default_handlers(),
        EmptyCartPolicy::default(),
    )
}
