//! HTTP API server for the shop order service.
//!
//! Exposes the order lifecycle over REST, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{OrderService, ServiceConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{CatalogLookup, OrderRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, C>(state: Arc<AppState<R, C>>, metrics_handle: PrometheusHandle) -> Router
where
    R: OrderRepository + 'static,
    C: CatalogLookup + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<R, C>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<R, C>).put(routes::orders::update::<R, C>),
        )
        .route("/orders/{id}/pay", post(routes::orders::pay::<R, C>))
        .route("/orders/{id}/process", post(routes::orders::process::<R, C>))
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

/// Creates the application state around the given stores.
pub fn create_state<R, C>(repo: R, catalog: C, config: ServiceConfig) -> Arc<AppState<R, C>>
where
    R: OrderRepository + 'static,
    C: CatalogLookup + 'static,
{
    Arc::new(AppState {
        order_service: OrderService::with_config(repo, catalog, config),
    })
}
