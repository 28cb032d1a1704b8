//! vault-api - HTTP API for the vault product catalog
//!
//! Thin transport over [`vault_db::ProductCatalog`]: query-string parsing,
//! JSON encoding and error-to-status mapping. All filtering, sorting and
//! paging rules live in the catalog.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use vault_db::ProductCatalog;

pub use config::ServerConfig;
pub use error::ApiError;

/// Largest accepted request body. Import batches are the only large payloads.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: ProductCatalog,
}

impl AppState {
    pub fn new(catalog: ProductCatalog) -> Self {
        Self { catalog }
    }
}

/// Build the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/v1/products", get(handlers::products::list_products))
        .route(
            "/v1/products/styles",
            get(handlers::products::list_product_styles),
        )
        .route(
            "/v1/products/import",
            post(handlers::products::import_products),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(CatchPanicLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
