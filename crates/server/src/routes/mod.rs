//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check (unauthenticated)
//!
//! # Orders
//! GET  /api/orders                          - List orders (page, status, sort)
//! GET  /api/orders/{id}                     - Order detail
//! POST /api/orders/sync                     - Pull orders from the marketplace
//! POST /api/orders/{id}/label               - Generate a shipping label
//! POST /api/orders/labels                   - Generate labels for a batch
//!
//! # Products
//! GET  /api/products                        - List products (page, search)
//! POST /api/products/sync                   - Pull products from the marketplace
//! PUT  /api/products/{id}/stock             - Set a stock level
//!
//! # Shipping configuration
//! GET  /api/shipping/profile                - Default ship-from profile
//! PUT  /api/shipping/profile                - Save ship-from profile
//! PUT  /api/shipping/api-key                - Save carrier API key
//! POST /api/shipping/api-key/validate       - Check a key against the carrier
//! GET  /api/shipping/track/{carrier}/{tracking} - Tracking lookup
//!
//! # Marketplace
//! POST /api/marketplace/connect             - OAuth code exchange
//!
//! # Dashboard
//! GET  /api/dashboard/stats                 - Order + inventory roll-up
//! ```
//!
//! All `/api` routes require an `Authorization: Bearer <token>` session.

pub mod dashboard;
pub mod marketplace;
pub mod orders;
pub mod products;
pub mod shipping;

use axum::{
    Json, Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/orders", get(orders::list))
        .route("/orders/sync", post(orders::sync))
        .route("/orders/labels", post(orders::batch_labels))
        .route("/orders/{id}", get(orders::detail))
        .route("/orders/{id}/label", post(orders::generate_label))
        .route("/products", get(products::list))
        .route("/products/sync", post(products::sync))
        .route("/products/{id}/stock", put(products::update_stock))
        .route(
            "/shipping/profile",
            get(shipping::get_profile).put(shipping::save_profile),
        )
        .route("/shipping/api-key", put(shipping::save_api_key))
        .route("/shipping/api-key/validate", post(shipping::validate_api_key))
        .route(
            "/shipping/track/{carrier}/{tracking}",
            get(shipping::track),
        )
        .route("/marketplace/connect", post(marketplace::connect))
        .route("/dashboard/stats", get(dashboard::stats));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Paginated JSON response body.
#[derive(Debug, serde::Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl<T> From<crate::store::Page<T>> for PageResponse<T> {
    fn from(page: crate::store::Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        }
    }
}
