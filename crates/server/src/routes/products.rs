//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use tiktokflow_core::{Product, ProductId};

use crate::error::Result;
use crate::middleware::CurrentSeller;
use crate::state::AppState;
use crate::store::{ProductQuery, SortDirection};

use super::PageResponse;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_per_page")]
    per_page: u32,
    search: Option<String>,
    #[serde(default = "default_direction")]
    direction: SortDirection,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    10
}

const fn default_direction() -> SortDirection {
    SortDirection::Asc
}

impl From<ListParams> for ProductQuery {
    fn from(params: ListParams) -> Self {
        Self {
            page: params.page.max(1),
            per_page: params.per_page.clamp(1, 100),
            search: params.search.filter(|s| !s.trim().is_empty()),
            direction: params.direction,
        }
    }
}

/// `GET /api/products`
pub async fn list(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<Product>>> {
    let page = state
        .inventory()
        .list_products(session, &params.into())
        .await?;
    Ok(Json(page.into()))
}

/// `POST /api/products/sync`
pub async fn sync(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
) -> Result<Json<serde_json::Value>> {
    let synced = state.inventory().sync_products(session).await?;
    Ok(Json(serde_json::json!({ "synced": synced })))
}

/// Request body for the stock update endpoint.
#[derive(Debug, Deserialize)]
pub struct StockUpdateRequest {
    pub stock_level: i32,
}

/// `PUT /api/products/{id}/stock`
pub async fn update_stock(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Path(id): Path<ProductId>,
    Json(request): Json<StockUpdateRequest>,
) -> Result<Json<Product>> {
    let product = state
        .inventory()
        .update_stock(session, &id, request.stock_level)
        .await?;
    Ok(Json(product))
}
