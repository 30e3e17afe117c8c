//! Order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use tiktokflow_core::{Order, OrderId, OrderStatus};

use crate::error::Result;
use crate::middleware::CurrentSeller;
use crate::services::{BatchLabelOutcome, SyncSummary};
use crate::state::AppState;
use crate::store::{OrderQuery, OrderSort, SortDirection};

use super::PageResponse;

/// Query parameters for the order listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_per_page")]
    per_page: u32,
    status: Option<OrderStatus>,
    #[serde(default)]
    sort: OrderSort,
    #[serde(default)]
    direction: SortDirection,
}

const fn default_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    10
}

impl From<ListParams> for OrderQuery {
    fn from(params: ListParams) -> Self {
        Self {
            page: params.page.max(1),
            per_page: params.per_page.clamp(1, 100),
            status: params.status,
            sort: params.sort,
            direction: params.direction,
        }
    }
}

/// `GET /api/orders`
pub async fn list(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<Order>>> {
    let page = state.orders().get_orders(session, &params.into()).await?;
    Ok(Json(page.into()))
}

/// `GET /api/orders/{id}`
pub async fn detail(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state.orders().get_order(session, &id).await?;
    Ok(Json(order))
}

/// `POST /api/orders/sync`
pub async fn sync(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
) -> Result<Json<SyncSummary>> {
    let summary = state.orders().sync_orders(session).await?;
    Ok(Json(summary))
}

/// `POST /api/orders/{id}/label`
pub async fn generate_label(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state.orders().generate_label(session, &id).await?;
    Ok(Json(order))
}

/// Request body for the batch label endpoint.
#[derive(Debug, Deserialize)]
pub struct BatchLabelRequest {
    pub order_ids: Vec<OrderId>,
}

/// `POST /api/orders/labels`
pub async fn batch_labels(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Json(request): Json<BatchLabelRequest>,
) -> Result<Json<Vec<BatchLabelOutcome>>> {
    let outcomes = state
        .orders()
        .generate_labels(session, &request.order_ids)
        .await;
    Ok(Json(outcomes))
}
