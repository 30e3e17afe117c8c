//! Dashboard route handlers.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::CurrentSeller;
use crate::services::{InventoryStatistics, OrderStatistics};
use crate::state::AppState;

/// Combined dashboard roll-up.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub orders: OrderStatistics,
    pub inventory: InventoryStatistics,
}

/// `GET /api/dashboard/stats`
pub async fn stats(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
) -> Result<Json<DashboardStats>> {
    let orders = state.orders().order_statistics(session).await?;
    let inventory = state.inventory().inventory_statistics(session).await?;
    Ok(Json(DashboardStats { orders, inventory }))
}
