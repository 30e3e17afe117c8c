//! Marketplace connection route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::CurrentSeller;
use crate::state::AppState;

/// Request body for the shop connection endpoint.
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Authorization code from the marketplace OAuth redirect.
    pub auth_code: String,
}

/// `POST /api/marketplace/connect`
///
/// Exchanges the OAuth authorization code for tokens and stores them
/// against the seller. Tokens never appear in the response.
pub async fn connect(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<serde_json::Value>> {
    let credential = state
        .marketplace()
        .connect_shop(&request.auth_code, session.seller_id)
        .await?;
    state.store().save_marketplace_credential(&credential).await?;

    Ok(Json(serde_json::json!({
        "shop_id": credential.shop_id,
        "seller_name": credential.seller_name,
        "expires_at": credential.expires_at,
    })))
}
