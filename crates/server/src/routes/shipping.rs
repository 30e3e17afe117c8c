//! Shipping configuration route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use tiktokflow_core::ShippingProfile;

use crate::carrier::TrackingStatus;
use crate::error::{AppError, Result};
use crate::middleware::CurrentSeller;
use crate::services::ProfileInput;
use crate::state::AppState;

/// `GET /api/shipping/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
) -> Result<Json<ShippingProfile>> {
    let profile = state
        .shipping()
        .default_profile(session)
        .await?
        .ok_or_else(|| AppError::NotFound("no shipping profile configured".to_string()))?;
    Ok(Json(profile))
}

/// `PUT /api/shipping/profile`
pub async fn save_profile(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Json(input): Json<ProfileInput>,
) -> Result<Json<ShippingProfile>> {
    let profile = state.shipping().save_profile(session, input).await?;
    Ok(Json(profile))
}

/// Request body for saving the carrier API key.
#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

/// `PUT /api/shipping/api-key`
pub async fn save_api_key(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Json(request): Json<ApiKeyRequest>,
) -> Result<StatusCode> {
    state.shipping().save_api_key(session, request.api_key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for validating an API key. An absent key means "validate
/// whatever is stored".
#[derive(Debug, Default, Deserialize)]
pub struct ValidateKeyRequest {
    pub api_key: Option<String>,
}

/// `POST /api/shipping/api-key/validate`
pub async fn validate_api_key(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Json(request): Json<ValidateKeyRequest>,
) -> Result<Json<serde_json::Value>> {
    let valid = state
        .shipping()
        .validate_api_key(session, request.api_key.as_deref())
        .await?;
    Ok(Json(serde_json::json!({ "valid": valid })))
}

/// `GET /api/shipping/track/{carrier}/{tracking}`
pub async fn track(
    State(state): State<AppState>,
    CurrentSeller(session): CurrentSeller,
    Path((carrier, tracking)): Path<(String, String)>,
) -> Result<Json<TrackingStatus>> {
    let status = state.shipping().track(session, &carrier, &tracking).await?;
    Ok(Json(status))
}
