//! Authentication extractor.
//!
//! Sessions are provisioned by the external identity provider; this server
//! only validates them. Every `/api` handler takes a [`CurrentSeller`],
//! which resolves the `Authorization: Bearer <token>` header to a live
//! session row. Expired or unknown tokens are rejected with 401.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use tiktokflow_core::Session;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires an authenticated seller session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentSeller(session): CurrentSeller,
/// ) -> impl IntoResponse {
///     format!("seller {}", session.seller_id)
/// }
/// ```
pub struct CurrentSeller(pub Session);

impl FromRequestParts<AppState> for CurrentSeller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let session = state
            .store()
            .session(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired session".to_string()))?;

        // Associate subsequent errors with the seller in Sentry.
        sentry::configure_scope(|scope| {
            scope.set_user(Some(sentry::User {
                id: Some(session.seller_id.to_string()),
                ..Default::default()
            }));
        });

        Ok(Self(session))
    }
}
