//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::carrier::CarrierError;
use crate::marketplace::MarketplaceError;
use crate::store::RepositoryError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Carrier API operation failed.
    #[error("Carrier error: {0}")]
    Carrier(#[from] CarrierError),

    /// Marketplace API operation failed.
    #[error("Marketplace error: {0}")]
    Marketplace(#[from] MarketplaceError),

    /// A required configuration step has not been completed.
    ///
    /// Raised before any external call is made: no shipping profile, no
    /// carrier key, or no connected shop.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Stored data could not be interpreted (e.g. unparseable address).
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// The carrier returned no rates for a shipment.
    #[error("No shipping rates available for this shipment")]
    NoRatesAvailable,

    /// The operation is not valid for the resource's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Carrier(_) | Self::Marketplace(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Carrier(err) => match err {
                CarrierError::Unauthorized => StatusCode::UNAUTHORIZED,
                CarrierError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Marketplace(err) => match err {
                MarketplaceError::Auth(_) => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::ConfigurationMissing(_) => StatusCode::PRECONDITION_FAILED,
            Self::MalformedData(_) | Self::NoRatesAvailable => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Carrier(err) => match err {
                CarrierError::Unauthorized => "Carrier rejected the API key".to_string(),
                CarrierError::RateLimited(_) => "Carrier rate limit reached".to_string(),
                _ => "Shipping carrier error".to_string(),
            },
            Self::Marketplace(err) => match err {
                MarketplaceError::Auth(_) => {
                    "Shop connection expired, please reconnect".to_string()
                }
                _ => "Marketplace error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("ORD001".to_string());
        assert_eq!(err.to_string(), "Not found: ORD001");

        let err = AppError::ConfigurationMissing("no default shipping profile".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration missing: no default shipping profile"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::ConfigurationMissing("test".to_string())),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            get_status(AppError::MalformedData("test".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::NoRatesAvailable),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::InvalidState("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_external_failures_map_to_bad_gateway() {
        assert_eq!(
            get_status(AppError::Carrier(CarrierError::Api {
                status: 500,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Marketplace(MarketplaceError::Api {
                code: 105_001,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_expired_shop_connection_is_unauthorized() {
        assert_eq!(
            get_status(AppError::Marketplace(MarketplaceError::Auth(
                "refresh rejected".to_string()
            ))),
            StatusCode::UNAUTHORIZED
        );
    }
}
