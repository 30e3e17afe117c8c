//! Shipping carrier gateway.
//!
//! Wraps the Shippo REST API: address registration, rate shopping, label
//! purchase, label refund (compensation), and tracking lookup.
//!
//! # API Reference
//!
//! - Base URL: `https://api.goshippo.com` (configurable)
//! - Authentication: per-seller key via `Authorization: ShippoToken <key>`
//! - Endpoints: `/addresses/`, `/shipments/`, `/transactions/`, `/refunds/`,
//!   `/tracks/`, `/shipments/{id}/rates/`

mod shippo;
mod types;

pub use shippo::ShippoClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use tiktokflow_core::{CarrierAddressId, PostalAddress, RateId, TransactionId};

/// Errors that can occur when interacting with the carrier API.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the carrier.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid API key).
    #[error("Unauthorized: invalid API key")]
    Unauthorized,
}

/// Contract for the shipping carrier.
///
/// Every call carries the seller's API key; carrier accounts are per-seller,
/// so the client holds no key of its own. The lifecycle service depends on
/// this trait, not on [`ShippoClient`], so tests substitute a stub.
#[async_trait]
pub trait CarrierGateway: Send + Sync {
    /// Check that an API key is accepted by the carrier.
    async fn validate_api_key(&self, api_key: &str) -> Result<bool, CarrierError>;

    /// Register (and validate) an address at the carrier.
    ///
    /// Returns the carrier's address object ID for later reuse.
    async fn create_address(
        &self,
        api_key: &str,
        name: &str,
        company: Option<&str>,
        address: &PostalAddress,
    ) -> Result<CarrierAddressId, CarrierError>;

    /// Create a shipment quote request, returning the offered rates.
    async fn create_shipment(
        &self,
        api_key: &str,
        from: &ShipmentAddress,
        to: &ShipmentAddress,
        parcel: &Parcel,
    ) -> Result<Vec<Rate>, CarrierError>;

    /// Purchase a previously quoted rate.
    ///
    /// This charges the seller's carrier account and is not idempotent.
    async fn purchase_label(
        &self,
        api_key: &str,
        rate_id: &RateId,
    ) -> Result<PurchasedLabel, CarrierError>;

    /// Request a refund for a purchased label (best-effort compensation).
    async fn refund_label(
        &self,
        api_key: &str,
        transaction_id: &TransactionId,
    ) -> Result<(), CarrierError>;

    /// Look up tracking status for a shipment. Best-effort; callers treat
    /// failure as non-fatal.
    async fn track(
        &self,
        api_key: &str,
        carrier: &str,
        tracking_number: &str,
    ) -> Result<TrackingStatus, CarrierError>;
}
