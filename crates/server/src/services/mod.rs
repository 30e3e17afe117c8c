//! Business services.
//!
//! Each service owns one workflow and depends only on the gateway traits
//! ([`crate::store::DataStore`], [`crate::carrier::CarrierGateway`],
//! [`crate::marketplace::MarketplaceGateway`]), so the orchestration is
//! testable against in-memory fakes. Every operation takes the caller's
//! [`Session`](tiktokflow_core::Session) explicitly; services never read
//! ambient identity state.

pub mod inventory;
pub mod orders;
pub mod shipping;

pub use inventory::{InventoryService, InventoryStatistics};
pub use orders::{
    BatchLabelOutcome, DailyOrders, OrderLifecycleService, OrderStatistics, SyncSummary,
};
pub use shipping::{ProfileInput, ShippingConfigService};

use tiktokflow_core::{MarketplaceCredential, SellerId};

use crate::error::AppError;
use crate::marketplace::{self, MarketplaceGateway};
use crate::store::DataStore;

/// Load the seller's marketplace credential, refreshing it first if the
/// access token is within the refresh window.
///
/// A successful refresh rotates both tokens and persists the rotation before
/// returning, so a crash after this point cannot lose the new refresh token.
///
/// # Errors
///
/// `ConfigurationMissing` if the seller has not connected a shop; marketplace
/// or store errors otherwise.
pub(crate) async fn fresh_credential(
    store: &dyn DataStore,
    gateway: &dyn MarketplaceGateway,
    seller: SellerId,
) -> Result<MarketplaceCredential, AppError> {
    let credential = store
        .marketplace_credential(seller)
        .await?
        .ok_or_else(|| AppError::ConfigurationMissing("no connected shop".to_string()))?;

    if !marketplace::needs_refresh(credential.expires_at, chrono::Utc::now()) {
        return Ok(credential);
    }

    let rotated = gateway.refresh_credentials(&credential).await?;
    store.save_marketplace_credential(&rotated).await?;
    Ok(rotated)
}

/// Load the seller's carrier API key.
///
/// # Errors
///
/// `ConfigurationMissing` if no key has been saved.
pub(crate) async fn carrier_api_key(
    store: &dyn DataStore,
    seller: SellerId,
) -> Result<String, AppError> {
    let settings = store
        .carrier_settings(seller)
        .await?
        .ok_or_else(|| AppError::ConfigurationMissing("no carrier API key".to_string()))?;
    Ok(settings.api_key)
}
