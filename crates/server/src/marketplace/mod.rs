//! Marketplace gateway.
//!
//! Wraps the TikTok Shop Open API: OAuth code exchange and token refresh,
//! order and product listing, inventory push, and order-status push.
//!
//! # Token refresh
//!
//! Access tokens are refreshed proactively: before any authenticated call,
//! the caller checks [`needs_refresh`] and exchanges the refresh token if
//! the access token is within five minutes of expiry. A refresh rotates
//! both tokens; the rotated credential is persisted by the caller. Refresh
//! failures surface as [`MarketplaceError::Auth`] and are not retried.

mod tiktok;
mod types;

pub use tiktok::TikTokShopClient;
pub use types::*;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use tiktokflow_core::{
    MarketplaceCredential, MarketplaceOrderStatus, OrderId, ProductId, SellerId, SkuId,
};

/// Refresh the access token when it is within this window of expiry.
const REFRESH_SKEW_MINUTES: i64 = 5;

/// Errors that can occur when interacting with the marketplace API.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {code} - {message}")]
    Api { code: i64, message: String },

    /// Credentials are invalid or expired and could not be refreshed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Whether an access token should be refreshed before use.
///
/// True exactly when `now >= expires_at - 5min`. A call made six minutes
/// before expiry uses the existing token; one made four minutes before
/// expiry refreshes first.
#[must_use]
pub fn needs_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= expires_at - Duration::minutes(REFRESH_SKEW_MINUTES)
}

/// Contract for the marketplace.
///
/// Calls take the seller's credential explicitly; the client holds only the
/// OAuth app configuration. The services depend on this trait, not on
/// [`TikTokShopClient`], so tests substitute a stub.
#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    /// Complete the OAuth flow: exchange an authorization code for tokens.
    async fn connect_shop(
        &self,
        auth_code: &str,
        seller: SellerId,
    ) -> Result<MarketplaceCredential, MarketplaceError>;

    /// Exchange the refresh token for a new token pair.
    ///
    /// Rotates both tokens; the caller persists the returned credential.
    async fn refresh_credentials(
        &self,
        credential: &MarketplaceCredential,
    ) -> Result<MarketplaceCredential, MarketplaceError>;

    /// Search the shop's orders. Returns one page plus the total count.
    async fn get_orders(
        &self,
        credential: &MarketplaceCredential,
        query: &MarketplacePageQuery,
    ) -> Result<(Vec<MarketplaceOrder>, u64), MarketplaceError>;

    /// Search the shop's products. Returns one page plus the total count.
    async fn get_products(
        &self,
        credential: &MarketplaceCredential,
        query: &MarketplacePageQuery,
    ) -> Result<(Vec<MarketplaceProduct>, u64), MarketplaceError>;

    /// Push an order status (and tracking number, once shipped) to the shop.
    async fn update_order_status(
        &self,
        credential: &MarketplaceCredential,
        order_id: &OrderId,
        status: MarketplaceOrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<(), MarketplaceError>;

    /// Push a stock level for one SKU to the shop.
    async fn update_inventory(
        &self,
        credential: &MarketplaceCredential,
        product_id: &ProductId,
        sku_id: &SkuId,
        quantity: i32,
    ) -> Result<(), MarketplaceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_refresh_boundary() {
        let now = Utc::now();

        // Six minutes of validity left: keep the current token.
        assert!(!needs_refresh(now + Duration::minutes(6), now));
        // Four minutes left: refresh first.
        assert!(needs_refresh(now + Duration::minutes(4), now));
        // Exactly at the window edge: refresh.
        assert!(needs_refresh(now + Duration::minutes(5), now));
        // Already expired: refresh.
        assert!(needs_refresh(now - Duration::minutes(1), now));
    }
}
