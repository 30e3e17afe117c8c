//! Domain records shared between the server, CLI, and tests.
//!
//! These are plain data types; persistence and wire mapping live in the
//! server crate. One seller owns many orders and products, one default
//! shipping profile, one carrier key, and one marketplace credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CarrierAddressId, OrderId, OrderStatus, PostalAddress, ProductId, SellerId, ShopId, SkuId,
};

/// One customer purchase.
///
/// Created by marketplace sync (or seeding); mutated only by the order
/// lifecycle service when generating a label, or by sync reconciling status.
/// Never deleted in normal operation.
///
/// Invariant: `shipping_label_url` and `tracking_number` are both `None` or
/// both `Some`, and are only `Some` once the order has shipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub seller_id: SellerId,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    /// Customer address as the marketplace supplied it (JSON blob).
    /// Parsed into a [`PostalAddress`] at label-generation time.
    pub customer_address: String,
    /// Stable marketplace product reference, when the order carries one.
    /// Inventory reconciliation prefers this over name matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_label_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

impl Order {
    /// Whether a purchased label is recorded against the order.
    #[must_use]
    pub const fn has_label(&self) -> bool {
        self.shipping_label_url.is_some() && self.tracking_number.is_some()
    }
}

/// One sellable SKU.
///
/// `stock_level` never goes below zero: reconciliation clamps decrements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: SellerId,
    /// Marketplace SKU identifier, required when pushing stock updates.
    pub sku_id: SkuId,
    /// Seller-facing SKU code.
    pub sku: String,
    pub name: String,
    pub stock_level: i32,
}

/// The seller's ship-from address.
///
/// Exactly one profile per seller has `is_default = true`; the default is
/// the ship-from source for label generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingProfile {
    pub seller_id: SellerId,
    /// Address object registered at the carrier, set once the address has
    /// been validated there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_address_id: Option<CarrierAddressId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
    pub is_default: bool,
}

/// The seller's carrier API key.
#[derive(Clone, PartialEq, Eq)]
pub struct CarrierSettings {
    pub seller_id: SellerId,
    pub api_key: String,
}

impl std::fmt::Debug for CarrierSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierSettings")
            .field("seller_id", &self.seller_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// OAuth token material for one seller's shop connection.
///
/// The access token is refreshed proactively when it is within five minutes
/// of expiry; a refresh rotates both tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct MarketplaceCredential {
    pub seller_id: SellerId,
    pub shop_id: ShopId,
    pub seller_name: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for MarketplaceCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceCredential")
            .field("seller_id", &self.seller_id)
            .field("shop_id", &self.shop_id)
            .field("seller_name", &self.seller_name)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// An authenticated seller session.
///
/// Created at login by the external identity provider, validated on every
/// request, and passed explicitly into each service call. Services never
/// read ambient identity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub seller_id: SellerId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn seller() -> SellerId {
        SellerId::new(Uuid::nil())
    }

    #[test]
    fn test_order_label_invariant_helper() {
        let mut order = Order {
            id: OrderId::new("ORD001"),
            seller_id: seller(),
            customer_name: "Jane Doe".to_string(),
            customer_email: None,
            customer_address: "{}".to_string(),
            product_id: None,
            product_name: "Tumbler".to_string(),
            quantity: 1,
            order_date: Utc::now(),
            status: OrderStatus::Pending,
            shipping_label_url: None,
            tracking_number: None,
        };
        assert!(!order.has_label());

        order.shipping_label_url = Some("https://labels.test/1.pdf".to_string());
        order.tracking_number = Some("TRK123".to_string());
        assert!(order.has_label());
    }

    #[test]
    fn test_secret_fields_redacted_in_debug() {
        let settings = CarrierSettings {
            seller_id: seller(),
            api_key: "shippo_live_abc123".to_string(),
        };
        let debug = format!("{settings:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("shippo_live_abc123"));

        let credential = MarketplaceCredential {
            seller_id: seller(),
            shop_id: ShopId::new("shop-1"),
            seller_name: "Test Seller".to_string(),
            access_token: "at-secret".to_string(),
            refresh_token: "rt-secret".to_string(),
            expires_at: Utc::now(),
        };
        let debug = format!("{credential:?}");
        assert!(!debug.contains("at-secret"));
        assert!(!debug.contains("rt-secret"));
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session {
            seller_id: seller(),
            expires_at: now,
        };
        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - chrono::Duration::seconds(1)));
    }
}
