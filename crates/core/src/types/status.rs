//! Order status domains and the mapping between them.
//!
//! The marketplace and this system speak different status vocabularies. The
//! local lifecycle is deliberately small (it only tracks what label
//! generation needs); the marketplace side is the closed set of wire values
//! TikTok Shop reports. The two are bridged by one explicit mapping here so
//! no other module guesses at equivalence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local order lifecycle status.
///
/// `Pending -> Generating -> Shipped` is the label-generation path.
/// `Generating` is a per-order lease taken by compare-and-swap before any
/// carrier traffic, so two concurrent label requests cannot both purchase.
/// `Delivered` and `Cancelled` only arrive via marketplace sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Generating,
    Shipped,
    Delivered,
    Cancelled,
}

/// Error parsing a stored order status.
#[derive(Debug, Error)]
#[error("unknown order status: {0}")]
pub struct ParseStatusError(String);

impl OrderStatus {
    /// The status as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a shipping label may be generated from this status.
    #[must_use]
    pub const fn can_generate_label(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The marketplace status to push when this local status changes.
    ///
    /// Returns `None` for `Generating`, which is a local-only lease state
    /// and must never be pushed to the marketplace.
    #[must_use]
    pub const fn to_marketplace(&self) -> Option<MarketplaceOrderStatus> {
        match self {
            Self::Pending => Some(MarketplaceOrderStatus::AwaitingShipment),
            Self::Generating => None,
            Self::Shipped => Some(MarketplaceOrderStatus::Shipped),
            Self::Delivered => Some(MarketplaceOrderStatus::Delivered),
            Self::Cancelled => Some(MarketplaceOrderStatus::Cancelled),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "generating" => Ok(Self::Generating),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order status as reported by the TikTok Shop API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketplaceOrderStatus {
    Unpaid,
    OnHold,
    AwaitingShipment,
    AwaitingCollection,
    PartiallyShipping,
    InTransit,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

impl MarketplaceOrderStatus {
    /// The wire value, for use in query parameters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::OnHold => "ON_HOLD",
            Self::AwaitingShipment => "AWAITING_SHIPMENT",
            Self::AwaitingCollection => "AWAITING_COLLECTION",
            Self::PartiallyShipping => "PARTIALLY_SHIPPING",
            Self::InTransit => "IN_TRANSIT",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Map a marketplace-reported status into the local lifecycle.
    ///
    /// Anything the marketplace considers not-yet-shipped maps to `Pending`;
    /// in-flight and shipped states map to `Shipped`; terminal states map to
    /// `Delivered`/`Cancelled`. `Generating` never comes from the
    /// marketplace.
    #[must_use]
    pub const fn to_local(&self) -> OrderStatus {
        match self {
            Self::Unpaid
            | Self::OnHold
            | Self::AwaitingShipment
            | Self::AwaitingCollection
            | Self::PartiallyShipping => OrderStatus::Pending,
            Self::InTransit | Self::Shipped => OrderStatus::Shipped,
            Self::Delivered | Self::Completed => OrderStatus::Delivered,
            Self::Cancelled => OrderStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Generating,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let parsed = OrderStatus::from_str(status.as_str()).expect("roundtrip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(OrderStatus::from_str("SHIPPED").is_err());
        assert!(OrderStatus::from_str("").is_err());
    }

    #[test]
    fn test_only_pending_can_generate() {
        assert!(OrderStatus::Pending.can_generate_label());
        assert!(!OrderStatus::Generating.can_generate_label());
        assert!(!OrderStatus::Shipped.can_generate_label());
        assert!(!OrderStatus::Delivered.can_generate_label());
        assert!(!OrderStatus::Cancelled.can_generate_label());
    }

    #[test]
    fn test_generating_never_pushed() {
        assert_eq!(OrderStatus::Generating.to_marketplace(), None);
    }

    #[test]
    fn test_marketplace_mapping() {
        assert_eq!(
            MarketplaceOrderStatus::AwaitingShipment.to_local(),
            OrderStatus::Pending
        );
        assert_eq!(
            MarketplaceOrderStatus::Unpaid.to_local(),
            OrderStatus::Pending
        );
        assert_eq!(
            MarketplaceOrderStatus::InTransit.to_local(),
            OrderStatus::Shipped
        );
        assert_eq!(
            MarketplaceOrderStatus::Completed.to_local(),
            OrderStatus::Delivered
        );
        assert_eq!(
            MarketplaceOrderStatus::Cancelled.to_local(),
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn test_wire_serde_screaming_snake() {
        let json = serde_json::to_string(&MarketplaceOrderStatus::AwaitingShipment)
            .expect("serialize");
        assert_eq!(json, "\"AWAITING_SHIPMENT\"");
        let back: MarketplaceOrderStatus =
            serde_json::from_str("\"IN_TRANSIT\"").expect("deserialize");
        assert_eq!(back, MarketplaceOrderStatus::InTransit);
    }
}
