//! Wire types for the marketplace API.
//!
//! Shapes mirror the TikTok Shop Open API payloads; conversion into the
//! local domain records happens here so the sync services never touch raw
//! wire data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tiktokflow_core::{
    MarketplaceOrderStatus, Order, OrderId, Product, ProductId, SellerId, SkuId,
};

/// Page selector for order and product searches.
#[derive(Debug, Clone)]
pub struct MarketplacePageQuery {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Restrict an order search to one marketplace status.
    pub status: Option<MarketplaceOrderStatus>,
}

impl Default for MarketplacePageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
            status: None,
        }
    }
}

/// One order as the marketplace reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceOrder {
    pub order_id: OrderId,
    pub order_status: MarketplaceOrderStatus,
    /// Order creation time, epoch seconds.
    pub create_time: i64,
    pub recipient: Recipient,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_label_url: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// The buyer and their delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Address as a free-form JSON object; stored verbatim and parsed into
    /// a postal address only at label-generation time.
    pub address: serde_json::Value,
}

/// One line item on a marketplace order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
}

impl MarketplaceOrder {
    /// Convert into a local [`Order`] owned by `seller`.
    ///
    /// The first line item names the order's product; quantity is the sum
    /// across all items. The raw address object is serialized back to a
    /// JSON string so nothing the marketplace sent is lost.
    #[must_use]
    pub fn into_order(self, seller: SellerId) -> Order {
        let product_id = self.items.first().and_then(|item| item.product_id.clone());
        let product_name = self
            .items
            .first()
            .map_or_else(|| "Unknown product".to_string(), |item| item.product_name.clone());
        // Stored orders require quantity > 0; an item-less order counts as one.
        let quantity = self.items.iter().map(|item| item.quantity).sum::<i32>().max(1);
        let order_date = DateTime::<Utc>::from_timestamp(self.create_time, 0)
            .unwrap_or_else(Utc::now);
        // Label URL and tracking number are stored both-or-neither; a lone
        // wire value is dropped rather than half-set.
        let (shipping_label_url, tracking_number) =
            match (self.shipping_label_url, self.tracking_number) {
                (Some(label), Some(tracking)) => (Some(label), Some(tracking)),
                _ => (None, None),
            };

        Order {
            id: self.order_id,
            seller_id: seller,
            customer_name: self.recipient.name,
            customer_email: self.recipient.email,
            customer_address: self.recipient.address.to_string(),
            product_id,
            product_name,
            quantity,
            order_date,
            status: self.order_status.to_local(),
            shipping_label_url,
            tracking_number,
        }
    }
}

/// One product as the marketplace reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub skus: Vec<ProductSku>,
}

/// One SKU variant of a marketplace product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSku {
    pub id: SkuId,
    pub seller_sku: String,
    #[serde(default)]
    pub stock_infos: Vec<StockInfo>,
}

/// Stock in one warehouse.
#[derive(Debug, Clone, Deserialize)]
pub struct StockInfo {
    pub available_stock: i32,
}

impl MarketplaceProduct {
    /// Convert into a local [`Product`] owned by `seller`.
    ///
    /// Single-SKU products are the norm here; the first SKU and its first
    /// warehouse stock figure are authoritative.
    #[must_use]
    pub fn into_product(self, seller: SellerId) -> Option<Product> {
        let sku = self.skus.into_iter().next()?;
        let stock_level = sku
            .stock_infos
            .first()
            .map_or(0, |info| info.available_stock)
            .max(0);

        Some(Product {
            id: self.id,
            seller_id: seller,
            sku_id: sku.id,
            sku: sku.seller_sku,
            name: self.name,
            stock_level,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tiktokflow_core::OrderStatus;
    use uuid::Uuid;

    #[test]
    fn test_order_conversion_maps_status_and_sums_quantity() {
        let wire: MarketplaceOrder = serde_json::from_value(serde_json::json!({
            "order_id": "ORD001",
            "order_status": "AWAITING_SHIPMENT",
            "create_time": 1_700_000_000,
            "recipient": {
                "name": "Jane Doe",
                "address": {"street1": "1 Main St", "city": "Austin",
                            "state": "TX", "zip": "78701", "country": "US"}
            },
            "items": [
                {"product_id": "P1", "product_name": "Tumbler", "quantity": 2},
                {"product_name": "Tumbler", "quantity": 1}
            ]
        }))
        .unwrap();

        let order = wire.into_order(SellerId::new(Uuid::nil()));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.quantity, 3);
        assert_eq!(order.product_id, Some(ProductId::new("P1")));
        assert!(order.customer_address.contains("Austin"));
        assert!(!order.has_label());
    }

    #[test]
    fn test_tracking_number_without_label_is_dropped() {
        let wire: MarketplaceOrder = serde_json::from_value(serde_json::json!({
            "order_id": "ORD002",
            "order_status": "SHIPPED",
            "create_time": 1_700_000_000,
            "recipient": {"name": "Jane Doe", "address": {}},
            "items": [{"product_name": "Tumbler", "quantity": 1}],
            "tracking_number": "TRK-EXTERNAL"
        }))
        .unwrap();

        let order = wire.into_order(SellerId::new(Uuid::nil()));
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_number, None);
        assert_eq!(order.shipping_label_url, None);
    }

    #[test]
    fn test_label_and_tracking_pair_is_kept() {
        let wire: MarketplaceOrder = serde_json::from_value(serde_json::json!({
            "order_id": "ORD003",
            "order_status": "SHIPPED",
            "create_time": 1_700_000_000,
            "recipient": {"name": "Jane Doe", "address": {}},
            "items": [{"product_name": "Tumbler", "quantity": 1}],
            "shipping_label_url": "https://labels.example/ext.pdf",
            "tracking_number": "TRK-EXTERNAL"
        }))
        .unwrap();

        let order = wire.into_order(SellerId::new(Uuid::nil()));
        assert!(order.has_label());
        assert_eq!(order.tracking_number.as_deref(), Some("TRK-EXTERNAL"));
    }

    #[test]
    fn test_order_without_items_gets_unit_quantity() {
        let wire: MarketplaceOrder = serde_json::from_value(serde_json::json!({
            "order_id": "ORD004",
            "order_status": "UNPAID",
            "create_time": 1_700_000_000,
            "recipient": {"name": "Jane Doe", "address": {}},
            "items": []
        }))
        .unwrap();

        let order = wire.into_order(SellerId::new(Uuid::nil()));
        assert_eq!(order.quantity, 1);
        assert_eq!(order.product_name, "Unknown product");
    }

    #[test]
    fn test_product_conversion_uses_first_sku() {
        let wire: MarketplaceProduct = serde_json::from_value(serde_json::json!({
            "id": "P1",
            "name": "Tumbler",
            "skus": [
                {"id": "S1", "seller_sku": "TMB-20", "stock_infos": [{"available_stock": 7}]}
            ]
        }))
        .unwrap();

        let product = wire.into_product(SellerId::new(Uuid::nil())).unwrap();
        assert_eq!(product.sku, "TMB-20");
        assert_eq!(product.stock_level, 7);
    }

    #[test]
    fn test_product_without_skus_is_skipped() {
        let wire: MarketplaceProduct = serde_json::from_value(serde_json::json!({
            "id": "P2",
            "name": "Sticker",
            "skus": []
        }))
        .unwrap();
        assert!(wire.into_product(SellerId::new(Uuid::nil())).is_none());
    }
}
