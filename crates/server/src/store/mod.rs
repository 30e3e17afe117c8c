//! Data store contract and Postgres implementation.
//!
//! The [`DataStore`] trait is the generic CRUD/query facade over the
//! relational store (orders, products, shipping profiles, carrier settings,
//! marketplace credentials, sessions). Services depend on the trait, never
//! on sqlx directly, so the lifecycle orchestration can be tested against an
//! in-memory implementation.

pub mod postgres;

pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use tiktokflow_core::{
    CarrierSettings, MarketplaceCredential, Order, OrderId, OrderStatus, Product, ProductId,
    SellerId, Session, ShippingProfile,
};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data failed validation when read back.
    #[error("Data corruption: {0}")]
    DataCorruption(String),
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Sort key for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    #[default]
    OrderDate,
    Status,
    CustomerName,
}

/// Pagination and filtering for order listings.
#[derive(Debug, Clone)]
pub struct OrderQuery {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    pub status: Option<OrderStatus>,
    pub sort: OrderSort,
    pub direction: SortDirection,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            status: None,
            sort: OrderSort::default(),
            direction: SortDirection::default(),
        }
    }
}

/// Pagination and filtering for product listings.
#[derive(Debug, Clone)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub direction: SortDirection,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            search: None,
            direction: SortDirection::Asc,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Number of pages needed to cover `total` at `per_page` items each.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64)
    }
}

/// Aggregated units sold for one product name.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductSales {
    pub product_name: String,
    pub quantity: i64,
}

/// Generic CRUD/query facade over the relational data store.
///
/// All operations are scoped to one seller; the seller is the sole writer of
/// its rows. Implementations: [`PgStore`] in production, an in-memory store
/// in the integration tests.
#[async_trait]
pub trait DataStore: Send + Sync {
    // ── Sessions ────────────────────────────────────────────────────────

    /// Look up a session by bearer token. Expired sessions are not returned.
    async fn session(&self, token: &str) -> Result<Option<Session>, RepositoryError>;

    // ── Orders ──────────────────────────────────────────────────────────

    async fn list_orders(
        &self,
        seller: SellerId,
        query: &OrderQuery,
    ) -> Result<Page<Order>, RepositoryError>;

    async fn get_order(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Insert or update orders keyed by `(seller_id, order_id)`.
    async fn upsert_orders(&self, orders: &[Order]) -> Result<u64, RepositoryError>;

    /// Atomically move an order from `Pending` to `Generating`.
    ///
    /// Returns the claimed order, or `None` if the order is not currently
    /// `Pending` (already claimed, shipped, cancelled, or missing). This is
    /// the per-order lease that prevents two concurrent label purchases.
    async fn claim_pending_order(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Move an order back from `Generating` to `Pending` after a failed
    /// label attempt.
    async fn release_order_claim(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<(), RepositoryError>;

    /// Record the purchased label and transition the order to `Shipped`.
    async fn mark_order_shipped(
        &self,
        seller: SellerId,
        id: &OrderId,
        label_url: &str,
        tracking_number: &str,
    ) -> Result<Order, RepositoryError>;

    async fn count_orders(
        &self,
        seller: SellerId,
        status: Option<OrderStatus>,
    ) -> Result<u64, RepositoryError>;

    /// Order dates on or after `since`, for trend statistics.
    async fn order_dates_since(
        &self,
        seller: SellerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RepositoryError>;

    /// Units sold per product name across all of the seller's orders.
    async fn product_sales(&self, seller: SellerId) -> Result<Vec<ProductSales>, RepositoryError>;

    // ── Products ────────────────────────────────────────────────────────

    async fn list_products(
        &self,
        seller: SellerId,
        query: &ProductQuery,
    ) -> Result<Page<Product>, RepositoryError>;

    async fn get_product(
        &self,
        seller: SellerId,
        id: &ProductId,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Fallback lookup used by inventory reconciliation when an order does
    /// not carry a stable product reference.
    async fn find_product_by_name(
        &self,
        seller: SellerId,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Insert or update products keyed by `(seller_id, product_id)`,
    /// overwriting local stock with the supplied values.
    async fn upsert_products(&self, products: &[Product]) -> Result<u64, RepositoryError>;

    /// Set a product's stock level. Returns `None` if the product is missing.
    async fn set_stock_level(
        &self,
        seller: SellerId,
        id: &ProductId,
        stock_level: i32,
    ) -> Result<Option<Product>, RepositoryError>;

    async fn count_products(&self, seller: SellerId) -> Result<u64, RepositoryError>;

    /// Count products with `stock_level < threshold`.
    async fn count_products_below(
        &self,
        seller: SellerId,
        threshold: i32,
    ) -> Result<u64, RepositoryError>;

    // ── Shipping configuration ──────────────────────────────────────────

    async fn default_shipping_profile(
        &self,
        seller: SellerId,
    ) -> Result<Option<ShippingProfile>, RepositoryError>;

    /// Upsert a shipping profile. When the profile is the default, any
    /// previous default for the seller is cleared in the same transaction so
    /// at most one default exists.
    async fn save_shipping_profile(
        &self,
        profile: &ShippingProfile,
    ) -> Result<(), RepositoryError>;

    async fn carrier_settings(
        &self,
        seller: SellerId,
    ) -> Result<Option<CarrierSettings>, RepositoryError>;

    async fn save_carrier_settings(
        &self,
        settings: &CarrierSettings,
    ) -> Result<(), RepositoryError>;

    // ── Marketplace credentials ─────────────────────────────────────────

    async fn marketplace_credential(
        &self,
        seller: SellerId,
    ) -> Result<Option<MarketplaceCredential>, RepositoryError>;

    /// Upsert credential material; also used to persist rotated tokens.
    async fn save_marketplace_credential(
        &self,
        credential: &MarketplaceCredential,
    ) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_total_pages() {
        let page = Page::<Order> {
            items: vec![],
            total: 21,
            page: 1,
            per_page: 10,
        };
        assert_eq!(page.total_pages(), 3);

        let exact = Page::<Order> {
            items: vec![],
            total: 20,
            page: 1,
            per_page: 10,
        };
        assert_eq!(exact.total_pages(), 2);

        let empty = Page::<Order> {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 10,
        };
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_query_defaults() {
        let q = OrderQuery::default();
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, 10);
        assert!(q.status.is_none());
        assert_eq!(q.sort, OrderSort::OrderDate);
        assert_eq!(q.direction, SortDirection::Desc);

        let p = ProductQuery::default();
        assert_eq!(p.direction, SortDirection::Asc);
    }
}
