//! Postgres-backed [`DataStore`] implementation.
//!
//! # Tables
//!
//! - `orders` - Marketplace orders, keyed by `(seller_id, order_id)`
//! - `products` - Sellable SKUs, keyed by `(seller_id, product_id)`
//! - `shipping_profiles` - Ship-from addresses (one default per seller)
//! - `shipping_settings` - Per-seller carrier API key
//! - `marketplace_credentials` - OAuth token material
//! - `sessions` - Bearer tokens provisioned by the identity provider
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p tiktokflow-cli -- migrate
//! ```
//!
//! Queries use runtime binding (`query_as`) rather than the compile-time
//! `query!` macros so the crate builds without a reachable database.

mod credentials;
mod orders;
mod products;
mod sessions;
mod shipping;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use tiktokflow_core::{
    CarrierSettings, MarketplaceCredential, Order, OrderId, OrderStatus, Product, ProductId,
    SellerId, Session, ShippingProfile,
};

use super::{DataStore, OrderQuery, Page, ProductQuery, ProductSales, RepositoryError};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Postgres-backed data store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn session(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        self.session_by_token(token).await
    }

    async fn list_orders(
        &self,
        seller: SellerId,
        query: &OrderQuery,
    ) -> Result<Page<Order>, RepositoryError> {
        self.list_orders_impl(seller, query).await
    }

    async fn get_order(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        self.get_order_impl(seller, id).await
    }

    async fn upsert_orders(&self, orders: &[Order]) -> Result<u64, RepositoryError> {
        self.upsert_orders_impl(orders).await
    }

    async fn claim_pending_order(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        self.claim_pending_order_impl(seller, id).await
    }

    async fn release_order_claim(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<(), RepositoryError> {
        self.release_order_claim_impl(seller, id).await
    }

    async fn mark_order_shipped(
        &self,
        seller: SellerId,
        id: &OrderId,
        label_url: &str,
        tracking_number: &str,
    ) -> Result<Order, RepositoryError> {
        self.mark_order_shipped_impl(seller, id, label_url, tracking_number)
            .await
    }

    async fn count_orders(
        &self,
        seller: SellerId,
        status: Option<OrderStatus>,
    ) -> Result<u64, RepositoryError> {
        self.count_orders_impl(seller, status).await
    }

    async fn order_dates_since(
        &self,
        seller: SellerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        self.order_dates_since_impl(seller, since).await
    }

    async fn product_sales(&self, seller: SellerId) -> Result<Vec<ProductSales>, RepositoryError> {
        self.product_sales_impl(seller).await
    }

    async fn list_products(
        &self,
        seller: SellerId,
        query: &ProductQuery,
    ) -> Result<Page<Product>, RepositoryError> {
        self.list_products_impl(seller, query).await
    }

    async fn get_product(
        &self,
        seller: SellerId,
        id: &ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        self.get_product_impl(seller, id).await
    }

    async fn find_product_by_name(
        &self,
        seller: SellerId,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        self.find_product_by_name_impl(seller, name).await
    }

    async fn upsert_products(&self, products: &[Product]) -> Result<u64, RepositoryError> {
        self.upsert_products_impl(products).await
    }

    async fn set_stock_level(
        &self,
        seller: SellerId,
        id: &ProductId,
        stock_level: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        self.set_stock_level_impl(seller, id, stock_level).await
    }

    async fn count_products(&self, seller: SellerId) -> Result<u64, RepositoryError> {
        self.count_products_impl(seller).await
    }

    async fn count_products_below(
        &self,
        seller: SellerId,
        threshold: i32,
    ) -> Result<u64, RepositoryError> {
        self.count_products_below_impl(seller, threshold).await
    }

    async fn default_shipping_profile(
        &self,
        seller: SellerId,
    ) -> Result<Option<ShippingProfile>, RepositoryError> {
        self.default_shipping_profile_impl(seller).await
    }

    async fn save_shipping_profile(
        &self,
        profile: &ShippingProfile,
    ) -> Result<(), RepositoryError> {
        self.save_shipping_profile_impl(profile).await
    }

    async fn carrier_settings(
        &self,
        seller: SellerId,
    ) -> Result<Option<CarrierSettings>, RepositoryError> {
        self.carrier_settings_impl(seller).await
    }

    async fn save_carrier_settings(
        &self,
        settings: &CarrierSettings,
    ) -> Result<(), RepositoryError> {
        self.save_carrier_settings_impl(settings).await
    }

    async fn marketplace_credential(
        &self,
        seller: SellerId,
    ) -> Result<Option<MarketplaceCredential>, RepositoryError> {
        self.marketplace_credential_impl(seller).await
    }

    async fn save_marketplace_credential(
        &self,
        credential: &MarketplaceCredential,
    ) -> Result<(), RepositoryError> {
        self.save_marketplace_credential_impl(credential).await
    }
}
