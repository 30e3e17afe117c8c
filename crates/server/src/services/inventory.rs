//! Inventory reconciliation.
//!
//! Keeps local stock aligned with the marketplace: a full product sync
//! treats marketplace stock as authoritative, while per-order decrements
//! flow the other way (local decrement first, then pushed to the shop).

use std::sync::Arc;

use tracing::{info, instrument, warn};

use tiktokflow_core::{Order, Product, ProductId, Session};

use crate::error::AppError;
use crate::marketplace::{MarketplaceGateway, MarketplacePageQuery};
use crate::store::{DataStore, Page, ProductQuery};

/// Stock level below which a product counts as low-stock.
const LOW_STOCK_THRESHOLD: i32 = 10;

/// Inventory roll-up for the dashboard.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InventoryStatistics {
    pub total_products: u64,
    /// Products with stock below [`LOW_STOCK_THRESHOLD`] (including zero).
    pub low_stock: u64,
    pub out_of_stock: u64,
    /// Top products by units sold, best first, at most five.
    pub top_sellers: Vec<crate::store::ProductSales>,
}

/// Inventory reconciliation service.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn DataStore>,
    marketplace: Arc<dyn MarketplaceGateway>,
}

impl InventoryService {
    /// Create a new inventory service.
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, marketplace: Arc<dyn MarketplaceGateway>) -> Self {
        Self { store, marketplace }
    }

    /// List the seller's products.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    pub async fn list_products(
        &self,
        session: Session,
        query: &ProductQuery,
    ) -> Result<Page<Product>, AppError> {
        Ok(self.store.list_products(session.seller_id, query).await?)
    }

    /// Pull the full product list from the marketplace and upsert it.
    ///
    /// Marketplace stock is authoritative: local stock levels are overwritten
    /// with whatever the shop reports. Idempotent; running it twice in a row
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// `ConfigurationMissing` if no shop is connected; marketplace or store
    /// errors otherwise.
    #[instrument(skip(self, session), fields(seller = %session.seller_id))]
    pub async fn sync_products(&self, session: Session) -> Result<u64, AppError> {
        let seller = session.seller_id;
        let credential =
            super::fresh_credential(self.store.as_ref(), self.marketplace.as_ref(), seller)
                .await?;

        let mut products = Vec::new();
        // Pagination is judged on wire items fetched, not on conversions:
        // SKU-less products are skipped and must not stall the page cursor.
        let mut fetched: u64 = 0;
        let mut query = MarketplacePageQuery::default();
        loop {
            let (wire, total) = self.marketplace.get_products(&credential, &query).await?;
            if wire.is_empty() {
                break;
            }
            fetched += wire.len() as u64;
            products.extend(
                wire.into_iter()
                    .filter_map(|product| product.into_product(seller)),
            );
            if fetched >= total {
                break;
            }
            query.page += 1;
        }

        let upserted = self.store.upsert_products(&products).await?;
        info!(upserted, "Product sync complete");
        Ok(upserted)
    }

    /// Reconcile stock for one newly-seen pending order.
    ///
    /// The order's product is matched by marketplace product id when the
    /// order carries one, falling back to exact name equality. An unmatched
    /// product triggers a full product re-sync instead of a decrement (the
    /// order references something we have never seen). Decrements clamp at
    /// zero; stock never goes negative.
    ///
    /// # Errors
    ///
    /// Returns error if the store or marketplace push fails.
    #[instrument(skip(self, session, order), fields(seller = %session.seller_id, order = %order.id))]
    pub async fn on_order_created(
        &self,
        session: Session,
        order: &Order,
    ) -> Result<(), AppError> {
        let seller = session.seller_id;

        let product = match &order.product_id {
            Some(id) => self.store.get_product(seller, id).await?,
            None => None,
        };
        let product = match product {
            Some(product) => Some(product),
            None => {
                self.store
                    .find_product_by_name(seller, &order.product_name)
                    .await?
            }
        };

        let Some(product) = product else {
            warn!(
                product_name = %order.product_name,
                "Order references unknown product, re-syncing catalog"
            );
            self.sync_products(session).await?;
            return Ok(());
        };

        let new_stock = (product.stock_level - order.quantity).max(0);
        self.set_and_push(session, &product, new_stock).await?;
        Ok(())
    }

    /// Manually set a product's stock level (restock or correction).
    ///
    /// # Errors
    ///
    /// `BadRequest` for negative stock, `NotFound` for an unknown product;
    /// store or marketplace errors otherwise.
    #[instrument(skip(self, session), fields(seller = %session.seller_id))]
    pub async fn update_stock(
        &self,
        session: Session,
        product_id: &ProductId,
        stock_level: i32,
    ) -> Result<Product, AppError> {
        if stock_level < 0 {
            return Err(AppError::BadRequest(
                "stock level cannot be negative".to_string(),
            ));
        }

        let product = self
            .store
            .get_product(session.seller_id, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

        self.set_and_push(session, &product, stock_level).await
    }

    /// Inventory roll-up for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns error if any store query fails.
    pub async fn inventory_statistics(
        &self,
        session: Session,
    ) -> Result<InventoryStatistics, AppError> {
        let seller = session.seller_id;
        let total_products = self.store.count_products(seller).await?;
        let low_stock = self
            .store
            .count_products_below(seller, LOW_STOCK_THRESHOLD)
            .await?;
        let out_of_stock = self.store.count_products_below(seller, 1).await?;

        let mut top_sellers = self.store.product_sales(seller).await?;
        top_sellers.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        top_sellers.truncate(5);

        Ok(InventoryStatistics {
            total_products,
            low_stock,
            out_of_stock,
            top_sellers,
        })
    }

    /// Persist a stock level, then push it to the marketplace.
    ///
    /// Local persistence comes first; if the push fails the local value
    /// stands and the error surfaces to the caller.
    async fn set_and_push(
        &self,
        session: Session,
        product: &Product,
        stock_level: i32,
    ) -> Result<Product, AppError> {
        let seller = session.seller_id;
        let updated = self
            .store
            .set_stock_level(seller, &product.id, stock_level)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", product.id)))?;

        let credential =
            super::fresh_credential(self.store.as_ref(), self.marketplace.as_ref(), seller)
                .await?;
        self.marketplace
            .update_inventory(&credential, &updated.id, &updated.sku_id, updated.stock_level)
            .await?;

        info!(product = %updated.id, stock = updated.stock_level, "Stock level updated");
        Ok(updated)
    }
}
