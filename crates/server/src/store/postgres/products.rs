//! Product table operations.

use sqlx::FromRow;

use tiktokflow_core::{Product, ProductId, SellerId, SkuId};

use super::PgStore;
use crate::store::{Page, ProductQuery, RepositoryError, SortDirection};

#[derive(FromRow)]
struct ProductRow {
    product_id: ProductId,
    seller_id: SellerId,
    sku_id: SkuId,
    sku: String,
    name: String,
    stock_level: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.product_id,
            seller_id: row.seller_id,
            sku_id: row.sku_id,
            sku: row.sku,
            name: row.name,
            stock_level: row.stock_level,
        }
    }
}

const PRODUCT_COLUMNS: &str = "product_id, seller_id, sku_id, sku, name, stock_level";

impl PgStore {
    pub(super) async fn list_products_impl(
        &self,
        seller: SellerId,
        query: &ProductQuery,
    ) -> Result<Page<Product>, RepositoryError> {
        let search = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));
        let offset = i64::from(query.page.saturating_sub(1)) * i64::from(query.per_page);
        let direction = match query.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE seller_id = $1 AND ($2::text IS NULL OR name ILIKE $2) \
             ORDER BY name {direction} LIMIT $3 OFFSET $4"
        );

        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(seller)
            .bind(&search)
            .bind(i64::from(query.per_page))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products \
             WHERE seller_id = $1 AND ($2::text IS NULL OR name ILIKE $2)",
        )
        .bind(seller)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page {
            items: rows.into_iter().map(Product::from).collect(),
            total: total.unsigned_abs(),
            page: query.page,
            per_page: query.per_page,
        })
    }

    pub(super) async fn get_product_impl(
        &self,
        seller: SellerId,
        id: &ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 AND product_id = $2"
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(seller)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    pub(super) async fn find_product_by_name_impl(
        &self,
        seller: SellerId,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE seller_id = $1 AND name = $2 LIMIT 1"
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(seller)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    pub(super) async fn upsert_products_impl(
        &self,
        products: &[Product],
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for product in products {
            let result = sqlx::query(
                "INSERT INTO products (seller_id, product_id, sku_id, sku, name, stock_level) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 ON CONFLICT (seller_id, product_id) DO UPDATE SET \
                     sku_id = excluded.sku_id, \
                     sku = excluded.sku, \
                     name = excluded.name, \
                     stock_level = excluded.stock_level",
            )
            .bind(product.seller_id)
            .bind(&product.id)
            .bind(&product.sku_id)
            .bind(&product.sku)
            .bind(&product.name)
            .bind(product.stock_level)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }

    pub(super) async fn set_stock_level_impl(
        &self,
        seller: SellerId,
        id: &ProductId,
        stock_level: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "UPDATE products SET stock_level = $3 \
             WHERE seller_id = $1 AND product_id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(seller)
            .bind(id)
            .bind(stock_level)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    pub(super) async fn count_products_impl(
        &self,
        seller: SellerId,
    ) -> Result<u64, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE seller_id = $1")
            .bind(seller)
            .fetch_one(&self.pool)
            .await?;
        Ok(total.unsigned_abs())
    }

    pub(super) async fn count_products_below_impl(
        &self,
        seller: SellerId,
        threshold: i32,
    ) -> Result<u64, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE seller_id = $1 AND stock_level < $2",
        )
        .bind(seller)
        .bind(threshold)
        .fetch_one(&self.pool)
        .await?;
        Ok(total.unsigned_abs())
    }
}
