//! Order table operations.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use tiktokflow_core::{Order, OrderId, OrderStatus, ProductId, SellerId};

use super::PgStore;
use crate::store::{OrderQuery, OrderSort, Page, ProductSales, RepositoryError, SortDirection};

#[derive(FromRow)]
struct OrderRow {
    order_id: OrderId,
    seller_id: SellerId,
    customer_name: String,
    customer_email: Option<String>,
    customer_address: String,
    product_id: Option<ProductId>,
    product_name: String,
    quantity: i32,
    order_date: DateTime<Utc>,
    status: String,
    shipping_label_url: Option<String>,
    tracking_number: Option<String>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&row.status).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        Ok(Self {
            id: row.order_id,
            seller_id: row.seller_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_address: row.customer_address,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            order_date: row.order_date,
            status,
            shipping_label_url: row.shipping_label_url,
            tracking_number: row.tracking_number,
        })
    }
}

const ORDER_COLUMNS: &str = "order_id, seller_id, customer_name, customer_email, \
     customer_address, product_id, product_name, quantity, order_date, status, \
     shipping_label_url, tracking_number";

const fn sort_column(sort: OrderSort) -> &'static str {
    match sort {
        OrderSort::OrderDate => "order_date",
        OrderSort::Status => "status",
        OrderSort::CustomerName => "customer_name",
    }
}

const fn sort_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

impl PgStore {
    pub(super) async fn list_orders_impl(
        &self,
        seller: SellerId,
        query: &OrderQuery,
    ) -> Result<Page<Order>, RepositoryError> {
        let status = query.status.map(|s| s.as_str().to_string());
        let offset = i64::from(query.page.saturating_sub(1)) * i64::from(query.per_page);

        // Sort column and direction come from closed enums, never user text.
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE seller_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY {} {} LIMIT $3 OFFSET $4",
            sort_column(query.sort),
            sort_keyword(query.direction),
        );

        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(seller)
            .bind(&status)
            .bind(i64::from(query.per_page))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders \
             WHERE seller_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(seller)
        .bind(&status)
        .fetch_one(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total: total.unsigned_abs(),
            page: query.page,
            per_page: query.per_page,
        })
    }

    pub(super) async fn get_order_impl(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE seller_id = $1 AND order_id = $2"
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(seller)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    pub(super) async fn upsert_orders_impl(&self, orders: &[Order]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for order in orders {
            // Sync never regresses a locally shipped (or in-generation) order
            // back to pending, and never clears a recorded label.
            let result = sqlx::query(
                "INSERT INTO orders (seller_id, order_id, customer_name, customer_email, \
                     customer_address, product_id, product_name, quantity, order_date, status, \
                     shipping_label_url, tracking_number) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
                 ON CONFLICT (seller_id, order_id) DO UPDATE SET \
                     customer_name = excluded.customer_name, \
                     customer_email = excluded.customer_email, \
                     customer_address = excluded.customer_address, \
                     product_id = excluded.product_id, \
                     product_name = excluded.product_name, \
                     quantity = excluded.quantity, \
                     order_date = excluded.order_date, \
                     status = CASE \
                         WHEN orders.status IN ('generating', 'shipped') \
                              AND excluded.status = 'pending' THEN orders.status \
                         ELSE excluded.status END, \
                     shipping_label_url = COALESCE(excluded.shipping_label_url, orders.shipping_label_url), \
                     tracking_number = COALESCE(excluded.tracking_number, orders.tracking_number)",
            )
            .bind(order.seller_id)
            .bind(&order.id)
            .bind(&order.customer_name)
            .bind(&order.customer_email)
            .bind(&order.customer_address)
            .bind(&order.product_id)
            .bind(&order.product_name)
            .bind(order.quantity)
            .bind(order.order_date)
            .bind(order.status.as_str())
            .bind(&order.shipping_label_url)
            .bind(&order.tracking_number)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }

    pub(super) async fn claim_pending_order_impl(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "UPDATE orders SET status = 'generating' \
             WHERE seller_id = $1 AND order_id = $2 AND status = 'pending' \
             RETURNING {ORDER_COLUMNS}"
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(seller)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    pub(super) async fn release_order_claim_impl(
        &self,
        seller: SellerId,
        id: &OrderId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE orders SET status = 'pending' \
             WHERE seller_id = $1 AND order_id = $2 AND status = 'generating'",
        )
        .bind(seller)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub(super) async fn mark_order_shipped_impl(
        &self,
        seller: SellerId,
        id: &OrderId,
        label_url: &str,
        tracking_number: &str,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "UPDATE orders SET status = 'shipped', shipping_label_url = $3, tracking_number = $4 \
             WHERE seller_id = $1 AND order_id = $2 \
             RETURNING {ORDER_COLUMNS}"
        );
        let row: OrderRow = sqlx::query_as(&sql)
            .bind(seller)
            .bind(id)
            .bind(label_url)
            .bind(tracking_number)
            .fetch_one(&self.pool)
            .await?;
        Order::try_from(row)
    }

    pub(super) async fn count_orders_impl(
        &self,
        seller: SellerId,
        status: Option<OrderStatus>,
    ) -> Result<u64, RepositoryError> {
        let status = status.map(|s| s.as_str().to_string());
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders \
             WHERE seller_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(seller)
        .bind(&status)
        .fetch_one(&self.pool)
        .await?;
        Ok(total.unsigned_abs())
    }

    pub(super) async fn order_dates_since_impl(
        &self,
        seller: SellerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        let dates: Vec<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT order_date FROM orders \
             WHERE seller_id = $1 AND order_date >= $2 \
             ORDER BY order_date ASC",
        )
        .bind(seller)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(dates)
    }

    pub(super) async fn product_sales_impl(
        &self,
        seller: SellerId,
    ) -> Result<Vec<ProductSales>, RepositoryError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT product_name, SUM(quantity)::bigint FROM orders \
             WHERE seller_id = $1 GROUP BY product_name",
        )
        .bind(seller)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(product_name, quantity)| ProductSales {
                product_name,
                quantity,
            })
            .collect())
    }
}
