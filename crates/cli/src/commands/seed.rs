//! Seed the database with demo data.
//!
//! Creates one seller with a known dev session token, six products, and six
//! orders (half pending, half shipped with labels). Intended for local
//! development against an empty database; running it twice upserts the same
//! rows.

use chrono::{Duration, TimeZone, Utc};
use tracing::info;
use uuid::Uuid;

use tiktokflow_core::{Order, OrderId, OrderStatus, Product, ProductId, SellerId, SkuId};
use tiktokflow_server::store::postgres::create_pool;
use tiktokflow_server::store::{DataStore, PgStore};

use super::CommandError;

/// Bearer token the seeded session answers to.
const DEV_SESSION_TOKEN: &str = "dev-session-token";

struct SeedOrder {
    id: &'static str,
    customer: &'static str,
    street: &'static str,
    city: &'static str,
    state: &'static str,
    zip: &'static str,
    product: &'static str,
    quantity: i32,
    date: (i32, u32, u32),
    label: Option<(&'static str, &'static str)>,
}

const ORDERS: &[SeedOrder] = &[
    SeedOrder {
        id: "ORD001",
        customer: "Sarah Johnson",
        street: "123 Main St",
        city: "New York",
        state: "NY",
        zip: "10001",
        product: "Wireless Earbuds",
        quantity: 2,
        date: (2024, 1, 15),
        label: None,
    },
    SeedOrder {
        id: "ORD002",
        customer: "Mike Chen",
        street: "456 Oak Ave",
        city: "Los Angeles",
        state: "CA",
        zip: "90210",
        product: "Phone Case",
        quantity: 1,
        date: (2024, 1, 14),
        label: Some(("https://example.com/label2", "TK1704892456")),
    },
    SeedOrder {
        id: "ORD003",
        customer: "Emily Davis",
        street: "789 Pine St",
        city: "Chicago",
        state: "IL",
        zip: "60601",
        product: "Laptop Stand",
        quantity: 1,
        date: (2024, 1, 13),
        label: None,
    },
    SeedOrder {
        id: "ORD004",
        customer: "Alex Rodriguez",
        street: "321 Elm Dr",
        city: "Miami",
        state: "FL",
        zip: "33101",
        product: "Bluetooth Speaker",
        quantity: 1,
        date: (2024, 1, 12),
        label: Some(("https://example.com/label4", "TK1704892789")),
    },
    SeedOrder {
        id: "ORD005",
        customer: "Jessica Wilson",
        street: "654 Maple Ln",
        city: "Seattle",
        state: "WA",
        zip: "98101",
        product: "Smart Watch Band",
        quantity: 3,
        date: (2024, 1, 11),
        label: None,
    },
    SeedOrder {
        id: "ORD006",
        customer: "David Brown",
        street: "987 Cedar Rd",
        city: "Austin",
        state: "TX",
        zip: "78701",
        product: "USB Cable",
        quantity: 2,
        date: (2024, 1, 10),
        label: Some(("https://example.com/label6", "TK1704893012")),
    },
];

const PRODUCTS: &[(&str, &str, &str, i32)] = &[
    ("PROD001", "Wireless Earbuds", "WE001", 45),
    ("PROD002", "Phone Case", "PC001", 23),
    ("PROD003", "Laptop Stand", "LS001", 8),
    ("PROD004", "Bluetooth Speaker", "BS001", 32),
    ("PROD005", "Smart Watch Band", "SWB001", 5),
    ("PROD006", "USB Cable", "UC001", 67),
];

/// Seed demo data for one seller.
///
/// # Errors
///
/// Returns an error if the database URL is missing or any insert fails.
pub async fn run(seller: Option<Uuid>) -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    let store = PgStore::new(pool.clone());

    let seller = SellerId::new(seller.unwrap_or_else(Uuid::new_v4));
    info!(%seller, "Seeding demo data");

    // Dev session, valid for 30 days. The sessions table is normally written
    // by the identity provider, so this goes through SQL directly.
    sqlx::query(
        r"
        INSERT INTO sessions (token, seller_id, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (token) DO UPDATE SET
            seller_id = excluded.seller_id,
            expires_at = excluded.expires_at
        ",
    )
    .bind(DEV_SESSION_TOKEN)
    .bind(seller)
    .bind(Utc::now() + Duration::days(30))
    .execute(&pool)
    .await?;

    let products: Vec<Product> = PRODUCTS
        .iter()
        .map(|&(id, name, sku, stock_level)| Product {
            id: ProductId::new(id),
            seller_id: seller,
            sku_id: SkuId::new(format!("SKU-{id}")),
            sku: sku.to_string(),
            name: name.to_string(),
            stock_level,
        })
        .collect();
    let product_count = store.upsert_products(&products).await?;

    let orders: Vec<Order> = ORDERS.iter().map(|seed| seed.to_order(seller)).collect();
    let order_count = store.upsert_orders(&orders).await?;

    info!(
        products = product_count,
        orders = order_count,
        token = DEV_SESSION_TOKEN,
        "Seed complete"
    );
    Ok(())
}

impl SeedOrder {
    fn to_order(&self, seller: SellerId) -> Order {
        let (year, month, day) = self.date;
        let address = serde_json::json!({
            "street1": self.street,
            "city": self.city,
            "state": self.state,
            "zip": self.zip,
            "country": "US",
        });

        Order {
            id: OrderId::new(self.id),
            seller_id: seller,
            customer_name: self.customer.to_string(),
            customer_email: None,
            customer_address: address.to_string(),
            product_id: None,
            product_name: self.product.to_string(),
            quantity: self.quantity,
            order_date: Utc
                .with_ymd_and_hms(year, month, day, 12, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            status: if self.label.is_some() {
                OrderStatus::Shipped
            } else {
                OrderStatus::Pending
            },
            shipping_label_url: self.label.map(|(url, _)| url.to_string()),
            tracking_number: self.label.map(|(_, tracking)| tracking.to_string()),
        }
    }
}
