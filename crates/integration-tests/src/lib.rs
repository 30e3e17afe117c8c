//! Integration test harness.
//!
//! Provides in-memory implementations of the three gateway contracts
//! (`DataStore`, `CarrierGateway`, `MarketplaceGateway`) plus a
//! [`TestContext`] that wires them into the real services, so the tests in
//! `tests/` exercise the production orchestration end to end without a
//! database or network.
//!
//! The in-memory store mirrors the semantics the Postgres implementation
//! guarantees: atomic `Pending -> Generating` claims, and an order upsert
//! that never regresses a locally `Generating`/`Shipped` order back to
//! `Pending` and never clears a stored label.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use tiktokflow_core::{
    CarrierAddressId, CarrierSettings, MarketplaceCredential, MarketplaceOrderStatus, Order,
    OrderId, OrderStatus, PostalAddress, Product, ProductId, RateId, SellerId, Session,
    ShippingProfile, ShopId, SkuId, TransactionId,
};
use tiktokflow_server::carrier::{
    CarrierError, CarrierGateway, Parcel, PurchasedLabel, Rate, ShipmentAddress, TrackingStatus,
};
use tiktokflow_server::marketplace::{
    MarketplaceError, MarketplaceGateway, MarketplaceOrder, MarketplacePageQuery,
    MarketplaceProduct,
};
use tiktokflow_server::services::{
    InventoryService, OrderLifecycleService, ShippingConfigService,
};
use tiktokflow_server::store::{
    DataStore, OrderQuery, OrderSort, Page, ProductQuery, ProductSales, RepositoryError,
    SortDirection,
};

// =============================================================================
// In-memory data store
// =============================================================================

#[derive(Default)]
struct MemState {
    sessions: HashMap<String, Session>,
    orders: HashMap<OrderId, Order>,
    products: HashMap<ProductId, Product>,
    profiles: Vec<ShippingProfile>,
    carrier_settings: Option<CarrierSettings>,
    credential: Option<MarketplaceCredential>,
}

/// In-memory [`DataStore`].
///
/// Single-seller by construction; the seller id on incoming rows is stored
/// but not used for scoping.
#[derive(Default)]
pub struct MemStore {
    state: Mutex<MemState>,
    /// When set, `mark_order_shipped` fails, simulating a persistence
    /// failure after a successful purchase.
    pub fail_mark_shipped: AtomicBool,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_session(&self, token: &str, session: Session) {
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(token.to_string(), session);
    }

    pub fn insert_order(&self, order: Order) {
        self.state.lock().unwrap().orders.insert(order.id.clone(), order);
    }

    pub fn insert_product(&self, product: Product) {
        self.state
            .lock()
            .unwrap()
            .products
            .insert(product.id.clone(), product);
    }

    pub fn insert_profile(&self, profile: ShippingProfile) {
        self.state.lock().unwrap().profiles.push(profile);
    }

    pub fn insert_carrier_settings(&self, settings: CarrierSettings) {
        self.state.lock().unwrap().carrier_settings = Some(settings);
    }

    pub fn insert_credential(&self, credential: MarketplaceCredential) {
        self.state.lock().unwrap().credential = Some(credential);
    }

    /// Snapshot an order for assertions.
    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<Order> {
        self.state.lock().unwrap().orders.get(id).cloned()
    }

    /// Snapshot a product for assertions.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.state.lock().unwrap().products.get(id).cloned()
    }

    /// Snapshot the stored credential for assertions.
    #[must_use]
    pub fn credential(&self) -> Option<MarketplaceCredential> {
        self.state.lock().unwrap().credential.clone()
    }
}

/// Mirror the `orders` table CHECK constraints so writes that Postgres would
/// reject fail here too.
fn check_order_row(order: &Order) -> Result<(), RepositoryError> {
    if order.quantity <= 0 {
        return Err(RepositoryError::DataCorruption(format!(
            "order {} violates quantity > 0",
            order.id
        )));
    }
    if order.shipping_label_url.is_some() != order.tracking_number.is_some() {
        return Err(RepositoryError::DataCorruption(format!(
            "order {} has a label URL without a tracking number or vice versa",
            order.id
        )));
    }
    Ok(())
}

#[async_trait]
impl DataStore for MemStore {
    async fn session(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .sessions
            .get(token)
            .filter(|session| !session.is_expired(Utc::now()))
            .copied())
    }

    async fn list_orders(
        &self,
        _seller: SellerId,
        query: &OrderQuery,
    ) -> Result<Page<Order>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| query.status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();

        orders.sort_by(|a, b| {
            let ordering = match query.sort {
                OrderSort::OrderDate => a.order_date.cmp(&b.order_date),
                OrderSort::Status => a.status.as_str().cmp(b.status.as_str()),
                OrderSort::CustomerName => a.customer_name.cmp(&b.customer_name),
            };
            match query.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = orders.len() as u64;
        let offset = ((query.page - 1) * query.per_page) as usize;
        let items = orders
            .into_iter()
            .skip(offset)
            .take(query.per_page as usize)
            .collect();
        Ok(Page {
            items,
            total,
            page: query.page,
            per_page: query.per_page,
        })
    }

    async fn get_order(
        &self,
        _seller: SellerId,
        id: &OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        Ok(self.state.lock().unwrap().orders.get(id).cloned())
    }

    async fn upsert_orders(&self, orders: &[Order]) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        for incoming in orders {
            match state.orders.get_mut(&incoming.id) {
                Some(existing) => {
                    let mut merged = incoming.clone();
                    // Same no-regress rules as the SQL upsert.
                    if matches!(
                        existing.status,
                        OrderStatus::Generating | OrderStatus::Shipped
                    ) && merged.status == OrderStatus::Pending
                    {
                        merged.status = existing.status;
                    }
                    if merged.shipping_label_url.is_none() {
                        merged.shipping_label_url = existing.shipping_label_url.clone();
                    }
                    if merged.tracking_number.is_none() {
                        merged.tracking_number = existing.tracking_number.clone();
                    }
                    check_order_row(&merged)?;
                    *existing = merged;
                }
                None => {
                    check_order_row(incoming)?;
                    state.orders.insert(incoming.id.clone(), incoming.clone());
                }
            }
        }
        Ok(orders.len() as u64)
    }

    async fn claim_pending_order(
        &self,
        _seller: SellerId,
        id: &OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        match state.orders.get_mut(id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Generating;
                Ok(Some(order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn release_order_claim(
        &self,
        _seller: SellerId,
        id: &OrderId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if let Some(order) = state.orders.get_mut(id) {
            if order.status == OrderStatus::Generating {
                order.status = OrderStatus::Pending;
            }
        }
        Ok(())
    }

    async fn mark_order_shipped(
        &self,
        _seller: SellerId,
        id: &OrderId,
        label_url: &str,
        tracking_number: &str,
    ) -> Result<Order, RepositoryError> {
        if self.fail_mark_shipped.load(Ordering::SeqCst) {
            return Err(RepositoryError::DataCorruption(
                "simulated persistence failure".to_string(),
            ));
        }
        let mut state = self.state.lock().unwrap();
        let order = state
            .orders
            .get_mut(id)
            .ok_or_else(|| RepositoryError::DataCorruption(format!("no order {id}")))?;
        order.status = OrderStatus::Shipped;
        order.shipping_label_url = Some(label_url.to_string());
        order.tracking_number = Some(tracking_number.to_string());
        Ok(order.clone())
    }

    async fn count_orders(
        &self,
        _seller: SellerId,
        status: Option<OrderStatus>,
    ) -> Result<u64, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .values()
            .filter(|order| status.is_none_or(|status| order.status == status))
            .count() as u64)
    }

    async fn order_dates_since(
        &self,
        _seller: SellerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .values()
            .map(|order| order.order_date)
            .filter(|date| *date >= since)
            .collect())
    }

    async fn product_sales(&self, _seller: SellerId) -> Result<Vec<ProductSales>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut by_name: HashMap<String, i64> = HashMap::new();
        for order in state.orders.values() {
            *by_name.entry(order.product_name.clone()).or_insert(0) += i64::from(order.quantity);
        }
        Ok(by_name
            .into_iter()
            .map(|(product_name, quantity)| ProductSales {
                product_name,
                quantity,
            })
            .collect())
    }

    async fn list_products(
        &self,
        _seller: SellerId,
        query: &ProductQuery,
    ) -> Result<Page<Product>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| {
                needle
                    .as_deref()
                    .is_none_or(|needle| product.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| match query.direction {
            SortDirection::Asc => a.name.cmp(&b.name),
            SortDirection::Desc => b.name.cmp(&a.name),
        });

        let total = products.len() as u64;
        let offset = ((query.page - 1) * query.per_page) as usize;
        let items = products
            .into_iter()
            .skip(offset)
            .take(query.per_page as usize)
            .collect();
        Ok(Page {
            items,
            total,
            page: query.page,
            per_page: query.per_page,
        })
    }

    async fn get_product(
        &self,
        _seller: SellerId,
        id: &ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        Ok(self.state.lock().unwrap().products.get(id).cloned())
    }

    async fn find_product_by_name(
        &self,
        _seller: SellerId,
        name: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .values()
            .find(|product| product.name == name)
            .cloned())
    }

    async fn upsert_products(&self, products: &[Product]) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        for product in products {
            state.products.insert(product.id.clone(), product.clone());
        }
        Ok(products.len() as u64)
    }

    async fn set_stock_level(
        &self,
        _seller: SellerId,
        id: &ProductId,
        stock_level: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.products.get_mut(id).map(|product| {
            product.stock_level = stock_level;
            product.clone()
        }))
    }

    async fn count_products(&self, _seller: SellerId) -> Result<u64, RepositoryError> {
        Ok(self.state.lock().unwrap().products.len() as u64)
    }

    async fn count_products_below(
        &self,
        _seller: SellerId,
        threshold: i32,
    ) -> Result<u64, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .values()
            .filter(|product| product.stock_level < threshold)
            .count() as u64)
    }

    async fn default_shipping_profile(
        &self,
        _seller: SellerId,
    ) -> Result<Option<ShippingProfile>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .iter()
            .find(|profile| profile.is_default)
            .cloned())
    }

    async fn save_shipping_profile(
        &self,
        profile: &ShippingProfile,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if profile.is_default {
            for existing in &mut state.profiles {
                existing.is_default = false;
            }
        }
        state.profiles.retain(|existing| existing.name != profile.name);
        state.profiles.push(profile.clone());
        Ok(())
    }

    async fn carrier_settings(
        &self,
        _seller: SellerId,
    ) -> Result<Option<CarrierSettings>, RepositoryError> {
        Ok(self.state.lock().unwrap().carrier_settings.clone())
    }

    async fn save_carrier_settings(
        &self,
        settings: &CarrierSettings,
    ) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().carrier_settings = Some(settings.clone());
        Ok(())
    }

    async fn marketplace_credential(
        &self,
        _seller: SellerId,
    ) -> Result<Option<MarketplaceCredential>, RepositoryError> {
        Ok(self.state.lock().unwrap().credential.clone())
    }

    async fn save_marketplace_credential(
        &self,
        credential: &MarketplaceCredential,
    ) -> Result<(), RepositoryError> {
        self.state.lock().unwrap().credential = Some(credential.clone());
        Ok(())
    }
}

// =============================================================================
// Stub carrier
// =============================================================================

/// Scripted [`CarrierGateway`] that records its calls.
pub struct StubCarrier {
    /// Rates returned by `create_shipment`.
    pub rates: Mutex<Vec<Rate>>,
    /// When set, `create_shipment` fails.
    pub fail_shipment: AtomicBool,
    /// When set, `purchase_label` fails.
    pub fail_purchase: AtomicBool,
    pub shipment_calls: AtomicU32,
    pub purchase_calls: AtomicU32,
    pub refund_calls: AtomicU32,
    /// Rate ids purchased, in order.
    pub purchased: Mutex<Vec<RateId>>,
}

impl Default for StubCarrier {
    fn default() -> Self {
        Self {
            rates: Mutex::new(vec![rate("r1", "12.00"), rate("r2", "9.50")]),
            fail_shipment: AtomicBool::new(false),
            fail_purchase: AtomicBool::new(false),
            shipment_calls: AtomicU32::new(0),
            purchase_calls: AtomicU32::new(0),
            refund_calls: AtomicU32::new(0),
            purchased: Mutex::new(Vec::new()),
        }
    }
}

impl StubCarrier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rates(&self, rates: Vec<Rate>) {
        *self.rates.lock().unwrap() = rates;
    }

    /// Total carrier API calls of any kind.
    #[must_use]
    pub fn total_calls(&self) -> u32 {
        self.shipment_calls.load(Ordering::SeqCst)
            + self.purchase_calls.load(Ordering::SeqCst)
            + self.refund_calls.load(Ordering::SeqCst)
    }
}

/// Build a rate with the given id and amount.
#[must_use]
pub fn rate(id: &str, amount: &str) -> Rate {
    Rate {
        id: RateId::new(id),
        amount: amount.to_string(),
        currency: "USD".to_string(),
        provider: "USPS".to_string(),
        servicelevel_name: Some("Priority".to_string()),
        estimated_days: Some(2),
    }
}

#[async_trait]
impl CarrierGateway for StubCarrier {
    async fn validate_api_key(&self, api_key: &str) -> Result<bool, CarrierError> {
        Ok(api_key.starts_with("shippo_"))
    }

    async fn create_address(
        &self,
        _api_key: &str,
        _name: &str,
        _company: Option<&str>,
        _address: &PostalAddress,
    ) -> Result<CarrierAddressId, CarrierError> {
        Ok(CarrierAddressId::new("addr-1"))
    }

    async fn create_shipment(
        &self,
        _api_key: &str,
        _from: &ShipmentAddress,
        _to: &ShipmentAddress,
        _parcel: &Parcel,
    ) -> Result<Vec<Rate>, CarrierError> {
        self.shipment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_shipment.load(Ordering::SeqCst) {
            return Err(CarrierError::Api {
                status: 500,
                message: "shipment failed".to_string(),
            });
        }
        Ok(self.rates.lock().unwrap().clone())
    }

    async fn purchase_label(
        &self,
        _api_key: &str,
        rate_id: &RateId,
    ) -> Result<PurchasedLabel, CarrierError> {
        self.purchase_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_purchase.load(Ordering::SeqCst) {
            return Err(CarrierError::Api {
                status: 500,
                message: "purchase failed".to_string(),
            });
        }
        self.purchased.lock().unwrap().push(rate_id.clone());
        Ok(PurchasedLabel {
            transaction_id: TransactionId::new(format!("txn-{rate_id}")),
            label_url: format!("https://labels.test/{rate_id}.pdf"),
            tracking_number: format!("TRK-{rate_id}"),
        })
    }

    async fn refund_label(
        &self,
        _api_key: &str,
        _transaction_id: &TransactionId,
    ) -> Result<(), CarrierError> {
        self.refund_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn track(
        &self,
        _api_key: &str,
        _carrier: &str,
        tracking_number: &str,
    ) -> Result<TrackingStatus, CarrierError> {
        Ok(TrackingStatus {
            status: "TRANSIT".to_string(),
            status_details: Some(format!("tracking {tracking_number}")),
        })
    }
}

// =============================================================================
// Stub marketplace
// =============================================================================

/// Scripted [`MarketplaceGateway`] that records its calls.
#[derive(Default)]
pub struct StubMarketplace {
    /// Wire orders returned by `get_orders` (single page).
    pub orders: Mutex<Vec<MarketplaceOrder>>,
    /// Wire products returned by `get_products` (single page).
    pub products: Mutex<Vec<MarketplaceProduct>>,
    pub refresh_calls: AtomicU32,
    pub product_fetches: AtomicU32,
    /// `(order_id, status, tracking)` pushes, in order.
    pub status_pushes: Mutex<Vec<(OrderId, MarketplaceOrderStatus, Option<String>)>>,
    /// `(product_id, sku_id, quantity)` pushes, in order.
    pub inventory_pushes: Mutex<Vec<(ProductId, SkuId, i32)>>,
}

impl StubMarketplace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_orders(&self, orders: serde_json::Value) {
        *self.orders.lock().unwrap() = serde_json::from_value(orders).unwrap();
    }

    pub fn set_products(&self, products: serde_json::Value) {
        *self.products.lock().unwrap() = serde_json::from_value(products).unwrap();
    }
}

#[async_trait]
impl MarketplaceGateway for StubMarketplace {
    async fn connect_shop(
        &self,
        _auth_code: &str,
        seller: SellerId,
    ) -> Result<MarketplaceCredential, MarketplaceError> {
        Ok(credential(seller, Utc::now() + Duration::hours(1)))
    }

    async fn refresh_credentials(
        &self,
        credential: &MarketplaceCredential,
    ) -> Result<MarketplaceCredential, MarketplaceError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Ok(MarketplaceCredential {
            access_token: format!("{}-rotated", credential.access_token),
            refresh_token: format!("{}-rotated", credential.refresh_token),
            expires_at: Utc::now() + Duration::hours(1),
            ..credential.clone()
        })
    }

    async fn get_orders(
        &self,
        _credential: &MarketplaceCredential,
        _query: &MarketplacePageQuery,
    ) -> Result<(Vec<MarketplaceOrder>, u64), MarketplaceError> {
        let orders = self.orders.lock().unwrap().clone();
        let total = orders.len() as u64;
        Ok((orders, total))
    }

    async fn get_products(
        &self,
        _credential: &MarketplaceCredential,
        _query: &MarketplacePageQuery,
    ) -> Result<(Vec<MarketplaceProduct>, u64), MarketplaceError> {
        self.product_fetches.fetch_add(1, Ordering::SeqCst);
        let products = self.products.lock().unwrap().clone();
        let total = products.len() as u64;
        Ok((products, total))
    }

    async fn update_order_status(
        &self,
        _credential: &MarketplaceCredential,
        order_id: &OrderId,
        status: MarketplaceOrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<(), MarketplaceError> {
        self.status_pushes.lock().unwrap().push((
            order_id.clone(),
            status,
            tracking_number.map(str::to_string),
        ));
        Ok(())
    }

    async fn update_inventory(
        &self,
        _credential: &MarketplaceCredential,
        product_id: &ProductId,
        sku_id: &SkuId,
        quantity: i32,
    ) -> Result<(), MarketplaceError> {
        self.inventory_pushes
            .lock()
            .unwrap()
            .push((product_id.clone(), sku_id.clone(), quantity));
        Ok(())
    }
}

// =============================================================================
// Fixtures and context
// =============================================================================

/// A credential with the given expiry.
#[must_use]
pub fn credential(seller: SellerId, expires_at: DateTime<Utc>) -> MarketplaceCredential {
    MarketplaceCredential {
        seller_id: seller,
        shop_id: ShopId::new("shop-1"),
        seller_name: "Test Seller".to_string(),
        access_token: "at-1".to_string(),
        refresh_token: "rt-1".to_string(),
        expires_at,
    }
}

/// A pending order with a parseable customer address.
#[must_use]
pub fn pending_order(seller: SellerId, id: &str) -> Order {
    Order {
        id: OrderId::new(id),
        seller_id: seller,
        customer_name: "Sarah Johnson".to_string(),
        customer_email: Some("sarah@example.com".to_string()),
        customer_address: serde_json::json!({
            "street1": "123 Main St",
            "city": "New York",
            "state": "NY",
            "zip": "10001",
            "country": "US",
        })
        .to_string(),
        product_id: Some(ProductId::new("P1")),
        product_name: "Wireless Earbuds".to_string(),
        quantity: 2,
        order_date: Utc::now(),
        status: OrderStatus::Pending,
        shipping_label_url: None,
        tracking_number: None,
    }
}

/// A product owned by `seller`.
#[must_use]
pub fn product(seller: SellerId, id: &str, name: &str, stock_level: i32) -> Product {
    Product {
        id: ProductId::new(id),
        seller_id: seller,
        sku_id: SkuId::new(format!("sku-{id}")),
        sku: format!("SKU-{id}"),
        name: name.to_string(),
        stock_level,
    }
}

/// A default ship-from profile.
#[must_use]
pub fn default_profile(seller: SellerId) -> ShippingProfile {
    ShippingProfile {
        seller_id: seller,
        carrier_address_id: None,
        name: "Warehouse".to_string(),
        company: Some("TikTokFlow Test Co".to_string()),
        address: PostalAddress {
            street1: "1 Depot Way".to_string(),
            street2: None,
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip: "78701".to_string(),
            country: "US".to_string(),
            phone: None,
            email: None,
        },
        is_default: true,
    }
}

/// Real services wired to in-memory fakes.
pub struct TestContext {
    pub seller: SellerId,
    pub session: Session,
    pub store: Arc<MemStore>,
    pub carrier: Arc<StubCarrier>,
    pub marketplace: Arc<StubMarketplace>,
    pub orders: OrderLifecycleService,
    pub inventory: InventoryService,
    pub shipping: ShippingConfigService,
}

impl TestContext {
    /// A context with a connected shop, default profile, and carrier key,
    /// ready for label generation.
    #[must_use]
    pub fn configured() -> Self {
        let ctx = Self::bare();
        ctx.store.insert_profile(default_profile(ctx.seller));
        ctx.store.insert_carrier_settings(CarrierSettings {
            seller_id: ctx.seller,
            api_key: "shippo_test_key".to_string(),
        });
        ctx.store
            .insert_credential(credential(ctx.seller, Utc::now() + Duration::hours(1)));
        ctx
    }

    /// A context with no shipping profile, carrier key, or shop connection.
    #[must_use]
    pub fn bare() -> Self {
        let seller = SellerId::new(Uuid::new_v4());
        let session = Session {
            seller_id: seller,
            expires_at: Utc::now() + Duration::hours(1),
        };

        let store = Arc::new(MemStore::new());
        let carrier = Arc::new(StubCarrier::new());
        let marketplace = Arc::new(StubMarketplace::new());

        let store_dyn: Arc<dyn DataStore> = Arc::clone(&store) as _;
        let carrier_dyn: Arc<dyn CarrierGateway> = Arc::clone(&carrier) as _;
        let marketplace_dyn: Arc<dyn MarketplaceGateway> = Arc::clone(&marketplace) as _;

        let inventory =
            InventoryService::new(Arc::clone(&store_dyn), Arc::clone(&marketplace_dyn));
        let orders = OrderLifecycleService::new(
            Arc::clone(&store_dyn),
            Arc::clone(&carrier_dyn),
            Arc::clone(&marketplace_dyn),
            inventory.clone(),
        );
        let shipping = ShippingConfigService::new(Arc::clone(&store_dyn), carrier_dyn);

        Self {
            seller,
            session,
            store,
            carrier,
            marketplace,
            orders,
            inventory,
            shipping,
        }
    }
}
