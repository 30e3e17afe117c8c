//! Application state shared across handlers.

use std::sync::Arc;

use crate::carrier::CarrierGateway;
use crate::config::ServerConfig;
use crate::marketplace::MarketplaceGateway;
use crate::services::{
    InventoryService, OrderLifecycleService, ShippingConfigService,
};
use crate::store::DataStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// services and gateway implementations. Handlers go through the services;
/// only the marketplace connect route touches a gateway directly.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn DataStore>,
    marketplace: Arc<dyn MarketplaceGateway>,
    orders: OrderLifecycleService,
    inventory: InventoryService,
    shipping: ShippingConfigService,
}

impl AppState {
    /// Create a new application state, wiring the services to the supplied
    /// gateway implementations.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn DataStore>,
        carrier: Arc<dyn CarrierGateway>,
        marketplace: Arc<dyn MarketplaceGateway>,
    ) -> Self {
        let inventory = InventoryService::new(Arc::clone(&store), Arc::clone(&marketplace));
        let orders = OrderLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&carrier),
            Arc::clone(&marketplace),
            inventory.clone(),
        );
        let shipping = ShippingConfigService::new(Arc::clone(&store), Arc::clone(&carrier));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                marketplace,
                orders,
                inventory,
                shipping,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the data store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.inner.store
    }

    /// Get a reference to the marketplace gateway.
    #[must_use]
    pub fn marketplace(&self) -> &Arc<dyn MarketplaceGateway> {
        &self.inner.marketplace
    }

    /// Get a reference to the order lifecycle service.
    #[must_use]
    pub fn orders(&self) -> &OrderLifecycleService {
        &self.inner.orders
    }

    /// Get a reference to the inventory service.
    #[must_use]
    pub fn inventory(&self) -> &InventoryService {
        &self.inner.inventory
    }

    /// Get a reference to the shipping configuration service.
    #[must_use]
    pub fn shipping(&self) -> &ShippingConfigService {
        &self.inner.shipping
    }
}
