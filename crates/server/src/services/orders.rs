//! Order lifecycle orchestration.
//!
//! Owns the `Pending -> Generating -> Shipped` label workflow and the
//! marketplace order sync. Label generation is guarded by a per-order
//! claim taken in the store before any carrier traffic: the compare-and-swap
//! to `Generating` is the only thing that admits an order into the carrier
//! path, so two concurrent requests for the same order cannot both purchase.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use tiktokflow_core::{Order, OrderId, OrderStatus, PostalAddress, SellerId, Session};

use crate::carrier::{CarrierGateway, Parcel, PurchasedLabel, Rate, ShipmentAddress};
use crate::error::AppError;
use crate::marketplace::{MarketplaceGateway, MarketplacePageQuery};
use crate::store::{DataStore, OrderQuery, Page};

use super::InventoryService;

/// Result of one marketplace order sync.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncSummary {
    /// Orders fetched from the marketplace.
    pub fetched: u64,
    /// Orders written to the store.
    pub upserted: u64,
    /// Orders seen for the first time in `Pending` state (these fed
    /// inventory reconciliation).
    pub new_pending: u64,
}

/// Order roll-up for the dashboard.
///
/// Counts degrade to zero individually if their query fails; the dashboard
/// always gets a complete shape.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OrderStatistics {
    pub total_orders: u64,
    pub pending: u64,
    pub shipped: u64,
    /// Orders per day over the last 30 days, oldest first, zero-filled.
    pub trend: Vec<DailyOrders>,
}

/// Orders created on one day.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DailyOrders {
    pub date: NaiveDate,
    pub count: u64,
}

/// Outcome of one order in a batch label run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchLabelOutcome {
    pub order_id: OrderId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Order lifecycle service.
#[derive(Clone)]
pub struct OrderLifecycleService {
    store: Arc<dyn DataStore>,
    carrier: Arc<dyn CarrierGateway>,
    marketplace: Arc<dyn MarketplaceGateway>,
    inventory: InventoryService,
}

impl OrderLifecycleService {
    /// Create a new order lifecycle service.
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        carrier: Arc<dyn CarrierGateway>,
        marketplace: Arc<dyn MarketplaceGateway>,
        inventory: InventoryService,
    ) -> Self {
        Self {
            store,
            carrier,
            marketplace,
            inventory,
        }
    }

    /// List the seller's orders.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    pub async fn get_orders(
        &self,
        session: Session,
        query: &OrderQuery,
    ) -> Result<Page<Order>, AppError> {
        Ok(self.store.list_orders(session.seller_id, query).await?)
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the seller has no such order.
    pub async fn get_order(&self, session: Session, id: &OrderId) -> Result<Order, AppError> {
        self.store
            .get_order(session.seller_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id}")))
    }

    /// Pull orders from the marketplace and reconcile them into the store.
    ///
    /// Marketplace statuses are mapped through the bridge table; the upsert
    /// never regresses a locally `Generating`/`Shipped` order back to
    /// `Pending` and never clears a stored label. Orders seen for the first
    /// time in `Pending` state feed inventory reconciliation; a failed
    /// reconciliation is logged and does not abort the sync.
    ///
    /// # Errors
    ///
    /// `ConfigurationMissing` if no shop is connected; marketplace or store
    /// errors otherwise.
    #[instrument(skip(self, session), fields(seller = %session.seller_id))]
    pub async fn sync_orders(&self, session: Session) -> Result<SyncSummary, AppError> {
        let seller = session.seller_id;
        let credential =
            super::fresh_credential(self.store.as_ref(), self.marketplace.as_ref(), seller)
                .await?;

        let mut incoming = Vec::new();
        let mut query = MarketplacePageQuery::default();
        loop {
            let (wire, total) = self.marketplace.get_orders(&credential, &query).await?;
            if wire.is_empty() {
                break;
            }
            incoming.extend(wire.into_iter().map(|order| order.into_order(seller)));
            if incoming.len() as u64 >= total {
                break;
            }
            query.page += 1;
        }

        // Identify first-time pending orders before the upsert makes
        // everything look known.
        let mut new_pending = Vec::new();
        for order in &incoming {
            if order.status == OrderStatus::Pending
                && self.store.get_order(seller, &order.id).await?.is_none()
            {
                new_pending.push(order.clone());
            }
        }

        let fetched = incoming.len() as u64;
        let upserted = self.store.upsert_orders(&incoming).await?;

        for order in &new_pending {
            if let Err(e) = self.inventory.on_order_created(session, order).await {
                warn!(order = %order.id, error = %e, "Inventory reconciliation failed");
            }
        }

        info!(fetched, upserted, new_pending = new_pending.len(), "Order sync complete");
        Ok(SyncSummary {
            fetched,
            upserted,
            new_pending: new_pending.len() as u64,
        })
    }

    /// Generate and purchase a shipping label for one pending order.
    ///
    /// The order is claimed (`Pending -> Generating`) before any external
    /// call. Any failure up to and including the rate purchase releases the
    /// claim, leaving the order `Pending` and unchanged. If persisting the
    /// purchased label fails, the purchase is compensated with a best-effort
    /// refund before the claim is released. A failure pushing the shipped
    /// status to the marketplace surfaces as an error, but the order stays
    /// `Shipped` locally; local state is the source of truth.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown order, `InvalidState` for an order that is
    /// not `Pending`, `ConfigurationMissing` without a default profile or
    /// carrier key, `MalformedData` for an unparsable customer address,
    /// `NoRatesAvailable` when the carrier quotes nothing, plus carrier,
    /// marketplace, and store errors.
    #[instrument(skip(self, session), fields(seller = %session.seller_id, %order_id))]
    pub async fn generate_label(
        &self,
        session: Session,
        order_id: &OrderId,
    ) -> Result<Order, AppError> {
        let seller = session.seller_id;

        let Some(claimed) = self.store.claim_pending_order(seller, order_id).await? else {
            return match self.store.get_order(seller, order_id).await? {
                None => Err(AppError::NotFound(format!("order {order_id}"))),
                Some(order) => Err(AppError::InvalidState(format!(
                    "order {order_id} is {}, label generation requires a pending order",
                    order.status
                ))),
            };
        };

        let (api_key, purchased) = match self.quote_and_purchase(seller, &claimed).await {
            Ok(result) => result,
            Err(e) => {
                self.release_claim(seller, order_id).await;
                return Err(e);
            }
        };

        let order = match self
            .store
            .mark_order_shipped(
                seller,
                order_id,
                &purchased.label_url,
                &purchased.tracking_number,
            )
            .await
        {
            Ok(order) => order,
            Err(e) => {
                // The label is already paid for; refund it rather than
                // leaving an orphaned purchase behind.
                if let Err(refund_err) = self
                    .carrier
                    .refund_label(&api_key, &purchased.transaction_id)
                    .await
                {
                    warn!(
                        transaction = %purchased.transaction_id,
                        error = %refund_err,
                        "Label refund failed after persistence error"
                    );
                }
                self.release_claim(seller, order_id).await;
                return Err(e.into());
            }
        };

        info!(tracking = %purchased.tracking_number, "Label generated");

        self.push_shipped(seller, &order).await?;
        Ok(order)
    }

    /// Generate labels for several orders, sequentially.
    ///
    /// Each order succeeds or fails on its own; one failure never aborts the
    /// rest of the batch.
    #[instrument(skip(self, session, order_ids), fields(seller = %session.seller_id, count = order_ids.len()))]
    pub async fn generate_labels(
        &self,
        session: Session,
        order_ids: &[OrderId],
    ) -> Vec<BatchLabelOutcome> {
        let mut outcomes = Vec::with_capacity(order_ids.len());
        for order_id in order_ids {
            let outcome = match self.generate_label(session, order_id).await {
                Ok(order) => BatchLabelOutcome {
                    order_id: order_id.clone(),
                    success: true,
                    order: Some(order),
                    error: None,
                },
                Err(e) => BatchLabelOutcome {
                    order_id: order_id.clone(),
                    success: false,
                    order: None,
                    error: Some(e.to_string()),
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Order roll-up for the dashboard.
    ///
    /// Each figure degrades to zero independently if its query fails, so the
    /// dashboard renders even when one aggregate is unavailable.
    #[instrument(skip(self, session), fields(seller = %session.seller_id))]
    pub async fn order_statistics(&self, session: Session) -> Result<OrderStatistics, AppError> {
        let seller = session.seller_id;

        let total_orders = self.count_or_zero(seller, None).await;
        let pending = self.count_or_zero(seller, Some(OrderStatus::Pending)).await;
        let shipped = self.count_or_zero(seller, Some(OrderStatus::Shipped)).await;

        let since = Utc::now() - Duration::days(30);
        let dates = match self.store.order_dates_since(seller, since).await {
            Ok(dates) => dates,
            Err(e) => {
                warn!(error = %e, "Order trend query failed");
                Vec::new()
            }
        };

        let mut per_day = std::collections::BTreeMap::new();
        let start = since.date_naive();
        let today = Utc::now().date_naive();
        let mut day = start;
        while day <= today {
            per_day.insert(day, 0_u64);
            day += Duration::days(1);
        }
        for date in dates {
            *per_day.entry(date.date_naive()).or_insert(0) += 1;
        }
        let trend = per_day
            .into_iter()
            .map(|(date, count)| DailyOrders { date, count })
            .collect();

        Ok(OrderStatistics {
            total_orders,
            pending,
            shipped,
            trend,
        })
    }

    // ── Label workflow internals ────────────────────────────────────────

    /// Steps between the claim and the persist: configuration lookups,
    /// address parsing, rate shopping, and the purchase itself. Callers
    /// release the claim if this fails.
    async fn quote_and_purchase(
        &self,
        seller: SellerId,
        order: &Order,
    ) -> Result<(String, PurchasedLabel), AppError> {
        let profile = self
            .store
            .default_shipping_profile(seller)
            .await?
            .ok_or_else(|| {
                AppError::ConfigurationMissing("no default shipping profile".to_string())
            })?;
        let api_key = super::carrier_api_key(self.store.as_ref(), seller).await?;

        let to_address = PostalAddress::parse_json(&order.customer_address)
            .map_err(|e| AppError::MalformedData(format!("customer address: {e}")))?;

        let from = ShipmentAddress::from_profile(&profile);
        let to = ShipmentAddress::for_recipient(
            &order.customer_name,
            order.customer_email.as_deref(),
            &to_address,
        );

        let rates = self
            .carrier
            .create_shipment(&api_key, &from, &to, &Parcel::default())
            .await?;
        let rate = cheapest_rate(&rates).ok_or(AppError::NoRatesAvailable)?;

        info!(rate = %rate.id, amount = %rate.amount, provider = %rate.provider, "Purchasing cheapest rate");
        let purchased = self.carrier.purchase_label(&api_key, &rate.id).await?;
        Ok((api_key, purchased))
    }

    /// Release a `Generating` claim after a failed attempt. Failure to
    /// release is logged, not propagated; the original error matters more.
    async fn release_claim(&self, seller: SellerId, order_id: &OrderId) {
        if let Err(e) = self.store.release_order_claim(seller, order_id).await {
            warn!(%order_id, error = %e, "Failed to release order claim");
        }
    }

    /// Push a shipped order's status and tracking number to the marketplace.
    async fn push_shipped(
        &self,
        seller: SellerId,
        order: &Order,
    ) -> Result<(), AppError> {
        let Some(status) = order.status.to_marketplace() else {
            return Ok(());
        };
        let credential =
            super::fresh_credential(self.store.as_ref(), self.marketplace.as_ref(), seller)
                .await?;
        self.marketplace
            .update_order_status(
                &credential,
                &order.id,
                status,
                order.tracking_number.as_deref(),
            )
            .await?;
        Ok(())
    }

    async fn count_or_zero(
        &self,
        seller: SellerId,
        status: Option<OrderStatus>,
    ) -> u64 {
        match self.store.count_orders(seller, status).await {
            Ok(count) => count,
            Err(e) => {
                warn!(?status, error = %e, "Order count query failed");
                0
            }
        }
    }
}

/// Pick the cheapest rate.
///
/// Amounts are decimal strings off the wire; they are compared as
/// [`Decimal`], never as floats. Ties keep the first rate seen, so the
/// choice is deterministic for a fixed input order. A rate whose amount
/// fails to parse sorts after every parseable rate.
fn cheapest_rate(rates: &[Rate]) -> Option<&Rate> {
    let mut best: Option<(&Rate, Option<Decimal>)> = None;
    for rate in rates {
        let amount = Decimal::from_str(&rate.amount).ok();
        let better = match (&best, &amount) {
            (None, _) => true,
            (Some((_, None)), Some(_)) => true,
            (Some((_, Some(current))), Some(candidate)) => candidate < current,
            _ => false,
        };
        if better {
            best = Some((rate, amount));
        }
    }
    best.map(|(rate, _)| rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tiktokflow_core::RateId;

    fn rate(id: &str, amount: &str) -> Rate {
        Rate {
            id: RateId::new(id),
            amount: amount.to_string(),
            currency: "USD".to_string(),
            provider: "USPS".to_string(),
            servicelevel_name: None,
            estimated_days: None,
        }
    }

    #[test]
    fn test_cheapest_rate_picks_minimum() {
        let rates = vec![rate("r1", "12.00"), rate("r2", "9.50"), rate("r3", "15.25")];
        let best = cheapest_rate(&rates).unwrap();
        assert_eq!(best.id, RateId::new("r2"));
    }

    #[test]
    fn test_cheapest_rate_tie_keeps_first() {
        let rates = vec![rate("r1", "9.50"), rate("r2", "9.50")];
        let best = cheapest_rate(&rates).unwrap();
        assert_eq!(best.id, RateId::new("r1"));

        // Same amounts, reversed order: the other rate wins.
        let reversed = vec![rate("r2", "9.50"), rate("r1", "9.50")];
        let best = cheapest_rate(&reversed).unwrap();
        assert_eq!(best.id, RateId::new("r2"));
    }

    #[test]
    fn test_cheapest_rate_not_float_comparison() {
        // 0.1 + 0.2 style trap: decimal comparison must be exact.
        let rates = vec![rate("r1", "0.30"), rate("r2", "0.3")];
        let best = cheapest_rate(&rates).unwrap();
        assert_eq!(best.id, RateId::new("r1"));
    }

    #[test]
    fn test_cheapest_rate_malformed_amount_sorts_last() {
        let rates = vec![rate("r1", "not-a-number"), rate("r2", "99.00")];
        let best = cheapest_rate(&rates).unwrap();
        assert_eq!(best.id, RateId::new("r2"));
    }

    #[test]
    fn test_cheapest_rate_empty() {
        assert!(cheapest_rate(&[]).is_none());
    }
}
