//! Shippo API client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tiktokflow_core::{CarrierAddressId, PostalAddress, RateId, TransactionId};

use super::{CarrierError, CarrierGateway, Parcel, PurchasedLabel, Rate, ShipmentAddress, TrackingStatus};
use crate::config::CarrierConfig;

/// Shippo API client.
///
/// Holds no credentials; every call is made with the requesting seller's
/// API key.
#[derive(Clone)]
pub struct ShippoClient {
    inner: Arc<ShippoClientInner>,
}

struct ShippoClientInner {
    client: reqwest::Client,
    base_url: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AddressRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<&'a str>,
    street1: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    street2: Option<&'a str>,
    city: &'a str,
    state: &'a str,
    zip: &'a str,
    country: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    validate: bool,
}

#[derive(Deserialize)]
struct AddressResponse {
    object_id: CarrierAddressId,
}

#[derive(Serialize)]
struct ShipmentRequest<'a> {
    address_from: &'a ShipmentAddress,
    address_to: &'a ShipmentAddress,
    parcels: [&'a Parcel; 1],
    /// Request synchronous rate generation.
    #[serde(rename = "async")]
    run_async: bool,
}

#[derive(Deserialize)]
struct ShipmentResponse {
    #[serde(default)]
    rates: Vec<Rate>,
}

#[derive(Serialize)]
struct TransactionRequest<'a> {
    rate: &'a RateId,
    #[serde(rename = "async")]
    run_async: bool,
}

#[derive(Deserialize)]
struct TransactionResponse {
    object_id: TransactionId,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    label_url: Option<String>,
    #[serde(default)]
    tracking_number: Option<String>,
    #[serde(default)]
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct RefundRequest<'a> {
    transaction: &'a TransactionId,
}

#[derive(Serialize)]
struct TrackRequest<'a> {
    carrier: &'a str,
    tracking_number: &'a str,
}

#[derive(Deserialize)]
struct TrackResponse {
    #[serde(default)]
    tracking_status: Option<TrackingStatus>,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    text: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

impl ShippoClient {
    /// Create a new Shippo API client.
    #[must_use]
    pub fn new(config: &CarrierConfig) -> Self {
        Self {
            inner: Arc::new(ShippoClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Execute a GET request with the seller's API key.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
    ) -> Result<T, CarrierError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .get(&url)
            .header("Authorization", format!("ShippoToken {api_key}"))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request with the seller's API key.
    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        api_key: &str,
        path: &str,
        body: &B,
    ) -> Result<T, CarrierError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(&url)
            .header("Authorization", format!("ShippoToken {api_key}"))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CarrierError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| CarrierError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse an error response from the carrier API.
    async fn parse_error(response: reqwest::Response) -> CarrierError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return CarrierError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return CarrierError::Unauthorized;
        }

        if status == 404 {
            return CarrierError::NotFound("Resource not found".to_string());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        CarrierError::Api { status, message }
    }
}

#[async_trait]
impl CarrierGateway for ShippoClient {
    #[instrument(skip(self, api_key))]
    async fn validate_api_key(&self, api_key: &str) -> Result<bool, CarrierError> {
        // Listing addresses is the cheapest authenticated call.
        match self.get::<serde_json::Value>(api_key, "/addresses/").await {
            Ok(_) => Ok(true),
            Err(CarrierError::Unauthorized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, api_key, address), fields(name = %name))]
    async fn create_address(
        &self,
        api_key: &str,
        name: &str,
        company: Option<&str>,
        address: &PostalAddress,
    ) -> Result<CarrierAddressId, CarrierError> {
        let request = AddressRequest {
            name,
            company,
            street1: &address.street1,
            street2: address.street2.as_deref(),
            city: &address.city,
            state: &address.state,
            zip: &address.zip,
            country: &address.country,
            phone: address.phone.as_deref(),
            email: address.email.as_deref(),
            validate: true,
        };
        let response: AddressResponse = self.post(api_key, "/addresses/", &request).await?;
        Ok(response.object_id)
    }

    #[instrument(skip_all)]
    async fn create_shipment(
        &self,
        api_key: &str,
        from: &ShipmentAddress,
        to: &ShipmentAddress,
        parcel: &Parcel,
    ) -> Result<Vec<Rate>, CarrierError> {
        let request = ShipmentRequest {
            address_from: from,
            address_to: to,
            parcels: [parcel],
            run_async: false,
        };
        let response: ShipmentResponse = self.post(api_key, "/shipments/", &request).await?;
        Ok(response.rates)
    }

    #[instrument(skip(self, api_key), fields(rate_id = %rate_id))]
    async fn purchase_label(
        &self,
        api_key: &str,
        rate_id: &RateId,
    ) -> Result<PurchasedLabel, CarrierError> {
        let request = TransactionRequest {
            rate: rate_id,
            run_async: false,
        };
        let response: TransactionResponse = self.post(api_key, "/transactions/", &request).await?;

        if response.status.as_deref() == Some("ERROR") {
            let message = response
                .messages
                .iter()
                .map(|m| m.text.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CarrierError::Api {
                status: 200,
                message,
            });
        }

        match (response.label_url, response.tracking_number) {
            (Some(label_url), Some(tracking_number)) => Ok(PurchasedLabel {
                transaction_id: response.object_id,
                label_url,
                tracking_number,
            }),
            _ => Err(CarrierError::Parse(
                "transaction succeeded without label URL or tracking number".to_string(),
            )),
        }
    }

    #[instrument(skip(self, api_key), fields(transaction_id = %transaction_id))]
    async fn refund_label(
        &self,
        api_key: &str,
        transaction_id: &TransactionId,
    ) -> Result<(), CarrierError> {
        let request = RefundRequest {
            transaction: transaction_id,
        };
        let _: serde_json::Value = self.post(api_key, "/refunds/", &request).await?;
        Ok(())
    }

    #[instrument(skip(self, api_key))]
    async fn track(
        &self,
        api_key: &str,
        carrier: &str,
        tracking_number: &str,
    ) -> Result<TrackingStatus, CarrierError> {
        let request = TrackRequest {
            carrier,
            tracking_number,
        };
        let response: TrackResponse = self.post(api_key, "/tracks/", &request).await?;
        response.tracking_status.ok_or_else(|| {
            CarrierError::Parse("tracking response missing tracking_status".to_string())
        })
    }
}

impl std::fmt::Debug for ShippoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippoClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}
