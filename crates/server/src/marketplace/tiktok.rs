//! TikTok Shop Open API client.

use std::sync::Arc;

use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tiktokflow_core::{
    MarketplaceCredential, MarketplaceOrderStatus, OrderId, ProductId, SellerId, SkuId,
};

use super::{
    MarketplaceError, MarketplaceGateway, MarketplaceOrder, MarketplacePageQuery,
    MarketplaceProduct,
};
use crate::config::MarketplaceConfig;

// =============================================================================
// Client
// =============================================================================

/// Client for the TikTok Shop Open API.
///
/// Holds the OAuth app configuration; per-seller tokens are passed into each
/// call. Cheap to clone.
#[derive(Clone)]
pub struct TikTokShopClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: secrecy::SecretString,
}

impl TikTokShopClient {
    /// Create a client from the server's marketplace configuration.
    #[must_use]
    pub fn new(config: &MarketplaceConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// POST to a token endpoint (unauthenticated; app credentials go in the
    /// body) and unwrap the response envelope.
    async fn token_request(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<TokenData, MarketplaceError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// GET an authenticated endpoint on behalf of the credential's shop.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        credential: &MarketplaceCredential,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, MarketplaceError> {
        let response = self
            .inner
            .client
            .get(self.url(path))
            .bearer_auth(&credential.access_token)
            .query(&[("shop_id", credential.shop_id.as_str().to_string())])
            .query(params)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// POST to an authenticated endpoint on behalf of the credential's shop.
    async fn post<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        credential: &MarketplaceCredential,
        path: &str,
        body: &B,
    ) -> Result<T, MarketplaceError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .bearer_auth(&credential.access_token)
            .query(&[("shop_id", credential.shop_id.as_str().to_string())])
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Unwrap the `{code, message, data}` envelope every endpoint uses.
    ///
    /// A non-zero envelope code is an API error even on HTTP 200; HTTP 401
    /// and 403 map to [`MarketplaceError::Auth`] regardless of body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MarketplaceError> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MarketplaceError::Auth(format!(
                "marketplace rejected the access token ({status})"
            )));
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(MarketplaceError::Api {
                code: i64::from(status.as_u16()),
                message: body.chars().take(200).collect(),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| MarketplaceError::Parse(format!("invalid response body: {e}")))?;

        if envelope.code != 0 {
            return Err(MarketplaceError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }

        envelope
            .data
            .ok_or_else(|| MarketplaceError::Parse("response envelope had no data".to_string()))
    }
}

impl std::fmt::Debug for TikTokShopClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TikTokShopClient")
            .field("base_url", &self.inner.base_url)
            .field("client_id", &self.inner.client_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    access_token: String,
    refresh_token: String,
    /// Access-token lifetime in seconds.
    expires_in: i64,
    shop_id: String,
    #[serde(default)]
    seller_name: Option<String>,
}

impl TokenData {
    fn into_credential(self, seller: SellerId, previous_name: Option<&str>) -> MarketplaceCredential {
        MarketplaceCredential {
            seller_id: seller,
            shop_id: self.shop_id.into(),
            seller_name: self
                .seller_name
                .or_else(|| previous_name.map(str::to_string))
                .unwrap_or_default(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderSearchData {
    #[serde(default)]
    orders: Vec<MarketplaceOrder>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct ProductSearchData {
    #[serde(default)]
    products: Vec<MarketplaceProduct>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Serialize)]
struct OrderUpdateRequest<'a> {
    order_id: &'a OrderId,
    order_status: MarketplaceOrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_number: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct StockUpdateRequest<'a> {
    product_id: &'a ProductId,
    skus: Vec<StockUpdateSku<'a>>,
}

#[derive(Debug, Serialize)]
struct StockUpdateSku<'a> {
    id: &'a SkuId,
    stock_infos: Vec<StockUpdateInfo>,
}

#[derive(Debug, Serialize)]
struct StockUpdateInfo {
    available_stock: i32,
}

// Acknowledgement bodies carry nothing we use.
#[derive(Debug, Deserialize)]
struct Ack {}

// =============================================================================
// Gateway implementation
// =============================================================================

#[async_trait::async_trait]
impl MarketplaceGateway for TikTokShopClient {
    #[instrument(skip(self, auth_code))]
    async fn connect_shop(
        &self,
        auth_code: &str,
        seller: SellerId,
    ) -> Result<MarketplaceCredential, MarketplaceError> {
        let body = serde_json::json!({
            "app_key": self.inner.client_id,
            "app_secret": self.inner.client_secret.expose_secret(),
            "auth_code": auth_code,
            "grant_type": "authorization_code",
        });
        let data = self.token_request("/api/v2/token/get", &body).await?;
        Ok(data.into_credential(seller, None))
    }

    #[instrument(skip(self, credential), fields(shop_id = %credential.shop_id))]
    async fn refresh_credentials(
        &self,
        credential: &MarketplaceCredential,
    ) -> Result<MarketplaceCredential, MarketplaceError> {
        let body = serde_json::json!({
            "app_key": self.inner.client_id,
            "app_secret": self.inner.client_secret.expose_secret(),
            "refresh_token": credential.refresh_token,
            "grant_type": "refresh_token",
        });
        let data = self
            .token_request("/api/v2/token/refresh", &body)
            .await
            .map_err(|e| match e {
                MarketplaceError::Api { code, message } => MarketplaceError::Auth(format!(
                    "token refresh rejected ({code}): {message}"
                )),
                other => other,
            })?;
        Ok(data.into_credential(credential.seller_id, Some(&credential.seller_name)))
    }

    #[instrument(skip(self, credential), fields(shop_id = %credential.shop_id))]
    async fn get_orders(
        &self,
        credential: &MarketplaceCredential,
        query: &MarketplacePageQuery,
    ) -> Result<(Vec<MarketplaceOrder>, u64), MarketplaceError> {
        let mut params = vec![
            ("page_number", query.page.to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        if let Some(status) = query.status {
            params.push(("order_status", status.as_str().to_string()));
        }

        let data: OrderSearchData = self
            .get(credential, "/api/orders/search", &params)
            .await?;
        Ok((data.orders, data.total))
    }

    #[instrument(skip(self, credential), fields(shop_id = %credential.shop_id))]
    async fn get_products(
        &self,
        credential: &MarketplaceCredential,
        query: &MarketplacePageQuery,
    ) -> Result<(Vec<MarketplaceProduct>, u64), MarketplaceError> {
        let params = vec![
            ("page_number", query.page.to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        let data: ProductSearchData = self
            .get(credential, "/api/products/search", &params)
            .await?;
        Ok((data.products, data.total))
    }

    #[instrument(skip(self, credential), fields(shop_id = %credential.shop_id, %order_id))]
    async fn update_order_status(
        &self,
        credential: &MarketplaceCredential,
        order_id: &OrderId,
        status: MarketplaceOrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<(), MarketplaceError> {
        let request = OrderUpdateRequest {
            order_id,
            order_status: status,
            tracking_number,
        };
        let _: Ack = self.post(credential, "/api/orders/update", &request).await?;
        Ok(())
    }

    #[instrument(skip(self, credential), fields(shop_id = %credential.shop_id, %product_id))]
    async fn update_inventory(
        &self,
        credential: &MarketplaceCredential,
        product_id: &ProductId,
        sku_id: &SkuId,
        quantity: i32,
    ) -> Result<(), MarketplaceError> {
        let request = StockUpdateRequest {
            product_id,
            skus: vec![StockUpdateSku {
                id: sku_id,
                stock_infos: vec![StockUpdateInfo {
                    available_stock: quantity.max(0),
                }],
            }],
        };
        let _: Ack = self
            .post(credential, "/api/products/stocks", &request)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_error_code_surfaces_as_api_error() {
        let body = r#"{"code": 105001, "message": "invalid shop", "data": null}"#;
        let envelope: Envelope<OrderSearchData> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.code, 105_001);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_token_data_rotation_keeps_seller_name() {
        let data = TokenData {
            access_token: "at2".to_string(),
            refresh_token: "rt2".to_string(),
            expires_in: 3600,
            shop_id: "shop-1".to_string(),
            seller_name: None,
        };
        let credential =
            data.into_credential(SellerId::new(uuid::Uuid::nil()), Some("Crafts by Jo"));
        assert_eq!(credential.seller_name, "Crafts by Jo");
        assert_eq!(credential.access_token, "at2");
        assert!(credential.expires_at > Utc::now());
    }

    #[test]
    fn test_stock_update_serialization() {
        let product_id = ProductId::new("P1");
        let sku_id = SkuId::new("S1");
        let request = StockUpdateRequest {
            product_id: &product_id,
            skus: vec![StockUpdateSku {
                id: &sku_id,
                stock_infos: vec![StockUpdateInfo { available_stock: 5 }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["skus"][0]["stock_infos"][0]["available_stock"], 5);
    }
}
