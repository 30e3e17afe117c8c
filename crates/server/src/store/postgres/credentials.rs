//! Marketplace credential operations.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use tiktokflow_core::{MarketplaceCredential, SellerId, ShopId};

use super::PgStore;
use crate::store::RepositoryError;

#[derive(FromRow)]
struct CredentialRow {
    seller_id: SellerId,
    shop_id: ShopId,
    seller_name: String,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<CredentialRow> for MarketplaceCredential {
    fn from(row: CredentialRow) -> Self {
        Self {
            seller_id: row.seller_id,
            shop_id: row.shop_id,
            seller_name: row.seller_name,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
        }
    }
}

impl PgStore {
    pub(super) async fn marketplace_credential_impl(
        &self,
        seller: SellerId,
    ) -> Result<Option<MarketplaceCredential>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(
            "SELECT seller_id, shop_id, seller_name, access_token, refresh_token, expires_at \
             FROM marketplace_credentials WHERE seller_id = $1",
        )
        .bind(seller)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(MarketplaceCredential::from))
    }

    pub(super) async fn save_marketplace_credential_impl(
        &self,
        credential: &MarketplaceCredential,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO marketplace_credentials \
                 (seller_id, shop_id, seller_name, access_token, refresh_token, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (seller_id) DO UPDATE SET \
                 shop_id = excluded.shop_id, \
                 seller_name = excluded.seller_name, \
                 access_token = excluded.access_token, \
                 refresh_token = excluded.refresh_token, \
                 expires_at = excluded.expires_at",
        )
        .bind(credential.seller_id)
        .bind(&credential.shop_id)
        .bind(&credential.seller_name)
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
