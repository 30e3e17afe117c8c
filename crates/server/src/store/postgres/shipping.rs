//! Shipping profile and carrier settings operations.

use sqlx::FromRow;

use tiktokflow_core::{CarrierAddressId, CarrierSettings, PostalAddress, SellerId, ShippingProfile};

use super::PgStore;
use crate::store::RepositoryError;

#[derive(FromRow)]
struct ShippingProfileRow {
    seller_id: SellerId,
    carrier_address_id: Option<CarrierAddressId>,
    name: String,
    company: Option<String>,
    street1: String,
    street2: Option<String>,
    city: String,
    state: String,
    zip: String,
    country: String,
    phone: Option<String>,
    email: Option<String>,
    is_default: bool,
}

impl From<ShippingProfileRow> for ShippingProfile {
    fn from(row: ShippingProfileRow) -> Self {
        Self {
            seller_id: row.seller_id,
            carrier_address_id: row.carrier_address_id,
            name: row.name,
            company: row.company,
            address: PostalAddress {
                street1: row.street1,
                street2: row.street2,
                city: row.city,
                state: row.state,
                zip: row.zip,
                country: row.country,
                phone: row.phone,
                email: row.email,
            },
            is_default: row.is_default,
        }
    }
}

impl PgStore {
    pub(super) async fn default_shipping_profile_impl(
        &self,
        seller: SellerId,
    ) -> Result<Option<ShippingProfile>, RepositoryError> {
        let row: Option<ShippingProfileRow> = sqlx::query_as(
            "SELECT seller_id, carrier_address_id, name, company, street1, street2, \
                    city, state, zip, country, phone, email, is_default \
             FROM shipping_profiles \
             WHERE seller_id = $1 AND is_default = TRUE",
        )
        .bind(seller)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ShippingProfile::from))
    }

    pub(super) async fn save_shipping_profile_impl(
        &self,
        profile: &ShippingProfile,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // At most one default per seller: clear any other default first,
        // inside the same transaction as the upsert.
        if profile.is_default {
            sqlx::query(
                "UPDATE shipping_profiles SET is_default = FALSE \
                 WHERE seller_id = $1 AND name <> $2",
            )
            .bind(profile.seller_id)
            .bind(&profile.name)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO shipping_profiles (seller_id, carrier_address_id, name, company, \
                 street1, street2, city, state, zip, country, phone, email, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (seller_id, name) DO UPDATE SET \
                 carrier_address_id = excluded.carrier_address_id, \
                 company = excluded.company, \
                 street1 = excluded.street1, \
                 street2 = excluded.street2, \
                 city = excluded.city, \
                 state = excluded.state, \
                 zip = excluded.zip, \
                 country = excluded.country, \
                 phone = excluded.phone, \
                 email = excluded.email, \
                 is_default = excluded.is_default",
        )
        .bind(profile.seller_id)
        .bind(&profile.carrier_address_id)
        .bind(&profile.name)
        .bind(&profile.company)
        .bind(&profile.address.street1)
        .bind(&profile.address.street2)
        .bind(&profile.address.city)
        .bind(&profile.address.state)
        .bind(&profile.address.zip)
        .bind(&profile.address.country)
        .bind(&profile.address.phone)
        .bind(&profile.address.email)
        .bind(profile.is_default)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub(super) async fn carrier_settings_impl(
        &self,
        seller: SellerId,
    ) -> Result<Option<CarrierSettings>, RepositoryError> {
        let row: Option<(SellerId, String)> = sqlx::query_as(
            "SELECT seller_id, shippo_api_key FROM shipping_settings WHERE seller_id = $1",
        )
        .bind(seller)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(seller_id, api_key)| CarrierSettings { seller_id, api_key }))
    }

    pub(super) async fn save_carrier_settings_impl(
        &self,
        settings: &CarrierSettings,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO shipping_settings (seller_id, shippo_api_key) VALUES ($1, $2) \
             ON CONFLICT (seller_id) DO UPDATE SET shippo_api_key = excluded.shippo_api_key",
        )
        .bind(settings.seller_id)
        .bind(&settings.api_key)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
