//! Shipping configuration: ship-from profile and carrier API key.

use std::sync::Arc;

use tracing::{info, instrument};

use tiktokflow_core::{CarrierSettings, PostalAddress, Session, ShippingProfile};

use crate::carrier::{CarrierGateway, TrackingStatus};
use crate::error::AppError;
use crate::store::DataStore;

/// Input for saving a shipping profile.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProfileInput {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
    /// Defaults to true: saving a profile makes it the ship-from source.
    #[serde(default = "default_true")]
    pub is_default: bool,
}

const fn default_true() -> bool {
    true
}

/// Shipping configuration service.
#[derive(Clone)]
pub struct ShippingConfigService {
    store: Arc<dyn DataStore>,
    carrier: Arc<dyn CarrierGateway>,
}

impl ShippingConfigService {
    /// Create a new shipping configuration service.
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, carrier: Arc<dyn CarrierGateway>) -> Self {
        Self { store, carrier }
    }

    /// The seller's default ship-from profile, if one has been saved.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    pub async fn default_profile(
        &self,
        session: Session,
    ) -> Result<Option<ShippingProfile>, AppError> {
        Ok(self
            .store
            .default_shipping_profile(session.seller_id)
            .await?)
    }

    /// Save a ship-from profile.
    ///
    /// The address must pass local validation. If the seller already has a
    /// carrier API key, the address is also registered (and validated) at the
    /// carrier and the returned address id is stored with the profile, so
    /// label generation can reference it. Without a key the profile is saved
    /// unregistered; registration happens implicitly on first use.
    ///
    /// # Errors
    ///
    /// `MalformedData` for an incomplete address; carrier errors if the
    /// carrier rejects it; store errors otherwise.
    #[instrument(skip(self, session, input), fields(seller = %session.seller_id))]
    pub async fn save_profile(
        &self,
        session: Session,
        input: ProfileInput,
    ) -> Result<ShippingProfile, AppError> {
        input
            .address
            .validate()
            .map_err(|e| AppError::MalformedData(e.to_string()))?;

        let carrier_address_id = match self.store.carrier_settings(session.seller_id).await? {
            Some(settings) => Some(
                self.carrier
                    .create_address(
                        &settings.api_key,
                        &input.name,
                        input.company.as_deref(),
                        &input.address,
                    )
                    .await?,
            ),
            None => None,
        };

        let profile = ShippingProfile {
            seller_id: session.seller_id,
            carrier_address_id,
            name: input.name,
            company: input.company,
            address: input.address,
            is_default: input.is_default,
        };
        self.store.save_shipping_profile(&profile).await?;

        info!(registered = profile.carrier_address_id.is_some(), "Shipping profile saved");
        Ok(profile)
    }

    /// Save the seller's carrier API key.
    ///
    /// The key is stored as supplied; call [`Self::validate_api_key`] to
    /// check it against the carrier.
    ///
    /// # Errors
    ///
    /// `BadRequest` for an empty key; store errors otherwise.
    #[instrument(skip(self, session, api_key), fields(seller = %session.seller_id))]
    pub async fn save_api_key(&self, session: Session, api_key: String) -> Result<(), AppError> {
        if api_key.trim().is_empty() {
            return Err(AppError::BadRequest("API key cannot be empty".to_string()));
        }
        self.store
            .save_carrier_settings(&CarrierSettings {
                seller_id: session.seller_id,
                api_key,
            })
            .await?;
        info!("Carrier API key saved");
        Ok(())
    }

    /// Check an API key against the carrier.
    ///
    /// Validates the supplied key, or the stored one when `api_key` is
    /// `None`. An invalid key is `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// `ConfigurationMissing` when neither a supplied nor a stored key
    /// exists; carrier transport errors otherwise.
    #[instrument(skip(self, session, api_key), fields(seller = %session.seller_id))]
    pub async fn validate_api_key(
        &self,
        session: Session,
        api_key: Option<&str>,
    ) -> Result<bool, AppError> {
        let key = match api_key {
            Some(key) => key.to_string(),
            None => super::carrier_api_key(self.store.as_ref(), session.seller_id).await?,
        };
        Ok(self.carrier.validate_api_key(&key).await?)
    }

    /// Look up tracking status for a shipment.
    ///
    /// # Errors
    ///
    /// `ConfigurationMissing` without a stored API key; carrier errors
    /// otherwise.
    #[instrument(skip(self, session), fields(seller = %session.seller_id))]
    pub async fn track(
        &self,
        session: Session,
        carrier_name: &str,
        tracking_number: &str,
    ) -> Result<TrackingStatus, AppError> {
        let key = super::carrier_api_key(self.store.as_ref(), session.seller_id).await?;
        Ok(self
            .carrier
            .track(&key, carrier_name, tracking_number)
            .await?)
    }
}
