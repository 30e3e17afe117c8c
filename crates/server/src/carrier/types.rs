//! Carrier wire types.

use serde::{Deserialize, Serialize};

use tiktokflow_core::{PostalAddress, RateId, ShippingProfile, TransactionId};

/// A shipment endpoint (ship-from or ship-to) as the carrier expects it.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentAddress {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub street1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ShipmentAddress {
    /// Build the ship-from endpoint from the seller's shipping profile.
    #[must_use]
    pub fn from_profile(profile: &ShippingProfile) -> Self {
        Self {
            name: profile.name.clone(),
            company: profile.company.clone(),
            street1: profile.address.street1.clone(),
            street2: profile.address.street2.clone(),
            city: profile.address.city.clone(),
            state: profile.address.state.clone(),
            zip: profile.address.zip.clone(),
            country: profile.address.country.clone(),
            phone: profile.address.phone.clone(),
            email: profile.address.email.clone(),
        }
    }

    /// Build the ship-to endpoint from a customer name and parsed address.
    #[must_use]
    pub fn for_recipient(name: &str, email: Option<&str>, address: &PostalAddress) -> Self {
        Self {
            name: name.to_string(),
            company: None,
            street1: address.street1.clone(),
            street2: address.street2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip: address.zip.clone(),
            country: address.country.clone(),
            phone: address.phone.clone(),
            email: email.map(String::from).or_else(|| address.email.clone()),
        }
    }
}

/// Parcel dimensions for a shipment quote.
///
/// The dashboard quotes every order with one fixed parcel size; per-order
/// dimensions are not collected from the marketplace.
#[derive(Debug, Clone, Serialize)]
pub struct Parcel {
    pub length: String,
    pub width: String,
    pub height: String,
    pub distance_unit: String,
    pub weight: String,
    pub mass_unit: String,
}

impl Default for Parcel {
    fn default() -> Self {
        Self {
            length: "10".to_string(),
            width: "8".to_string(),
            height: "4".to_string(),
            distance_unit: "in".to_string(),
            weight: "2".to_string(),
            mass_unit: "lb".to_string(),
        }
    }
}

/// A priced shipping option returned by the carrier.
#[derive(Debug, Clone, Deserialize)]
pub struct Rate {
    #[serde(rename = "object_id")]
    pub id: RateId,
    /// Decimal string as sent on the wire, e.g. `"9.50"`.
    pub amount: String,
    pub currency: String,
    pub provider: String,
    #[serde(default)]
    pub servicelevel_name: Option<String>,
    #[serde(default)]
    pub estimated_days: Option<u32>,
}

/// A purchased label.
#[derive(Debug, Clone)]
pub struct PurchasedLabel {
    pub transaction_id: TransactionId,
    pub label_url: String,
    pub tracking_number: String,
}

/// Tracking status for a shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_details: Option<String>,
}
