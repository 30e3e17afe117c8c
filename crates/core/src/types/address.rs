//! Structured postal addresses.
//!
//! Customer addresses arrive from the marketplace as a JSON blob and are
//! stored verbatim on the order. [`PostalAddress::parse_json`] turns the
//! stored blob back into structured fields at label-generation time; an
//! unparsable blob is the `MalformedData` failure of the label workflow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a stored customer address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The stored value is not valid JSON for an address.
    #[error("invalid address JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field the carrier requires is missing or empty.
    #[error("address missing required field: {0}")]
    MissingField(&'static str),
}

/// A structured postal address.
///
/// Used both for the seller's ship-from profile and the customer's ship-to
/// address. The marketplace writes `zipcode`; carrier payloads and our own
/// profiles use `zip`, hence the alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(alias = "zipcode")]
    pub zip: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl PostalAddress {
    /// Parse an address from its stored JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidJson`] if the value is not an address
    /// object, or [`AddressError::MissingField`] if a carrier-required field
    /// is empty.
    pub fn parse_json(raw: &str) -> Result<Self, AddressError> {
        let address: Self = serde_json::from_str(raw)?;
        address.validate()?;
        Ok(address)
    }

    /// Check that all carrier-required fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first empty field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("street1", &self.street1),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AddressError::MissingField(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marketplace_address() {
        let raw = r#"{
            "street1": "123 Main St",
            "street2": "Apt 4",
            "city": "Austin",
            "state": "TX",
            "zipcode": "78701",
            "country": "US",
            "phone": "555-0100"
        }"#;
        let addr = PostalAddress::parse_json(raw).expect("parse");
        assert_eq!(addr.street1, "123 Main St");
        assert_eq!(addr.zip, "78701");
        assert_eq!(addr.street2.as_deref(), Some("Apt 4"));
    }

    #[test]
    fn test_parse_zip_field_name() {
        let raw = r#"{"street1":"1 Elm","city":"Reno","state":"NV","zip":"89501","country":"US"}"#;
        let addr = PostalAddress::parse_json(raw).expect("parse");
        assert_eq!(addr.zip, "89501");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            PostalAddress::parse_json("742 Evergreen Terrace"),
            Err(AddressError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_required_field() {
        let raw = r#"{"street1":"","city":"Reno","state":"NV","zip":"89501","country":"US"}"#;
        assert!(matches!(
            PostalAddress::parse_json(raw),
            Err(AddressError::MissingField("street1"))
        ));
    }
}
