//! Core types for TikTokFlow.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod status;

pub use address::{AddressError, PostalAddress};
pub use id::*;
pub use status::*;
