//! TikTokFlow Core - Shared types library.
//!
//! This crate provides common types used across all TikTokFlow components:
//! - `server` - Order-management API (gateways, services, store)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, order status domains, postal addresses
//! - [`model`] - Domain records (orders, products, profiles, credentials)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod model;
pub mod types;

pub use model::*;
pub use types::*;
