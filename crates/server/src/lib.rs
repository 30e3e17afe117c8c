//! TikTokFlow server library.
//!
//! This crate provides the order-management backend as a library, allowing
//! the services and gateway clients to be exercised from tests without
//! standing up the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod carrier;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
