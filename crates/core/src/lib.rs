//! cartsync core - shared cart types.
//!
//! This crate provides the types shared by the cartsync components:
//! - `storefront` - Cart provider, GraphQL client and HTMX routes
//! - `integration-tests` - End-to-end tests against a mocked backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Derived cart totals live here so they can be computed
//! anywhere a line list is available.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids and prices, plus cart lines and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
