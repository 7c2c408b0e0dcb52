//! cartsync storefront library.
//!
//! Session carts synchronized with a commerce backend's checkout, served as
//! HTMX fragments. The binary in `main.rs` wires these modules together; the
//! library form exists so integration tests can drive the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
