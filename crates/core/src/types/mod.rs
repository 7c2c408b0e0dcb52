//! Core types for cartsync.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;

pub use cart::{CartLine, StoredLine, VariantDetails, total_price, total_quantity};
pub use id::*;
pub use price::{CurrencyCode, CurrencyCodeError, Price};
