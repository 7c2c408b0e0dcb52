//! Cache types for backend responses.

use cartsync_core::{CheckoutId, VariantDetails, VariantId};

use crate::api::types::Checkout;

/// Cache key for variant details and checkouts.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Variant(VariantId),
    Checkout(CheckoutId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Variant(Box<VariantDetails>),
    Checkout(Box<Checkout>),
}
