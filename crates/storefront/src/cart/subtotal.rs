//! Subtotal shown alongside the cart.

use std::fmt;

use serde::Serialize;

use cartsync_core::{CartLine, Price, total_price};

use crate::api::Checkout;

/// Where the displayed subtotal came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "price", rename_all = "camelCase")]
pub enum Subtotal {
    /// Authoritative amount from the remote checkout.
    RemoteCheckout(Price),
    /// Sum of local line prices.
    LocalEstimate(Price),
    /// Some line has no known price.
    Unknown,
}

impl Subtotal {
    /// Prefer the checkout's subtotal, falling back to a local estimate.
    #[must_use]
    pub fn resolve(checkout: Option<&Checkout>, lines: &[CartLine]) -> Self {
        if let Some(checkout) = checkout {
            return Self::RemoteCheckout(checkout.subtotal_price);
        }
        total_price(lines).map_or(Self::Unknown, Self::LocalEstimate)
    }

    #[must_use]
    pub const fn price(&self) -> Option<&Price> {
        match self {
            Self::RemoteCheckout(price) | Self::LocalEstimate(price) => Some(price),
            Self::Unknown => None,
        }
    }

    /// Formatted amount, or `-` when unknown.
    #[must_use]
    pub fn display(&self) -> String {
        self.price().map_or_else(|| "-".to_string(), Price::display)
    }
}

impl fmt::Display for Subtotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
