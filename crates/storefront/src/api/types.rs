//! Domain types for the commerce backend.
//!
//! These types provide a clean API separate from the raw response structs in
//! [`super::client::queries`].

use serde::{Deserialize, Serialize};

use cartsync_core::{CheckoutId, Price, VariantId};

/// A remote, backend-owned in-progress order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub id: CheckoutId,
    /// Sum of line prices before shipping (gross).
    pub subtotal_price: Price,
    /// Total including shipping and taxes (gross).
    pub total_price: Price,
    pub lines: Vec<CheckoutLine>,
}

impl Checkout {
    /// Total number of items across checkout lines.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// A line on a remote checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub id: String,
    pub variant_id: VariantId,
    pub quantity: i64,
}

/// A field-level validation error returned by a checkout mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFieldError {
    /// Input field the error refers to, if any.
    pub field: Option<String>,
    pub message: String,
}

/// Result of a `checkoutLinesUpdate` mutation.
///
/// Field errors are data, not failures: the mutation ran and rejected the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLinesUpdate {
    pub checkout: Option<Checkout>,
    pub errors: Vec<CheckoutFieldError>,
}

impl CheckoutLinesUpdate {
    /// Whether the backend rejected the update.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
