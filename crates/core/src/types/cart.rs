//! Cart lines and derived totals.
//!
//! A cart is an ordered list of [`CartLine`]s with at most one line per
//! variant. Lines are persisted in their [`StoredLine`] form (variant id and
//! quantity only); variant details are rehydrated from the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariantId};
use super::price::Price;

/// Product variant metadata needed to price and display a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDetails {
    pub id: VariantId,
    /// Variant name (e.g., "XL / Blue"). Empty for single-variant products.
    pub name: String,
    pub sku: Option<String>,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Price,
}

/// One product variant's presence in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub variant_id: VariantId,
    pub quantity: i64,
    /// Populated after the line has been rehydrated from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantDetails>,
}

impl CartLine {
    /// Create a line without variant details.
    #[must_use]
    pub const fn new(variant_id: VariantId, quantity: i64) -> Self {
        Self {
            variant_id,
            quantity,
            variant: None,
        }
    }

    /// The line's price (`unit price * quantity`), if variant details are known.
    #[must_use]
    pub fn line_price(&self) -> Option<Price> {
        self.variant.as_ref().map(|v| {
            Price::new(
                v.price.amount.saturating_mul(Decimal::from(self.quantity)),
                v.price.currency_code,
            )
        })
    }

    /// The persisted form of this line.
    #[must_use]
    pub fn to_stored(&self) -> StoredLine {
        StoredLine {
            variant_id: self.variant_id.clone(),
            quantity: self.quantity,
        }
    }
}

/// Persisted form of a cart line: `{"variantId": "...", "quantity": 2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLine {
    pub variant_id: VariantId,
    pub quantity: i64,
}

impl From<StoredLine> for CartLine {
    fn from(line: StoredLine) -> Self {
        Self::new(line.variant_id, line.quantity)
    }
}

/// Sum of all line quantities, saturating at `i64::MAX`.
#[must_use]
pub fn total_quantity(lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .fold(0, |total: i64, line| total.saturating_add(line.quantity))
}

/// Sum of `price * quantity` across lines, in the currency of the first line.
///
/// Returns `None` for an empty cart or when any line has not been rehydrated
/// with variant details. Lines in other currencies are summed as-is.
#[must_use]
pub fn total_price(lines: &[CartLine]) -> Option<Price> {
    let first = lines.first()?.variant.as_ref()?;
    let currency_code = first.price.currency_code;

    let mut total = Price::zero(currency_code);
    for line in lines {
        let line_price = line.line_price()?;
        if line_price.currency_code != currency_code {
            tracing::warn!(
                variant_id = %line.variant_id,
                expected = currency_code.code(),
                found = line_price.currency_code.code(),
                "Cart line currency differs from cart currency"
            );
        }
        total.amount = total.amount.saturating_add(line_price.amount);
    }

    Some(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::price::CurrencyCode;

    fn variant(id: &str, cents: i64) -> VariantDetails {
        VariantDetails {
            id: VariantId::new(id),
            name: String::new(),
            sku: None,
            product_id: ProductId::new(format!("product-{id}")),
            product_name: format!("Product {id}"),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
        }
    }

    fn priced_line(id: &str, quantity: i64, cents: i64) -> CartLine {
        CartLine {
            variant_id: VariantId::new(id),
            quantity,
            variant: Some(variant(id, cents)),
        }
    }

    #[test]
    fn test_total_quantity() {
        let lines = vec![
            CartLine::new(VariantId::new("v1"), 2),
            CartLine::new(VariantId::new("v2"), 5),
        ];
        assert_eq!(total_quantity(&lines), 7);
        assert_eq!(total_quantity(&[]), 0);
    }

    #[test]
    fn test_total_quantity_saturates() {
        let lines = vec![
            CartLine::new(VariantId::new("v1"), i64::MAX),
            CartLine::new(VariantId::new("v2"), i64::MAX),
        ];
        assert_eq!(total_quantity(&lines), i64::MAX);
    }

    #[test]
    fn test_line_price_with_max_quantity() {
        let line = priced_line("v1", i64::MAX, 1000);
        let price = line.line_price().unwrap();
        assert_eq!(price.amount, Decimal::from(i64::MAX) * Decimal::from(10));
    }

    #[test]
    fn test_total_price() {
        let lines = vec![priced_line("v1", 3, 1000), priced_line("v2", 1, 250)];
        let total = total_price(&lines).unwrap();
        assert_eq!(total.amount, Decimal::new(3250, 2));
        assert_eq!(total.currency_code, CurrencyCode::USD);
    }

    #[test]
    fn test_total_price_empty_cart() {
        assert!(total_price(&[]).is_none());
    }

    #[test]
    fn test_total_price_unknown_without_variant_details() {
        let lines = vec![
            priced_line("v1", 1, 1000),
            CartLine::new(VariantId::new("v2"), 1),
        ];
        assert!(total_price(&lines).is_none());
    }

    #[test]
    fn test_stored_line_format() {
        let line = priced_line("v1", 2, 1000);
        let json = serde_json::to_string(&vec![line.to_stored()]).unwrap();
        assert_eq!(json, r#"[{"variantId":"v1","quantity":2}]"#);
    }

    #[test]
    fn test_cart_line_reads_stored_json() {
        let lines: Vec<CartLine> =
            serde_json::from_str(r#"[{"variantId":"v1","quantity":3}]"#).unwrap();
        assert_eq!(lines, vec![CartLine::new(VariantId::new("v1"), 3)]);
    }
}
