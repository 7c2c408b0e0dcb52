//! Conversions from raw response structs to domain types.

use rust_decimal::Decimal;

use cartsync_core::{CheckoutId, CurrencyCode, Price, ProductId, VariantDetails, VariantId};

use super::queries::{
    CheckoutErrorFields, CheckoutFields, MoneyFields, TaxedMoneyFields, variant_list,
};
use crate::api::ApiError;
use crate::api::types::{Checkout, CheckoutFieldError, CheckoutLine};

/// Convert a backend money pair into a [`Price`].
///
/// # Errors
///
/// Returns `ApiError::InvalidData` for non-finite amounts or unsupported currencies.
pub fn convert_money(money: &MoneyFields) -> Result<Price, ApiError> {
    let amount = Decimal::try_from(money.amount)
        .map_err(|e| ApiError::InvalidData(format!("amount {}: {e}", money.amount)))?;
    let currency_code = money
        .currency
        .parse::<CurrencyCode>()
        .map_err(|e| ApiError::InvalidData(e.to_string()))?;
    Ok(Price::new(amount, currency_code))
}

fn convert_taxed_money(money: Option<&TaxedMoneyFields>, what: &str) -> Result<Price, ApiError> {
    let money = money.ok_or_else(|| ApiError::InvalidData(format!("checkout has no {what}")))?;
    convert_money(&money.gross)
}

/// Convert checkout fields into a [`Checkout`].
///
/// Lines without a variant (deleted products) are skipped.
///
/// # Errors
///
/// Returns `ApiError::InvalidData` if prices are missing or malformed.
pub fn convert_checkout(checkout: CheckoutFields) -> Result<Checkout, ApiError> {
    let subtotal_price = convert_taxed_money(checkout.subtotal_price.as_ref(), "subtotal price")?;
    let total_price = convert_taxed_money(checkout.total_price.as_ref(), "total price")?;

    let lines = checkout
        .lines
        .into_iter()
        .flatten()
        .filter_map(|line| {
            let variant = line.variant?;
            Some(CheckoutLine {
                id: line.id,
                variant_id: VariantId::new(variant.id),
                quantity: line.quantity,
            })
        })
        .collect();

    Ok(Checkout {
        id: CheckoutId::new(checkout.id),
        subtotal_price,
        total_price,
        lines,
    })
}

/// Convert a mutation error into a [`CheckoutFieldError`].
pub fn convert_field_error(error: CheckoutErrorFields) -> CheckoutFieldError {
    CheckoutFieldError {
        field: error.field,
        message: error
            .message
            .unwrap_or_else(|| "Invalid checkout input".to_string()),
    }
}

/// Convert a variant node into [`VariantDetails`].
///
/// # Errors
///
/// Returns `ApiError::InvalidData` if the variant has no usable price.
pub fn convert_variant(node: variant_list::ProductVariantNode) -> Result<VariantDetails, ApiError> {
    let price = node
        .price
        .as_ref()
        .ok_or_else(|| ApiError::InvalidData(format!("variant {} has no price", node.id)))
        .and_then(convert_money)?;

    Ok(VariantDetails {
        id: VariantId::new(node.id),
        name: node.name,
        sku: node.sku,
        product_id: ProductId::new(node.product.id),
        product_name: node.product.name,
        price,
    })
}
