//! Remote operations the cart depends on.

use std::future::Future;

use cartsync_core::{CheckoutId, VariantDetails, VariantId};

use crate::api::{ApiError, CheckoutLinesUpdate, StorefrontClient};

/// The two backend calls made by the cart. One attempt per call, no retries.
pub trait CheckoutRemote: Send + Sync {
    /// Set `variant_id` to `quantity` (a full quantity, not a delta) on a checkout.
    fn update_line_quantity(
        &self,
        checkout_id: &CheckoutId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> impl Future<Output = Result<CheckoutLinesUpdate, ApiError>> + Send;

    /// Variant details for `ids`, in request order.
    fn fetch_variants_by_ids(
        &self,
        ids: &[VariantId],
    ) -> impl Future<Output = Result<Vec<VariantDetails>, ApiError>> + Send;
}

impl CheckoutRemote for StorefrontClient {
    fn update_line_quantity(
        &self,
        checkout_id: &CheckoutId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> impl Future<Output = Result<CheckoutLinesUpdate, ApiError>> + Send {
        self.update_checkout_line(checkout_id, variant_id, quantity)
    }

    fn fetch_variants_by_ids(
        &self,
        ids: &[VariantId],
    ) -> impl Future<Output = Result<Vec<VariantDetails>, ApiError>> + Send {
        self.get_variants_by_ids(ids)
    }
}
