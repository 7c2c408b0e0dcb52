//! The checkout collaborator.
//!
//! The cart never owns the checkout: it reads the current one before each
//! change and hands back whatever the backend returns.

use std::future::Future;

use tracing::{debug, warn};

use super::storage::{CHECKOUT_KEY, CartStorage};
use crate::api::Checkout;

/// Holder of the visitor's remote checkout, if one exists.
pub trait CheckoutContext: Send + Sync {
    /// The current checkout.
    fn checkout(&self) -> impl Future<Output = Option<Checkout>> + Send;

    /// Replace the current checkout with one returned by the backend.
    fn update(&self, checkout: Checkout) -> impl Future<Output = ()> + Send;
}

/// Checkout kept as JSON in a [`CartStorage`] under [`CHECKOUT_KEY`].
#[derive(Debug, Clone)]
pub struct StoredCheckout<S> {
    storage: S,
}

impl<S: CartStorage> StoredCheckout<S> {
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: CartStorage> CheckoutContext for StoredCheckout<S> {
    async fn checkout(&self) -> Option<Checkout> {
        let raw = match self.storage.get(CHECKOUT_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read checkout from storage");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| debug!(error = %e, "Ignoring unreadable stored checkout"))
            .ok()
    }

    async fn update(&self, checkout: Checkout) {
        let json = match serde_json::to_string(&checkout) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize checkout");
                return;
            }
        };

        if let Err(e) = self.storage.set(CHECKOUT_KEY, json).await {
            warn!(checkout_id = %checkout.id, error = %e, "Failed to store checkout");
        }
    }
}
