//! The cart state container.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use cartsync_core::{CartLine, Price, StoredLine, VariantId, total_price, total_quantity};

use super::checkout::CheckoutContext;
use super::error::CartError;
use super::remote::CheckoutRemote;
use super::storage::{CART_KEY, CartStorage};
use super::subtotal::Subtotal;

/// Observable cart state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    /// Lines in insertion order; a changed line moves to the end.
    pub lines: Vec<CartLine>,
    /// A remote call is in flight.
    pub loading: bool,
    /// Errors from the last failed remote operation.
    pub errors: Vec<CartError>,
    /// Incremented every time the line list changes.
    pub version: u64,
}

impl CartState {
    /// Sum of all line quantities.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        total_quantity(&self.lines)
    }

    /// Locally computed total, if every line carries variant details.
    #[must_use]
    pub fn total(&self) -> Option<Price> {
        total_price(&self.lines)
    }

    /// The line for `variant_id`, if present.
    #[must_use]
    pub fn line(&self, variant_id: &VariantId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.variant_id == variant_id)
    }

    fn quantity_of(&self, variant_id: &VariantId) -> Option<i64> {
        self.line(variant_id).map(|line| line.quantity)
    }
}

struct Inner {
    state: CartState,
    /// Lines as of the previous commit.
    committed: Vec<CartLine>,
    /// Lines as last written to storage.
    persisted: Vec<StoredLine>,
}

/// Single authoritative cart for one visitor.
///
/// Mutations are serialized: each one holds the state lock from reading the
/// current quantity until the reconciled state is committed, remote call
/// included.
pub struct CartProvider<S, R, C> {
    storage: S,
    remote: R,
    checkout: C,
    inner: Mutex<Inner>,
    updates: watch::Sender<CartState>,
}

impl<S, R, C> CartProvider<S, R, C>
where
    S: CartStorage,
    R: CheckoutRemote,
    C: CheckoutContext,
{
    /// Create a provider from the lines persisted in `storage`.
    ///
    /// Missing or unreadable data yields an empty cart.
    pub async fn load(storage: S, remote: R, checkout: C) -> Self {
        let persisted = read_stored_lines(&storage).await;
        let lines: Vec<CartLine> = persisted.iter().cloned().map(CartLine::from).collect();

        let state = CartState {
            lines: lines.clone(),
            ..CartState::default()
        };
        let (updates, _) = watch::channel(state.clone());

        Self {
            storage,
            remote,
            checkout,
            inner: Mutex::new(Inner {
                state,
                committed: lines,
                persisted,
            }),
            updates,
        }
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.updates.borrow().clone()
    }

    /// Subscribe to state changes, including `loading` transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.updates.subscribe()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        total_quantity(&self.updates.borrow().lines)
    }

    /// Locally computed total of the current lines.
    #[must_use]
    pub fn total(&self) -> Option<Price> {
        total_price(&self.updates.borrow().lines)
    }

    /// Subtotal to display: the checkout's when one exists, else a local estimate.
    pub async fn subtotal(&self) -> Subtotal {
        let checkout = self.checkout.checkout().await;
        Subtotal::resolve(checkout.as_ref(), &self.updates.borrow().lines)
    }

    /// Add `quantity` of a variant. Quantities saturate at `i64::MAX`.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn add(&self, variant_id: &VariantId, quantity: u32) -> CartState {
        let mut inner = self.inner.lock().await;
        let target = inner
            .state
            .quantity_of(variant_id)
            .unwrap_or(0)
            .saturating_add(i64::from(quantity));
        self.apply_quantity(&mut inner, variant_id, target).await
    }

    /// Take `quantity` of a variant out of the cart.
    ///
    /// A variant with no line is set to `quantity` instead.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn subtract(&self, variant_id: &VariantId, quantity: u32) -> CartState {
        let mut inner = self.inner.lock().await;
        let quantity = i64::from(quantity);
        let target = inner
            .state
            .quantity_of(variant_id)
            .map_or(quantity, |current| current.saturating_sub(quantity));
        self.apply_quantity(&mut inner, variant_id, target).await
    }

    /// Remove a variant from the cart.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn remove(&self, variant_id: &VariantId) -> CartState {
        let mut inner = self.inner.lock().await;
        self.apply_quantity(&mut inner, variant_id, 0).await
    }

    /// Set the quantity of a variant. Zero or less removes the line.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn change_quantity(&self, variant_id: &VariantId, quantity: i64) -> CartState {
        let mut inner = self.inner.lock().await;
        self.apply_quantity(&mut inner, variant_id, quantity).await
    }

    /// Rehydrate persisted lines with variant details from the backend.
    ///
    /// No-op when nothing is persisted. Variants the backend no longer knows
    /// are dropped. On failure the cart is emptied and the error recorded.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> CartState {
        let mut inner = self.inner.lock().await;

        let stored = read_stored_lines(&self.storage).await;
        if stored.is_empty() {
            return inner.state.clone();
        }

        inner.state.loading = true;
        self.publish(&inner.state);

        let ids: Vec<VariantId> = stored.iter().map(|line| line.variant_id.clone()).collect();
        match self.remote.fetch_variants_by_ids(&ids).await {
            Ok(variants) => {
                let quantities: HashMap<&VariantId, i64> = stored
                    .iter()
                    .map(|line| (&line.variant_id, line.quantity))
                    .collect();

                inner.state.lines = variants
                    .into_iter()
                    .filter_map(|variant| {
                        let quantity = *quantities.get(&variant.id)?;
                        Some(CartLine {
                            variant_id: variant.id.clone(),
                            quantity,
                            variant: Some(variant),
                        })
                    })
                    .collect();
                inner.state.errors.clear();
                debug!(lines = inner.state.lines.len(), "Cart rehydrated");
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch cart variants");
                inner.state.lines.clear();
                inner.state.errors = vec![CartError::from(&e)];
            }
        }

        self.finish(&mut inner).await
    }

    /// Empty the cart and its errors. The remote checkout is left alone.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> CartState {
        let mut inner = self.inner.lock().await;
        inner.state.lines.clear();
        inner.state.errors.clear();
        self.finish(&mut inner).await
    }

    /// Drop recorded errors.
    pub async fn clear_errors(&self) -> CartState {
        let mut inner = self.inner.lock().await;
        inner.state.errors.clear();
        self.finish(&mut inner).await
    }

    async fn apply_quantity(
        &self,
        inner: &mut Inner,
        variant_id: &VariantId,
        quantity: i64,
    ) -> CartState {
        let quantity = if quantity < 0 {
            debug!(requested = quantity, "Clamping negative quantity to zero");
            0
        } else {
            quantity
        };

        inner.state.loading = true;
        self.publish(&inner.state);

        if let Some(checkout) = self.checkout.checkout().await {
            match self
                .remote
                .update_line_quantity(&checkout.id, variant_id, quantity)
                .await
            {
                Ok(update) if update.has_errors() => {
                    warn!(
                        checkout_id = %checkout.id,
                        errors = update.errors.len(),
                        "Checkout rejected line update"
                    );
                    inner.state.errors = update.errors.into_iter().map(CartError::from).collect();
                    return self.finish(inner).await;
                }
                Ok(update) => {
                    if let Some(checkout) = update.checkout {
                        self.checkout.update(checkout).await;
                    }
                }
                Err(e) => {
                    warn!(checkout_id = %checkout.id, error = %e, "Checkout line update failed");
                    inner.state.errors = vec![CartError::from(&e)];
                    return self.finish(inner).await;
                }
            }
        }

        reconcile_line(&mut inner.state.lines, variant_id, quantity);
        self.finish(inner).await
    }

    /// End an operation: clear `loading`, commit, publish.
    async fn finish(&self, inner: &mut Inner) -> CartState {
        inner.state.loading = false;
        self.commit(inner).await;
        self.publish(&inner.state);
        inner.state.clone()
    }

    /// Detect line changes since the previous commit and persist them.
    ///
    /// Storage failures are logged; the next change retries the write.
    async fn commit(&self, inner: &mut Inner) {
        if inner.state.lines != inner.committed {
            inner.state.version += 1;
            inner.committed.clone_from(&inner.state.lines);
        }

        let stored: Vec<StoredLine> = inner.state.lines.iter().map(CartLine::to_stored).collect();
        if stored == inner.persisted {
            return;
        }

        let json = match serde_json::to_string(&stored) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        match self.storage.set(CART_KEY, json).await {
            Ok(()) => {
                debug!(lines = stored.len(), "Cart persisted");
                inner.persisted = stored;
            }
            Err(e) => warn!(error = %e, "Failed to persist cart"),
        }
    }

    fn publish(&self, state: &CartState) {
        self.updates.send_replace(state.clone());
    }
}

/// Replace the line for `variant_id` with one at `quantity`, appended last.
///
/// Variant details of the replaced line are kept.
fn reconcile_line(lines: &mut Vec<CartLine>, variant_id: &VariantId, quantity: i64) {
    let previous = lines
        .iter()
        .position(|line| &line.variant_id == variant_id)
        .map(|index| lines.remove(index));

    if quantity > 0 {
        lines.push(CartLine {
            variant_id: variant_id.clone(),
            quantity,
            variant: previous.and_then(|line| line.variant),
        });
    }
}

/// Read persisted lines; any failure reads as an empty cart.
async fn read_stored_lines<S: CartStorage>(storage: &S) -> Vec<StoredLine> {
    let raw = match storage.get(CART_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read cart from storage");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<StoredLine>>>(&raw) {
        Ok(lines) => normalize(lines.unwrap_or_default()),
        Err(e) => {
            debug!(error = %e, "Ignoring unreadable stored cart");
            Vec::new()
        }
    }
}

/// Enforce one positive line per variant; a later duplicate wins.
fn normalize(lines: Vec<StoredLine>) -> Vec<StoredLine> {
    let mut result: Vec<StoredLine> = Vec::with_capacity(lines.len());
    for line in lines {
        result.retain(|existing| existing.variant_id != line.variant_id);
        if line.quantity > 0 {
            result.push(line);
        }
    }
    result
}
