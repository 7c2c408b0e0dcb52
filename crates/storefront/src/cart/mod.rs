//! Session cart: local line items synchronized with a remote checkout.
//!
//! # Architecture
//!
//! - [`CartProvider`] is the single authoritative in-memory cart. All
//!   mutations go through one primitive, [`CartProvider::change_quantity`]
//! - Lines are persisted through a [`CartStorage`] key-value store under
//!   [`CART_KEY`]; persistence is driven by change detection, not by the
//!   mutation methods themselves
//! - When the [`CheckoutContext`] knows a checkout, every change is first
//!   applied remotely through a [`CheckoutRemote`]
//! - Consumers observe state through a `tokio::sync::watch` subscription
//!
//! ```text
//! route handler ─▶ CartProvider ─▶ CheckoutRemote (if checkout)
//!                       │
//!                       ├─▶ reconcile lines ─▶ CartStorage ("cart")
//!                       └─▶ watch subscribers
//! ```

pub mod checkout;
pub mod error;
pub mod provider;
pub mod remote;
pub mod storage;
pub mod subtotal;

pub use checkout::{CheckoutContext, StoredCheckout};
pub use error::CartError;
pub use provider::{CartProvider, CartState};
pub use remote::CheckoutRemote;
pub use storage::{CART_KEY, CHECKOUT_KEY, CartStorage, MemoryStorage, SessionStorage, StorageError};
pub use subtotal::Subtotal;
