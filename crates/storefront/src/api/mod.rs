//! Commerce backend GraphQL client.
//!
//! # Architecture
//!
//! - Uses `graphql_client` request/response envelopes with hand-written
//!   operation documents (see [`client::queries`])
//! - The backend is the source of truth for checkouts and variant pricing
//! - In-memory caching via `moka` for variant details and the last known
//!   checkout (5 minute TTL)
//!
//! # Operations
//!
//! - `checkoutLinesUpdate` - set the quantity of one variant on a checkout
//! - `productVariants` - variant details (name, price) by id
//! - `checkout` - read a checkout by id
//!
//! # Example
//!
//! ```rust,ignore
//! use cartsync_storefront::api::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config.api);
//!
//! let variants = client.get_variants_by_ids(&[variant_id.clone()]).await?;
//! let update = client.update_checkout_line(&checkout_id, &variant_id, 2).await?;
//! ```

pub mod client;
pub mod types;

pub use client::StorefrontClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
///
/// None of these are fatal to the cart: the provider turns them into
/// [`CartError::Remote`](crate::cart::CartError::Remote) records.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The operation ran and reported errors instead of data.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A successful response lacked a field the operation always returns.
    #[error("Response missing {0}")]
    Missing(&'static str),

    /// The requested checkout does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response data could not be converted into domain types.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl ApiError {
    /// A GraphQL failure carrying one message.
    #[cfg(test)]
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![message.into()])
    }
}
