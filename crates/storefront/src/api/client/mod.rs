//! Commerce backend GraphQL client implementation.
//!
//! Uses `graphql_client` envelopes with `reqwest` 0.13 for HTTP.
//! Caches variant details and checkouts using `moka` (5-minute TTL).

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use cartsync_core::{CheckoutId, VariantDetails, VariantId};

use crate::api::types::{Checkout, CheckoutLinesUpdate};
use crate::api::ApiError;
use crate::config::StorefrontApiConfig;

use cache::{CacheKey, CacheValue};
use conversions::{convert_checkout, convert_field_error, convert_variant};
use queries::{
    GetCheckout, UpdateCheckoutLine, VariantList, get_checkout, update_checkout_line,
    variant_list,
};

/// Upper bound on the page size of a variant lookup.
const MAX_VARIANTS_PER_QUERY: usize = 100;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the commerce backend's storefront GraphQL API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new storefront API client.
    #[must_use]
    pub fn new(config: &StorefrontApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.api_url.to_string(),
                access_token: config.api_token.clone(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ApiError> {
        let request_body = Q::build_query(variables);

        let mut request = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("Content-Type", "application/json")
            .json(&request_body);

        if let Some(token) = &self.inner.access_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse storefront GraphQL response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");

            return Err(ApiError::GraphQL(
                errors.into_iter().map(describe_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront GraphQL response has no data and no errors"
            );
            ApiError::Missing("data")
        })
    }

    // =========================================================================
    // Checkout Methods (the mutation refreshes the cached checkout)
    // =========================================================================

    /// Set the quantity of one variant on a checkout.
    ///
    /// `quantity` is the full desired quantity, not a delta; zero removes the
    /// line. Field errors are returned in the result rather than as `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self), fields(checkout_id = %checkout_id, variant_id = %variant_id))]
    pub async fn update_checkout_line(
        &self,
        checkout_id: &CheckoutId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<CheckoutLinesUpdate, ApiError> {
        let variables = update_checkout_line::Variables {
            checkout_id: checkout_id.to_string(),
            lines: vec![update_checkout_line::CheckoutLineInput {
                variant_id: variant_id.to_string(),
                quantity,
            }],
        };

        let data = self.execute::<UpdateCheckoutLine>(variables).await?;

        let payload = data
            .checkout_lines_update
            .ok_or(ApiError::Missing("checkoutLinesUpdate"))?;

        let errors: Vec<_> = payload
            .errors
            .into_iter()
            .map(convert_field_error)
            .collect();

        let checkout = payload.checkout.map(convert_checkout).transpose()?;

        if let Some(checkout) = &checkout {
            self.inner
                .cache
                .insert(
                    CacheKey::Checkout(checkout.id.clone()),
                    CacheValue::Checkout(Box::new(checkout.clone())),
                )
                .await;
        }

        debug!(errors = errors.len(), "Checkout line updated");
        Ok(CheckoutLinesUpdate { checkout, errors })
    }

    /// Get a checkout by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout is not found or the request fails.
    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    pub async fn get_checkout(&self, checkout_id: &CheckoutId) -> Result<Checkout, ApiError> {
        let cache_key = CacheKey::Checkout(checkout_id.clone());

        if let Some(CacheValue::Checkout(checkout)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for checkout");
            return Ok(*checkout);
        }

        let variables = get_checkout::Variables {
            id: checkout_id.to_string(),
        };

        let data = self.execute::<GetCheckout>(variables).await?;

        let checkout = data
            .checkout
            .ok_or_else(|| ApiError::NotFound(format!("Checkout not found: {checkout_id}")))
            .and_then(convert_checkout)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Checkout(Box::new(checkout.clone())))
            .await;

        Ok(checkout)
    }

    // =========================================================================
    // Variant Methods
    // =========================================================================

    /// Get variant details for the given ids.
    ///
    /// Results follow the order of `ids`; ids unknown to the backend are
    /// omitted. Only ids missing from the cache are queried.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a variant cannot be converted.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_variants_by_ids(
        &self,
        ids: &[VariantId],
    ) -> Result<Vec<VariantDetails>, ApiError> {
        let mut found = std::collections::HashMap::with_capacity(ids.len());
        let mut missing = Vec::new();

        for id in ids {
            match self.inner.cache.get(&CacheKey::Variant(id.clone())).await {
                Some(CacheValue::Variant(variant)) => {
                    found.insert(id.clone(), *variant);
                }
                _ => missing.push(id.to_string()),
            }
        }

        if missing.is_empty() {
            debug!("Cache hit for all variants");
        }

        for chunk in missing.chunks(MAX_VARIANTS_PER_QUERY) {
            let variables = variant_list::Variables {
                ids: chunk.to_vec(),
                first: i64::try_from(chunk.len()).unwrap_or(i64::MAX),
            };

            let data = self.execute::<VariantList>(variables).await?;
            let edges = data
                .product_variants
                .map(|connection| connection.edges)
                .unwrap_or_default();

            for edge in edges {
                let variant = convert_variant(edge.node)?;
                self.inner
                    .cache
                    .insert(
                        CacheKey::Variant(variant.id.clone()),
                        CacheValue::Variant(Box::new(variant.clone())),
                    )
                    .await;
                found.insert(variant.id.clone(), variant);
            }
        }

        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached checkout.
    pub async fn invalidate_checkout(&self, checkout_id: &CheckoutId) {
        self.inner
            .cache
            .invalidate(&CacheKey::Checkout(checkout_id.clone()))
            .await;
    }
}

/// One line per GraphQL error: the message, plus the response path if any.
fn describe_graphql_error(error: graphql_client::Error) -> String {
    let message = if error.message.is_empty() {
        "(no details)".to_string()
    } else {
        error.message
    };

    let path = error
        .path
        .unwrap_or_default()
        .into_iter()
        .map(|fragment| match fragment {
            graphql_client::PathFragment::Key(key) => key,
            graphql_client::PathFragment::Index(index) => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".");

    if path.is_empty() {
        message
    } else {
        format!("{message} (at {path})")
    }
}

#[cfg(test)]
mod tests {
    use graphql_client::PathFragment;

    use super::*;

    fn error(message: &str, path: Option<Vec<PathFragment>>) -> graphql_client::Error {
        graphql_client::Error {
            message: message.to_string(),
            locations: None,
            path,
            extensions: None,
        }
    }

    #[test]
    fn test_describe_graphql_error() {
        assert_eq!(describe_graphql_error(error("Invalid ID", None)), "Invalid ID");
        assert_eq!(
            describe_graphql_error(error(
                "Couldn't resolve",
                Some(vec![
                    PathFragment::Key("productVariants".to_string()),
                    PathFragment::Index(0),
                ]),
            )),
            "Couldn't resolve (at productVariants.0)"
        );
        assert_eq!(describe_graphql_error(error("", None)), "(no details)");
    }
}
