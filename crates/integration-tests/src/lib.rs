//! Integration test helpers for cartsync.
//!
//! Tests run without external services: the commerce backend is a `mockito`
//! server speaking the GraphQL wire format, sessions live in a
//! `tower_sessions::MemoryStore`, and the `PostgreSQL` pool is created lazily
//! and never connected.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartsync-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use mockito::{Matcher, Mock, ServerGuard};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower_sessions::MemoryStore;
use url::Url;

use cartsync_storefront::config::{StorefrontApiConfig, StorefrontConfig};
use cartsync_storefront::middleware::{SESSION_COOKIE_NAME, create_session_layer};
use cartsync_storefront::routes;
use cartsync_storefront::state::AppState;

/// Path the mock backend serves GraphQL on.
pub const GRAPHQL_PATH: &str = "/graphql/";

/// API configuration pointing at the mock backend.
///
/// # Panics
///
/// Panics if the mock server URL is not a valid URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn api_config(server: &ServerGuard) -> StorefrontApiConfig {
    StorefrontApiConfig {
        api_url: Url::parse(&format!("{}{GRAPHQL_PATH}", server.url())).unwrap(),
        api_token: None,
    }
}

/// Full storefront configuration pointing at the mock backend.
#[must_use]
pub fn storefront_config(server: &ServerGuard) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/cartsync_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        api: api_config(server),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// The cart router with in-memory sessions.
///
/// # Panics
///
/// Panics if the lazy pool cannot be configured.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_app(server: &ServerGuard) -> Router {
    let config = storefront_config(server);
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/cartsync_test")
        .unwrap();
    let state = AppState::new(config, pool);
    let session_layer = create_session_layer(MemoryStore::default(), state.config());

    routes::routes().layer(session_layer).with_state(state)
}

/// Build a form POST, optionally carrying a session cookie.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn form_post(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// Build a GET, optionally carrying a session cookie.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// The `name=value` pair of the session cookie set by a response.
#[must_use]
pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(SESSION_COOKIE_NAME))
        .and_then(|value| value.split(';').next())
        .map(String::from)
}

/// Read a response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
#[allow(clippy::unwrap_used)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Backend fixtures
// =============================================================================

/// A `productVariants` node.
#[must_use]
pub fn variant_node(id: &str, product_name: &str, amount: f64) -> Value {
    json!({
        "id": id,
        "name": "",
        "sku": format!("SKU-{id}"),
        "price": { "amount": amount, "currency": "USD" },
        "product": { "id": format!("product-{id}"), "name": product_name }
    })
}

/// A `productVariants` response body.
#[must_use]
pub fn variants_body(nodes: &[Value]) -> String {
    let edges: Vec<Value> = nodes.iter().map(|node| json!({ "node": node })).collect();
    json!({ "data": { "productVariants": { "edges": edges } } }).to_string()
}

/// A checkout object in wire format.
#[must_use]
pub fn checkout_node(id: &str, subtotal: f64, lines: &[(&str, i64)]) -> Value {
    let lines: Vec<Value> = lines
        .iter()
        .enumerate()
        .map(|(i, (variant_id, quantity))| {
            json!({
                "id": format!("line-{i}"),
                "quantity": quantity,
                "variant": { "id": variant_id }
            })
        })
        .collect();

    json!({
        "id": id,
        "subtotalPrice": { "gross": { "amount": subtotal, "currency": "USD" } },
        "totalPrice": { "gross": { "amount": subtotal, "currency": "USD" } },
        "lines": lines
    })
}

/// A `checkoutLinesUpdate` response body.
#[must_use]
pub fn lines_update_body(checkout: Option<Value>, errors: &[(&str, &str)]) -> String {
    let errors: Vec<Value> = errors
        .iter()
        .map(|(field, message)| json!({ "field": field, "message": message }))
        .collect();
    json!({
        "data": {
            "checkoutLinesUpdate": { "checkout": checkout, "errors": errors }
        }
    })
    .to_string()
}

/// Mock one GraphQL operation by operation name.
pub async fn mock_operation(
    server: &mut ServerGuard,
    operation: &str,
    body: impl Into<String>,
) -> Mock {
    server
        .mock("POST", GRAPHQL_PATH)
        .match_body(Matcher::PartialJson(json!({ "operationName": operation })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.into())
        .create_async()
        .await
}
