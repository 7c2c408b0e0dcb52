//! HTTP route handlers for the storefront.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod cart;

/// Create the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/cart", cart_routes())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/subtract", post(cart::subtract))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/errors/clear", post(cart::clear_errors))
        .route("/count", get(cart::count))
        .route("/subtotal", get(cart::subtotal))
        .route("/state", get(cart::snapshot))
        .route(
            "/checkout",
            get(cart::checkout).post(cart::attach_checkout),
        )
}
