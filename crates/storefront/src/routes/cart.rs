//! Cart route handlers.
//!
//! Each request loads the visitor's cart from the session, applies one
//! operation, and renders an HTMX fragment. Mutations send an `HX-Trigger:
//! cart-updated` header so the count badge and subtotal refresh themselves.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cartsync_core::{CartLine, CheckoutId, VariantId};

use crate::api::{ApiError, Checkout, StorefrontClient};
use crate::cart::{
    CartProvider, CartState, CheckoutContext, SessionStorage, StoredCheckout, Subtotal,
};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// The cart as seen by one request.
pub type SessionCart = CartProvider<SessionStorage, StorefrontClient, StoredCheckout<SessionStorage>>;

/// Event name sent to HTMX after a successful mutation.
const CART_UPDATED: &str = "cart-updated";

// =============================================================================
// Views
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub variant_id: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: i64,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let variant = line.variant.as_ref();
        Self {
            variant_id: line.variant_id.to_string(),
            title: variant.map_or_else(
                || line.variant_id.to_string(),
                |v| v.product_name.clone(),
            ),
            variant_title: variant
                .map(|v| v.name.clone())
                .filter(|name| !name.is_empty()),
            quantity: line.quantity,
            price: variant.map_or_else(|| "-".to_string(), |v| v.price.display()),
            line_price: line
                .line_price()
                .map_or_else(|| "-".to_string(), |price| price.display()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: i64,
    pub subtotal: String,
    pub errors: Vec<String>,
}

impl CartView {
    fn new(state: &CartState, subtotal: &Subtotal) -> Self {
        Self {
            lines: state.lines.iter().map(CartLineView::from).collect(),
            item_count: state.quantity(),
            subtotal: subtotal.display(),
            errors: state.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Cart subtotal fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_subtotal.html")]
pub struct CartSubtotalTemplate {
    pub subtotal: String,
}

// =============================================================================
// Forms
// =============================================================================

/// Add or subtract form data.
#[derive(Debug, Deserialize)]
pub struct QuantityDeltaForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Set quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub variant_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub variant_id: String,
}

/// Attach checkout form data.
#[derive(Debug, Deserialize)]
pub struct AttachCheckoutForm {
    pub checkout_id: String,
}

fn parse_variant_id(raw: &str) -> Result<VariantId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("variant_id is required".to_string()));
    }
    Ok(VariantId::new(trimmed))
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_cart(state: &AppState, session: Session) -> SessionCart {
    let storage = SessionStorage::new(session);
    CartProvider::load(
        storage.clone(),
        state.storefront().clone(),
        StoredCheckout::new(storage),
    )
    .await
}

async fn render_items(cart: &SessionCart, state: &CartState) -> CartItemsTemplate {
    let subtotal = cart.subtotal().await;
    CartItemsTemplate {
        cart: CartView::new(state, &subtotal),
    }
}

/// Render the items fragment, announcing the change when it succeeded.
async fn mutation_response(cart: &SessionCart, state: &CartState) -> Response {
    let fragment = render_items(cart, state).await;
    if state.errors.is_empty() {
        (AppendHeaders([("HX-Trigger", CART_UPDATED)]), fragment).into_response()
    } else {
        fragment.into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
///
/// Without a checkout the lines are rehydrated from the backend so prices
/// and names can be shown.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&state, session.clone()).await;

    let has_checkout = StoredCheckout::new(SessionStorage::new(session))
        .checkout()
        .await
        .is_some();
    let snapshot = if has_checkout {
        cart.snapshot()
    } else {
        cart.fetch().await
    };

    let subtotal = cart.subtotal().await;
    CartShowTemplate {
        cart: CartView::new(&snapshot, &subtotal),
    }
}

/// Add a variant to the cart (HTMX).
///
/// Returns the count badge like the add-to-cart buttons expect.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<QuantityDeltaForm>,
) -> Result<Response> {
    let variant_id = parse_variant_id(&form.variant_id)?;
    let cart = load_cart(&state, session).await;

    let snapshot = cart.add(&variant_id, form.quantity.unwrap_or(1)).await;
    let badge = CartCountTemplate {
        count: snapshot.quantity(),
    };

    if snapshot.errors.is_empty() {
        Ok((AppendHeaders([("HX-Trigger", CART_UPDATED)]), badge).into_response())
    } else {
        Ok(render_items(&cart, &snapshot).await.into_response())
    }
}

/// Subtract a quantity of a variant (HTMX).
#[instrument(skip(state, session))]
pub async fn subtract(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<QuantityDeltaForm>,
) -> Result<Response> {
    let variant_id = parse_variant_id(&form.variant_id)?;
    let cart = load_cart(&state, session).await;

    let snapshot = cart.subtract(&variant_id, form.quantity.unwrap_or(1)).await;
    Ok(mutation_response(&cart, &snapshot).await)
}

/// Set the quantity of a variant (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let variant_id = parse_variant_id(&form.variant_id)?;
    let cart = load_cart(&state, session).await;

    let snapshot = cart.change_quantity(&variant_id, i64::from(form.quantity)).await;
    Ok(mutation_response(&cart, &snapshot).await)
}

/// Remove a variant from the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let variant_id = parse_variant_id(&form.variant_id)?;
    let cart = load_cart(&state, session).await;

    let snapshot = cart.remove(&variant_id).await;
    Ok(mutation_response(&cart, &snapshot).await)
}

/// Empty the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Response {
    let cart = load_cart(&state, session).await;
    let snapshot = cart.clear().await;
    mutation_response(&cart, &snapshot).await
}

/// Dismiss displayed errors (HTMX).
#[instrument(skip(state, session))]
pub async fn clear_errors(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&state, session).await;
    let snapshot = cart.clear_errors().await;
    render_items(&cart, &snapshot).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&state, session).await;
    CartCountTemplate {
        count: cart.quantity(),
    }
}

/// Get cart subtotal (HTMX).
#[instrument(skip(state, session))]
pub async fn subtotal(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&state, session).await;
    CartSubtotalTemplate {
        subtotal: cart.subtotal().await.display(),
    }
}

/// Cart state as JSON.
#[instrument(skip(state, session))]
pub async fn snapshot(State(state): State<AppState>, session: Session) -> Json<CartState> {
    let cart = load_cart(&state, session).await;
    Json(cart.snapshot())
}

/// The visitor's checkout, refreshed from the backend (JSON).
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Json<Checkout>> {
    let context = StoredCheckout::new(SessionStorage::new(session));
    let stored = context
        .checkout()
        .await
        .ok_or_else(|| AppError::NotFound("No checkout for this session".to_string()))?;

    state.storefront().invalidate_checkout(&stored.id).await;
    let checkout = state.storefront().get_checkout(&stored.id).await?;
    context.update(checkout.clone()).await;
    Ok(Json(checkout))
}

/// Attach an existing backend checkout to this session.
///
/// Later cart mutations are mirrored to it line by line.
#[instrument(skip(state, session))]
pub async fn attach_checkout(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AttachCheckoutForm>,
) -> Result<impl IntoResponse> {
    let checkout_id = form.checkout_id.trim();
    if checkout_id.is_empty() {
        return Err(AppError::BadRequest("checkout_id is required".to_string()));
    }
    let checkout_id = CheckoutId::new(checkout_id);

    state.storefront().invalidate_checkout(&checkout_id).await;
    let checkout = state
        .storefront()
        .get_checkout(&checkout_id)
        .await
        .map_err(|e| match e {
            ApiError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Api(other),
        })?;
    StoredCheckout::new(SessionStorage::new(session))
        .update(checkout.clone())
        .await;

    Ok((AppendHeaders([("HX-Trigger", CART_UPDATED)]), Json(checkout)))
}
