//! `CartProvider` wired to the real client and a mocked backend.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use cartsync_core::{CurrencyCode, Price, VariantId};
use cartsync_integration_tests::{
    api_config, checkout_node, lines_update_body, mock_operation, variant_node, variants_body,
};
use cartsync_storefront::api::{Checkout, StorefrontClient};
use cartsync_storefront::cart::{
    CART_KEY, CHECKOUT_KEY, CartError, CartProvider, CartStorage, CheckoutContext, MemoryStorage,
    StoredCheckout, Subtotal,
};

type Cart = CartProvider<MemoryStorage, StorefrontClient, StoredCheckout<MemoryStorage>>;

fn usd(amount: i64) -> Price {
    Price::new(Decimal::from(amount), CurrencyCode::USD)
}

/// A storage pre-loaded with a checkout in the shape the backend returns.
async fn storage_with_checkout() -> MemoryStorage {
    let storage = MemoryStorage::new();
    let checkout: Checkout = Checkout {
        id: cartsync_core::CheckoutId::new("c1"),
        subtotal_price: usd(0),
        total_price: usd(0),
        lines: vec![],
    };
    StoredCheckout::new(storage.clone()).update(checkout).await;
    storage
}

async fn cart(storage: &MemoryStorage, client: StorefrontClient) -> Cart {
    CartProvider::load(storage.clone(), client, StoredCheckout::new(storage.clone())).await
}

#[tokio::test]
async fn test_add_with_checkout_updates_remote_then_local() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_operation(
        &mut server,
        "UpdateCheckoutLine",
        lines_update_body(Some(checkout_node("c1", 30.0, &[("v1", 3)])), &[]),
    )
    .await;

    let storage = storage_with_checkout().await;
    let cart = cart(&storage, StorefrontClient::new(&api_config(&server))).await;

    let state = cart.add(&VariantId::new("v1"), 3).await;

    mock.assert_async().await;
    assert_eq!(state.quantity(), 3);
    assert!(state.errors.is_empty());
    assert_eq!(cart.subtotal().await, Subtotal::RemoteCheckout(usd(30)));
    assert_eq!(
        storage.get(CART_KEY).await.unwrap().as_deref(),
        Some(r#"[{"variantId":"v1","quantity":3}]"#)
    );
}

#[tokio::test]
async fn test_rejected_update_keeps_lines_and_surfaces_errors() {
    let mut server = mockito::Server::new_async().await;
    mock_operation(
        &mut server,
        "UpdateCheckoutLine",
        lines_update_body(None, &[("quantity", "Only 2 remaining in stock")]),
    )
    .await;

    let storage = storage_with_checkout().await;
    storage
        .set(CART_KEY, r#"[{"variantId":"v1","quantity":2}]"#.to_string())
        .await
        .unwrap();
    let cart = cart(&storage, StorefrontClient::new(&api_config(&server))).await;

    let state = cart.add(&VariantId::new("v1"), 1).await;

    assert_eq!(state.quantity(), 2);
    assert_eq!(
        state.errors,
        vec![CartError::Field {
            field: Some("quantity".to_string()),
            message: "Only 2 remaining in stock".to_string(),
        }]
    );
    assert!(storage.get(CHECKOUT_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_backend_failure_is_recorded() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", cartsync_integration_tests::GRAPHQL_PATH)
        .with_status(500)
        .create_async()
        .await;

    let storage = storage_with_checkout().await;
    let cart = cart(&storage, StorefrontClient::new(&api_config(&server))).await;

    let state = cart.add(&VariantId::new("v1"), 1).await;

    assert!(state.lines.is_empty());
    assert_eq!(state.errors.len(), 1);
    assert!(state.errors[0].field().is_none());
}

#[tokio::test]
async fn test_fetch_rehydrates_persisted_lines() {
    let mut server = mockito::Server::new_async().await;
    mock_operation(
        &mut server,
        "VariantList",
        variants_body(&[variant_node("v1", "Linen Shirt", 10.0)]),
    )
    .await;

    let storage = MemoryStorage::with_entry(CART_KEY, r#"[{"variantId":"v1","quantity":3}]"#);
    let cart = cart(&storage, StorefrontClient::new(&api_config(&server))).await;

    let state = cart.fetch().await;

    assert_eq!(state.quantity(), 3);
    assert_eq!(
        state.lines[0].variant.as_ref().map(|v| v.product_name.as_str()),
        Some("Linen Shirt")
    );
    assert_eq!(cart.total(), Some(usd(30)));
    assert_eq!(cart.subtotal().await.display(), "$30.00");
}

#[tokio::test]
async fn test_concurrent_adds_are_serialized() {
    let server = mockito::Server::new_async().await;
    let cart = std::sync::Arc::new(
        cart(&MemoryStorage::new(), StorefrontClient::new(&api_config(&server))).await,
    );

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let cart = cart.clone();
        tasks.push(tokio::spawn(async move {
            cart.add(&VariantId::new("v1"), 1).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(cart.quantity(), 10);
    assert_eq!(cart.snapshot().lines.len(), 1);
}
