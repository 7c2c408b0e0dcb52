//! `StorefrontClient` against a mocked GraphQL backend.

#![allow(clippy::unwrap_used)]

use mockito::Matcher;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;

use cartsync_core::{CheckoutId, CurrencyCode, VariantId};
use cartsync_integration_tests::{
    GRAPHQL_PATH, api_config, checkout_node, lines_update_body, mock_operation, variant_node,
    variants_body,
};
use cartsync_storefront::api::{ApiError, StorefrontClient};

#[tokio::test]
async fn test_update_checkout_line_sends_full_quantity() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GRAPHQL_PATH)
        .match_body(Matcher::PartialJson(json!({
            "operationName": "UpdateCheckoutLine",
            "variables": {
                "checkoutId": "c1",
                "lines": [{ "variantId": "v1", "quantity": 5 }]
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(lines_update_body(
            Some(checkout_node("c1", 50.0, &[("v1", 5)])),
            &[],
        ))
        .expect(1)
        .create_async()
        .await;

    let client = StorefrontClient::new(&api_config(&server));
    let update = client
        .update_checkout_line(&CheckoutId::new("c1"), &VariantId::new("v1"), 5)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(!update.has_errors());
    let checkout = update.checkout.unwrap();
    assert_eq!(checkout.total_quantity(), 5);
    assert_eq!(checkout.subtotal_price.amount, Decimal::new(50, 0));
    assert_eq!(checkout.subtotal_price.currency_code, CurrencyCode::USD);
}

#[tokio::test]
async fn test_update_checkout_line_returns_field_errors() {
    let mut server = mockito::Server::new_async().await;
    mock_operation(
        &mut server,
        "UpdateCheckoutLine",
        lines_update_body(None, &[("quantity", "Only 2 remaining in stock")]),
    )
    .await;

    let client = StorefrontClient::new(&api_config(&server));
    let update = client
        .update_checkout_line(&CheckoutId::new("c1"), &VariantId::new("v1"), 9)
        .await
        .unwrap();

    assert!(update.checkout.is_none());
    assert_eq!(update.errors.len(), 1);
    assert_eq!(update.errors[0].field.as_deref(), Some("quantity"));
    assert_eq!(update.errors[0].message, "Only 2 remaining in stock");
}

#[tokio::test]
async fn test_updated_checkout_is_served_from_cache() {
    let mut server = mockito::Server::new_async().await;
    mock_operation(
        &mut server,
        "UpdateCheckoutLine",
        lines_update_body(Some(checkout_node("c1", 20.0, &[("v1", 2)])), &[]),
    )
    .await;
    let get_checkout = server
        .mock("POST", GRAPHQL_PATH)
        .match_body(Matcher::PartialJson(json!({ "operationName": "GetCheckout" })))
        .with_status(200)
        .with_body(json!({ "data": { "checkout": null } }).to_string())
        .expect(0)
        .create_async()
        .await;

    let client = StorefrontClient::new(&api_config(&server));
    let checkout_id = CheckoutId::new("c1");
    client
        .update_checkout_line(&checkout_id, &VariantId::new("v1"), 2)
        .await
        .unwrap();

    let checkout = client.get_checkout(&checkout_id).await.unwrap();

    get_checkout.assert_async().await;
    assert_eq!(checkout.total_quantity(), 2);
}

#[tokio::test]
async fn test_get_checkout_not_found() {
    let mut server = mockito::Server::new_async().await;
    mock_operation(
        &mut server,
        "GetCheckout",
        json!({ "data": { "checkout": null } }).to_string(),
    )
    .await;

    let client = StorefrontClient::new(&api_config(&server));
    let err = client
        .get_checkout(&CheckoutId::new("missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_variants_follow_request_order_and_skip_unknown() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GRAPHQL_PATH)
        .match_body(Matcher::PartialJson(json!({
            "operationName": "VariantList",
            "variables": { "ids": ["v2", "gone", "v1"], "first": 3 }
        })))
        .with_status(200)
        .with_body(variants_body(&[
            variant_node("v1", "Linen Shirt", 10.0),
            variant_node("v2", "Coconut Hat", 4.5),
        ]))
        .expect(1)
        .create_async()
        .await;

    let client = StorefrontClient::new(&api_config(&server));
    let ids = [VariantId::new("v2"), VariantId::new("gone"), VariantId::new("v1")];
    let variants = client.get_variants_by_ids(&ids).await.unwrap();

    let ordered: Vec<&str> = variants.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ordered, vec!["v2", "v1"]);
    assert_eq!(variants[0].product_name, "Coconut Hat");
    assert_eq!(variants[0].price.amount, Decimal::new(45, 1));

    // Both known variants are cached now
    let again = client
        .get_variants_by_ids(&[VariantId::new("v1"), VariantId::new("v2")])
        .await
        .unwrap();
    assert_eq!(again.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_graphql_errors_are_reported() {
    let mut server = mockito::Server::new_async().await;
    mock_operation(
        &mut server,
        "VariantList",
        json!({
            "data": null,
            "errors": [{ "message": "Couldn't resolve to a node: v1" }]
        })
        .to_string(),
    )
    .await;

    let client = StorefrontClient::new(&api_config(&server));
    let err = client
        .get_variants_by_ids(&[VariantId::new("v1")])
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::GraphQL(_)));
    assert_eq!(
        err.to_string(),
        "GraphQL errors: Couldn't resolve to a node: v1"
    );
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", GRAPHQL_PATH)
        .with_status(429)
        .with_header("Retry-After", "7")
        .create_async()
        .await;

    let client = StorefrontClient::new(&api_config(&server));
    let err = client
        .get_variants_by_ids(&[VariantId::new("v1")])
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::RateLimited(7)));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", GRAPHQL_PATH)
        .with_status(502)
        .with_body("upstream down")
        .create_async()
        .await;

    let client = StorefrontClient::new(&api_config(&server));
    let err = client
        .update_checkout_line(&CheckoutId::new("c1"), &VariantId::new("v1"), 1)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("HTTP 502"));
}

#[tokio::test]
async fn test_bearer_token_is_sent_when_configured() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GRAPHQL_PATH)
        .match_header("authorization", "Bearer tk_9fQ2mZ7xLp4Rv8Ns")
        .with_status(200)
        .with_body(variants_body(&[]))
        .expect(1)
        .create_async()
        .await;

    let mut config = api_config(&server);
    config.api_token = Some(SecretString::from("tk_9fQ2mZ7xLp4Rv8Ns"));
    let client = StorefrontClient::new(&config);

    let variants = client
        .get_variants_by_ids(&[VariantId::new("v1")])
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(variants.is_empty());
}
