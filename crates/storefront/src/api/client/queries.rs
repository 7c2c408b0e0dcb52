//! GraphQL operation definitions for the commerce backend.
//!
//! Each operation implements [`GraphQLQuery`] by hand: the document is a
//! static string and the variables/response shapes are plain serde structs,
//! so no schema file is needed at build time.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

/// Fragment shared by every operation that returns a checkout.
macro_rules! checkout_fields {
    () => {
        r"
fragment CheckoutFields on Checkout {
  id
  subtotalPrice {
    gross {
      amount
      currency
    }
  }
  totalPrice {
    gross {
      amount
      currency
    }
  }
  lines {
    id
    quantity
    variant {
      id
    }
  }
}
"
    };
}

#[cfg(test)]
const CHECKOUT_FIELDS: &str = checkout_fields!();

// =============================================================================
// Shared response shapes
// =============================================================================

/// `Money` scalar pair as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct MoneyFields {
    pub amount: f64,
    pub currency: String,
}

/// `TaxedMoney`; only the gross amount is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxedMoneyFields {
    pub gross: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutLineFields {
    pub id: String,
    pub quantity: i64,
    pub variant: Option<VariantRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFields {
    pub id: String,
    pub subtotal_price: Option<TaxedMoneyFields>,
    pub total_price: Option<TaxedMoneyFields>,
    #[serde(default)]
    pub lines: Vec<Option<CheckoutLineFields>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutErrorFields {
    pub field: Option<String>,
    pub message: Option<String>,
}

// =============================================================================
// checkoutLinesUpdate
// =============================================================================

pub struct UpdateCheckoutLine;

pub mod update_checkout_line {
    use super::{CheckoutErrorFields, CheckoutFields, Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "UpdateCheckoutLine";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CheckoutLineInput {
        pub variant_id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub checkout_id: String,
        pub lines: Vec<CheckoutLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub checkout_lines_update: Option<CheckoutLinesUpdatePayload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CheckoutLinesUpdatePayload {
        pub checkout: Option<CheckoutFields>,
        #[serde(default)]
        pub errors: Vec<CheckoutErrorFields>,
    }
}

impl GraphQLQuery for UpdateCheckoutLine {
    type Variables = update_checkout_line::Variables;
    type ResponseData = update_checkout_line::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: UPDATE_CHECKOUT_LINE_QUERY,
            operation_name: update_checkout_line::OPERATION_NAME,
        }
    }
}

const UPDATE_CHECKOUT_LINE_QUERY: &str = concat!(
    r"
mutation UpdateCheckoutLine($checkoutId: ID!, $lines: [CheckoutLineInput]!) {
  checkoutLinesUpdate(checkoutId: $checkoutId, lines: $lines) {
    checkout {
      ...CheckoutFields
    }
    errors {
      field
      message
    }
  }
}
",
    checkout_fields!()
);

// =============================================================================
// productVariants
// =============================================================================

pub struct VariantList;

pub mod variant_list {
    use super::{Deserialize, MoneyFields, Serialize};

    pub const OPERATION_NAME: &str = "VariantList";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub ids: Vec<String>,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_variants: Option<ProductVariantConnection>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductVariantConnection {
        #[serde(default)]
        pub edges: Vec<ProductVariantEdge>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductVariantEdge {
        pub node: ProductVariantNode,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductVariantNode {
        pub id: String,
        #[serde(default)]
        pub name: String,
        pub sku: Option<String>,
        pub price: Option<MoneyFields>,
        pub product: ProductRef,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductRef {
        pub id: String,
        pub name: String,
    }
}

impl GraphQLQuery for VariantList {
    type Variables = variant_list::Variables;
    type ResponseData = variant_list::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: VARIANT_LIST_QUERY,
            operation_name: variant_list::OPERATION_NAME,
        }
    }
}

const VARIANT_LIST_QUERY: &str = r"
query VariantList($ids: [ID!], $first: Int) {
  productVariants(ids: $ids, first: $first) {
    edges {
      node {
        id
        name
        sku
        price {
          amount
          currency
        }
        product {
          id
          name
        }
      }
    }
  }
}
";

// =============================================================================
// checkout
// =============================================================================

pub struct GetCheckout;

pub mod get_checkout {
    use super::{CheckoutFields, Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetCheckout";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub checkout: Option<CheckoutFields>,
    }
}

impl GraphQLQuery for GetCheckout {
    type Variables = get_checkout::Variables;
    type ResponseData = get_checkout::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: GET_CHECKOUT_QUERY,
            operation_name: get_checkout::OPERATION_NAME,
        }
    }
}

const GET_CHECKOUT_QUERY: &str = concat!(
    r"
query GetCheckout($id: ID!) {
  checkout(id: $id) {
    ...CheckoutFields
  }
}
",
    checkout_fields!()
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_checkout_line_body() {
        let body = UpdateCheckoutLine::build_query(update_checkout_line::Variables {
            checkout_id: "c1".to_string(),
            lines: vec![update_checkout_line::CheckoutLineInput {
                variant_id: "v1".to_string(),
                quantity: 3,
            }],
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["operationName"], "UpdateCheckoutLine");
        assert_eq!(json["variables"]["checkoutId"], "c1");
        assert_eq!(json["variables"]["lines"][0]["variantId"], "v1");
        assert_eq!(json["variables"]["lines"][0]["quantity"], 3);
        assert!(
            json["query"]
                .as_str()
                .unwrap()
                .contains("fragment CheckoutFields on Checkout")
        );
    }

    #[test]
    fn test_checkout_fragment_is_shared() {
        assert!(UPDATE_CHECKOUT_LINE_QUERY.ends_with(CHECKOUT_FIELDS));
        assert!(GET_CHECKOUT_QUERY.ends_with(CHECKOUT_FIELDS));
    }

    #[test]
    fn test_variant_list_response_parses() {
        let data: variant_list::ResponseData = serde_json::from_value(serde_json::json!({
            "productVariants": {
                "edges": [{
                    "node": {
                        "id": "v1",
                        "name": "XL",
                        "sku": null,
                        "price": { "amount": 10, "currency": "USD" },
                        "product": { "id": "p1", "name": "Shirt" }
                    }
                }]
            }
        }))
        .unwrap();

        let edges = data.product_variants.unwrap().edges;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].node.product.name, "Shirt");
    }
}
