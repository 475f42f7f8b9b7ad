use crate::error::{Error, Result};
use crate::models::customer::{Customer, CustomerStats, CustomerStatus, EnrichedCustomer};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::str::FromStr;

const CUSTOMER_CREATE_MUTATION: &str = r#"
mutation customerCreate($input: CustomerInput!) {
  customerCreate(input: $input) {
    customer {
      id
      email
      firstName
      lastName
      phone
    }
    userErrors {
      field
      message
    }
  }
}"#;

const CUSTOMER_STATS_QUERY: &str = r#"
query getCustomer($id: ID!) {
  customer(id: $id) {
    id
    emailMarketingConsent {
      marketingState
      marketingOptInLevel
    }
    ordersCount
    totalSpent {
      amount
      currencyCode
    }
  }
}"#;

#[derive(Debug, Clone, Serialize)]
pub struct ShopifyAddressInput {
    pub address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

/// Input of the `customerCreate` mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopifyCustomerInput {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<ShopifyAddressInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The customer record Shopify returns from `customerCreate`. `id` is the
/// fully-qualified GID, e.g. `gid://shopify/Customer/123456`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopifyCustomer {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Remote directory seam: the commerce platform holding the authoritative
/// customer records once a registration is approved.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn create_customer(&self, input: ShopifyCustomerInput) -> Result<ShopifyCustomer>;
    async fn fetch_customer_stats(&self, shopify_customer_id: &str) -> Result<CustomerStats>;
}

#[derive(Clone)]
pub struct ShopifyService {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl ShopifyService {
    pub fn new(shop_domain: &str, access_token: String, api_version: &str, client: Client) -> Self {
        Self {
            client,
            endpoint: format!(
                "https://{}/admin/api/{}/graphql.json",
                shop_domain, api_version
            ),
            access_token,
        }
    }

    async fn graphql(&self, query: &str, variables: JsonValue) -> Result<JsonValue> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;

        let body: JsonValue = response.json().await?;
        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(Error::Internal(format!("Shopify GraphQL error: {}", errors)));
        }
        Ok(body)
    }
}

#[async_trait]
impl CustomerDirectory for ShopifyService {
    async fn create_customer(&self, input: ShopifyCustomerInput) -> Result<ShopifyCustomer> {
        let body = self
            .graphql(CUSTOMER_CREATE_MUTATION, json!({ "input": input }))
            .await?;
        let payload = &body["data"]["customerCreate"];

        if let Some(message) = first_user_error(&payload["userErrors"]) {
            return Err(Error::RemoteValidation(message));
        }

        serde_json::from_value(payload["customer"].clone())
            .map_err(|e| Error::Internal(format!("Unexpected customerCreate response: {}", e)))
    }

    async fn fetch_customer_stats(&self, shopify_customer_id: &str) -> Result<CustomerStats> {
        let gid = format!("gid://shopify/Customer/{}", shopify_customer_id);
        let body = self
            .graphql(CUSTOMER_STATS_QUERY, json!({ "id": gid }))
            .await?;
        Ok(parse_customer_stats(&body["data"]["customer"]))
    }
}

/// First field-level error message reported by a mutation, if any.
pub fn first_user_error(user_errors: &JsonValue) -> Option<String> {
    user_errors
        .as_array()?
        .first()?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

/// Trailing path segment of a Shopify GID (`gid://shopify/Customer/555` ->
/// `555`).
pub fn extract_gid_id(gid: &str) -> Option<String> {
    gid.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn parse_customer_stats(customer: &JsonValue) -> CustomerStats {
    let mut stats = CustomerStats::default();
    if customer.is_null() {
        return stats;
    }

    stats.order_count = match &customer["ordersCount"] {
        JsonValue::Number(n) => n.as_i64().unwrap_or(0),
        JsonValue::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    };
    if let Some(amount) = customer["totalSpent"]["amount"].as_str() {
        stats.total_spent = Decimal::from_str(amount).unwrap_or(Decimal::ZERO);
    }
    if let Some(code) = customer["totalSpent"]["currencyCode"].as_str() {
        stats.currency_code = code.to_string();
    }
    stats.email_subscribed =
        customer["emailMarketingConsent"]["marketingState"].as_str() == Some("SUBSCRIBED");
    stats
}

/// The `customerCreate` input for a local registration. The address is sent
/// only when a street address is on file; explicit non-empty notes win over
/// the stored ones.
pub fn build_customer_input(customer: &Customer, notes: Option<&str>) -> ShopifyCustomerInput {
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

    let addresses = non_empty(&customer.address).map(|address1| {
        vec![ShopifyAddressInput {
            address1,
            city: non_empty(&customer.city),
            province: non_empty(&customer.state),
            country: non_empty(&customer.country),
            zip: non_empty(&customer.zip_code),
        }]
    });

    ShopifyCustomerInput {
        email: customer.email.clone(),
        first_name: customer.first_name.clone(),
        last_name: customer.last_name.clone(),
        phone: non_empty(&customer.phone),
        addresses,
        note: effective_notes(notes, customer.notes.as_deref()),
    }
}

/// Explicit notes take precedence over the customer's stored notes; blank
/// values count as absent.
pub fn effective_notes(explicit: Option<&str>, existing: Option<&str>) -> Option<String> {
    explicit
        .filter(|s| !s.is_empty())
        .or_else(|| existing.filter(|s| !s.is_empty()))
        .map(|s| s.to_string())
}

/// Join every approved customer with its Shopify aggregates. Lookups fan out
/// concurrently and results come back in input order. A failed lookup logs
/// and falls back to zeroed stats instead of failing the page.
pub async fn enrich_with_stats<D: CustomerDirectory>(
    directory: &D,
    customers: Vec<Customer>,
) -> Vec<EnrichedCustomer> {
    let lookups = customers.into_iter().map(|customer| async move {
        let remote_id = match (customer.status, &customer.shopify_customer_id) {
            (CustomerStatus::Approved, Some(id)) => Some(id.clone()),
            _ => None,
        };
        let stats = match remote_id {
            Some(id) => match directory.fetch_customer_stats(&id).await {
                Ok(stats) => stats,
                Err(e) => {
                    tracing::error!(
                        customer_id = %customer.id,
                        error = ?e,
                        "Failed to fetch Shopify stats, using defaults"
                    );
                    CustomerStats::default()
                }
            },
            None => CustomerStats::default(),
        };
        EnrichedCustomer { customer, stats }
    });

    join_all(lookups).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn customer(status: CustomerStatus, shopify_id: Option<&str>) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@acme.com".to_string(),
            phone: None,
            company: None,
            address: None,
            city: None,
            state: None,
            country: None,
            zip_code: None,
            notes: None,
            status,
            shopify_customer_id: shopify_id.map(|s| s.to_string()),
            approved_at: None,
            rejected_at: None,
            approved_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn gid_extraction_takes_trailing_segment() {
        assert_eq!(
            extract_gid_id("gid://shopify/Customer/555").as_deref(),
            Some("555")
        );
        assert_eq!(extract_gid_id("555").as_deref(), Some("555"));
        assert_eq!(extract_gid_id("gid://shopify/Customer/"), None);
    }

    #[test]
    fn notes_precedence() {
        assert_eq!(
            effective_notes(Some("new"), Some("old")).as_deref(),
            Some("new")
        );
        assert_eq!(effective_notes(Some(""), Some("old")).as_deref(), Some("old"));
        assert_eq!(effective_notes(None, Some("old")).as_deref(), Some("old"));
        assert_eq!(effective_notes(Some(""), None), None);
    }

    #[test]
    fn address_sent_only_with_street() {
        let mut c = customer(CustomerStatus::Pending, None);
        c.city = Some("Portland".to_string());
        c.zip_code = Some("97201".to_string());
        let input = build_customer_input(&c, None);
        assert!(input.addresses.is_none());

        c.address = Some("1 Main St".to_string());
        let input = build_customer_input(&c, Some("hello"));
        let addrs = input.addresses.expect("addresses");
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].address1, "1 Main St");
        assert_eq!(addrs[0].city.as_deref(), Some("Portland"));
        assert!(addrs[0].country.is_none());
        assert_eq!(input.note.as_deref(), Some("hello"));
    }

    #[test]
    fn user_errors_surface_first_message() {
        let errors = serde_json::json!([
            { "field": ["input", "email"], "message": "Email has already been taken" },
            { "field": ["input", "phone"], "message": "Phone is invalid" }
        ]);
        assert_eq!(
            first_user_error(&errors).as_deref(),
            Some("Email has already been taken")
        );
        assert_eq!(first_user_error(&serde_json::json!([])), None);
        assert_eq!(first_user_error(&JsonValue::Null), None);
    }

    #[test]
    fn stats_parse_with_defaults() {
        let payload = serde_json::json!({
            "id": "gid://shopify/Customer/9",
            "ordersCount": "4",
            "totalSpent": { "amount": "123.45", "currencyCode": "EUR" },
            "emailMarketingConsent": { "marketingState": "SUBSCRIBED" }
        });
        let stats = parse_customer_stats(&payload);
        assert_eq!(stats.order_count, 4);
        assert_eq!(stats.total_spent, Decimal::from_str("123.45").unwrap());
        assert_eq!(stats.currency_code, "EUR");
        assert!(stats.email_subscribed);

        let empty = parse_customer_stats(&JsonValue::Null);
        assert_eq!(empty.order_count, 0);
        assert_eq!(empty.currency_code, "USD");
        assert!(!empty.email_subscribed);
    }

    #[tokio::test]
    async fn enrichment_isolates_per_customer_failures() {
        let mut directory = MockCustomerDirectory::new();
        directory
            .expect_fetch_customer_stats()
            .returning(|id| {
                if id == "2" {
                    Err(Error::Internal("boom".to_string()))
                } else {
                    Ok(CustomerStats {
                        order_count: 7,
                        total_spent: Decimal::from_str("10.00").unwrap(),
                        currency_code: "EUR".to_string(),
                        email_subscribed: true,
                    })
                }
            });

        let page = vec![
            customer(CustomerStatus::Approved, Some("1")),
            customer(CustomerStatus::Approved, Some("2")),
            customer(CustomerStatus::Approved, Some("3")),
        ];
        let expected_ids: Vec<_> = page.iter().map(|c| c.id).collect();

        let enriched = enrich_with_stats(&directory, page).await;
        assert_eq!(enriched.len(), 3);
        let got_ids: Vec<_> = enriched.iter().map(|e| e.customer.id).collect();
        assert_eq!(got_ids, expected_ids);

        assert_eq!(enriched[0].stats.order_count, 7);
        assert!(enriched[0].stats.email_subscribed);
        // the failed lookup falls back to defaults
        assert_eq!(enriched[1].stats.order_count, 0);
        assert_eq!(enriched[1].stats.currency_code, "USD");
        assert!(!enriched[1].stats.email_subscribed);
        assert_eq!(enriched[2].stats.order_count, 7);
    }

    #[tokio::test]
    async fn enrichment_skips_non_approved_rows() {
        let mut directory = MockCustomerDirectory::new();
        directory.expect_fetch_customer_stats().never();

        let page = vec![
            customer(CustomerStatus::Pending, None),
            customer(CustomerStatus::Rejected, Some("9")),
        ];
        let enriched = enrich_with_stats(&directory, page).await;
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].stats.order_count, 0);
        assert_eq!(enriched[1].stats.order_count, 0);
    }
}
