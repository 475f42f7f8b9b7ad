use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "customer_status", rename_all = "lowercase")]
pub enum CustomerStatus {
    Pending,
    Approved,
    Rejected,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Pending => "pending",
            CustomerStatus::Approved => "approved",
            CustomerStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CustomerStatus::Pending),
            "approved" => Ok(CustomerStatus::Approved),
            "rejected" => Ok(CustomerStatus::Rejected),
            other => Err(format!("Unknown customer status: {}", other)),
        }
    }
}

/// A registration row. Serialized in camelCase to match the admin UI contract.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub status: CustomerStatus,
    pub shopify_customer_id: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-status row counts shown as badges on every list view.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub total: i64,
}

/// Order/consent aggregates fetched from Shopify for an approved customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub order_count: i64,
    pub total_spent: Decimal,
    pub currency_code: String,
    pub email_subscribed: bool,
}

impl Default for CustomerStats {
    fn default() -> Self {
        Self {
            order_count: 0,
            total_spent: Decimal::ZERO,
            currency_code: "USD".to_string(),
            email_subscribed: false,
        }
    }
}

/// A customer joined with its Shopify aggregates for the review listing.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCustomer {
    #[serde(flatten)]
    pub customer: Customer,
    #[serde(flatten)]
    pub stats: CustomerStats,
}
