use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::customer::{Customer, StatusCounts};

/// Body of `POST /api/customers` and of the public registration form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
}

/// Body of `PUT /api/customers/:id`.
///
/// Only these fields are settable through the generic update path;
/// `shopify_customer_id`, the transition timestamps and `approved_by` are
/// owned by the approval workflow. A present-but-blank value clears the
/// column for optional fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Query string of `GET /api/customers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCustomersQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query string of `GET /app/customers` and `GET /api/customers/export`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Body of `POST /api/customers/approve` and `/reject`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    pub customer_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ListCustomersResponse {
    pub customers: Vec<Customer>,
    pub pagination: Pagination,
    pub statistics: StatusCounts,
}
