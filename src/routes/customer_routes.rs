use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::dto::customer_dto::{
    CreateCustomerPayload, DecisionPayload, ListCustomersQuery, ListCustomersResponse, Pagination,
    ReviewListQuery, UpdateCustomerPayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::SessionClaims;
use crate::services::customer_service::{
    parse_status_filter, total_pages, DEFAULT_LIMIT, DEFAULT_PAGE,
};
use crate::services::shopify_service::enrich_with_stats;
use crate::utils::extract::JsonPayload;
use crate::AppState;

/// GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<impl axum::response::IntoResponse> {
    let status = parse_status_filter(query.status.as_deref())?;
    let page = query.page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(1);

    let (customers, total) = state
        .customer_service
        .list(status, query.search.as_deref(), page, limit)
        .await?;
    let statistics = state.customer_service.status_counts().await?;

    Ok(Json(ListCustomersResponse {
        customers,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        },
        statistics,
    }))
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload<CreateCustomerPayload>,
) -> Result<impl axum::response::IntoResponse> {
    let customer = state.customer_service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "customer": customer, "success": true })),
    ))
}

/// GET /api/customers/:id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let customer = state
        .customer_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Customer not found".to_string()))?;
    Ok(Json(json!({ "customer": customer })))
}

/// PUT /api/customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonPayload(payload): JsonPayload<UpdateCustomerPayload>,
) -> Result<impl axum::response::IntoResponse> {
    let customer = state.customer_service.update(id, payload).await?;
    Ok(Json(json!({ "customer": customer, "success": true })))
}

/// DELETE /api/customers/:id
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    state.customer_service.delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Customer deleted" })))
}

/// POST /api/customers/approve
pub async fn approve_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    JsonPayload(payload): JsonPayload<DecisionPayload>,
) -> Result<impl axum::response::IntoResponse> {
    let id = payload
        .customer_id
        .ok_or_else(|| Error::BadRequest("Customer ID is required".to_string()))?;

    let (customer, shopify_customer) = state
        .approval_service
        .approve(&state.shopify_service, id, payload.notes, claims.shop())
        .await?;

    Ok(Json(json!({
        "customer": customer,
        "shopifyCustomer": shopify_customer,
        "success": true,
        "message": "Customer approved and created in Shopify successfully",
    })))
}

/// POST /api/customers/reject
pub async fn reject_customer(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    JsonPayload(payload): JsonPayload<DecisionPayload>,
) -> Result<impl axum::response::IntoResponse> {
    let id = payload
        .customer_id
        .ok_or_else(|| Error::BadRequest("Customer ID is required".to_string()))?;

    let customer = state
        .approval_service
        .reject(id, payload.notes, claims.shop())
        .await?;

    Ok(Json(json!({
        "customer": customer,
        "success": true,
        "message": "Customer registration rejected",
    })))
}

/// GET /app/customers: the staff review listing. Unpaginated, search also
/// matches phone, and approved rows are enriched with Shopify order/consent
/// aggregates.
pub async fn review_customers(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl axum::response::IntoResponse> {
    let status = parse_status_filter(query.status.as_deref())?;
    let customers = state
        .customer_service
        .list_for_review(status, query.search.as_deref())
        .await?;
    let customers = enrich_with_stats(&state.shopify_service, customers).await;
    let counts = state.customer_service.status_counts().await?;

    Ok(Json(json!({
        "customers": customers,
        "status": query.status.unwrap_or_else(|| "all".to_string()),
        "search": query.search.unwrap_or_default(),
        "pendingCount": counts.pending,
        "approvedCount": counts.approved,
        "rejectedCount": counts.rejected,
    })))
}
