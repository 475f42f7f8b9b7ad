use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::dto::customer_dto::ReviewListQuery;
use crate::error::Result;
use crate::services::customer_service::parse_status_filter;
use crate::services::export_service::ExportService;
use crate::AppState;

/// GET /api/customers/export: CSV download of all (optionally filtered)
/// customers.
pub async fn export_customers(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse> {
    let status = parse_status_filter(query.status.as_deref())?;
    let customers = state
        .customer_service
        .list_for_review(status, query.search.as_deref())
        .await?;

    let csv = ExportService::generate_customers_csv(&customers);
    let filename = format!(
        "customers_export_{}.csv",
        chrono::Utc::now().format("%Y%m%d_%H%M")
    );
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
