use axum::{extract::State, Json};

use crate::error::Result;
use crate::AppState;

/// GET /api/dashboard/stats
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse> {
    let overview = state.dashboard_service.overview().await?;
    Ok(Json(overview))
}
