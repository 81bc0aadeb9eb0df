// src/handlers/export.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, services::export::ExportService};

/// Writes the completed-tests CSV for a user.
///
/// * `{"status": "written", ...}` with the file path and run counters.
/// * `{"status": "empty"}` when the user has no completed tests (no file is written).
pub async fn export_completed_tests(
    State(export): State<Arc<ExportService>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Export requested for user {}", user_id);
    let outcome = export.export_completed_tests(user_id).await?;

    Ok(Json(outcome))
}
