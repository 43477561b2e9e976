use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use bookdate_core::store::SheetTarget;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{ProcessQuery, ProcessResponse},
};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `max_isbn`; absent or blank means no limit.
fn parse_max_isbn(raw: Option<&str>) -> ApiResult<Option<usize>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse::<usize>().map(Some).map_err(|_| {
            ApiError::BadRequest(format!(
                "max_isbn must be a non-negative integer, got '{}'",
                v
            ))
        }),
    }
}

fn target_for(state: &AppState, query: ProcessQuery) -> ApiResult<SheetTarget> {
    let spreadsheet_id = non_blank(query.spreadsheet_id)
        .or_else(|| state.default_spreadsheet_id.clone())
        .ok_or_else(|| {
            ApiError::BadRequest("The spreadsheet id (spreadsheet_id) is required".to_string())
        })?;
    let sheet_name =
        non_blank(query.sheet_name).unwrap_or_else(|| state.default_sheet_name.clone());

    Ok(SheetTarget::new(spreadsheet_id)
        .with_sheet_name(sheet_name)
        .with_index_sheet_name(state.index_sheet_name.clone()))
}

async fn process_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProcessQuery>,
) -> ApiResult<Json<ProcessResponse>> {
    let max_count = parse_max_isbn(query.max_isbn.as_deref())?;
    let target = target_for(&state, query)?;
    tracing::info!(
        "Starting run for {} / {}",
        target.spreadsheet_id,
        target.sheet_name
    );

    let statistics = state.process_books(&target, max_count).await?;

    Ok(Json(ProcessResponse {
        message: "Process completed successfully".to_string(),
        statistics,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/process-books", get(process_books))
}
