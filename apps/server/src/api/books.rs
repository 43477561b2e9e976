use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use bookdate_lookup::{Isbn, VolumeLookup, VolumeQuery};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::LookupRequest,
};

async fn lookup(state: &AppState, isbn: Option<String>) -> ApiResult<Json<VolumeLookup>> {
    let isbn = isbn
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("The isbn parameter is required".to_string()))?;
    let isbn = Isbn::parse(&isbn)?;

    let result = state.google_books.lookup_volume(&isbn).await?;
    Ok(Json(result))
}

async fn lookup_get(
    State(state): State<Arc<AppState>>,
    Query(request): Query<LookupRequest>,
) -> ApiResult<Json<VolumeLookup>> {
    lookup(&state, request.isbn).await
}

/// The query string wins over the body.
async fn lookup_post(
    State(state): State<Arc<AppState>>,
    Query(request): Query<LookupRequest>,
    body: Bytes,
) -> ApiResult<Json<VolumeLookup>> {
    let isbn = request.isbn.or_else(|| {
        serde_json::from_slice::<LookupRequest>(&body)
            .ok()
            .and_then(|b| b.isbn)
    });
    lookup(&state, isbn).await
}

/// Raw volume search; unknown parameters are forwarded to Google Books.
async fn search_volumes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<Json<serde_json::Value>> {
    let query = VolumeQuery::from_params(params)?;
    let body = state.google_books.search_volumes(&query).await?;
    Ok(Json(body))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/books/lookup", get(lookup_get).post(lookup_post))
        .route("/books/volumes", get(search_volumes))
}
