use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use super::types::elapsed_ms;
use super::{ApiError, ApiResponse, AppState, FetchResultDto, SearchResultsDto};
use crate::models::movie::MovieRecord;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// `POST /api/movies/fetch`
///
/// Runs one ingestion pass and reports per-item counts.
pub async fn fetch_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FetchResultDto>>, ApiError> {
    let start = Instant::now();
    let report = state.ingestion().run().await?;

    Ok(Json(ApiResponse::success(FetchResultDto {
        report,
        processing_time_ms: elapsed_ms(start),
    })))
}

/// `GET /api/movies/search?query=...`
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<SearchResultsDto>>, ApiError> {
    let start = Instant::now();
    let outcome = state.search_service().search(&params.query).await?;

    Ok(Json(ApiResponse::success(SearchResultsDto {
        count: outcome.results.len(),
        results: outcome.results,
        source: outcome.source,
        processing_time_ms: elapsed_ms(start),
    })))
}

/// `GET /api/movies/{external_id}`
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(external_id): Path<String>,
) -> Result<Json<ApiResponse<MovieRecord>>, ApiError> {
    let record = state
        .shared
        .catalog
        .get(&external_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Movie", &external_id))?;

    Ok(Json(ApiResponse::success(record)))
}
