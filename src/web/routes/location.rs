use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::services::location_service::{self, LocationResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LocationSearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

pub async fn search_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationSearchQuery>,
) -> impl IntoResponse {
    let q = match query.q.as_deref().map(str::trim).filter(|s| s.chars().count() >= 2) {
        Some(v) => v,
        None => return (StatusCode::BAD_REQUEST, Json(Vec::<LocationResult>::new())),
    };

    let limit = location_service::clamp_limit(query.limit);
    match location_service::search_locations_upstream(
        &state.http,
        &state.config.location_api_url,
        state.config.location_api_key.as_deref(),
        q,
        limit,
    )
    .await
    {
        Ok(results) => (StatusCode::OK, Json(results)),
        Err(_) => (StatusCode::BAD_GATEWAY, Json(Vec::new())),
    }
}
