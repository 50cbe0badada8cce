use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct TrendsQuery {
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendPoint {
    week_start: NaiveDate,
    posts: i64,
}

/// Weekly post volumes for a scope, oldest week first.
///
/// The region scope spans every country; any other scope is treated as a
/// country code filter. `?topic=` narrows to one topic's series.
pub(super) async fn get_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(scope): Path<String>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<Vec<TrendPoint>>>, ApiError> {
    let country = (scope != state.region_code).then_some(scope.as_str());
    let rows = sdgpulse_db::weekly_series(&state.pool, country, query.topic.as_deref())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| TrendPoint {
            week_start: row.week_start,
            posts: row.posts,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
