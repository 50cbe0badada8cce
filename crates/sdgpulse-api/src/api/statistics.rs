use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, map_lookup_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct StatisticsItem {
    scope: String,
    total: i64,
    sdg_total: i64,
    max_topic: Option<String>,
    max_count: Option<i64>,
    min_topic: Option<String>,
    min_count: Option<i64>,
    max_positive_topic: Option<String>,
    max_positive_share: Option<f64>,
    max_negative_topic: Option<String>,
    max_negative_share: Option<f64>,
    computed_at: DateTime<Utc>,
}

fn to_item(row: sdgpulse_db::StatisticsRow) -> StatisticsItem {
    StatisticsItem {
        scope: row.scope,
        total: row.total,
        sdg_total: row.sdg_total,
        max_topic: row.max_topic,
        max_count: row.max_count,
        min_topic: row.min_topic,
        min_count: row.min_count,
        max_positive_topic: row.max_positive_topic,
        max_positive_share: row.max_positive_share,
        max_negative_topic: row.max_negative_topic,
        max_negative_share: row.max_negative_share,
        computed_at: row.computed_at,
    }
}

pub(super) async fn list_statistics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StatisticsItem>>>, ApiError> {
    let rows = sdgpulse_db::list_statistics(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(to_item).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_statistics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(scope): Path<String>,
) -> Result<Json<ApiResponse<StatisticsItem>>, ApiError> {
    let row = sdgpulse_db::get_statistics(&state.pool, &scope)
        .await
        .map_err(|e| {
            map_lookup_error(
                req_id.0.clone(),
                &e,
                "no statistics snapshot for this scope",
            )
        })?;

    Ok(Json(ApiResponse {
        data: to_item(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::to_item;
    use chrono::Utc;
    use sdgpulse_db::StatisticsRow;

    #[test]
    fn statistics_item_is_serializable() {
        let item = to_item(StatisticsRow {
            scope: "ARAB".to_string(),
            total: 120,
            sdg_total: 90,
            max_topic: Some("SDG06".to_string()),
            max_count: Some(40),
            min_topic: Some("SDG13".to_string()),
            min_count: Some(0),
            max_positive_topic: Some("SDG06".to_string()),
            max_positive_share: Some(0.75),
            max_negative_topic: Some("SDG01".to_string()),
            max_negative_share: Some(0.4),
            computed_at: Utc::now(),
        });

        let json = serde_json::to_string(&item).expect("serialize statistics item");
        assert!(json.contains("\"scope\":\"ARAB\""));
        assert!(json.contains("\"max_positive_share\":0.75"));
        assert!(json.contains("\"min_count\":0"));
    }
}
