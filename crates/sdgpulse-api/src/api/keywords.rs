use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_lookup_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct KeywordStatsItem {
    scope: String,
    /// The stored snapshot document: totals, extrema, and the per-keyword
    /// `keywords` array.
    stats: serde_json::Value,
    computed_at: DateTime<Utc>,
}

pub(super) async fn get_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(scope): Path<String>,
) -> Result<Json<ApiResponse<KeywordStatsItem>>, ApiError> {
    let row = sdgpulse_db::get_keyword_stats(&state.pool, &scope)
        .await
        .map_err(|e| {
            map_lookup_error(
                req_id.0.clone(),
                &e,
                "no keyword stats snapshot for this scope",
            )
        })?;

    Ok(Json(ApiResponse {
        data: KeywordStatsItem {
            scope: row.scope,
            stats: row.stats,
            computed_at: row.computed_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::KeywordStatsItem;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn keyword_stats_item_is_serializable() {
        let item = KeywordStatsItem {
            scope: "ARAB".to_string(),
            stats: json!({
                "total": 10,
                "sdg_total": 6,
                "max": {"keyword": "water", "count": 4},
                "min": null,
                "keywords": []
            }),
            computed_at: Utc::now(),
        };

        let json = serde_json::to_string(&item).expect("serialize keyword stats item");
        assert!(json.contains("\"scope\":\"ARAB\""));
        assert!(json.contains("\"keyword\":\"water\""));
    }
}
