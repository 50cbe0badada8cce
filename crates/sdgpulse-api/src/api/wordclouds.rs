use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct WordcloudQuery {
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct WordcloudItem {
    scope: String,
    topic_id: Option<String>,
    lang: String,
    is_overall: bool,
    /// Ranked `[{"word": ..., "count": ...}]` entries, possibly empty.
    entries: serde_json::Value,
    computed_at: DateTime<Utc>,
}

/// An unknown scope yields an empty list, not a 404; snapshots appear once
/// the pipeline has produced them.
pub(super) async fn list_wordclouds(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(scope): Path<String>,
    Query(query): Query<WordcloudQuery>,
) -> Result<Json<ApiResponse<Vec<WordcloudItem>>>, ApiError> {
    let rows = sdgpulse_db::list_wordclouds(&state.pool, &scope, query.topic.as_deref())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| WordcloudItem {
            scope: row.scope,
            topic_id: row.topic_id,
            lang: row.lang,
            is_overall: row.is_overall,
            entries: row.entries,
            computed_at: row.computed_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::WordcloudItem;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn wordcloud_item_is_serializable() {
        let item = WordcloudItem {
            scope: "JO".to_string(),
            topic_id: Some("SDG06".to_string()),
            lang: "en".to_string(),
            is_overall: false,
            entries: json!([{"word": "water", "count": 4}]),
            computed_at: Utc::now(),
        };

        let json = serde_json::to_string(&item).expect("serialize wordcloud item");
        assert!(json.contains("\"topic_id\":\"SDG06\""));
        assert!(json.contains("\"word\":\"water\""));
    }
}
