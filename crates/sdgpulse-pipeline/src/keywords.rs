//! Keyword-level statistics over the post corpus.
//!
//! Keywords are the individual search phrases inside the SDG topic queries.
//! Each scope gets one JSON document counting, per keyword, how many stored
//! posts mention it and how those mentions split by sentiment.

use std::collections::HashSet;

use sdgpulse_core::{Lang, ReferenceData};
use sdgpulse_db::ScoredTextRow;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::PipelineError;

/// Recompute and overwrite the keyword statistics for the region scope and
/// every country scope.
///
/// Returns the number of scopes written.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if any scan or overwrite fails.
pub async fn write_keyword_stats(
    pool: &PgPool,
    reference: &ReferenceData,
    region_code: &str,
) -> Result<usize, PipelineError> {
    let keywords = extract_keywords(reference);

    let mut scopes: Vec<(String, Option<&str>)> = vec![(region_code.to_string(), None)];
    for country in &reference.countries {
        scopes.push((country.code.clone(), Some(country.code.as_str())));
    }

    for (scope, country_code) in &scopes {
        let posts = sdgpulse_db::list_scored_texts(pool, *country_code).await?;
        let stats = compute_keyword_stats(&keywords, &posts);
        sdgpulse_db::replace_keyword_stats(pool, scope, &stats).await?;
    }

    tracing::info!(
        scopes = scopes.len(),
        keywords = keywords.len(),
        "keyword statistics recomputed"
    );
    Ok(scopes.len())
}

/// Pull the individual search phrases out of every SDG topic query, both
/// languages, in topic order. Grouping characters are stripped and phrases
/// are deduplicated case-insensitively, keeping the first casing seen.
#[must_use]
pub fn extract_keywords(reference: &ReferenceData) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keywords = Vec::new();

    for topic in reference.topics.iter().filter(|t| t.is_sdg) {
        for lang in Lang::ALL {
            let cleaned: String = topic
                .query_for(lang)
                .chars()
                .filter(|c| !matches!(c, '(' | ')' | '"'))
                .collect();
            for part in cleaned.split(" OR ") {
                let keyword = part.trim();
                if keyword.is_empty() {
                    continue;
                }
                if seen.insert(keyword.to_lowercase()) {
                    keywords.push(keyword.to_owned());
                }
            }
        }
    }

    keywords
}

/// Compute one scope's keyword statistics document.
///
/// A post matches a keyword when its text contains the whole phrase,
/// case-insensitively; one post can match several keywords and is counted
/// once per keyword. `total` is the scope's post count, `sdg_total` the sum
/// of all match counts. The four extrema skip keywords with no matches and
/// break ties toward the keyword listed first.
#[must_use]
pub fn compute_keyword_stats(keywords: &[String], posts: &[ScoredTextRow]) -> Value {
    let lowered: Vec<(String, Option<&str>)> = posts
        .iter()
        .map(|p| (p.text.to_lowercase(), p.sentiment.as_deref()))
        .collect();

    let mut sdg_total = 0usize;
    let mut max_count: Option<(&str, usize)> = None;
    let mut min_count: Option<(&str, usize)> = None;
    let mut max_positive: Option<(&str, f64)> = None;
    let mut max_negative: Option<(&str, f64)> = None;
    let mut rows = Vec::with_capacity(keywords.len());

    for keyword in keywords {
        let needle = keyword.to_lowercase();
        let mut count = 0usize;
        let mut positive = 0usize;
        let mut negative = 0usize;
        for (text, sentiment) in &lowered {
            if !text.contains(&needle) {
                continue;
            }
            count += 1;
            match sentiment {
                Some("positive") => positive += 1,
                Some("negative") => negative += 1,
                _ => {}
            }
        }

        sdg_total += count;
        rows.push(json!({
            "keyword": keyword,
            "count": count,
            "positive": positive,
            "negative": negative,
        }));

        if count == 0 {
            continue;
        }
        if count > max_count.map_or(0, |(_, best)| best) {
            max_count = Some((keyword, count));
        }
        if min_count.is_none_or(|(_, best)| count < best) {
            min_count = Some((keyword, count));
        }

        #[allow(clippy::cast_precision_loss)]
        let positive_share = positive as f64 / count as f64;
        #[allow(clippy::cast_precision_loss)]
        let negative_share = negative as f64 / count as f64;
        if positive_share > max_positive.map_or(0.0, |(_, best)| best) {
            max_positive = Some((keyword, positive_share));
        }
        if negative_share > max_negative.map_or(0.0, |(_, best)| best) {
            max_negative = Some((keyword, negative_share));
        }
    }

    json!({
        "total": posts.len(),
        "sdg_total": sdg_total,
        "max": max_count.map(|(k, n)| json!({ "keyword": k, "count": n })),
        "min": min_count.map(|(k, n)| json!({ "keyword": k, "count": n })),
        "max_positive": max_positive.map(|(k, s)| json!({ "keyword": k, "share": s })),
        "max_negative": max_negative.map(|(k, s)| json!({ "keyword": k, "share": s })),
        "keywords": rows,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
