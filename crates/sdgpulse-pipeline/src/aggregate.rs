//! Weekly roll-ups and per-scope statistics snapshots.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use sdgpulse_core::ReferenceData;
use sdgpulse_db::{NewStatistics, SentimentTallyRow, TopicVolumeRow, WeekBump};
use sqlx::PgPool;

use crate::classify::LabeledPost;
use crate::PipelineError;

/// The Monday on or before `date`, in UTC.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_monday());
    date - chrono::Duration::days(offset)
}

/// Fold this run's newly classified posts into `weekly_counts`.
///
/// Returns the number of (subscription, week) buckets touched.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if the upsert fails.
pub async fn fold_weekly_counts(
    pool: &PgPool,
    posts: &[LabeledPost],
) -> Result<usize, PipelineError> {
    if posts.is_empty() {
        return Ok(0);
    }

    let bumps = week_bumps(posts);
    sdgpulse_db::bump_weekly_counts(pool, &bumps).await?;

    tracing::info!(
        posts = posts.len(),
        buckets = bumps.len(),
        "folded posts into weekly counts"
    );
    Ok(bumps.len())
}

fn week_bumps(posts: &[LabeledPost]) -> Vec<WeekBump> {
    let mut grouped: BTreeMap<(i64, NaiveDate), i64> = BTreeMap::new();
    for post in posts {
        let week = week_start(post.created_at.date_naive());
        *grouped.entry((post.subscription_id, week)).or_insert(0) += 1;
    }

    grouped
        .into_iter()
        .map(|((subscription_id, week_start), n)| WeekBump {
            subscription_id,
            week_start,
            n,
        })
        .collect()
}

/// Recompute and overwrite the statistics snapshot for the region scope and
/// every country scope.
///
/// Returns the number of scopes written.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if any scan or upsert fails.
pub async fn write_statistics(
    pool: &PgPool,
    reference: &ReferenceData,
    region_code: &str,
) -> Result<usize, PipelineError> {
    let sdg_topic_ids: Vec<String> = reference
        .topics
        .iter()
        .filter(|t| t.is_sdg)
        .map(|t| t.id.clone())
        .collect();

    let mut scopes: Vec<(String, Option<&str>)> = vec![(region_code.to_string(), None)];
    for country in &reference.countries {
        scopes.push((country.code.clone(), Some(country.code.as_str())));
    }

    for (scope, country_code) in &scopes {
        let volumes = sdgpulse_db::topic_volumes(pool, *country_code).await?;
        let tallies = sdgpulse_db::topic_sentiment_tallies(pool, *country_code).await?;
        let stats = compute_statistics(scope, &sdg_topic_ids, &volumes, &tallies);
        sdgpulse_db::upsert_statistics(pool, &stats).await?;
    }

    tracing::info!(scopes = scopes.len(), "statistics snapshots recomputed");
    Ok(scopes.len())
}

/// Compute one scope's statistics from full weekly-count and label scans.
///
/// `total` sums every topic's weekly counts; `sdg_total` restricts to SDG
/// topics. Volume extrema rank SDG topics only, an uncounted topic ranking
/// with 0 so an idle topic is the minimum. Sentiment leaders skip topics
/// with no classified posts. All ties break by topic id ascending.
#[must_use]
pub fn compute_statistics(
    scope: &str,
    sdg_topic_ids: &[String],
    volumes: &[TopicVolumeRow],
    tallies: &[SentimentTallyRow],
) -> NewStatistics {
    let total: i64 = volumes.iter().map(|v| v.total).sum();
    let sdg_total: i64 = volumes.iter().filter(|v| v.is_sdg).map(|v| v.total).sum();

    let mut ranked_ids: Vec<&str> = sdg_topic_ids.iter().map(String::as_str).collect();
    ranked_ids.sort_unstable();

    let volume_by_topic: HashMap<&str, i64> = volumes
        .iter()
        .filter(|v| v.is_sdg)
        .map(|v| (v.topic_id.as_str(), v.total))
        .collect();

    // Iterating in id order makes the strict comparisons break ties toward
    // the lowest topic id.
    let mut max_volume: Option<(&str, i64)> = None;
    let mut min_volume: Option<(&str, i64)> = None;
    for topic_id in &ranked_ids {
        let count = volume_by_topic.get(topic_id).copied().unwrap_or(0);
        if max_volume.is_none_or(|(_, best)| count > best) {
            max_volume = Some((topic_id, count));
        }
        if min_volume.is_none_or(|(_, best)| count < best) {
            min_volume = Some((topic_id, count));
        }
    }

    #[derive(Default)]
    struct TopicLabels {
        positive: i64,
        negative: i64,
        labeled: i64,
    }

    let mut labels_by_topic: HashMap<&str, TopicLabels> = HashMap::new();
    for tally in tallies.iter().filter(|t| t.is_sdg) {
        let entry = labels_by_topic.entry(tally.topic_id.as_str()).or_default();
        entry.labeled += tally.posts;
        match tally.sentiment.as_str() {
            "positive" => entry.positive += tally.posts,
            "negative" => entry.negative += tally.posts,
            _ => {}
        }
    }

    let mut max_positive: Option<(&str, f64)> = None;
    let mut max_negative: Option<(&str, f64)> = None;
    for topic_id in &ranked_ids {
        let Some(labels) = labels_by_topic.get(topic_id) else {
            continue;
        };
        if labels.labeled == 0 {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let positive_share = labels.positive as f64 / labels.labeled as f64;
        #[allow(clippy::cast_precision_loss)]
        let negative_share = labels.negative as f64 / labels.labeled as f64;

        if max_positive.is_none_or(|(_, best)| positive_share > best) {
            max_positive = Some((topic_id, positive_share));
        }
        if max_negative.is_none_or(|(_, best)| negative_share > best) {
            max_negative = Some((topic_id, negative_share));
        }
    }

    NewStatistics {
        scope: scope.to_string(),
        total,
        sdg_total,
        max_topic: max_volume.map(|(id, _)| id.to_string()),
        max_count: max_volume.map(|(_, n)| n),
        min_topic: min_volume.map(|(id, _)| id.to_string()),
        min_count: min_volume.map(|(_, n)| n),
        max_positive_topic: max_positive.map(|(id, _)| id.to_string()),
        max_positive_share: max_positive.map(|(_, share)| share),
        max_negative_topic: max_negative.map(|(id, _)| id.to_string()),
        max_negative_share: max_negative.map(|(_, share)| share),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use sdgpulse_core::Sentiment;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn week_start_of_a_monday_is_itself() {
        assert_eq!(week_start(date(2024, 1, 1)), date(2024, 1, 1));
    }

    #[test]
    fn week_start_moves_back_to_monday() {
        // 2024-01-03 is a Wednesday, 2024-01-07 a Sunday.
        assert_eq!(week_start(date(2024, 1, 3)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 7)), date(2024, 1, 1));
    }

    #[test]
    fn week_start_crosses_year_boundaries() {
        // 2023-01-01 is a Sunday; its week starts in 2022.
        assert_eq!(week_start(date(2023, 1, 1)), date(2022, 12, 26));
    }

    fn labeled(subscription_id: i64, created_at: &str) -> LabeledPost {
        LabeledPost {
            post_id: 0,
            subscription_id,
            sentiment: Sentiment::Neutral,
            created_at: created_at.parse::<DateTime<Utc>>().expect("valid timestamp"),
        }
    }

    #[test]
    fn week_bumps_group_by_subscription_and_week() {
        let posts = vec![
            labeled(1, "2024-01-01T09:00:00Z"),
            labeled(1, "2024-01-04T09:00:00Z"),
            labeled(1, "2024-01-08T09:00:00Z"),
            labeled(2, "2024-01-01T09:00:00Z"),
        ];

        let bumps = week_bumps(&posts);

        assert_eq!(bumps.len(), 3);
        assert_eq!(bumps[0].subscription_id, 1);
        assert_eq!(bumps[0].week_start, date(2024, 1, 1));
        assert_eq!(bumps[0].n, 2);
        assert_eq!(bumps[1].week_start, date(2024, 1, 8));
        assert_eq!(bumps[1].n, 1);
        assert_eq!(bumps[2].subscription_id, 2);
        assert_eq!(bumps[2].n, 1);
    }

    fn volume(topic_id: &str, is_sdg: bool, total: i64) -> TopicVolumeRow {
        TopicVolumeRow {
            topic_id: topic_id.to_string(),
            is_sdg,
            total,
        }
    }

    fn tally(topic_id: &str, sentiment: &str, posts: i64) -> SentimentTallyRow {
        SentimentTallyRow {
            topic_id: topic_id.to_string(),
            is_sdg: true,
            sentiment: sentiment.to_string(),
            posts,
        }
    }

    fn sdg_ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    #[test]
    fn totals_cover_all_topics_but_sdg_total_restricts() {
        let volumes = vec![
            volume("SDG00", false, 100),
            volume("SDG01", true, 30),
            volume("SDG02", true, 10),
        ];

        let stats = compute_statistics("ARAB", &sdg_ids(&["SDG01", "SDG02"]), &volumes, &[]);

        assert_eq!(stats.total, 140);
        assert_eq!(stats.sdg_total, 40);
        // The baseline bucket never ranks.
        assert_eq!(stats.max_topic.as_deref(), Some("SDG01"));
        assert_eq!(stats.max_count, Some(30));
    }

    #[test]
    fn idle_sdg_topic_is_the_volume_minimum() {
        let volumes = vec![volume("SDG01", true, 30), volume("SDG02", true, 10)];

        let stats = compute_statistics(
            "JO",
            &sdg_ids(&["SDG01", "SDG02", "SDG03"]),
            &volumes,
            &[],
        );

        assert_eq!(stats.min_topic.as_deref(), Some("SDG03"));
        assert_eq!(stats.min_count, Some(0));
    }

    #[test]
    fn volume_ties_break_by_topic_id_ascending() {
        let volumes = vec![volume("SDG05", true, 10), volume("SDG02", true, 10)];

        let stats = compute_statistics("JO", &sdg_ids(&["SDG02", "SDG05"]), &volumes, &[]);

        assert_eq!(stats.max_topic.as_deref(), Some("SDG02"));
        assert_eq!(stats.min_topic.as_deref(), Some("SDG02"));
    }

    #[test]
    fn sentiment_leaders_rank_by_share_not_count() {
        // SDG01: 2 of 10 positive. SDG02: 3 of 4 positive, 1 of 4 negative.
        let tallies = vec![
            tally("SDG01", "positive", 2),
            tally("SDG01", "neutral", 8),
            tally("SDG02", "positive", 3),
            tally("SDG02", "negative", 1),
        ];

        let stats = compute_statistics("JO", &sdg_ids(&["SDG01", "SDG02"]), &[], &tallies);

        assert_eq!(stats.max_positive_topic.as_deref(), Some("SDG02"));
        assert_eq!(stats.max_positive_share, Some(0.75));
        assert_eq!(stats.max_negative_topic.as_deref(), Some("SDG02"));
        assert_eq!(stats.max_negative_share, Some(0.25));
    }

    #[test]
    fn zero_post_topics_never_lead_sentiment() {
        let tallies = vec![tally("SDG01", "positive", 1)];

        let stats = compute_statistics("JO", &sdg_ids(&["SDG01", "SDG02"]), &[], &tallies);

        // SDG02 has no posts at all and must not appear as a 100% leader.
        assert_eq!(stats.max_positive_topic.as_deref(), Some("SDG01"));
        assert_eq!(stats.max_negative_topic.as_deref(), Some("SDG01"));
        assert_eq!(stats.max_negative_share, Some(0.0));
    }

    #[test]
    fn empty_scope_has_zero_totals_and_no_sentiment_leaders() {
        let stats = compute_statistics("QA", &sdg_ids(&["SDG01", "SDG02"]), &[], &[]);

        assert_eq!(stats.total, 0);
        assert_eq!(stats.sdg_total, 0);
        // With every count at zero the lowest topic id holds both extrema.
        assert_eq!(stats.max_topic.as_deref(), Some("SDG01"));
        assert_eq!(stats.max_count, Some(0));
        assert_eq!(stats.min_topic.as_deref(), Some("SDG01"));
        assert_eq!(stats.min_count, Some(0));
        assert_eq!(stats.max_positive_topic, None);
        assert_eq!(stats.max_negative_topic, None);
    }
}
