//! Sentiment labeling for newly collected posts.

use chrono::{DateTime, Utc};
use sdgpulse_core::{Lang, Sentiment};
use sdgpulse_db::UnlabeledPostRow;
use sdgpulse_lexicon::SentimentModel;
use sqlx::PgPool;

use crate::PipelineError;

/// A post labeled during this run, carrying what aggregation needs.
#[derive(Debug, Clone)]
pub struct LabeledPost {
    pub post_id: i64,
    pub subscription_id: i64,
    pub sentiment: Sentiment,
    pub created_at: DateTime<Utc>,
}

/// Label every unlabeled post belonging to the given subscriptions.
///
/// Posts whose stored language tag is unsupported are labeled `neutral`
/// without invoking the model. Already-labeled posts are never touched, so
/// re-running is a no-op.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if reading or writing labels fails.
pub async fn classify_new_posts(
    pool: &PgPool,
    model: &dyn SentimentModel,
    subscription_ids: &[i64],
) -> Result<Vec<LabeledPost>, PipelineError> {
    if subscription_ids.is_empty() {
        return Ok(Vec::new());
    }

    let unlabeled = sdgpulse_db::list_unlabeled_posts(pool, subscription_ids).await?;
    if unlabeled.is_empty() {
        return Ok(Vec::new());
    }

    let labeled: Vec<LabeledPost> = unlabeled
        .into_iter()
        .map(|post| label_post(model, &post))
        .collect();

    let labels: Vec<(i64, Sentiment)> = labeled
        .iter()
        .map(|post| (post.post_id, post.sentiment))
        .collect();
    let updated = sdgpulse_db::set_sentiment_labels(pool, &labels).await?;

    tracing::info!(labeled = updated, "applied sentiment labels");
    Ok(labeled)
}

fn label_post(model: &dyn SentimentModel, post: &UnlabeledPostRow) -> LabeledPost {
    let sentiment = match Lang::from_tag(&post.lang) {
        Some(lang) => model.label(&post.text, lang),
        None => Sentiment::Neutral,
    };

    LabeledPost {
        post_id: post.post_id,
        subscription_id: post.subscription_id,
        sentiment,
        created_at: post.created_at,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Always answers `Positive`; panics give away an unwanted invocation.
    struct FixedModel {
        panic_on_call: bool,
    }

    impl SentimentModel for FixedModel {
        fn label(&self, _text: &str, _lang: Lang) -> Sentiment {
            assert!(!self.panic_on_call, "model must not be called");
            Sentiment::Positive
        }
    }

    fn unlabeled(post_id: i64, lang: &str) -> UnlabeledPostRow {
        UnlabeledPostRow {
            post_id,
            subscription_id: 1,
            text: "some text".to_string(),
            lang: lang.to_string(),
            created_at: "2024-01-01T00:00:00Z".parse().expect("valid timestamp"),
        }
    }

    #[test]
    fn supported_lang_goes_through_the_model() {
        let model = FixedModel {
            panic_on_call: false,
        };
        let labeled = label_post(&model, &unlabeled(1, "en"));
        assert_eq!(labeled.sentiment, Sentiment::Positive);
    }

    #[test]
    fn unsupported_lang_is_neutral_without_model_call() {
        let model = FixedModel {
            panic_on_call: true,
        };
        for tag in ["und", "fr", ""] {
            let labeled = label_post(&model, &unlabeled(2, tag));
            assert_eq!(labeled.sentiment, Sentiment::Neutral);
        }
    }
}
