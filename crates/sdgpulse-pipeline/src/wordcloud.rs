//! Word-cloud snapshot recomputation.

use std::collections::{HashMap, HashSet};

use sdgpulse_core::{Lang, ReferenceData};
use sdgpulse_db::SubscriptionRow;
use sdgpulse_lexicon::Tokenizer;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::PipelineError;

/// Recompute and overwrite every word-cloud snapshot from the full post
/// corpus.
///
/// One snapshot per subscription scope `(country, topic, lang)`, plus one
/// region-wide snapshot per language. A scope with no matching posts still
/// gets a snapshot with empty entries. Words coming from a country's search
/// query are excluded so the cloud is not dominated by the terms the posts
/// were fetched with.
///
/// Returns the number of snapshots written.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if any scan or overwrite fails.
pub async fn write_wordclouds(
    pool: &PgPool,
    tokenizer: &dyn Tokenizer,
    reference: &ReferenceData,
    subscriptions: &[SubscriptionRow],
    region_code: &str,
    top_n: usize,
) -> Result<usize, PipelineError> {
    let mut written = 0usize;

    for sub in subscriptions {
        let Some(lang) = Lang::from_tag(&sub.lang) else {
            tracing::warn!(
                subscription_id = sub.id,
                lang = %sub.lang,
                "skipping word cloud for unsupported language"
            );
            continue;
        };

        let texts = sdgpulse_db::list_texts_for_subscription(pool, sub.id).await?;
        let excluded = query_exclusions(&sub.country_query);
        let ranked = rank_tokens(tokenizer, &texts, lang, &excluded, top_n);
        sdgpulse_db::replace_wordcloud(
            pool,
            &sub.country_code,
            Some(&sub.topic_id),
            lang.as_str(),
            &entries_json(&ranked),
        )
        .await?;
        written += 1;
    }

    for lang in Lang::ALL {
        let texts = sdgpulse_db::list_texts_for_lang(pool, lang.as_str()).await?;
        let mut excluded = HashSet::new();
        for country in &reference.countries {
            excluded.extend(query_exclusions(country.query_for(lang)));
        }
        let ranked = rank_tokens(tokenizer, &texts, lang, &excluded, top_n);
        sdgpulse_db::replace_wordcloud(pool, region_code, None, lang.as_str(), &entries_json(&ranked))
            .await?;
        written += 1;
    }

    tracing::info!(snapshots = written, "word-cloud snapshots recomputed");
    Ok(written)
}

/// Lowercased words of a search query, minus grouping characters and the
/// boolean operators.
fn query_exclusions(query: &str) -> HashSet<String> {
    query
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '"'))
        .collect::<String>()
        .split_whitespace()
        .filter(|w| !w.eq_ignore_ascii_case("or") && !w.eq_ignore_ascii_case("and"))
        .map(str::to_lowercase)
        .collect()
}

/// Count tokens across `texts` and keep the `top_n` by count descending,
/// breaking ties by word ascending.
fn rank_tokens(
    tokenizer: &dyn Tokenizer,
    texts: &[String],
    lang: Lang,
    excluded: &HashSet<String>,
    top_n: usize,
) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for text in texts {
        for token in tokenizer.tokenize(text, lang, excluded) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}

fn entries_json(ranked: &[(String, u64)]) -> Value {
    Value::Array(
        ranked
            .iter()
            .map(|(word, count)| json!({ "word": word, "count": count }))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use sdgpulse_lexicon::StopwordTokenizer;

    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn query_exclusions_strip_grouping_and_operators() {
        let excluded = query_exclusions("(Jordan OR \"Amman city\") AND water");

        let expected: HashSet<String> = ["jordan", "amman", "city", "water"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(excluded, expected);
    }

    #[test]
    fn query_exclusions_of_empty_query_are_empty() {
        assert!(query_exclusions("").is_empty());
        assert!(query_exclusions("( )").is_empty());
    }

    #[test]
    fn ranking_orders_by_count_then_word() {
        let corpus = texts(&[
            "water water solar",
            "solar water",
            "energy solar",
        ]);

        let ranked = rank_tokens(&StopwordTokenizer, &corpus, Lang::En, &HashSet::new(), 50);

        assert_eq!(
            ranked,
            vec![
                ("solar".to_owned(), 3),
                ("water".to_owned(), 3),
                ("energy".to_owned(), 1),
            ]
        );
    }

    #[test]
    fn ranking_truncates_to_top_n() {
        let corpus = texts(&["water water solar energy"]);

        let ranked = rank_tokens(&StopwordTokenizer, &corpus, Lang::En, &HashSet::new(), 1);

        assert_eq!(ranked, vec![("water".to_owned(), 2)]);
    }

    #[test]
    fn excluded_query_words_never_rank() {
        let corpus = texts(&["Jordan builds water plants", "Jordan expands solar"]);
        let excluded = query_exclusions("(Jordan OR Amman)");

        let ranked = rank_tokens(&StopwordTokenizer, &corpus, Lang::En, &excluded, 50);

        assert!(ranked.iter().all(|(word, _)| word != "jordan"));
        assert!(ranked.iter().any(|(word, _)| word == "water"));
    }

    #[test]
    fn empty_corpus_yields_empty_entries() {
        let ranked = rank_tokens(&StopwordTokenizer, &[], Lang::Ar, &HashSet::new(), 50);

        assert!(ranked.is_empty());
        assert_eq!(entries_json(&ranked), serde_json::json!([]));
    }

    #[test]
    fn entries_serialize_as_word_count_objects() {
        let entries = entries_json(&[("water".to_owned(), 2), ("solar".to_owned(), 1)]);

        assert_eq!(
            entries,
            serde_json::json!([
                { "word": "water", "count": 2 },
                { "word": "solar", "count": 1 },
            ])
        );
    }
}
