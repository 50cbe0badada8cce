//! Sentiment labeling and text tokenization for SDG posts.
//!
//! Two pure, stateless capabilities used by the pipeline: a weighted-lexicon
//! sentiment model that maps post text to {positive, negative, neutral}, and
//! a stopword-filtering tokenizer that turns raw post text into cleaned
//! word-cloud tokens. Both are language-aware (English and Arabic).

use std::collections::HashSet;

use sdgpulse_core::{Lang, Sentiment};

pub mod sentiment;
pub mod tokenize;

mod stopwords;

pub use sentiment::{lexicon_score, LexiconModel};
pub use tokenize::StopwordTokenizer;

/// Maps post text to a sentiment label.
///
/// Implementations must be deterministic for a given `(text, lang)` pair; the
/// classification stage relies on that to stay idempotent.
pub trait SentimentModel: Send + Sync {
    fn label(&self, text: &str, lang: Lang) -> Sentiment;
}

/// Splits raw post text into cleaned, counted-ready tokens.
///
/// Tokens appearing in `excluded` (scope-specific words such as the country
/// name the posts were filtered by) are dropped in addition to the built-in
/// stopword lists.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str, lang: Lang, excluded: &HashSet<String>) -> Vec<String>;
}
