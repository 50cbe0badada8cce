//! Text cleanup and tokenization for word clouds.
//!
//! English text is lowercased, stripped of URLs, mentions, hashtags, and
//! everything outside ASCII letters, then split on whitespace. Arabic text
//! keeps only Arabic-script runs, which drops Latin noise (URLs, mentions)
//! in one pass. Both paths filter the static stopword lists plus any
//! caller-supplied excluded words, and drop single-character leftovers.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use sdgpulse_core::Lang;

use crate::stopwords::is_stopword;
use crate::Tokenizer;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").expect("valid regex"));
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").expect("valid regex"));
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").expect("valid regex"));
static EN_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\s_]").expect("valid regex"));
static AR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{0600}-\u{06FF}]+").expect("valid regex"));

/// [`Tokenizer`] backed by the static stopword lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct StopwordTokenizer;

impl Tokenizer for StopwordTokenizer {
    fn tokenize(&self, text: &str, lang: Lang, excluded: &HashSet<String>) -> Vec<String> {
        match lang {
            Lang::En => tokenize_en(text, excluded),
            Lang::Ar => tokenize_ar(text, excluded),
        }
    }
}

fn tokenize_en(text: &str, excluded: &HashSet<String>) -> Vec<String> {
    let text = text.to_lowercase().replace('\n', " ");
    let text = URL_RE.replace_all(&text, "");
    let text = MENTION_RE.replace_all(&text, "");
    let text = HASHTAG_RE.replace_all(&text, "");
    let text = EN_STRIP_RE.replace_all(&text, "");
    text.split_whitespace()
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !is_stopword(w, Lang::En))
        .filter(|w| !excluded.contains(*w))
        .map(str::to_owned)
        .collect()
}

fn tokenize_ar(text: &str, excluded: &HashSet<String>) -> Vec<String> {
    AR_RUN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !is_stopword(w, Lang::Ar))
        .filter(|w| !excluded.contains(*w))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_exclusions() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn english_text_is_lowercased_and_cleaned() {
        let tokens = StopwordTokenizer.tokenize(
            "Clean WATER access is improving!",
            Lang::En,
            &no_exclusions(),
        );
        assert_eq!(tokens, vec!["clean", "water", "access", "improving"]);
    }

    #[test]
    fn urls_mentions_and_hashtags_are_removed() {
        let tokens = StopwordTokenizer.tokenize(
            "Read this https://example.org/report via @unwater #SDG6 update",
            Lang::En,
            &no_exclusions(),
        );
        assert_eq!(tokens, vec!["read", "update"]);
    }

    #[test]
    fn numbers_and_punctuation_are_stripped() {
        let tokens =
            StopwordTokenizer.tokenize("Poverty fell 12% in 2025?!", Lang::En, &no_exclusions());
        assert_eq!(tokens, vec!["poverty", "fell"]);
    }

    #[test]
    fn arabic_text_keeps_only_arabic_runs() {
        let tokens = StopwordTokenizer.tokenize(
            "جودة التعليم تتحسن http://t.co/x RT @user",
            Lang::Ar,
            &no_exclusions(),
        );
        assert_eq!(tokens, vec!["جودة", "التعليم", "تتحسن"]);
    }

    #[test]
    fn arabic_stopwords_are_filtered() {
        let tokens =
            StopwordTokenizer.tokenize("التعليم في الأردن", Lang::Ar, &no_exclusions());
        assert_eq!(tokens, vec!["التعليم", "الأردن"]);
    }

    #[test]
    fn excluded_words_are_dropped() {
        let excluded: HashSet<String> = ["jordan".to_owned()].into_iter().collect();
        let tokens =
            StopwordTokenizer.tokenize("Jordan expands solar power in Jordan", Lang::En, &excluded);
        assert_eq!(tokens, vec!["expands", "solar", "power"]);
    }

    #[test]
    fn single_characters_are_dropped() {
        let tokens = StopwordTokenizer.tokenize("x marks the spot", Lang::En, &no_exclusions());
        assert_eq!(tokens, vec!["marks", "spot"]);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(StopwordTokenizer
            .tokenize("", Lang::En, &no_exclusions())
            .is_empty());
        assert!(StopwordTokenizer
            .tokenize("", Lang::Ar, &no_exclusions())
            .is_empty());
    }
}
