//! Weighted-lexicon sentiment scoring for development-topic posts.

use sdgpulse_core::{Lang, Sentiment};

use crate::SentimentModel;

/// English word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const EN_LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("good", 0.3),
    ("great", 0.4),
    ("excellent", 0.5),
    ("progress", 0.4),
    ("improved", 0.4),
    ("improving", 0.4),
    ("success", 0.5),
    ("successful", 0.5),
    ("achieved", 0.4),
    ("achievement", 0.4),
    ("growth", 0.3),
    ("better", 0.3),
    ("best", 0.5),
    ("hope", 0.3),
    ("hopeful", 0.4),
    ("proud", 0.4),
    ("support", 0.3),
    ("empowering", 0.4),
    ("safe", 0.4),
    ("thriving", 0.5),
    ("opportunity", 0.3),
    ("win", 0.4),
    ("inspiring", 0.5),
    ("recovery", 0.3),
    // Negative signals
    ("bad", -0.4),
    ("worse", -0.5),
    ("worst", -0.6),
    ("crisis", -0.6),
    ("failure", -0.4),
    ("failed", -0.4),
    ("corruption", -0.6),
    ("violence", -0.7),
    ("death", -0.6),
    ("dying", -0.6),
    ("disaster", -0.6),
    ("shortage", -0.5),
    ("collapse", -0.6),
    ("problem", -0.3),
    ("concern", -0.3),
    ("warning", -0.4),
    ("threat", -0.5),
    ("suffering", -0.6),
    ("neglect", -0.5),
    ("scandal", -0.5),
    ("broken", -0.4),
    ("angry", -0.4),
    ("terrible", -0.6),
    ("dangerous", -0.5),
];

/// Arabic word weights, same conventions as [`EN_LEXICON`].
pub(crate) const AR_LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("تقدم", 0.4),
    ("نجاح", 0.5),
    ("ناجح", 0.5),
    ("ممتاز", 0.5),
    ("جيد", 0.3),
    ("رائع", 0.5),
    ("أمل", 0.3),
    ("امل", 0.3),
    ("فخر", 0.4),
    ("تحسن", 0.4),
    ("دعم", 0.3),
    ("إنجاز", 0.5),
    ("انجاز", 0.5),
    ("آمن", 0.4),
    ("نظيف", 0.3),
    ("فرصة", 0.3),
    ("تفاؤل", 0.4),
    ("ازدهار", 0.5),
    // Negative signals
    ("أزمة", -0.6),
    ("ازمة", -0.6),
    ("فشل", -0.5),
    ("فساد", -0.6),
    ("عنف", -0.7),
    ("كارثة", -0.6),
    ("سيء", -0.4),
    ("أسوأ", -0.6),
    ("اسوأ", -0.6),
    ("نقص", -0.5),
    ("انهيار", -0.6),
    ("موت", -0.6),
    ("معاناة", -0.6),
    ("مشكلة", -0.3),
    ("قلق", -0.3),
    ("تهديد", -0.5),
    ("إهمال", -0.5),
    ("اهمال", -0.5),
    ("غضب", -0.4),
    ("خطير", -0.5),
];

/// Score a text string against the lexicon for `lang`.
///
/// Splits text into lowercase words, strips surrounding punctuation, sums
/// matching weights, and clamps the result to `[-1.0, 1.0]`. Returns `0.0`
/// for empty or unmatched text.
#[must_use]
pub fn lexicon_score(text: &str, lang: Lang) -> f32 {
    let lexicon = match lang {
        Lang::En => EN_LEXICON,
        Lang::Ar => AR_LEXICON,
    };
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        for &(lex_word, weight) in lexicon {
            if w == lex_word {
                score += weight;
                break;
            }
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Lexicon-backed [`SentimentModel`].
///
/// A positive weighted sum labels the post positive, a negative sum negative,
/// and zero (including no lexicon hits at all) neutral.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconModel;

impl SentimentModel for LexiconModel {
    fn label(&self, text: &str, lang: Lang) -> Sentiment {
        let score = lexicon_score(text, lang);
        if score > 0.0 {
            Sentiment::Positive
        } else if score < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score("", Lang::En), 0.0);
    }

    #[test]
    fn whitespace_only_returns_zero() {
        assert_eq!(lexicon_score("   ", Lang::En), 0.0);
    }

    #[test]
    fn unknown_text_is_neutral() {
        assert_eq!(
            LexiconModel.label("the quick brown fox", Lang::En),
            Sentiment::Neutral
        );
    }

    #[test]
    fn positive_english_keyword_labels_positive() {
        assert_eq!(
            LexiconModel.label("real progress on clean water this year", Lang::En),
            Sentiment::Positive
        );
    }

    #[test]
    fn negative_english_keyword_labels_negative() {
        assert_eq!(
            LexiconModel.label("the water crisis is getting worse", Lang::En),
            Sentiment::Negative
        );
    }

    #[test]
    fn positive_arabic_keyword_labels_positive() {
        assert_eq!(
            LexiconModel.label("تقدم كبير في التعليم", Lang::Ar),
            Sentiment::Positive
        );
    }

    #[test]
    fn negative_arabic_keyword_labels_negative() {
        assert_eq!(
            LexiconModel.label("أزمة مياه في المنطقة", Lang::Ar),
            Sentiment::Negative
        );
    }

    #[test]
    fn arabic_words_do_not_score_english_text() {
        assert_eq!(lexicon_score("تقدم كبير", Lang::En), 0.0);
    }

    #[test]
    fn mixed_text_returns_intermediate() {
        // progress (+0.4) + crisis (-0.6) = -0.2
        let score = lexicon_score("progress stalled by the crisis", Lang::En);
        assert!(
            score > -1.0 && score < 0.0,
            "expected small negative score, got {score}"
        );
    }

    #[test]
    fn score_clamps_to_positive_one() {
        let text = "excellent success best thriving inspiring progress achieved win";
        assert_eq!(lexicon_score(text, Lang::En), 1.0);
    }

    #[test]
    fn score_clamps_to_negative_one() {
        let text = "crisis disaster violence corruption collapse suffering worst";
        assert_eq!(lexicon_score(text, Lang::En), -1.0);
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert_eq!(
            LexiconModel.label("what a success!", Lang::En),
            Sentiment::Positive
        );
    }

    #[test]
    fn hashtag_prefix_stripped_from_words() {
        assert_eq!(
            LexiconModel.label("#progress in renewable energy", Lang::En),
            Sentiment::Positive
        );
    }
}
