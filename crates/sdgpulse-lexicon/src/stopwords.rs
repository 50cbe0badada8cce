//! Static stopword lists for the word-frequency tokenizer.
//!
//! The lists cover common function words plus platform noise ("https",
//! "amp", "retweet") that survives text cleanup often enough to crowd out
//! real keywords.

use std::collections::HashSet;
use std::sync::LazyLock;

use sdgpulse_core::Lang;

const EN: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "can", "will",
    "just", "should", "now",
    // Platform noise and chatter
    "https", "amp", "really", "us", "every", "like", "please", "still", "via", "get",
    "could", "love", "one", "new", "never", "even", "thing", "soon", "try", "god", "day",
    "retweet", "gt", "got", "would", "ur", "always", "think", "means", "dont", "go", "much",
    "sir", "take", "everyone", "everything", "subscribe", "yes", "look",
];

const AR: &[&str] = &[
    "في", "من", "على", "إلى", "الى", "عن", "مع", "هذا", "هذه", "ذلك", "تلك", "التي",
    "الذي", "الذين", "ما", "لا", "لم", "لن", "إن", "أن", "ان", "أنّ", "كان", "كانت",
    "يكون", "هو", "هي", "هم", "نحن", "أنا", "انا", "أنت", "أو", "او", "ثم", "بل", "قد",
    "كل", "بعض", "غير", "بين", "بعد", "قبل", "عند", "حتى", "إذا", "اذا", "كيف", "لماذا",
    "أين", "متى", "هل", "ليس", "كما", "لكن", "منذ", "حول", "ضد", "خلال", "هناك", "فيه",
    "عليه", "إنه", "انه", "وهي", "وهو", "لها", "له", "بها", "به", "فيها", "منها", "عنها",
    "إلا", "الا", "أي", "اي", "يا", "ولا", "وما", "أم", "ام", "اما",
    // Dialect chatter seen in the collected corpora
    "تم", "الله", "مش", "عم", "انو", "شو", "شي", "يلي", "بسبب", "بس", "ال", "بكل",
    "الان", "ع",
];

static EN_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| EN.iter().copied().collect());
static AR_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| AR.iter().copied().collect());

/// Returns `true` when `word` is a stopword for `lang`.
pub(crate) fn is_stopword(word: &str, lang: Lang) -> bool {
    match lang {
        Lang::En => EN_SET.contains(word),
        Lang::Ar => AR_SET.contains(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_english_words_are_stopwords() {
        assert!(is_stopword("the", Lang::En));
        assert!(is_stopword("https", Lang::En));
        assert!(!is_stopword("water", Lang::En));
    }

    #[test]
    fn common_arabic_words_are_stopwords() {
        assert!(is_stopword("في", Lang::Ar));
        assert!(is_stopword("مش", Lang::Ar));
        assert!(!is_stopword("تعليم", Lang::Ar));
    }

    #[test]
    fn lists_are_language_scoped() {
        assert!(!is_stopword("the", Lang::Ar));
        assert!(!is_stopword("في", Lang::En));
    }
}
