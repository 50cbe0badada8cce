//! Shared types and configuration for the sdgpulse workspace.
//!
//! Holds the language/sentiment vocabulary used across crates, the
//! environment-driven [`AppConfig`], and the YAML reference data
//! (countries and topics) that defines the collection universe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod reference;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use reference::{compose_scope_query, scope_query, CountryConfig, ReferenceData, TopicConfig};

/// Language of a subscription or post.
///
/// Stored in the database as its lowercase tag (`"en"` / `"ar"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Ar,
}

impl Lang {
    /// All languages the pipeline collects and tokenizes.
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Ar];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ar => "ar",
        }
    }

    /// Parse a BCP-47-ish tag as it appears on posts. Tags outside the
    /// supported set (e.g. `"und"`) return `None`; callers treat those
    /// posts as unclassifiable rather than erroring.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Lang> {
        match tag {
            "en" => Some(Lang::En),
            "ar" => Some(Lang::Ar),
            _ => None,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label assigned to a post by the classifier capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(CoreError::InvalidSentiment(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sentiment label: {0}")]
    InvalidSentiment(String),
}

/// Configuration loading/validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read reference file {path}: {source}")]
    ReferenceFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse reference file: {0}")]
    ReferenceFileParse(#[from] serde_yaml::Error),

    #[error("reference data validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_tag_round_trip() {
        for lang in Lang::ALL {
            assert_eq!(Lang::from_tag(lang.as_str()), Some(lang));
        }
    }

    #[test]
    fn lang_rejects_unsupported_tags() {
        assert_eq!(Lang::from_tag("und"), None);
        assert_eq!(Lang::from_tag("fr"), None);
        assert_eq!(Lang::from_tag(""), None);
    }

    #[test]
    fn sentiment_parses_all_labels() {
        for s in [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral] {
            assert_eq!(s.as_str().parse::<Sentiment>().unwrap(), s);
        }
    }

    #[test]
    fn sentiment_rejects_unknown_label() {
        assert!("mixed".parse::<Sentiment>().is_err());
    }
}
