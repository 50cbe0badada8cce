use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Lang};

/// A country (or territory) the pipeline listens to.
///
/// `query_en` / `query_ar` carry the location keywords OR-ed together for the
/// search API (e.g. `"Lebanon OR Beirut"`). An empty query means posts are
/// matched on topic keywords alone for that language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryConfig {
    pub code: String,
    pub name_en: String,
    pub name_ar: String,
    #[serde(default)]
    pub query_en: String,
    #[serde(default)]
    pub query_ar: String,
}

impl CountryConfig {
    #[must_use]
    pub fn query_for(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.query_en,
            Lang::Ar => &self.query_ar,
        }
    }
}

/// A monitored topic. SDG topics (`is_sdg: true`) participate in the
/// per-goal rankings; the auxiliary baseline topic (all posts about the
/// country, no goal filter) is flagged `is_sdg: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub query_en: String,
    #[serde(default)]
    pub query_ar: String,
    #[serde(default = "default_is_sdg")]
    pub is_sdg: bool,
}

fn default_is_sdg() -> bool {
    true
}

impl TopicConfig {
    #[must_use]
    pub fn query_for(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.query_en,
            Lang::Ar => &self.query_ar,
        }
    }

    /// Languages with an explicit topic query. The baseline topic has none;
    /// its subscriptions ride on the country keywords alone.
    #[must_use]
    pub fn langs(&self) -> Vec<Lang> {
        Lang::ALL
            .into_iter()
            .filter(|lang| !self.query_for(*lang).trim().is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CountriesFile {
    pub countries: Vec<CountryConfig>,
}

#[derive(Debug, Deserialize)]
pub struct TopicsFile {
    pub topics: Vec<TopicConfig>,
}

/// The full collection universe: every (country, topic, language)
/// combination with a usable topic query becomes a subscription.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub countries: Vec<CountryConfig>,
    pub topics: Vec<TopicConfig>,
}

impl ReferenceData {
    /// Load and validate both reference files.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either file cannot be read, parsed, or fails
    /// validation.
    pub fn load(countries_path: &Path, topics_path: &Path) -> Result<Self, ConfigError> {
        let countries = load_countries(countries_path)?;
        let topics = load_topics(topics_path)?;
        Ok(Self {
            countries: countries.countries,
            topics: topics.topics,
        })
    }

    #[must_use]
    pub fn country(&self, code: &str) -> Option<&CountryConfig> {
        self.countries.iter().find(|c| c.code == code)
    }

    #[must_use]
    pub fn topic(&self, id: &str) -> Option<&TopicConfig> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// Every (country, topic, language) triple worth subscribing to.
    ///
    /// An SDG topic needs its own keywords for the language; without them
    /// the query would degrade to the bare country filter and collect
    /// baseline posts under a goal label. The baseline topic has no keywords
    /// and rides on the country query alone.
    #[must_use]
    pub fn subscription_universe(&self) -> Vec<(&CountryConfig, &TopicConfig, Lang)> {
        let mut universe = Vec::new();
        for country in &self.countries {
            for topic in &self.topics {
                for lang in Lang::ALL {
                    let has_topic_query = !topic.query_for(lang).trim().is_empty();
                    let has_country_query = !country.query_for(lang).trim().is_empty();
                    let viable = if topic.is_sdg {
                        has_topic_query
                    } else {
                        has_topic_query || has_country_query
                    };
                    if viable {
                        universe.push((country, topic, lang));
                    }
                }
            }
        }
        universe
    }
}

/// Build the search-API query for one subscription scope.
///
/// Shape: `({topic keywords}) ({country keywords}) lang:{lang} -is:retweet`,
/// with an empty topic or country part omitted along with its parentheses.
/// Retweets are always excluded so a viral repost cannot dominate counts.
#[must_use]
pub fn scope_query(topic: &TopicConfig, country: &CountryConfig, lang: Lang) -> String {
    compose_scope_query(topic.query_for(lang), country.query_for(lang), lang.as_str())
}

/// String-level form of [`scope_query`] for callers that already hold the
/// language-resolved query parts, such as a subscription row.
#[must_use]
pub fn compose_scope_query(topic_part: &str, country_part: &str, lang_tag: &str) -> String {
    let topic_part = topic_part.trim();
    let country_part = country_part.trim();

    match (topic_part.is_empty(), country_part.is_empty()) {
        (true, _) => format!("{country_part} lang:{lang_tag} -is:retweet"),
        (false, true) => format!("{topic_part} lang:{lang_tag} -is:retweet"),
        (false, false) => {
            format!("({topic_part}) ({country_part}) lang:{lang_tag} -is:retweet")
        }
    }
}

/// Load and validate the countries file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_countries(path: &Path) -> Result<CountriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReferenceFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CountriesFile = serde_yaml::from_str(&content)?;
    validate_countries(&file)?;
    Ok(file)
}

/// Load and validate the topics file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_topics(path: &Path) -> Result<TopicsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReferenceFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: TopicsFile = serde_yaml::from_str(&content)?;
    validate_topics(&file)?;
    Ok(file)
}

fn validate_countries(file: &CountriesFile) -> Result<(), ConfigError> {
    if file.countries.is_empty() {
        return Err(ConfigError::Validation(
            "countries file defines no countries".to_string(),
        ));
    }

    let mut seen_codes = HashSet::new();
    for country in &file.countries {
        let code = country.code.trim();
        if code.is_empty() {
            return Err(ConfigError::Validation(
                "country code must be non-empty".to_string(),
            ));
        }
        if !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "country code '{code}' must be uppercase ASCII letters"
            )));
        }
        if !seen_codes.insert(code.to_string()) {
            return Err(ConfigError::Validation(format!(
                "duplicate country code: '{code}'"
            )));
        }
        if country.name_en.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "country '{code}' has an empty English name"
            )));
        }
    }
    Ok(())
}

fn validate_topics(file: &TopicsFile) -> Result<(), ConfigError> {
    if file.topics.is_empty() {
        return Err(ConfigError::Validation(
            "topics file defines no topics".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for topic in &file.topics {
        let id = topic.id.trim();
        if id.is_empty() {
            return Err(ConfigError::Validation(
                "topic id must be non-empty".to_string(),
            ));
        }
        if !seen_ids.insert(id.to_string()) {
            return Err(ConfigError::Validation(format!("duplicate topic id: '{id}'")));
        }
        // Baseline topics may leave every query empty; they inherit the
        // country keywords. SDG topics without keywords collect nothing.
        if topic.is_sdg && topic.langs().is_empty() {
            return Err(ConfigError::Validation(format!(
                "SDG topic '{id}' has no query in any supported language"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(code: &str, query_en: &str, query_ar: &str) -> CountryConfig {
        CountryConfig {
            code: code.to_string(),
            name_en: "Testland".to_string(),
            name_ar: "بلد".to_string(),
            query_en: query_en.to_string(),
            query_ar: query_ar.to_string(),
        }
    }

    fn topic(id: &str, query_en: &str, query_ar: &str, is_sdg: bool) -> TopicConfig {
        TopicConfig {
            id: id.to_string(),
            name: "Test topic".to_string(),
            query_en: query_en.to_string(),
            query_ar: query_ar.to_string(),
            is_sdg,
        }
    }

    #[test]
    fn scope_query_with_both_parts() {
        let t = topic("SDG01", "poverty OR inequality", "", true);
        let c = country("LB", "Lebanon OR Beirut", "");
        assert_eq!(
            scope_query(&t, &c, Lang::En),
            "(poverty OR inequality) (Lebanon OR Beirut) lang:en -is:retweet"
        );
    }

    #[test]
    fn scope_query_without_country_part() {
        let t = topic("SDG01", "poverty", "", true);
        let c = country("LB", "", "");
        assert_eq!(scope_query(&t, &c, Lang::En), "poverty lang:en -is:retweet");
    }

    #[test]
    fn scope_query_without_topic_part() {
        let t = topic("SDG00", "", "", false);
        let c = country("LB", "Lebanon OR Beirut", "");
        assert_eq!(
            scope_query(&t, &c, Lang::En),
            "Lebanon OR Beirut lang:en -is:retweet"
        );
    }

    #[test]
    fn scope_query_arabic_lang_filter() {
        let t = topic("SDG04", "", "التعليم OR المدارس", true);
        let c = country("EG", "", "مصر OR القاهرة");
        assert_eq!(
            scope_query(&t, &c, Lang::Ar),
            "(التعليم OR المدارس) (مصر OR القاهرة) lang:ar -is:retweet"
        );
    }

    #[test]
    fn topic_langs_follow_nonempty_queries() {
        assert_eq!(topic("SDG01", "poverty", "", true).langs(), vec![Lang::En]);
        assert_eq!(
            topic("SDG01", "poverty", "الفقر", true).langs(),
            vec![Lang::En, Lang::Ar]
        );
        assert!(topic("SDG01", " ", "", true).langs().is_empty());
    }

    #[test]
    fn validate_rejects_duplicate_country_code() {
        let file = CountriesFile {
            countries: vec![country("EG", "", ""), country("EG", "", "")],
        };
        let err = validate_countries(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate country code"));
    }

    #[test]
    fn validate_rejects_lowercase_country_code() {
        let file = CountriesFile {
            countries: vec![country("eg", "", "")],
        };
        let err = validate_countries(&file).unwrap_err();
        assert!(err.to_string().contains("uppercase"));
    }

    #[test]
    fn validate_rejects_sdg_topic_without_queries() {
        let file = TopicsFile {
            topics: vec![topic("SDG01", "", "", true)],
        };
        let err = validate_topics(&file).unwrap_err();
        assert!(err.to_string().contains("no query"));
    }

    #[test]
    fn validate_accepts_baseline_topic_without_queries() {
        let file = TopicsFile {
            topics: vec![topic("SDG00", "", "", false), topic("SDG01", "poverty", "", true)],
        };
        assert!(validate_topics(&file).is_ok());
    }

    #[test]
    fn subscription_universe_skips_keywordless_combinations() {
        let data = ReferenceData {
            countries: vec![country("LB", "Lebanon OR Beirut", "لبنان")],
            topics: vec![
                topic("SDG00", "", "", false),
                topic("SDG01", "poverty", "الفقر", true),
                topic("SDG04", "education", "", true),
            ],
        };
        let universe = data.subscription_universe();
        // The baseline rides on the country query in both languages; SDG04
        // has no Arabic keywords, so an Arabic subscription for it would
        // collect baseline posts under a goal label and is skipped.
        let keys: Vec<(&str, &str, Lang)> = universe
            .iter()
            .map(|(c, t, l)| (c.code.as_str(), t.id.as_str(), *l))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("LB", "SDG00", Lang::En),
                ("LB", "SDG00", Lang::Ar),
                ("LB", "SDG01", Lang::En),
                ("LB", "SDG01", Lang::Ar),
                ("LB", "SDG04", Lang::En),
            ]
        );
    }

    #[test]
    fn validate_rejects_duplicate_topic_id() {
        let file = TopicsFile {
            topics: vec![topic("SDG01", "poverty", "", true), topic("SDG01", "x", "", true)],
        };
        let err = validate_topics(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate topic id"));
    }

    #[test]
    fn topics_yaml_defaults_is_sdg_to_true() {
        let yaml = r"
topics:
  - id: SDG01
    name: No poverty
    query_en: poverty OR inequality
";
        let file: TopicsFile = serde_yaml::from_str(yaml).unwrap();
        assert!(file.topics[0].is_sdg);
    }

    #[test]
    fn load_reference_from_real_files() {
        let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
        let countries = base.join("config").join("countries.yaml");
        let topics = base.join("config").join("topics.yaml");
        assert!(
            countries.exists() && topics.exists(),
            "reference yaml missing under {base:?}; required for this test"
        );
        let data = ReferenceData::load(&countries, &topics);
        assert!(data.is_ok(), "failed to load reference data: {data:?}");
        let data = data.unwrap();
        assert!(!data.countries.is_empty());
        assert!(data.topics.iter().any(|t| !t.is_sdg), "baseline topic missing");
        assert!(data.topics.iter().filter(|t| t.is_sdg).count() >= 17);
    }
}
