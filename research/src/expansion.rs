//! Keyword expansion
//!
//! Generates keyword variants through four channels: an autocomplete
//! suggestion API, a synonym lookup API, n-gram templates, and question
//! templates. The two HTTP channels degrade to empty lists on failure so a
//! slow or blocked endpoint never sinks a research batch.

use std::{env, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ResearchError;
use crate::scoring::ExpansionCounts;

mod defaults {
    pub const SUGGEST_API_URL: &str = "https://suggestqueries.google.com/complete/search";
    pub const SYNONYM_API_URL: &str = "https://api.datamuse.com/words";
    pub const HTTP_TIMEOUT_SECS: &str = "10";
}

/// Book-style phrase openers applied in front of a keyword
const NGRAM_PREFIXES: [&str; 8] = [
    "how to",
    "guide to",
    "complete guide",
    "beginner guide",
    "step by step",
    "ultimate guide",
    "easy",
    "simple",
];

/// Book-style phrase endings appended after a keyword
const NGRAM_SUFFIXES: [&str; 8] = [
    "for beginners",
    "guide",
    "handbook",
    "manual",
    "tips",
    "strategies",
    "techniques",
    "methods",
];

const MAX_AUTOCOMPLETE: usize = 10;
const MAX_SYNONYMS: usize = 15;
const MAX_NGRAMS: usize = 20;

/// Variants generated for one keyword, grouped by expansion channel
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeywordExpansions {
    pub original: String,
    pub autocomplete: Vec<String>,
    pub synonyms: Vec<String>,
    pub ngrams: Vec<String>,
    pub related_questions: Vec<String>,
}

impl KeywordExpansions {
    /// Per-channel counts, the only thing the scorer reads
    pub fn counts(&self) -> ExpansionCounts {
        ExpansionCounts {
            autocomplete: self.autocomplete.len(),
            synonyms: self.synonyms.len(),
            ngrams: self.ngrams.len(),
            related_questions: self.related_questions.len(),
        }
    }
}

/// Synonym API entry ({"word": "..."} objects, Datamuse shape)
#[derive(Debug, Deserialize)]
struct SynonymEntry {
    word: String,
}

/// Client for the two HTTP expansion channels
pub struct ExpansionClient {
    http: reqwest::Client,
    suggest_url: String,
    synonym_url: String,
}

impl ExpansionClient {
    pub fn from_env() -> Result<Self, ResearchError> {
        let timeout = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::HTTP_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(10);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            http,
            suggest_url: env::var("SUGGEST_API_URL")
                .unwrap_or_else(|_| defaults::SUGGEST_API_URL.to_string()),
            synonym_url: env::var("SYNONYM_API_URL")
                .unwrap_or_else(|_| defaults::SYNONYM_API_URL.to_string()),
        })
    }

    /// Expand a keyword through all four channels
    pub async fn expand_keyword(&self, keyword: &str) -> KeywordExpansions {
        let autocomplete = match self.autocomplete(keyword).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                tracing::warn!("Autocomplete lookup failed for '{}': {}", keyword, err);
                Vec::new()
            }
        };

        let synonyms = match self.synonyms(keyword).await {
            Ok(synonyms) => synonyms,
            Err(err) => {
                tracing::warn!("Synonym lookup failed for '{}': {}", keyword, err);
                Vec::new()
            }
        };

        KeywordExpansions {
            original: keyword.to_string(),
            autocomplete,
            synonyms,
            ngrams: generate_ngrams(keyword),
            related_questions: related_questions(keyword),
        }
    }

    /// Autocomplete suggestions: the API answers `[query, [suggestions...]]`
    async fn autocomplete(&self, keyword: &str) -> Result<Vec<String>, ResearchError> {
        let payload: JsonValue = self
            .http
            .get(&self.suggest_url)
            .query(&[("client", "firefox"), ("q", keyword)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let suggestions = payload
            .get(1)
            .and_then(JsonValue::as_array)
            .ok_or(ResearchError::UnexpectedPayload("suggest API"))?;

        Ok(suggestions
            .iter()
            .filter_map(JsonValue::as_str)
            .map(String::from)
            .take(MAX_AUTOCOMPLETE)
            .collect())
    }

    /// Synonyms looked up per word of the keyword, deduped in order
    async fn synonyms(&self, keyword: &str) -> Result<Vec<String>, ResearchError> {
        let mut synonyms: Vec<String> = Vec::new();

        for word in keyword.to_lowercase().split_whitespace() {
            let entries: Vec<SynonymEntry> = self
                .http
                .get(&self.synonym_url)
                .query(&[("ml", word)])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            for entry in entries {
                let synonym = entry.word.replace('_', " ");
                if synonym != word && synonym.len() > 2 && !synonyms.contains(&synonym) {
                    synonyms.push(synonym);
                }
            }

            if synonyms.len() >= MAX_SYNONYMS {
                break;
            }
        }

        synonyms.truncate(MAX_SYNONYMS);
        Ok(synonyms)
    }
}

/// Template-based phrase variants: prefixes, suffixes, and word bigrams
pub fn generate_ngrams(keyword: &str) -> Vec<String> {
    let keyword = keyword.trim().to_lowercase();
    let words: Vec<&str> = keyword.split_whitespace().collect();
    let mut variations: Vec<String> = Vec::new();

    for prefix in NGRAM_PREFIXES {
        variations.push(format!("{} {}", prefix, keyword));
    }

    for suffix in NGRAM_SUFFIXES {
        variations.push(format!("{} {}", keyword, suffix));
    }

    // Word bigrams only make sense for multi-word keywords
    if words.len() > 1 {
        for pair in words.windows(2) {
            variations.push(pair.join(" "));
        }
    }

    variations.truncate(MAX_NGRAMS);
    variations
}

/// Question-form variants readers actually type into search boxes
pub fn related_questions(keyword: &str) -> Vec<String> {
    vec![
        format!("How to {}?", keyword),
        format!("What is {}?", keyword),
        format!("Why {}?", keyword),
        format!("When to {}?", keyword),
        format!("Where to {}?", keyword),
        format!("Best {} methods?", keyword),
        format!("Common {} mistakes?", keyword),
        format!("{} for beginners?", keyword),
        format!("Advanced {} techniques?", keyword),
        format!("{} step by step?", keyword),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ngrams_cover_prefixes_suffixes_and_bigrams() {
        let variations = generate_ngrams("keto diet cookbook");

        assert!(variations.contains(&"how to keto diet cookbook".to_string()));
        assert!(variations.contains(&"keto diet cookbook for beginners".to_string()));
        assert!(variations.contains(&"keto diet".to_string()));
        assert!(variations.contains(&"diet cookbook".to_string()));
        assert!(variations.len() <= 20);
    }

    #[test]
    fn single_word_keywords_get_no_bigrams() {
        let variations = generate_ngrams("gardening");

        // 8 prefixes + 8 suffixes, nothing else
        assert_eq!(variations.len(), 16);
        assert!(!variations.contains(&"gardening".to_string()));
    }

    #[test]
    fn ngrams_normalize_case_and_whitespace() {
        let variations = generate_ngrams("  Dog Training ");
        assert!(variations.contains(&"how to dog training".to_string()));
        assert!(variations.contains(&"dog training".to_string()));
    }

    #[test]
    fn related_questions_are_ten_templates() {
        let questions = related_questions("watercolor painting");

        assert_eq!(questions.len(), 10);
        assert!(questions.contains(&"How to watercolor painting?".to_string()));
        assert!(questions.contains(&"watercolor painting step by step?".to_string()));
    }

    #[test]
    fn counts_mirror_channel_lengths() {
        let expansions = KeywordExpansions {
            original: "test".to_string(),
            autocomplete: vec!["a".into(), "b".into()],
            synonyms: vec!["c".into()],
            ngrams: generate_ngrams("test"),
            related_questions: related_questions("test"),
        };

        let counts = expansions.counts();
        assert_eq!(counts.autocomplete, 2);
        assert_eq!(counts.synonyms, 1);
        assert_eq!(counts.ngrams, 16);
        assert_eq!(counts.related_questions, 10);
        assert_eq!(counts.total(), 29);
    }
}
