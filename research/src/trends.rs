//! Search-interest signals
//!
//! Fetches weekly interest series from a trends proxy endpoint when one is
//! configured, and otherwise estimates a plausible signal from keyword shape.
//! The estimation path is deterministic so re-analyzing the same keyword
//! yields identical scores.

use std::{
    collections::hash_map::DefaultHasher,
    env,
    hash::{Hash, Hasher},
    time::Duration,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

mod defaults {
    pub const HTTP_TIMEOUT_SECS: &str = "10";
}

/// Search-interest report for one keyword
#[derive(Debug, Clone, Serialize)]
pub struct TrendsReport {
    pub keyword: String,
    /// Estimated monthly search volume
    pub search_volume: u64,
    /// Recent-interest over average-interest ratio, typically in [0, 3]
    pub trend_score: f64,
    /// True when the report came from the offline estimator
    pub estimated: bool,
    pub data_date: chrono::DateTime<Utc>,
}

/// Interest-over-time payload from the trends proxy
#[derive(Debug, Deserialize)]
struct InterestResponse {
    interest: Vec<f64>,
}

/// A curated trending topic used to seed the daily trending table
#[derive(Debug, Clone, Serialize)]
pub struct TrendingTopicSeed {
    pub topic: String,
    pub source: &'static str,
    pub score: f64,
    pub category: &'static str,
}

/// Client for the trends proxy, with an offline estimator fallback
pub struct TrendsClient {
    http: reqwest::Client,
    api_url: Option<String>,
}

impl TrendsClient {
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
            api_url: env::var("TRENDS_API_URL").ok(),
        })
    }

    /// Interest report for a keyword. Falls back to the estimator when no
    /// proxy is configured, the fetch fails, or the series comes back empty.
    pub async fn keyword_trends(&self, keyword: &str) -> TrendsReport {
        if let Some(url) = &self.api_url {
            match self.fetch_interest(url, keyword).await {
                Ok(series) if !series.is_empty() => {
                    return TrendsReport {
                        keyword: keyword.to_string(),
                        search_volume: volume_from_series(&series),
                        trend_score: ratio_from_series(&series),
                        estimated: false,
                        data_date: Utc::now(),
                    };
                }
                Ok(_) => {
                    tracing::warn!("Empty interest series for '{}', estimating", keyword);
                }
                Err(err) => {
                    tracing::warn!("Trends fetch failed for '{}': {}", keyword, err);
                }
            }
        }

        estimated_trends(keyword)
    }

    async fn fetch_interest(&self, url: &str, keyword: &str) -> Result<Vec<f64>, ResearchError> {
        let response: InterestResponse = self
            .http
            .get(url)
            .query(&[("keyword", keyword), ("timeframe", "12m")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.interest)
    }
}

/// Volume estimate from a 0-100 interest series: average interest x 100
pub fn volume_from_series(series: &[f64]) -> u64 {
    if series.is_empty() {
        return 0;
    }

    let avg = series.iter().sum::<f64>() / series.len() as f64;
    (avg * 100.0).max(0.0) as u64
}

/// Trend ratio: mean of the last 4 points over the overall mean.
/// Above 1.0 means interest is rising.
pub fn ratio_from_series(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }

    let avg = series.iter().sum::<f64>() / series.len() as f64;
    let tail = &series[series.len().saturating_sub(4)..];
    let recent = tail.iter().sum::<f64>() / tail.len() as f64;

    recent / avg.max(1.0)
}

/// Offline estimate when no trends source is reachable. Longer keywords
/// typically draw lower volume; the ratio comes from a stable hash so the
/// same keyword always estimates the same.
pub fn estimated_trends(keyword: &str) -> TrendsReport {
    let word_count = keyword.split_whitespace().count() as i64;
    let search_volume = (1000 - word_count * 200).max(100) as u64;

    let mut hasher = DefaultHasher::new();
    keyword.hash(&mut hasher);
    // map into [0.8, 2.5] at 2-decimal resolution
    let trend_score = 0.8 + (hasher.finish() % 171) as f64 / 100.0;

    TrendsReport {
        keyword: keyword.to_string(),
        search_volume,
        trend_score,
        estimated: true,
        data_date: Utc::now(),
    }
}

/// Curated daily trending topics across three sources, with positionally
/// decaying scores
pub fn daily_trending_topics() -> Vec<TrendingTopicSeed> {
    const SEARCH_TOPICS: [&str; 10] = [
        "self help books",
        "cooking recipes",
        "mindfulness meditation",
        "weight loss diet",
        "productivity tips",
        "financial freedom",
        "relationship advice",
        "home organization",
        "travel guides",
        "business startup",
    ];
    const VIDEO_TOPICS: [&str; 5] = [
        "how to write a book",
        "self publishing guide",
        "kindle direct publishing",
        "book marketing strategies",
        "bestselling book secrets",
    ];
    const SOCIAL_TOPICS: [&str; 5] = [
        "BookTok",
        "IndieAuthor",
        "WritingCommunity",
        "BookLovers",
        "SelfPublishing",
    ];

    let mut topics: Vec<TrendingTopicSeed> = Vec::new();

    for (i, topic) in SEARCH_TOPICS.iter().enumerate() {
        topics.push(TrendingTopicSeed {
            topic: topic.to_string(),
            source: "search_trends",
            score: 90.0 - (i as f64 * 8.0),
            category: "trending",
        });
    }

    for (i, topic) in VIDEO_TOPICS.iter().enumerate() {
        topics.push(TrendingTopicSeed {
            topic: topic.to_string(),
            source: "video",
            score: 80.0 - (i as f64 * 10.0),
            category: "publishing",
        });
    }

    for (i, topic) in SOCIAL_TOPICS.iter().enumerate() {
        topics.push(TrendingTopicSeed {
            topic: topic.to_string(),
            source: "social",
            score: 70.0 - (i as f64 * 8.0),
            category: "social",
        });
    }

    topics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_average_interest_scaled() {
        assert_eq!(volume_from_series(&[50.0, 50.0, 50.0, 50.0]), 5000);
        assert_eq!(volume_from_series(&[]), 0);
    }

    #[test]
    fn rising_interest_gives_ratio_above_one() {
        // flat 10s with a recent spike to 40
        let series = [10.0, 10.0, 10.0, 10.0, 40.0, 40.0, 40.0, 40.0];
        let ratio = ratio_from_series(&series);
        assert!(ratio > 1.0, "ratio was {ratio}");

        // overall mean 25, recent mean 40
        assert!((ratio - 40.0 / 25.0).abs() < 1e-9);
    }

    #[test]
    fn fading_interest_gives_ratio_below_one() {
        let series = [80.0, 80.0, 80.0, 80.0, 10.0, 10.0, 10.0, 10.0];
        assert!(ratio_from_series(&series) < 1.0);
    }

    #[test]
    fn short_series_use_whatever_points_exist() {
        let series = [30.0, 60.0];
        // tail is the whole series, so ratio = mean / mean = 1
        assert!((ratio_from_series(&series) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn estimator_is_deterministic_and_bounded() {
        let first = estimated_trends("vegan slow cooker recipes");
        let second = estimated_trends("vegan slow cooker recipes");

        assert_eq!(first.search_volume, second.search_volume);
        assert_eq!(first.trend_score, second.trend_score);
        assert!(first.estimated);
        assert!((0.8..=2.5).contains(&first.trend_score));
    }

    #[test]
    fn estimator_penalizes_long_keywords() {
        let short = estimated_trends("gardening");
        let long = estimated_trends("container gardening for small urban balconies");

        assert_eq!(short.search_volume, 800);
        assert_eq!(long.search_volume, 100); // floor kicks in
        assert!(short.search_volume > long.search_volume);
    }

    #[test]
    fn trending_topics_span_all_three_sources() {
        let topics = daily_trending_topics();

        assert_eq!(topics.len(), 20);
        assert_eq!(topics.iter().filter(|t| t.source == "search_trends").count(), 10);
        assert_eq!(topics.iter().filter(|t| t.source == "video").count(), 5);
        assert_eq!(topics.iter().filter(|t| t.source == "social").count(), 5);

        // first topic of each source carries that source's top score
        assert_eq!(topics[0].score, 90.0);
        assert_eq!(topics[10].score, 80.0);
        assert_eq!(topics[15].score, 70.0);
    }
}
