//! Per-keyword analysis orchestration
//!
//! Glues the signal clients to the scorer: expansion, trends, and
//! marketplace lookups feed [`KeywordScorer::calculate`], and finished
//! analyses are ordered by opportunity for presentation. One keyword's
//! failure never aborts a batch.

use serde::Serialize;

use crate::error::ResearchError;
use crate::expansion::{ExpansionClient, KeywordExpansions};
use crate::marketplace::MarketplaceClient;
use crate::scoring::{CompetitionSignal, KeywordScorer, ScoreColor, ScoreRecord, TrendSignal};
use crate::trends::TrendsClient;

/// The three signal clients bundled for the request path
pub struct ResearchClients {
    pub expansion: ExpansionClient,
    pub trends: TrendsClient,
    pub marketplace: MarketplaceClient,
}

impl ResearchClients {
    pub fn from_env() -> Result<Self, ResearchError> {
        Ok(Self {
            expansion: ExpansionClient::from_env()?,
            trends: TrendsClient::from_env()?,
            marketplace: MarketplaceClient::from_env()?,
        })
    }

    /// Analyze one keyword end to end: expand it, gather signals, score it
    pub async fn analyze_keyword(&self, keyword: &str) -> KeywordAnalysis {
        let expansions = self.expansion.expand_keyword(keyword).await;
        let trends = self.trends.keyword_trends(keyword).await;
        let competition = self.marketplace.keyword_competition(keyword).await;

        let scores = KeywordScorer::calculate(
            &TrendSignal {
                search_volume: trends.search_volume,
                trend_ratio: trends.trend_score,
            },
            &CompetitionSignal {
                result_count: competition.result_count,
                avg_reviews: competition.avg_reviews,
            },
            &expansions.counts(),
        );

        let color_code = ScoreColor::for_scores(scores.opportunity_score, scores.difficulty_score);

        KeywordAnalysis {
            keyword: keyword.to_string(),
            expansions,
            search_volume: trends.search_volume,
            trend_score: trends.trend_score,
            marketplace_results: competition.result_count,
            avg_price: competition.avg_price,
            avg_reviews: competition.avg_reviews,
            category: competition.category,
            scores,
            color_code,
        }
    }
}

/// One fully-analyzed keyword: raw signals plus the score record
#[derive(Debug, Clone, Serialize)]
pub struct KeywordAnalysis {
    pub keyword: String,
    pub expansions: KeywordExpansions,
    pub search_volume: u64,
    /// Raw trend ratio as reported, before normalization
    pub trend_score: f64,
    pub marketplace_results: u64,
    pub avg_price: f64,
    pub avg_reviews: f64,
    pub category: String,
    pub scores: ScoreRecord,
    pub color_code: ScoreColor,
}

/// Order finished analyses by opportunity, best first.
///
/// The sort is stable, so keywords with equal opportunity keep their input
/// order. Applied once after all scoring, never interleaved with it.
pub fn batch_score_keywords(mut analyses: Vec<KeywordAnalysis>) -> Vec<KeywordAnalysis> {
    analyses.sort_by(|a, b| {
        b.scores
            .opportunity_score
            .partial_cmp(&a.scores.opportunity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    analyses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(keyword: &str, opportunity_score: f64) -> KeywordAnalysis {
        let scores = ScoreRecord {
            opportunity_score,
            ..ScoreRecord::failed()
        };

        KeywordAnalysis {
            keyword: keyword.to_string(),
            expansions: KeywordExpansions::default(),
            search_volume: 0,
            trend_score: 0.0,
            marketplace_results: 0,
            avg_price: 0.0,
            avg_reviews: 0.0,
            category: "Books".to_string(),
            color_code: ScoreColor::Danger,
            scores,
        }
    }

    #[test]
    fn batch_orders_by_opportunity_descending() {
        let batch = vec![
            analysis("low", 40.0),
            analysis("high", 90.0),
            analysis("mid", 65.0),
        ];

        let ordered = batch_score_keywords(batch);
        let keywords: Vec<&str> = ordered.iter().map(|a| a.keyword.as_str()).collect();
        assert_eq!(keywords, ["high", "mid", "low"]);
    }

    #[test]
    fn equal_opportunities_keep_input_order() {
        let batch = vec![
            analysis("first", 50.0),
            analysis("second", 50.0),
            analysis("third", 80.0),
        ];

        let ordered = batch_score_keywords(batch);
        let keywords: Vec<&str> = ordered.iter().map(|a| a.keyword.as_str()).collect();
        assert_eq!(keywords, ["third", "first", "second"]);
    }

    #[test]
    fn empty_batch_is_fine() {
        assert!(batch_score_keywords(Vec::new()).is_empty());
    }
}
