//! Keyword scoring module
//!
//! Turns raw search-interest, marketplace-competition, and expansion signals
//! into normalized 0-100 sub-scores, composite difficulty / profitability /
//! opportunity scores, and a human-readable recommendation.

pub mod keyword_score;

pub use keyword_score::{
    CompetitionSignal, ExpansionCounts, KeywordScorer, Recommendation, ScoreColor, ScoreRecord,
    TrendSignal,
};
