//! Keyword opportunity scoring
//!
//! Calculates a set of 0-100 scores for each keyword to help users
//! separate promising niches from crowded ones.
//!
//! Score components:
//! - Volume Score: how much search interest the keyword draws
//! - Competition Score: how crowded the marketplace results are
//! - Trend Score: whether interest is rising or fading
//! - Expansion Score: how many content angles the keyword opens up
//! - Difficulty / Profitability / Opportunity: weighted composites

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::ResearchError;

/// Raw search-interest signal for one keyword
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendSignal {
    /// Estimated monthly search volume
    pub search_volume: u64,
    /// Recent-interest over average-interest ratio, typically in [0, 3]
    pub trend_ratio: f64,
}

/// Raw marketplace-competition signal for one keyword
#[derive(Debug, Clone, Copy, Default)]
pub struct CompetitionSignal {
    /// Number of listings returned by a marketplace search
    pub result_count: u64,
    /// Average review count across the first result page
    pub avg_reviews: f64,
}

/// Counts of generated keyword variants, one per expansion category
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpansionCounts {
    pub autocomplete: usize,
    pub synonyms: usize,
    pub ngrams: usize,
    pub related_questions: usize,
}

impl ExpansionCounts {
    pub fn total(&self) -> usize {
        self.autocomplete + self.synonyms + self.ngrams + self.related_questions
    }
}

/// Verdict attached to a scored keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Excellent,
    VeryGood,
    Good,
    Moderate,
    LowCompetition,
    Challenging,
    AnalysisFailed,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Excellent => "Excellent - High opportunity, low competition",
            Recommendation::VeryGood => {
                "Very Good - Strong potential with manageable competition"
            }
            Recommendation::Good => "Good - Decent opportunity, moderate effort required",
            Recommendation::Moderate => "Moderate - Some potential, higher effort needed",
            Recommendation::LowCompetition => {
                "Low Competition - Easy to rank but limited volume"
            }
            Recommendation::Challenging => "Challenging - High competition or low opportunity",
            Recommendation::AnalysisFailed => "Analysis failed",
        }
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Traffic-light hint for UI display, thresholds independent from
/// [`Recommendation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreColor {
    Success,
    Warning,
    Danger,
}

impl ScoreColor {
    pub fn for_scores(opportunity_score: f64, difficulty_score: f64) -> ScoreColor {
        if opportunity_score >= 70.0 && difficulty_score <= 40.0 {
            ScoreColor::Success
        } else if opportunity_score >= 50.0 && difficulty_score <= 60.0 {
            ScoreColor::Warning
        } else {
            ScoreColor::Danger
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreColor::Success => "success",
            ScoreColor::Warning => "warning",
            ScoreColor::Danger => "danger",
        }
    }
}

impl Serialize for ScoreColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Result of scoring one keyword
///
/// Every numeric field lies in [0, 100] and is rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub volume_score: f64,
    pub competition_score: f64,
    pub trend_score: f64,
    pub expansion_score: f64,
    pub difficulty_score: f64,
    pub profitability_score: f64,
    pub opportunity_score: f64,
    pub recommendation: Recommendation,
}

impl ScoreRecord {
    /// Safe-default record returned when a signal payload cannot be read.
    /// Difficulty pins to 100 so a failed keyword never looks attractive.
    pub fn failed() -> ScoreRecord {
        ScoreRecord {
            volume_score: 0.0,
            competition_score: 0.0,
            trend_score: 0.0,
            expansion_score: 0.0,
            difficulty_score: 100.0,
            profitability_score: 0.0,
            opportunity_score: 0.0,
            recommendation: Recommendation::AnalysisFailed,
        }
    }
}

/// Round to 2 decimal places; applied only at the output stage so
/// intermediates keep full precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Keyword scorer: a stateless bundle of the scoring curves and weights
pub struct KeywordScorer;

impl KeywordScorer {
    /// Score one keyword from typed signals.
    ///
    /// Sub-scores are computed first, then difficulty (which re-reads the
    /// competition signal), then the profitability and opportunity
    /// composites.
    pub fn calculate(
        trend: &TrendSignal,
        competition: &CompetitionSignal,
        expansions: &ExpansionCounts,
    ) -> ScoreRecord {
        let volume_score = Self::volume_score(trend.search_volume);
        let competition_score =
            Self::competition_score(competition.result_count, competition.avg_reviews);
        let trend_score = Self::normalize_trend_score(trend.trend_ratio);
        let expansion_score = Self::expansion_score(expansions);

        let difficulty_score = Self::difficulty_score(
            competition_score,
            competition.result_count,
            competition.avg_reviews,
        );

        let profitability_score = Self::profitability_score(
            volume_score,
            competition_score,
            trend_score,
            expansion_score,
        );

        let opportunity_score = Self::opportunity_score(profitability_score, difficulty_score);

        ScoreRecord {
            volume_score: round2(volume_score),
            competition_score: round2(competition_score),
            trend_score: round2(trend_score),
            expansion_score: round2(expansion_score),
            difficulty_score: round2(difficulty_score),
            profitability_score: round2(profitability_score),
            opportunity_score: round2(opportunity_score),
            recommendation: Self::recommendation(opportunity_score, difficulty_score),
        }
    }

    /// Score one keyword from loosely-typed collaborator payloads.
    ///
    /// Missing fields default to zero; a present but non-numeric field makes
    /// the whole record fall back to [`ScoreRecord::failed`]. A bad payload
    /// must never abort a batch, so no error escapes this function.
    pub fn score_raw(
        keyword: &str,
        trends_data: &JsonValue,
        marketplace_data: &JsonValue,
        expansions: &JsonValue,
    ) -> ScoreRecord {
        match Self::try_score_raw(trends_data, marketplace_data, expansions) {
            Ok(record) => record,
            Err(err) => {
                tracing::error!("Error calculating scores for '{}': {}", keyword, err);
                ScoreRecord::failed()
            }
        }
    }

    fn try_score_raw(
        trends_data: &JsonValue,
        marketplace_data: &JsonValue,
        expansions: &JsonValue,
    ) -> Result<ScoreRecord, ResearchError> {
        let trend = TrendSignal {
            search_volume: count_field(trends_data, "trends", "search_volume")?,
            trend_ratio: num_field(trends_data, "trends", "trend_score")?,
        };
        let competition = CompetitionSignal {
            result_count: count_field(marketplace_data, "marketplace", "result_count")?,
            avg_reviews: num_field(marketplace_data, "marketplace", "avg_reviews")?,
        };
        let counts = expansion_counts_from_json(expansions);

        Ok(Self::calculate(&trend, &competition, &counts))
    }

    /// Volume score (0-100), log-scaled so low-volume gains matter more.
    /// Volumes: 0-100 = 0-20, 100-1000 = 20-50, 1000-10000 = 50-80, 10000+ = 80-100
    pub fn volume_score(search_volume: u64) -> f64 {
        if search_volume == 0 {
            return 0.0;
        }

        let v = search_volume as f64;
        if search_volume < 100 {
            (v * 0.2).min(20.0)
        } else if search_volume < 1000 {
            20.0 + ((v - 100.0) / 900.0) * 30.0
        } else if search_volume < 10000 {
            50.0 + ((v - 1000.0) / 9000.0) * 30.0
        } else {
            (80.0 + (v / 10000.0).log10() * 10.0).min(100.0)
        }
    }

    /// Competition score (0-100, higher = more competitive)
    pub fn competition_score(result_count: u64, avg_reviews: f64) -> f64 {
        if result_count == 0 {
            return 0.0;
        }

        // Base competition from result count
        let base_score: f64 = if result_count < 100 {
            10.0
        } else if result_count < 1000 {
            25.0
        } else if result_count < 10000 {
            50.0
        } else if result_count < 100000 {
            75.0
        } else {
            90.0
        };

        // More reviews = more established competition
        let review_modifier = if avg_reviews > 100.0 {
            10.0
        } else if avg_reviews > 50.0 {
            5.0
        } else {
            0.0
        };

        (base_score + review_modifier).min(100.0)
    }

    /// Normalize a raw trend ratio (typically 0-3) to the 0-100 scale
    pub fn normalize_trend_score(trend_ratio: f64) -> f64 {
        (trend_ratio * 33.33).clamp(0.0, 100.0)
    }

    /// Expansion score: more generated variants = more content angles,
    /// capped once the total reaches 50
    pub fn expansion_score(counts: &ExpansionCounts) -> f64 {
        ((counts.total() as f64 / 50.0) * 100.0).min(100.0)
    }

    /// Difficulty score (0-100, lower is easier).
    ///
    /// The competition signal deliberately counts twice: once through
    /// `competition_score` (which already carries a review modifier) and
    /// again through the result/review factors below.
    pub fn difficulty_score(competition_score: f64, result_count: u64, avg_reviews: f64) -> f64 {
        let result_factor = if result_count > 100000 {
            20.0
        } else if result_count > 10000 {
            10.0
        } else if result_count > 1000 {
            5.0
        } else {
            0.0
        };

        let review_factor = if avg_reviews > 500.0 {
            15.0
        } else if avg_reviews > 100.0 {
            8.0
        } else if avg_reviews > 50.0 {
            3.0
        } else {
            0.0
        };

        (competition_score + result_factor + review_factor).min(100.0)
    }

    /// Profitability (0-100, higher is better): good volume + good trends +
    /// low competition + good expansion potential
    pub fn profitability_score(
        volume_score: f64,
        competition_score: f64,
        trend_score: f64,
        expansion_score: f64,
    ) -> f64 {
        let profitability = volume_score * 0.4
            + trend_score * 0.2
            + (100.0 - competition_score) * 0.3
            + expansion_score * 0.1;

        profitability.min(100.0)
    }

    /// Opportunity (0-100): high profitability combined with low difficulty
    pub fn opportunity_score(profitability_score: f64, difficulty_score: f64) -> f64 {
        (profitability_score * 0.7 + (100.0 - difficulty_score) * 0.3).min(100.0)
    }

    /// Verdict for a scored keyword; branches are ordered and the first
    /// match wins
    pub fn recommendation(opportunity_score: f64, difficulty_score: f64) -> Recommendation {
        if opportunity_score >= 80.0 && difficulty_score <= 30.0 {
            Recommendation::Excellent
        } else if opportunity_score >= 70.0 && difficulty_score <= 50.0 {
            Recommendation::VeryGood
        } else if opportunity_score >= 60.0 && difficulty_score <= 60.0 {
            Recommendation::Good
        } else if opportunity_score >= 50.0 {
            Recommendation::Moderate
        } else if difficulty_score <= 30.0 {
            Recommendation::LowCompetition
        } else {
            Recommendation::Challenging
        }
    }
}

/// Non-negative numeric field; missing or null reads as zero
fn num_field(
    data: &JsonValue,
    signal: &'static str,
    field: &'static str,
) -> Result<f64, ResearchError> {
    match data.get(field) {
        None | Some(JsonValue::Null) => Ok(0.0),
        Some(value) => value
            .as_f64()
            .map(|v| v.max(0.0))
            .ok_or(ResearchError::MalformedSignal {
                signal,
                field: field.to_string(),
            }),
    }
}

/// Non-negative integer field; missing or null reads as zero
fn count_field(
    data: &JsonValue,
    signal: &'static str,
    field: &'static str,
) -> Result<u64, ResearchError> {
    num_field(data, signal, field).map(|v| v as u64)
}

/// Category counts from a loose expansion payload. A category that is
/// missing or not an array contributes zero.
fn expansion_counts_from_json(expansions: &JsonValue) -> ExpansionCounts {
    let len_of = |field: &str| {
        expansions
            .get(field)
            .and_then(JsonValue::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    };

    ExpansionCounts {
        autocomplete: len_of("autocomplete"),
        synonyms: len_of("synonyms"),
        ngrams: len_of("ngrams"),
        related_questions: len_of("related_questions"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPS: f64 = 1e-9;

    fn score(volume: u64, ratio: f64, results: u64, reviews: f64, variants: usize) -> ScoreRecord {
        KeywordScorer::calculate(
            &TrendSignal {
                search_volume: volume,
                trend_ratio: ratio,
            },
            &CompetitionSignal {
                result_count: results,
                avg_reviews: reviews,
            },
            &ExpansionCounts {
                autocomplete: variants,
                ..Default::default()
            },
        )
    }

    #[test]
    fn volume_curve_is_continuous_at_bucket_boundaries() {
        assert!((KeywordScorer::volume_score(100) - 20.0).abs() < EPS);
        assert!((KeywordScorer::volume_score(1000) - 50.0).abs() < EPS);
        assert!((KeywordScorer::volume_score(10000) - 80.0).abs() < EPS);

        // Neighbors stay close to the boundary value
        for (boundary, value) in [(100u64, 20.0), (1000, 50.0), (10000, 80.0)] {
            let below = KeywordScorer::volume_score(boundary - 1);
            let above = KeywordScorer::volume_score(boundary + 1);
            assert!((below - value).abs() < 0.25, "below {boundary}: {below}");
            assert!((above - value).abs() < 0.25, "above {boundary}: {above}");
        }
    }

    #[test]
    fn volume_score_is_monotonic() {
        let samples = [0u64, 1, 50, 99, 100, 101, 500, 999, 1000, 5000, 9999, 10000, 50000, 1_000_000];
        let scores: Vec<f64> = samples.iter().map(|v| KeywordScorer::volume_score(*v)).collect();
        for pair in scores.windows(2) {
            assert!(pair[1] >= pair[0] - EPS, "scores not monotonic: {scores:?}");
        }
    }

    #[test]
    fn volume_score_handles_extremes() {
        assert_eq!(KeywordScorer::volume_score(0), 0.0);
        // log tail caps at 100 no matter how large the volume
        assert_eq!(KeywordScorer::volume_score(u64::MAX), 100.0);
        assert!((KeywordScorer::volume_score(500) - (20.0 + (400.0 / 900.0) * 30.0)).abs() < EPS);
    }

    #[test]
    fn competition_buckets_and_review_modifier() {
        assert_eq!(KeywordScorer::competition_score(50, 0.0), 10.0);
        assert_eq!(KeywordScorer::competition_score(500, 0.0), 25.0);
        assert_eq!(KeywordScorer::competition_score(5000, 0.0), 50.0);
        assert_eq!(KeywordScorer::competition_score(50000, 0.0), 75.0);
        assert_eq!(KeywordScorer::competition_score(500000, 0.0), 90.0);

        // review modifier boundaries are strict
        assert_eq!(KeywordScorer::competition_score(5000, 50.0), 50.0);
        assert_eq!(KeywordScorer::competition_score(5000, 50.5), 55.0);
        assert_eq!(KeywordScorer::competition_score(5000, 100.0), 55.0);
        assert_eq!(KeywordScorer::competition_score(5000, 100.5), 60.0);

        // capped at 100
        assert_eq!(KeywordScorer::competition_score(500000, 1000.0), 100.0);
    }

    #[test]
    fn zero_results_means_zero_competition_regardless_of_reviews() {
        assert_eq!(KeywordScorer::competition_score(0, 5000.0), 0.0);
    }

    #[test]
    fn trend_ratio_rescales_and_clamps() {
        assert!((KeywordScorer::normalize_trend_score(1.5) - 49.995).abs() < EPS);
        assert_eq!(KeywordScorer::normalize_trend_score(0.0), 0.0);
        assert_eq!(KeywordScorer::normalize_trend_score(-1.0), 0.0);
        assert_eq!(KeywordScorer::normalize_trend_score(4.0), 100.0);
    }

    #[test]
    fn expansion_score_caps_at_fifty_variants() {
        let counts = ExpansionCounts {
            autocomplete: 10,
            synonyms: 5,
            ngrams: 20,
            related_questions: 10,
        };
        assert!((KeywordScorer::expansion_score(&counts) - 90.0).abs() < EPS);

        let many = ExpansionCounts {
            autocomplete: 60,
            ..Default::default()
        };
        assert_eq!(KeywordScorer::expansion_score(&many), 100.0);
        assert_eq!(KeywordScorer::expansion_score(&ExpansionCounts::default()), 0.0);
    }

    #[test]
    fn difficulty_double_counts_the_competition_signal() {
        // competition 50 + review modifier 10 = 60, then the same reviews
        // add 8 again and the result count adds 5
        let competition = KeywordScorer::competition_score(5000, 120.0);
        assert_eq!(competition, 60.0);
        assert_eq!(KeywordScorer::difficulty_score(competition, 5000, 120.0), 73.0);

        // caps at 100
        assert_eq!(KeywordScorer::difficulty_score(95.0, 200000, 600.0), 100.0);
    }

    #[test]
    fn worked_example_matches_pinned_values() {
        let record = score(500, 1.5, 5000, 20.0, 45);

        assert_eq!(record.volume_score, 33.33);
        assert_eq!(record.competition_score, 50.0);
        assert_eq!(record.trend_score, 50.0); // 49.995 rounded
        assert_eq!(record.expansion_score, 90.0);
        assert_eq!(record.difficulty_score, 55.0);
        assert_eq!(record.profitability_score, 47.33);
        assert_eq!(record.opportunity_score, 46.63);
        assert_eq!(record.recommendation, Recommendation::Challenging);
    }

    #[test]
    fn all_outputs_stay_in_range() {
        let extremes = [
            score(0, 0.0, 0, 0.0, 0),
            score(u64::MAX, 1000.0, u64::MAX, 1e9, 10000),
            score(1, 3.0, 1, 1.0, 1),
            score(10000, 0.5, 100000, 500.0, 50),
        ];

        for record in extremes {
            for value in [
                record.volume_score,
                record.competition_score,
                record.trend_score,
                record.expansion_score,
                record.difficulty_score,
                record.profitability_score,
                record.opportunity_score,
            ] {
                assert!((0.0..=100.0).contains(&value), "out of range: {record:?}");
            }
        }
    }

    #[test]
    fn recommendation_branches_are_ordered() {
        assert_eq!(
            KeywordScorer::recommendation(85.0, 25.0),
            Recommendation::Excellent
        );
        // fails the first branch on difficulty, lands on the second
        assert_eq!(
            KeywordScorer::recommendation(85.0, 45.0),
            Recommendation::VeryGood
        );
        assert_eq!(
            KeywordScorer::recommendation(65.0, 55.0),
            Recommendation::Good
        );
        assert_eq!(
            KeywordScorer::recommendation(65.0, 65.0),
            Recommendation::Moderate
        );
        assert_eq!(
            KeywordScorer::recommendation(40.0, 20.0),
            Recommendation::LowCompetition
        );
        assert_eq!(
            KeywordScorer::recommendation(40.0, 80.0),
            Recommendation::Challenging
        );
    }

    #[test]
    fn color_thresholds_differ_from_recommendation_thresholds() {
        assert_eq!(ScoreColor::for_scores(75.0, 35.0), ScoreColor::Success);
        assert_eq!(ScoreColor::for_scores(75.0, 45.0), ScoreColor::Warning);
        assert_eq!(ScoreColor::for_scores(55.0, 55.0), ScoreColor::Warning);
        assert_eq!(ScoreColor::for_scores(45.0, 20.0), ScoreColor::Danger);
        assert_eq!(ScoreColor::for_scores(55.0, 65.0), ScoreColor::Danger);
    }

    #[test]
    fn malformed_payload_yields_the_failed_record() {
        let record = KeywordScorer::score_raw(
            "broken keyword",
            &json!({"search_volume": "abc", "trend_score": 1.0}),
            &json!({"result_count": 5000, "avg_reviews": 20}),
            &json!({}),
        );

        assert_eq!(record, ScoreRecord::failed());
        assert_eq!(record.difficulty_score, 100.0);
        assert_eq!(record.recommendation, Recommendation::AnalysisFailed);
    }

    #[test]
    fn missing_fields_default_to_zero_not_failure() {
        let record = KeywordScorer::score_raw("sparse", &json!({}), &json!({}), &json!({}));

        assert_eq!(record.volume_score, 0.0);
        assert_eq!(record.competition_score, 0.0);
        assert_eq!(record.difficulty_score, 0.0);
        // (100 - 0) * 0.3 still contributes
        assert_eq!(record.profitability_score, 30.0);
        assert_eq!(record.opportunity_score, 51.0);
        assert_eq!(record.recommendation, Recommendation::Moderate);
    }

    #[test]
    fn non_array_expansion_categories_count_as_zero() {
        let counts = expansion_counts_from_json(&json!({
            "autocomplete": ["a", "b"],
            "synonyms": "not a list",
            "ngrams": null,
        }));

        assert_eq!(counts.autocomplete, 2);
        assert_eq!(counts.synonyms, 0);
        assert_eq!(counts.ngrams, 0);
        assert_eq!(counts.related_questions, 0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let first = score(720, 1.2, 12000, 85.0, 23);
        let second = score(720, 1.2, 12000, 85.0, 23);
        assert_eq!(first, second);
    }
}
