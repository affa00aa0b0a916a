//! Marketplace competition signals
//!
//! Scrapes a bookstore search page for one keyword and reduces it to the
//! numbers the scorer cares about: how many listings compete, and how
//! established they are (prices, ratings, review counts). Page structure is
//! scanned with plain text markers; anything that cannot be read contributes
//! nothing rather than failing the keyword.

use std::{env, time::Duration};

use serde::{Serialize, Serializer};

use crate::error::ResearchError;

mod defaults {
    pub const MARKETPLACE_BASE_URL: &str = "https://www.amazon.com";
    pub const HTTP_TIMEOUT_SECS: &str = "15";
}

/// Result containers on the search page start with this attribute
const LISTING_MARKER: &str = "data-component-type=\"s-search-result\"";

/// How far to look back from a "results" marker for the result count
const RESULT_COUNT_WINDOW: usize = 60;

const MAX_LISTINGS: usize = 10;

/// Competition tier derived from the raw result count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
    VeryHigh,
    Unknown,
}

impl CompetitionLevel {
    pub fn from_result_count(result_count: u64) -> CompetitionLevel {
        if result_count > 50000 {
            CompetitionLevel::VeryHigh
        } else if result_count > 10000 {
            CompetitionLevel::High
        } else if result_count > 1000 {
            CompetitionLevel::Medium
        } else {
            CompetitionLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionLevel::Low => "Low",
            CompetitionLevel::Medium => "Medium",
            CompetitionLevel::High => "High",
            CompetitionLevel::VeryHigh => "Very High",
            CompetitionLevel::Unknown => "Unknown",
        }
    }
}

impl Serialize for CompetitionLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Competition report for one keyword
#[derive(Debug, Clone, Serialize)]
pub struct CompetitionReport {
    pub keyword: String,
    pub result_count: u64,
    pub avg_price: f64,
    pub avg_reviews: f64,
    pub avg_rating: f64,
    pub category: String,
    pub competition_level: CompetitionLevel,
    pub listings_analyzed: usize,
}

impl CompetitionReport {
    /// Zeroed report for a keyword whose search page could not be fetched
    pub fn unavailable(keyword: &str) -> CompetitionReport {
        CompetitionReport {
            keyword: keyword.to_string(),
            result_count: 0,
            avg_price: 0.0,
            avg_reviews: 0.0,
            avg_rating: 0.0,
            category: "Unknown".to_string(),
            competition_level: CompetitionLevel::Unknown,
            listings_analyzed: 0,
        }
    }
}

/// Price / rating / review-count samples read from one listing
#[derive(Debug, Clone, Copy, Default)]
struct ListingSample {
    price: Option<f64>,
    rating: Option<f64>,
    review_count: Option<u64>,
}

/// Client for the marketplace search page
pub struct MarketplaceClient {
    http: reqwest::Client,
    base_url: String,
}

impl MarketplaceClient {
    pub fn from_env() -> Result<Self, ResearchError> {
        let timeout = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::HTTP_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(15);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            http,
            base_url: env::var("MARKETPLACE_BASE_URL")
                .unwrap_or_else(|_| defaults::MARKETPLACE_BASE_URL.to_string()),
        })
    }

    /// Competition report for a keyword; a failed fetch degrades to the
    /// zeroed report instead of an error
    pub async fn keyword_competition(&self, keyword: &str) -> CompetitionReport {
        match self.fetch_search_page(keyword).await {
            Ok(page) => {
                let listings = extract_listings(&page);
                let result_count = match extract_result_count(&page) {
                    0 => (listings.len() as u64) * 20, // estimate from visible listings
                    count => count,
                };

                competition_report(keyword, result_count, &listings)
            }
            Err(err) => {
                tracing::warn!("Marketplace fetch failed for '{}': {}", keyword, err);
                CompetitionReport::unavailable(keyword)
            }
        }
    }

    async fn fetch_search_page(&self, keyword: &str) -> Result<String, ResearchError> {
        let url = format!("{}/s", self.base_url);

        let page = self
            .http
            .get(&url)
            .query(&[("k", keyword), ("i", "stripbooks")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(page)
    }
}

/// Largest comma-grouped integer found near any "results" marker, e.g.
/// "1-16 of over 40,000 results" reads as 40000
pub fn extract_result_count(page: &str) -> u64 {
    let text = page.to_lowercase();
    let mut max_count = 0u64;
    let mut search_from = 0;

    while let Some(pos) = text[search_from..].find("results") {
        let idx = search_from + pos;
        let window = &text.as_bytes()[idx.saturating_sub(RESULT_COUNT_WINDOW)..idx];

        if let Some(count) = largest_number_in(window) {
            max_count = max_count.max(count);
        }

        search_from = idx + "results".len();
    }

    max_count
}

/// Largest integer in a byte window; commas inside digit runs are grouping
fn largest_number_in(window: &[u8]) -> Option<u64> {
    let mut best: Option<u64> = None;
    let mut digits = String::new();

    for &byte in window.iter().chain(std::iter::once(&b' ')) {
        if byte.is_ascii_digit() {
            digits.push(byte as char);
        } else if byte == b',' && !digits.is_empty() {
            // grouping separator, keep accumulating
        } else if !digits.is_empty() {
            if let Ok(value) = digits.parse::<u64>() {
                best = Some(best.map_or(value, |b| b.max(value)));
            }
            digits.clear();
        }
    }

    best
}

fn extract_listings(page: &str) -> Vec<ListingSample> {
    page.split(LISTING_MARKER)
        .skip(1)
        .take(MAX_LISTINGS)
        .map(listing_sample)
        .collect()
}

fn listing_sample(chunk: &str) -> ListingSample {
    ListingSample {
        price: extract_price(chunk),
        rating: extract_rating(chunk),
        review_count: extract_review_count(chunk),
    }
}

/// First "$12.99"-style price in the chunk
fn extract_price(chunk: &str) -> Option<f64> {
    let idx = chunk.find('$')?;
    let rest = &chunk[idx + 1..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    let token = rest[..end].trim_end_matches('.');

    if token.is_empty() {
        None
    } else {
        token.parse().ok()
    }
}

/// Star rating from a "4.5 out of 5" fragment
fn extract_rating(chunk: &str) -> Option<f64> {
    let idx = chunk.find(" out of 5")?;
    let bytes = chunk.as_bytes();
    let mut start = idx;

    while start > 0 && (bytes[start - 1].is_ascii_digit() || bytes[start - 1] == b'.') {
        start -= 1;
    }

    if start == idx {
        None
    } else {
        chunk[start..idx].parse().ok()
    }
}

/// Review count from a "1,234 ratings" fragment
fn extract_review_count(chunk: &str) -> Option<u64> {
    let text = chunk.to_lowercase();
    let idx = text.find("ratings").or_else(|| text.find("reviews"))?;
    largest_number_in(&text.as_bytes()[idx.saturating_sub(20)..idx])
}

fn competition_report(
    keyword: &str,
    result_count: u64,
    listings: &[ListingSample],
) -> CompetitionReport {
    let prices: Vec<f64> = listings.iter().filter_map(|l| l.price).collect();
    let ratings: Vec<f64> = listings.iter().filter_map(|l| l.rating).collect();
    let reviews: Vec<u64> = listings.iter().filter_map(|l| l.review_count).collect();

    let avg = |values: &[f64]| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };

    let avg_reviews = if reviews.is_empty() {
        0.0
    } else {
        (reviews.iter().sum::<u64>() as f64 / reviews.len() as f64).floor()
    };

    CompetitionReport {
        keyword: keyword.to_string(),
        result_count,
        avg_price: (avg(&prices) * 100.0).round() / 100.0,
        avg_reviews,
        avg_rating: (avg(&ratings) * 10.0).round() / 10.0,
        category: "Books".to_string(),
        competition_level: CompetitionLevel::from_result_count(result_count),
        listings_analyzed: listings.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_count_takes_largest_number_near_the_marker() {
        let page = r#"<span>1-16 of over 40,000 results for "keto diet"</span>"#;
        assert_eq!(extract_result_count(page), 40000);
    }

    #[test]
    fn result_count_scans_every_marker() {
        let page = "7 results here ... and 1-48 of 2,315 results there";
        assert_eq!(extract_result_count(page), 2315);
    }

    #[test]
    fn result_count_is_zero_when_nothing_matches() {
        assert_eq!(extract_result_count("<html>no matches</html>"), 0);
        assert_eq!(extract_result_count("results with no number nearby"), 0);
    }

    #[test]
    fn price_rating_and_reviews_are_read_from_a_listing_chunk() {
        let chunk = r#"<span>4.5 out of 5 stars</span><span>2,318 ratings</span><span>$14.99</span>"#;

        assert_eq!(extract_price(chunk), Some(14.99));
        assert_eq!(extract_rating(chunk), Some(4.5));
        assert_eq!(extract_review_count(chunk), Some(2318));
    }

    #[test]
    fn unreadable_fragments_yield_none() {
        assert_eq!(extract_price("no price here"), None);
        assert_eq!(extract_rating("out of 5 with no number"), None);
        assert_eq!(extract_review_count("nothing countable"), None);
    }

    #[test]
    fn listings_are_split_on_the_result_marker() {
        let page = format!(
            "<header/>{m}<div>$9.99</div>{m}<div>$19.99 4.0 out of 5</div>",
            m = LISTING_MARKER
        );

        let listings = extract_listings(&page);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, Some(9.99));
        assert_eq!(listings[1].rating, Some(4.0));
    }

    #[test]
    fn report_averages_only_present_samples() {
        let listings = [
            ListingSample {
                price: Some(10.0),
                rating: Some(4.0),
                review_count: Some(100),
            },
            ListingSample {
                price: Some(20.0),
                rating: None,
                review_count: Some(301),
            },
            ListingSample::default(),
        ];

        let report = competition_report("test", 5000, &listings);
        assert_eq!(report.avg_price, 15.0);
        assert_eq!(report.avg_rating, 4.0);
        assert_eq!(report.avg_reviews, 200.0); // floor(200.5)
        assert_eq!(report.listings_analyzed, 3);
        assert_eq!(report.competition_level, CompetitionLevel::Medium);
    }

    #[test]
    fn competition_levels_follow_result_count_tiers() {
        assert_eq!(CompetitionLevel::from_result_count(500), CompetitionLevel::Low);
        assert_eq!(CompetitionLevel::from_result_count(5000), CompetitionLevel::Medium);
        assert_eq!(CompetitionLevel::from_result_count(20000), CompetitionLevel::High);
        assert_eq!(CompetitionLevel::from_result_count(80000), CompetitionLevel::VeryHigh);
    }

    #[test]
    fn unavailable_report_is_zeroed_and_unknown() {
        let report = CompetitionReport::unavailable("ghost keyword");
        assert_eq!(report.result_count, 0);
        assert_eq!(report.competition_level, CompetitionLevel::Unknown);
        assert_eq!(report.listings_analyzed, 0);
    }
}
