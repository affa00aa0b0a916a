//! Export builders
//!
//! Turns session keyword payloads and favorites into downloadable CSV
//! bodies. Session entries are loose JSON (their shape follows the analysis
//! result), so fields are read defensively with empty-string defaults.

use std::io;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::Value as JsonValue;

use keyword_db::entity::favorite::Favorite;

const KEYWORD_CSV_HEADER: [&str; 13] = [
    "keyword",
    "search_volume",
    "trend_score",
    "marketplace_results",
    "competition_score",
    "difficulty_score",
    "profitability_score",
    "opportunity_score",
    "category",
    "avg_price",
    "avg_reviews",
    "recommendation",
    "exported_at",
];

const FAVORITES_CSV_HEADER: [&str; 7] = [
    "keyword",
    "search_volume",
    "competition_score",
    "difficulty_score",
    "marketplace_results",
    "created_at",
    "notes",
];

/// CSV body for a session's keyword entries
pub fn keywords_csv(entries: &[JsonValue]) -> Result<String, csv::Error> {
    let exported_at = Utc::now().to_rfc3339();
    let mut buffer = Vec::new();

    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(KEYWORD_CSV_HEADER)?;

        for entry in entries {
            writer.write_record(&[
                field(entry, "keyword"),
                field(entry, "search_volume"),
                field(entry, "trend_score"),
                field(entry, "marketplace_results"),
                score_field(entry, "competition_score"),
                score_field(entry, "difficulty_score"),
                score_field(entry, "profitability_score"),
                score_field(entry, "opportunity_score"),
                field(entry, "category"),
                field(entry, "avg_price"),
                field(entry, "avg_reviews"),
                score_field(entry, "recommendation"),
                exported_at.clone(),
            ])?;
        }

        writer.flush()?;
    }

    into_utf8(buffer)
}

/// CSV body for the favorites list
pub fn favorites_csv(favorites: &[Favorite]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();

    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(FAVORITES_CSV_HEADER)?;

        for favorite in favorites {
            writer.write_record(&[
                favorite.keyword.clone(),
                favorite.search_volume.unwrap_or(0).to_string(),
                favorite.competition_score.unwrap_or(0.0).to_string(),
                favorite.difficulty_score.unwrap_or(0.0).to_string(),
                favorite.marketplace_results.unwrap_or(0).to_string(),
                favorite
                    .created_at
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_default(),
                favorite.notes.clone().unwrap_or_default(),
            ])?;
        }

        writer.flush()?;
    }

    into_utf8(buffer)
}

/// CSV download response with a timestamped attachment filename
pub fn csv_attachment(basename: &str, body: String) -> Response {
    let filename = format!("{}_{}.csv", basename, Utc::now().format("%Y%m%d_%H%M%S"));

    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// JSON download response with a timestamped attachment filename
pub fn json_attachment(basename: &str, body: String) -> Response {
    let filename = format!("{}_{}.json", basename, Utc::now().format("%Y%m%d_%H%M%S"));

    (
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Top-level field rendered as CSV text; missing fields render empty
fn field(entry: &JsonValue, key: &str) -> String {
    entry.get(key).map(render_scalar).unwrap_or_default()
}

/// Field nested under the entry's `scores` object
fn score_field(entry: &JsonValue, key: &str) -> String {
    entry
        .get("scores")
        .and_then(|scores| scores.get(key))
        .map(render_scalar)
        .unwrap_or_default()
}

fn render_scalar(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn into_utf8(buffer: Vec<u8>) -> Result<String, csv::Error> {
    String::from_utf8(buffer)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keywords_csv_flattens_nested_scores() {
        let entries = [json!({
            "keyword": "keto diet",
            "search_volume": 800,
            "trend_score": 1.4,
            "marketplace_results": 5000,
            "category": "Books",
            "avg_price": 12.99,
            "avg_reviews": 85.0,
            "scores": {
                "competition_score": 55.0,
                "difficulty_score": 58.0,
                "profitability_score": 47.33,
                "opportunity_score": 46.63,
                "recommendation": "Challenging - High competition or low opportunity"
            }
        })];

        let body = keywords_csv(&entries).expect("csv should build");
        let mut lines = body.lines();

        assert_eq!(lines.next().unwrap(), KEYWORD_CSV_HEADER.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("keto diet,800,1.4,5000,55.0,58.0,47.33,46.63,Books"));
        assert!(row.contains("Challenging - High competition or low opportunity"));
    }

    #[test]
    fn keywords_csv_tolerates_sparse_entries() {
        let entries = [json!({"keyword": "only a keyword"})];

        let body = keywords_csv(&entries).expect("csv should build");
        let row = body.lines().nth(1).unwrap();
        assert!(row.starts_with("only a keyword,,,"));
    }

    #[test]
    fn empty_session_exports_header_only() {
        let body = keywords_csv(&[]).expect("csv should build");
        assert_eq!(body.lines().count(), 1);
    }

    #[test]
    fn favorites_csv_writes_one_row_per_favorite() {
        let favorites = [Favorite {
            id: 1,
            keyword: "sourdough bread".to_string(),
            search_volume: Some(900),
            competition_score: Some(45.0),
            difficulty_score: Some(50.0),
            marketplace_results: Some(3200),
            created_at: None,
            notes: Some("strong niche".to_string()),
        }];

        let body = favorites_csv(&favorites).expect("csv should build");
        let row = body.lines().nth(1).unwrap();
        assert_eq!(row, "sourdough bread,900,45,50,3200,,strong niche");
    }
}
