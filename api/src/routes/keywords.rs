//! Keyword search route

use std::{env, sync::Arc};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres};

use keyword_db::entity::search_session::SearchSession;
use research::analysis::{batch_score_keywords, KeywordAnalysis};

use crate::AppState;

/// Name of the single rolling autosave session
pub const AUTOSAVE_SESSION_NAME: &str = "Auto-saved Session";

mod defaults {
    pub const KEYWORD_BATCH_LIMIT: &str = "50";
}

/// Request body for the search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub keywords: String,
    #[serde(default)]
    pub bulk_mode: bool,
}

/// Search response: scored keywords ordered best-first
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<KeywordAnalysis>,
    pub total_keywords: usize,
}

/// Split raw input into trimmed keywords: one per line in bulk mode,
/// comma-separated otherwise
pub fn parse_keywords(input: &str, bulk_mode: bool) -> Vec<String> {
    let separator = if bulk_mode { '\n' } else { ',' };

    input
        .split(separator)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

fn batch_limit() -> usize {
    env::var("KEYWORD_BATCH_LIMIT")
        .unwrap_or_else(|_| defaults::KEYWORD_BATCH_LIMIT.to_string())
        .parse::<usize>()
        .unwrap_or(50)
}

/// POST /api/keywords/search
/// Expands, analyzes, and scores each submitted keyword, then rewrites the
/// autosave session with the ordered results
pub async fn search_keywords(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    let keywords = parse_keywords(&request.keywords, request.bulk_mode);

    if keywords.is_empty() {
        return (StatusCode::BAD_REQUEST, "No keywords provided").into_response();
    }

    let mut results = Vec::new();
    for keyword in keywords.iter().take(batch_limit()) {
        results.push(state.clients.analyze_keyword(keyword).await);
    }

    let results = batch_score_keywords(results);

    let payload = match serde_json::to_value(&results) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to serialize search results: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error").into_response();
        }
    };

    if let Err(e) = upsert_autosave(&state.db_pool, &payload).await {
        tracing::error!("Failed to autosave session: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
    }

    let total_keywords = results.len();
    Json(SearchResponse {
        success: true,
        results,
        total_keywords,
    })
    .into_response()
}

/// Rewrite the rolling autosave session, creating it on first use
async fn upsert_autosave(pool: &Pool<Postgres>, payload: &JsonValue) -> Result<(), sqlx::Error> {
    match SearchSession::find_autosave(pool).await? {
        Some(session) => {
            SearchSession::update_keywords(session.id, payload, pool).await?;
        }
        None => {
            SearchSession::create(AUTOSAVE_SESSION_NAME, true, payload, pool).await?;
        }
    }

    Ok(())
}
