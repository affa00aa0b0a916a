//! Trending topic routes

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;

use keyword_db::entity::trending_topic::{NewTrendingTopic, TrendingTopic};
use research::trends::daily_trending_topics;

use crate::AppState;

const TRENDING_LIMIT: i64 = 10;

/// Trending topic response item
#[derive(Debug, Serialize)]
pub struct TrendingItem {
    pub topic: String,
    pub source: String,
    pub trend_score: f64,
    pub date_trending: String,
}

impl From<TrendingTopic> for TrendingItem {
    fn from(t: TrendingTopic) -> Self {
        Self {
            topic: t.topic,
            source: t.source.unwrap_or_default(),
            trend_score: t.trend_score.unwrap_or(0.0),
            date_trending: t
                .date_trending
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub topics: Vec<TrendingItem>,
}

/// GET /api/trending
/// Returns today's trending topics, seeding the table from the curated
/// lists the first time a day is requested
pub async fn get_trending(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let today = Utc::now().date_naive();

    let mut topics = match TrendingTopic::find_for_date(today, TRENDING_LIMIT, &state.db_pool).await
    {
        Ok(topics) => topics,
        Err(e) => {
            tracing::error!("Failed to load trending topics: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    if topics.is_empty() {
        for seed in daily_trending_topics().into_iter().take(TRENDING_LIMIT as usize) {
            let topic = NewTrendingTopic {
                topic: seed.topic,
                source: seed.source.to_string(),
                trend_score: seed.score,
                date_trending: today,
            };

            if let Err(e) = TrendingTopic::create(&topic, &state.db_pool).await {
                tracing::error!("Failed to record trending topic: {}", e);
            }
        }

        topics = match TrendingTopic::find_for_date(today, TRENDING_LIMIT, &state.db_pool).await {
            Ok(topics) => topics,
            Err(e) => {
                tracing::error!("Failed to reload trending topics: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
            }
        };
    }

    let topics: Vec<TrendingItem> = topics.into_iter().map(Into::into).collect();
    Json(TrendingResponse { topics }).into_response()
}
