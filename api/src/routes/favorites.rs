//! Favorite API routes

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use keyword_db::entity::favorite::{Favorite, NewFavorite};

use crate::export;
use crate::AppState;

/// Favorite response item
#[derive(Debug, Serialize)]
pub struct FavoriteItem {
    pub id: i32,
    pub keyword: String,
    pub search_volume: i64,
    pub competition_score: f64,
    pub difficulty_score: f64,
    pub marketplace_results: i64,
    pub created_at: String,
    pub notes: String,
}

impl From<Favorite> for FavoriteItem {
    fn from(f: Favorite) -> Self {
        Self {
            id: f.id,
            keyword: f.keyword,
            search_volume: f.search_volume.unwrap_or(0),
            competition_score: f.competition_score.unwrap_or(0.0),
            difficulty_score: f.difficulty_score.unwrap_or(0.0),
            marketplace_results: f.marketplace_results.unwrap_or(0),
            created_at: f.created_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
            notes: f.notes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteItem>,
}

/// Request body for adding a favorite
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub keyword: String,
    #[serde(default)]
    pub search_volume: i64,
    #[serde(default)]
    pub competition_score: f64,
    #[serde(default)]
    pub difficulty_score: f64,
    #[serde(default)]
    pub marketplace_results: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for removing a favorite
#[derive(Debug, Deserialize)]
pub struct RemoveFavoriteRequest {
    pub keyword: String,
}

/// GET /api/favorites
/// Returns all favorites, newest first
pub async fn get_favorites(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match Favorite::find_all(&state.db_pool).await {
        Ok(favorites) => {
            let favorites: Vec<FavoriteItem> = favorites.into_iter().map(Into::into).collect();
            Json(FavoritesResponse { favorites }).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list favorites: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// POST /api/favorites
/// Adds a keyword to favorites; duplicates are rejected
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddFavoriteRequest>,
) -> impl IntoResponse {
    let keyword = request.keyword.trim();
    if keyword.is_empty() {
        return (StatusCode::BAD_REQUEST, "Keyword is required").into_response();
    }

    match Favorite::find_by_keyword(keyword, &state.db_pool).await {
        Ok(Some(_)) => {
            return (StatusCode::BAD_REQUEST, "Keyword already in favorites").into_response()
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to check favorite '{}': {}", keyword, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    }

    let favorite = NewFavorite {
        keyword: keyword.to_string(),
        search_volume: request.search_volume,
        competition_score: request.competition_score,
        difficulty_score: request.difficulty_score,
        marketplace_results: request.marketplace_results,
        notes: request.notes,
    };

    match Favorite::create(&favorite, &state.db_pool).await {
        Ok(_) => Json(serde_json::json!({
            "success": true,
            "message": "Added to favorites"
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to add favorite '{}': {}", keyword, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// DELETE /api/favorites
/// Removes a keyword from favorites
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RemoveFavoriteRequest>,
) -> impl IntoResponse {
    let keyword = request.keyword.trim();

    match Favorite::delete_by_keyword(keyword, &state.db_pool).await {
        Ok(0) => (StatusCode::NOT_FOUND, "Keyword not found in favorites").into_response(),
        Ok(_) => Json(serde_json::json!({
            "success": true,
            "message": "Removed from favorites"
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to remove favorite '{}': {}", keyword, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// GET /api/favorites/export
/// Downloads all favorites as a CSV attachment
pub async fn export_favorites(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let favorites = match Favorite::find_all(&state.db_pool).await {
        Ok(favorites) => favorites,
        Err(e) => {
            tracing::error!("Failed to list favorites for export: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    match export::favorites_csv(&favorites) {
        Ok(body) => export::csv_attachment("keyword_favorites", body),
        Err(e) => {
            tracing::error!("Failed to build favorites CSV: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Export error").into_response()
        }
    }
}
