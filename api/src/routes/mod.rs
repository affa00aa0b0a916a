//! API route definitions

pub mod export;
pub mod favorites;
pub mod keywords;
pub mod sessions;
pub mod trending;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Keyword routes
        .route("/keywords/search", post(keywords::search_keywords))
        .route("/trending", get(trending::get_trending))
        // Session routes
        .route(
            "/sessions",
            get(sessions::get_sessions).post(sessions::save_session),
        )
        .route("/sessions/backup", get(sessions::backup_sessions))
        .route(
            "/sessions/:id",
            get(sessions::load_session).delete(sessions::delete_session),
        )
        // Favorite routes
        .route(
            "/favorites",
            get(favorites::get_favorites)
                .post(favorites::add_favorite)
                .delete(favorites::remove_favorite),
        )
        .route("/favorites/export", get(favorites::export_favorites))
        // Export routes
        .route("/export/:format", get(export::export_session))
}
