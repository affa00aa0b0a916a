//! KeywordScout API Server
//!
//! REST API for keyword research: search, sessions, favorites, trending
//! topics, and exports.

use std::{env, net::SocketAddr, sync::Arc};

use axum::{routing::get, Router};
use sqlx::{Pool, Postgres};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use research::ResearchClients;

mod export;
mod routes;

/// Application state shared across handlers
pub struct AppState {
    pub db_pool: Pool<Postgres>,
    pub clients: ResearchClients,
}

mod defaults {
    pub const API_PORT: &str = "8080";
    pub const API_HOST: &str = "0.0.0.0";
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting KeywordScout API Server...");

    // Initialize database connection
    let db_pool = keyword_db::initialize_database().await?;
    tracing::info!("Connected to database");

    // Signal clients for the research pipeline
    let clients = ResearchClients::from_env()?;

    // Create app state
    let state = Arc::new(AppState { db_pool, clients });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Root endpoint with API info
        .route("/", get(root))
        // Health check
        .route("/health", get(health_check))
        // API routes
        .nest("/api", routes::api_routes())
        // State and middleware
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    // Get port from environment
    let port = env::var("API_PORT")
        .unwrap_or_else(|_| defaults::API_PORT.to_string())
        .parse::<u16>()
        .unwrap_or(8080);

    let host = env::var("API_HOST").unwrap_or_else(|_| defaults::API_HOST.to_string());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Root endpoint - API information
async fn root() -> axum::response::Html<&'static str> {
    axum::response::Html(r#"
<!DOCTYPE html>
<html>
<head>
    <title>KeywordScout API</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; background: #1a1a2e; color: #eee; }
        h1 { color: #f5a623; }
        a { color: #4fc3f7; }
        code { background: #333; padding: 2px 6px; border-radius: 4px; }
        .endpoint { margin: 10px 0; padding: 10px; background: #252540; border-radius: 8px; }
        .method { color: #4caf50; font-weight: bold; }
    </style>
</head>
<body>
    <h1>KeywordScout API</h1>
    <p>Keyword research engine for self-publishers</p>

    <h2>Endpoints</h2>

    <div class="endpoint">
        <span class="method">GET</span> <a href="/health">/health</a> - Health check
    </div>

    <h3>Keywords</h3>
    <div class="endpoint">
        <span class="method">POST</span> <code>/api/keywords/search</code> - Expand, analyze, and score keywords
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/trending">/api/trending</a> - Today's trending topics
    </div>

    <h3>Sessions</h3>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/sessions">/api/sessions</a> - List saved sessions
    </div>
    <div class="endpoint">
        <span class="method">POST</span> <code>/api/sessions</code> - Save a named session
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <code>/api/sessions/:id</code> - Load a session (0 = autosave)
    </div>
    <div class="endpoint">
        <span class="method">DELETE</span> <code>/api/sessions/:id</code> - Delete a session
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/sessions/backup">/api/sessions/backup</a> - Download all sessions as JSON
    </div>

    <h3>Favorites</h3>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/favorites">/api/favorites</a> - List favorites
    </div>
    <div class="endpoint">
        <span class="method">POST</span> <code>/api/favorites</code> - Add a favorite
    </div>
    <div class="endpoint">
        <span class="method">DELETE</span> <code>/api/favorites</code> - Remove a favorite
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/favorites/export">/api/favorites/export</a> - Download favorites as CSV
    </div>

    <h3>Export</h3>
    <div class="endpoint">
        <span class="method">GET</span> <code>/api/export/:format?session_id=</code> - Export a session (csv, json)
    </div>
</body>
</html>
    "#)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
