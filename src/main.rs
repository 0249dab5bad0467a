//! Creative Vault Backend
//!
//! A personal document vault: SQLite persistence, session auth, a tag and
//! text filtered feed, and Tantivy full-text search.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod feed;
mod filter;
mod models;
mod search;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use search::SearchIndex;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    init_tracing(&config);

    tracing::info!("Starting Creative Vault Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Index path: {:?}", config.index_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if !config.allow_signup {
        tracing::warn!("Sign-up is disabled (VAULT_ALLOW_SIGNUP=false)");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let purged = repo.purge_expired_sessions().await?;
    if purged > 0 {
        tracing::info!("Purged {} expired sessions", purged);
    }

    // Initialize search index
    let search = Arc::new(SearchIndex::open(&config.index_path)?);

    // Build initial search index from database
    tracing::info!("Building search index...");
    let documents = repo.list_all_documents().await?;
    search.rebuild(&documents).await?;
    tracing::info!("Search index built with {} documents", documents.len());

    let bind_addr = config.bind_addr;
    let state = AppState {
        repo,
        search,
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let (json, text) = match config.log_format {
        LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
        LogFormat::Text => (None, Some(tracing_subscriber::fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(text)
        .init();
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes that need a live session
    let protected_routes = Router::new()
        // Session
        .route("/auth/sign-out", post(api::sign_out))
        .route("/auth/session", get(api::current_session))
        // Feed
        .route("/feed", get(api::get_feed))
        .route("/tags", get(api::list_tags))
        // Documents
        .route(
            "/documents",
            get(api::list_documents).post(api::create_document),
        )
        .route(
            "/documents/{id}",
            get(api::get_document)
                .put(api::update_document)
                .delete(api::delete_document),
        )
        // Search
        .route("/search", get(api::search_documents))
        // Profile
        .route(
            "/profile",
            get(api::get_profile).put(api::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_layer,
        ));

    let public_routes = Router::new()
        .route("/landing", get(api::get_landing))
        .route("/auth/sign-up", post(api::sign_up))
        .route("/auth/sign-in", post(api::sign_in));

    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
