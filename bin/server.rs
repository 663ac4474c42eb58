// Gain Ranking - Web Server
// REST API with Axum: each /api/ranking request runs one refresh cycle

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use gain_ranking::{
    FileFeed, FilterSummary, Leaderboard, RankingConfig, RankingEngine, RankingError,
    SnapshotSlot, SqliteStore,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

type Engine = RankingEngine<SnapshotSlot<SqliteStore>>;

/// Shared application state
///
/// The mutex serializes refresh cycles, so two requests never interleave
/// load/save on the snapshot slot.
#[derive(Clone)]
struct AppState {
    engine: Arc<Mutex<Engine>>,
    feed_path: PathBuf,
    top_n: usize,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn err(data: T, message: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(message),
        }
    }
}

/// Ranking response
#[derive(Serialize)]
struct RankingResponse {
    refreshed_at: String,
    no_data: bool,
    persisted: bool,
    rows: Leaderboard,
    feed: FilterSummary,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/ranking - Refresh from the feed and return the leaderboard
async fn get_ranking(State(state): State<AppState>) -> impl IntoResponse {
    let mut engine = match state.engine.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    match engine.refresh_from(&FileFeed::new(&state.feed_path)) {
        Ok(outcome) => {
            let response = RankingResponse {
                refreshed_at: outcome.refreshed_at.to_rfc3339(),
                no_data: outcome.is_empty(),
                persisted: outcome.persisted,
                rows: Leaderboard::build(&outcome.current, &outcome.movements, state.top_n),
                feed: outcome.report.summary(),
            };
            (StatusCode::OK, Json(ApiResponse::ok(Some(response)))).into_response()
        }
        Err(e @ RankingError::FeedUnavailable(_)) => {
            error!("Feed unavailable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<Option<RankingResponse>>::err(None, e.to_string())),
            )
                .into_response()
        }
        Err(e) => {
            error!("Error refreshing ranking: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Option<RankingResponse>>::err(None, e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/snapshot - Stored snapshot, no refresh
async fn get_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    let engine = match state.engine.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    let stored = engine.stored_snapshot();
    Json(ApiResponse::ok(Leaderboard::without_movement(&stored, state.top_n)))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting ranking-server v{}", gain_ranking::VERSION);

    let config = match std::env::var("RANKING_CONFIG") {
        Ok(path) => RankingConfig::from_file(&path)?,
        Err(_) => RankingConfig::default(),
    };

    let feed_path = config
        .feed_path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("feed_path must be set in config for the server"))?;

    let store = SqliteStore::open(&config.database_path)?;
    info!("✓ Database opened: {}", config.database_path.display());

    let engine = RankingEngine::new(
        config.columns.clone(),
        SnapshotSlot::new(store, &config.storage_key),
    );

    // Create shared state
    let state = AppState {
        engine: Arc::new(Mutex::new(engine)),
        feed_path,
        top_n: config.top_n,
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ranking", get(get_ranking))
        .route("/snapshot", get(get_snapshot))
        .with_state(state);

    let app = Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = std::env::var("RANKING_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🚀 Server running on http://{}", addr);
    info!("   API: http://{}/api/ranking", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
