//! Leaderboard HTTP service
//!
//! `GET`, `POST` and (opt-in) `DELETE` on `/leaderboard`, backed by any
//! `LeaderboardStore`. Store access is serialized through one async mutex so
//! read-modify-write cycles never interleave.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::consts::LEADERBOARD_ENDPOINT;
use crate::leaderboard::{FileStore, Leaderboard, LeaderboardError, LeaderboardStore, ScoreSubmission};

pub fn http_port() -> u16 {
    env::var("LEADERBOARD_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

pub fn store_path() -> PathBuf {
    env::var("LEADERBOARD_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("leaderboard.json"))
}

/// `DELETE` is a debug affordance and stays unrouted unless asked for
pub fn delete_enabled() -> bool {
    matches!(
        env::var("LEADERBOARD_ENABLE_DELETE").as_deref(),
        Ok("1") | Ok("true")
    )
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Box<dyn LeaderboardStore>>>,
}

impl AppState {
    pub fn new(store: impl LeaderboardStore + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub leaderboard: Leaderboard,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(err: LeaderboardError) -> ApiError {
    match err {
        LeaderboardError::Storage(e) => {
            log::error!("Leaderboard write failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Server Error".into(),
                }),
            )
        }
        other => {
            log::debug!("Rejected submission: {other}");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: other.to_string(),
                }),
            )
        }
    }
}

pub async fn get_leaderboard(State(state): State<AppState>) -> Json<Leaderboard> {
    let store = state.store.lock().await;
    Json(store.load())
}

pub async fn post_leaderboard(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let submission = ScoreSubmission::from_json(&body).map_err(api_error)?;

    let mut store = state.store.lock().await;
    let mut board = store.load();
    if board.submit(&submission, Utc::now()) {
        log::info!(
            "{} scored {} (rank {:?})",
            submission.username(),
            submission.score(),
            board.rank_of(submission.username())
        );
    }
    store.save(&board).map_err(api_error)?;

    Ok(Json(SubmitResponse {
        success: true,
        leaderboard: board,
    }))
}

pub async fn delete_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, ApiError> {
    let mut store = state.store.lock().await;
    store.save(&Leaderboard::new()).map_err(api_error)?;
    log::warn!("Leaderboard cleared");
    Ok(Json(ClearResponse { success: true }))
}

pub fn app(state: AppState, enable_delete: bool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut route = get(get_leaderboard).post(post_leaderboard);
    if enable_delete {
        route = route.delete(delete_leaderboard);
    }

    Router::new()
        .route(LEADERBOARD_ENDPOINT, route)
        .layer(cors)
        .with_state(state)
}

/// Serve until the process is stopped
pub async fn run() -> std::io::Result<()> {
    let store = FileStore::new(store_path());
    let enable_delete = delete_enabled();
    log::info!("Leaderboard file: {}", store.path().display());
    if enable_delete {
        log::warn!("DELETE {LEADERBOARD_ENDPOINT} is enabled");
    }

    let app = app(AppState::new(store), enable_delete);
    let addr = SocketAddr::from(([0, 0, 0, 0], http_port()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on {addr}");
    axum::serve(listener, app).await
}
