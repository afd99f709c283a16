use std::{path::PathBuf, sync::Arc};

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use log::info;
use playtrack_app::{Application, domain::avatar::MAX_AVATAR_BYTES};
use tower_http::{cors::CorsLayer, services::ServeDir};

pub mod error;
pub mod jwt;

mod extract;
mod games;
mod leaderboard;
mod players;
mod recommendations;
mod search;
mod social;
mod topics;

pub use error::ServiceError;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
}

/// Multipart framing overhead allowed on top of the avatar size limit.
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(app: Arc<Application>, uploads_dir: PathBuf) -> Router {
    let api: Router<AppState> = Router::new()
        .route("/players", post(players::signup).get(players::list_players))
        .route("/players/login", post(players::login))
        .route("/players/{username}", get(players::get_player))
        .route("/players/{username}/profile", get(players::get_profile))
        .route(
            "/players/{username}/upload-avatar",
            post(players::upload_avatar)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + UPLOAD_OVERHEAD_BYTES)),
        )
        .route("/players/{username}/avatar", get(players::get_avatar))
        .route(
            "/players/{username}/change-password",
            post(players::change_password),
        )
        .route("/players/{username}/add-game", post(games::add_game))
        .route("/players/{username}/rate", post(games::rate_game))
        .route("/players/{username}/favorite", post(games::favorite_game))
        .route("/games", post(games::create_game).get(games::list_games))
        .route("/players/{username}/follow", post(social::follow))
        .route("/players/{username}/unfollow", post(social::unfollow))
        .route(
            "/players/{username}/is-following/{target}",
            get(social::is_following),
        )
        .route("/players/{username}/block", post(social::block))
        .route("/social-graph/depth", post(social::social_distance))
        .route(
            "/players/{username}/recommendations/friends",
            get(recommendations::friends),
        )
        .route(
            "/players/{username}/recommendations/extended",
            get(recommendations::extended),
        )
        .route(
            "/players/{username}/recommendations/similar",
            get(recommendations::similar),
        )
        .route(
            "/topics/recommended/{username}",
            get(recommendations::topics),
        )
        .route("/users/search", get(search::search_users))
        .route("/topics", get(topics::list_topics).post(topics::create_topic))
        .route("/topics/search", get(search::search_topics))
        .route(
            "/topics/{id}",
            get(topics::get_topic)
                .put(topics::update_topic)
                .delete(topics::delete_topic),
        )
        .route(
            "/topics/{id}/comments",
            get(topics::list_comments).post(topics::create_comment),
        )
        .route("/leaderboard/global", get(leaderboard::global))
        .route("/leaderboard/game", post(leaderboard::record_game_score))
        .route("/leaderboard/game/{title}", get(leaderboard::game))
        .route("/stats/player", post(leaderboard::record_player_stats))
        .route("/stats/player/{username}", get(leaderboard::player_stats))
        .route("/stats/activity", post(leaderboard::record_activity))
        .route("/stats/leaderboard-summary", get(leaderboard::summary))
        .route("/analytics/sync-all", post(leaderboard::sync_all));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(CorsLayer::permissive())
        .with_state(AppState { app })
}

pub async fn run(
    app: Arc<Application>,
    uploads_dir: PathBuf,
    host: String,
    port: u16,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    info!("API server listening on port {}", port);
    axum::serve(listener, router(app, uploads_dir))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP API shut down gracefully");
    Ok(())
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
    })
}

#[derive(serde::Serialize)]
pub(crate) struct MessageResponse {
    message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Query parameters shared by the paged topic listings.
#[derive(serde::Deserialize)]
pub(crate) struct PageQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

pub(crate) const DEFAULT_PAGE_SIZE: usize = 10;

impl PageQuery {
    pub(crate) fn page(&self) -> usize {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub(crate) fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.limit())
    }
}
