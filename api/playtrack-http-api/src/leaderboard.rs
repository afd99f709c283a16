use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use playtrack_app::{
    domain::analytics::PlayerGameStats,
    workflow::leaderboard::{
        query::{LeaderboardSummary, RankedGameScore, RankedPlayer},
        record::PlayerStatsUpdate,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, MessageResponse, ServiceError,
    extract::{JsonBody, QueryParams},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRankedPlayer {
    rank: usize,
    username: String,
    avatar: Option<String>,
    total_score: i64,
    games_played: u32,
    avg_rating: f64,
    updated_at: DateTime<Utc>,
}

impl From<RankedPlayer> for JsonRankedPlayer {
    fn from(row: RankedPlayer) -> Self {
        Self {
            rank: row.rank,
            username: row.username,
            avatar: row.avatar,
            total_score: row.total_score,
            games_played: row.games_played,
            avg_rating: row.average_rating,
            updated_at: row.updated_at,
        }
    }
}

pub async fn global(
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonRankedPlayer>>, ServiceError> {
    let board = state
        .app
        .leaderboard_query_use_case
        .global_leaderboard()
        .await?;
    Ok(Json(board.into_iter().map(JsonRankedPlayer::from).collect()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRankedGameScore {
    rank: usize,
    username: String,
    score: i64,
    updated_at: DateTime<Utc>,
}

impl From<RankedGameScore> for JsonRankedGameScore {
    fn from(row: RankedGameScore) -> Self {
        Self {
            rank: row.rank,
            username: row.username,
            score: row.score,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

pub async fn game(
    Path(title): Path<String>,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LimitQuery>,
) -> Result<Json<Vec<JsonRankedGameScore>>, ServiceError> {
    let board = state
        .app
        .leaderboard_query_use_case
        .game_leaderboard(&title, query.limit)
        .await?;
    Ok(Json(board.into_iter().map(JsonRankedGameScore::from).collect()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonGameScoreRequest {
    #[serde(default)]
    game_title: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    score: i64,
}

pub async fn record_game_score(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JsonGameScoreRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state
        .app
        .leaderboard_record_use_case
        .record_game_score(&request.game_title, &request.username, request.score)
        .await?;
    Ok(MessageResponse::new("Leaderboard updated successfully"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayerStatsRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    game_title: String,
    playtime: Option<i64>,
    achievements_count: Option<i32>,
    level: Option<i32>,
}

pub async fn record_player_stats(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JsonPlayerStatsRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state
        .app
        .leaderboard_record_use_case
        .record_player_stats(PlayerStatsUpdate {
            username: request.username,
            game_title: request.game_title,
            playtime: request.playtime,
            achievements_count: request.achievements_count,
            level: request.level,
        })
        .await?;
    Ok(MessageResponse::new("Player stats updated successfully"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayerStats {
    username: String,
    game_title: String,
    total_playtime: i64,
    achievements_count: i32,
    level: i32,
    last_played: DateTime<Utc>,
}

impl From<PlayerGameStats> for JsonPlayerStats {
    fn from(stats: PlayerGameStats) -> Self {
        Self {
            username: stats.username,
            game_title: stats.game_title,
            total_playtime: stats.total_playtime,
            achievements_count: stats.achievements_count,
            level: stats.level,
            last_played: stats.last_played,
        }
    }
}

pub async fn player_stats(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonPlayerStats>>, ServiceError> {
    let stats = state
        .app
        .leaderboard_query_use_case
        .player_stats(&username)
        .await?;
    Ok(Json(stats.into_iter().map(JsonPlayerStats::from).collect()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonActivityRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    activity_type: String,
    #[serde(default)]
    points: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonActivityResponse {
    message: String,
    total_score: i64,
}

pub async fn record_activity(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JsonActivityRequest>,
) -> Result<Json<JsonActivityResponse>, ServiceError> {
    let total_score = state
        .app
        .leaderboard_record_use_case
        .record_activity(&request.username, &request.activity_type, request.points)
        .await?;
    Ok(Json(JsonActivityResponse {
        message: "Activity logged successfully".to_string(),
        total_score,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSummary {
    total_ratings: u64,
    total_topics: u64,
    total_comments: u64,
    total_connections: u64,
    total_time_active: u64,
}

impl From<LeaderboardSummary> for JsonSummary {
    fn from(summary: LeaderboardSummary) -> Self {
        Self {
            total_ratings: summary.total_ratings,
            total_topics: summary.total_topics,
            total_comments: summary.total_comments,
            total_connections: summary.total_connections,
            total_time_active: summary.total_time_active,
        }
    }
}

pub async fn summary(State(state): State<AppState>) -> Result<Json<JsonSummary>, ServiceError> {
    let summary = state.app.leaderboard_query_use_case.summary().await?;
    Ok(Json(summary.into()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSyncResponse {
    message: String,
    total_players: usize,
}

pub async fn sync_all(State(state): State<AppState>) -> Result<Json<JsonSyncResponse>, ServiceError> {
    let synced = state.app.sync_all_use_case.sync_all().await?;
    Ok(Json(JsonSyncResponse {
        message: format!("Successfully synced {} players to the analytics store", synced),
        total_players: synced,
    }))
}
