use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use playtrack_app::domain::game::Game;
use serde::{Deserialize, Serialize};

use crate::{AppState, MessageResponse, ServiceError, extract::JsonBody, jwt::Claims};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonGameRequest {
    #[serde(default)]
    game_title: String,
}

pub async fn add_game(
    Path(username): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonGameRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    claims.ensure_subject(&username)?;
    state
        .app
        .library_use_case
        .add_game(&username, &request.game_title)
        .await?;
    Ok(MessageResponse::new(format!(
        "{} added {} to their library",
        username, request.game_title
    )))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRateRequest {
    #[serde(default)]
    game_title: String,
    rating: Option<i64>,
}

#[derive(Serialize)]
pub struct JsonRateResponse {
    message: String,
    rating: u8,
}

pub async fn rate_game(
    Path(username): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonRateRequest>,
) -> Result<Json<JsonRateResponse>, ServiceError> {
    claims.ensure_subject(&username)?;
    let score = state
        .app
        .library_use_case
        .rate_game(&username, &request.game_title, request.rating.unwrap_or(0))
        .await?;
    Ok(Json(JsonRateResponse {
        message: format!("{} rated {} {}/5", username, request.game_title, score.value()),
        rating: score.value(),
    }))
}

pub async fn favorite_game(
    Path(username): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonGameRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    claims.ensure_subject(&username)?;
    state
        .app
        .library_use_case
        .favorite_game(&username, &request.game_title)
        .await?;
    Ok(MessageResponse::new(format!(
        "{} marked {} as favorite",
        username, request.game_title
    )))
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonGame {
    #[serde(default)]
    title: String,
    genre: Option<String>,
    release_year: Option<i32>,
}

impl From<Game> for JsonGame {
    fn from(game: Game) -> Self {
        Self {
            title: game.title,
            genre: game.genre,
            release_year: game.release_year,
        }
    }
}

pub async fn create_game(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JsonGame>,
) -> Result<(StatusCode, Json<JsonGame>), ServiceError> {
    let game = state
        .app
        .game_catalog_use_case
        .create_game(Game {
            title: request.title,
            genre: request.genre,
            release_year: request.release_year,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(game.into())))
}

pub async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<JsonGame>>, ServiceError> {
    let games = state.app.game_catalog_use_case.list_games().await?;
    Ok(Json(games.into_iter().map(JsonGame::from).collect()))
}
