use axum::{
    Json,
    extract::{Path, State},
};
use playtrack_app::domain::social_distance::SocialDistance;
use serde::{Deserialize, Serialize};

use crate::{AppState, MessageResponse, ServiceError, extract::JsonBody, jwt::Claims};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTargetRequest {
    #[serde(default)]
    target_username: String,
}

pub async fn follow(
    Path(username): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonTargetRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    claims.ensure_subject(&username)?;
    state
        .app
        .follow_use_case
        .follow(&username, &request.target_username)
        .await?;
    Ok(MessageResponse::new(format!(
        "{} now follows {}",
        username, request.target_username
    )))
}

pub async fn unfollow(
    Path(username): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonTargetRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    claims.ensure_subject(&username)?;
    state
        .app
        .follow_use_case
        .unfollow(&username, &request.target_username)
        .await?;
    Ok(MessageResponse::new(format!(
        "{} stopped following {}",
        username, request.target_username
    )))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonIsFollowing {
    is_following: bool,
}

pub async fn is_following(
    Path((username, target)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<JsonIsFollowing>, ServiceError> {
    let is_following = state
        .app
        .follow_use_case
        .is_following(&username, &target)
        .await?;
    Ok(Json(JsonIsFollowing { is_following }))
}

pub async fn block(
    Path(username): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonTargetRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    claims.ensure_subject(&username)?;
    state
        .app
        .block_use_case
        .block(&username, &request.target_username)
        .await?;
    Ok(MessageResponse::new(format!(
        "{} blocked {}",
        username, request.target_username
    )))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSocialDistanceRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    game_title: String,
}

#[derive(Serialize)]
pub struct JsonConnection {
    username: String,
    depth: u8,
}

#[derive(Serialize)]
pub struct JsonEdge {
    from: String,
    to: String,
}

#[derive(Serialize)]
pub struct JsonSocialDistance {
    connections: Vec<JsonConnection>,
    edges: Vec<JsonEdge>,
    intermediaries: Vec<String>,
    truncated: bool,
}

impl From<SocialDistance> for JsonSocialDistance {
    fn from(distance: SocialDistance) -> Self {
        Self {
            connections: distance
                .connections
                .into_iter()
                .map(|c| JsonConnection {
                    username: c.username,
                    depth: c.depth,
                })
                .collect(),
            edges: distance
                .edges
                .into_iter()
                .map(|e| JsonEdge { from: e.from, to: e.to })
                .collect(),
            intermediaries: distance.intermediaries,
            truncated: distance.truncated,
        }
    }
}

pub async fn social_distance(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JsonSocialDistanceRequest>,
) -> Result<Json<JsonSocialDistance>, ServiceError> {
    let distance = state
        .app
        .social_distance_use_case
        .query(&request.username, &request.game_title)
        .await?;
    Ok(Json(distance.into()))
}
