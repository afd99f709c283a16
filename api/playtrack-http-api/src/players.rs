use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use playtrack_app::{
    domain::{GameTitle, avatar::AvatarUpload},
    workflow::account::{
        PlayerView,
        get_profile::{FriendView, LibraryGameView, ProfileView},
        signup::SignupRequest,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, MessageResponse, ServiceError,
    extract::JsonBody,
    jwt::{Claims, generate_jwt},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlayer {
    username: String,
    email: String,
    age: u32,
    created_at: DateTime<Utc>,
    avatar: Option<String>,
}

impl From<PlayerView> for JsonPlayer {
    fn from(player: PlayerView) -> Self {
        Self {
            username: player.username,
            email: player.email,
            age: player.age,
            created_at: player.created_at,
            avatar: player.avatar,
        }
    }
}

#[derive(Deserialize)]
pub struct JsonSignupRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    age: Option<u32>,
}

#[derive(Serialize)]
pub struct JsonSignupResponse {
    message: String,
    player: JsonPlayer,
}

pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JsonSignupRequest>,
) -> Result<(StatusCode, Json<JsonSignupResponse>), ServiceError> {
    let player = state
        .app
        .signup_use_case
        .signup(SignupRequest {
            username: request.username,
            email: request.email,
            password: request.password,
            age: request.age,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(JsonSignupResponse {
            message: "Account created successfully".to_string(),
            player: player.into(),
        }),
    ))
}

#[derive(Deserialize)]
pub struct JsonLoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
pub struct JsonLoginResponse {
    message: String,
    player: JsonPlayer,
    token: String,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JsonLoginRequest>,
) -> Result<Json<JsonLoginResponse>, ServiceError> {
    let player = state
        .app
        .login_use_case
        .login(&request.username, &request.password)
        .await?;
    let token = generate_jwt(&player.username)
        .map_err(|e| ServiceError::Internal(format!("token creation failed: {:?}", e)))?;
    Ok(Json(JsonLoginResponse {
        message: "Logged in successfully".to_string(),
        player: player.into(),
        token,
    }))
}

pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<JsonPlayer>>, ServiceError> {
    let players = state.app.get_player_use_case.list_players().await?;
    Ok(Json(players.into_iter().map(JsonPlayer::from).collect()))
}

pub async fn get_player(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<JsonPlayer>, ServiceError> {
    let player = state.app.get_player_use_case.get_player(&username).await?;
    Ok(Json(player.into()))
}

#[derive(Serialize)]
pub struct JsonLibraryGame {
    title: GameTitle,
    genre: Option<String>,
    rating: Option<u8>,
}

impl From<LibraryGameView> for JsonLibraryGame {
    fn from(game: LibraryGameView) -> Self {
        Self {
            title: game.title,
            genre: game.genre,
            rating: game.rating,
        }
    }
}

#[derive(Serialize)]
pub struct JsonFriend {
    username: String,
    email: String,
}

impl From<FriendView> for JsonFriend {
    fn from(friend: FriendView) -> Self {
        Self {
            username: friend.username,
            email: friend.email,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonProfileStats {
    rated_games_count: usize,
    follows_count: usize,
    average_rating: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonProfile {
    player: JsonPlayer,
    all_games: Vec<JsonLibraryGame>,
    top_rated_games: Vec<JsonLibraryGame>,
    friends_list: Vec<JsonFriend>,
    favorites: Vec<GameTitle>,
    stats: JsonProfileStats,
}

impl From<ProfileView> for JsonProfile {
    fn from(profile: ProfileView) -> Self {
        Self {
            player: profile.player.into(),
            all_games: profile.all_games.into_iter().map(Into::into).collect(),
            top_rated_games: profile.top_rated_games.into_iter().map(Into::into).collect(),
            friends_list: profile.friends.into_iter().map(Into::into).collect(),
            favorites: profile.favorites,
            stats: JsonProfileStats {
                rated_games_count: profile.stats.rated_games_count,
                follows_count: profile.stats.follows_count,
                average_rating: format!("{:.2}", profile.stats.average_rating),
            },
        }
    }
}

pub async fn get_profile(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<JsonProfile>, ServiceError> {
    let profile = state.app.get_profile_use_case.get_profile(&username).await?;
    Ok(Json(profile.into()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonAvatarUploadResponse {
    message: String,
    avatar_url: String,
}

pub async fn upload_avatar(
    Path(username): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    mut multipart: Multipart,
) -> Result<Json<JsonAvatarUploadResponse>, ServiceError> {
    claims.ensure_subject(&username)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("avatar") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::BadRequest(e.body_text()))?;
        upload = Some(AvatarUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or_else(|| ServiceError::BadRequest("No file uploaded".to_string()))?;

    let avatar_url = state
        .app
        .avatar_use_case
        .upload_avatar(&username, upload)
        .await?;
    Ok(Json(JsonAvatarUploadResponse {
        message: "Avatar uploaded successfully".to_string(),
        avatar_url,
    }))
}

#[derive(Serialize)]
pub struct JsonAvatarResponse {
    avatar: Option<String>,
}

pub async fn get_avatar(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<JsonAvatarResponse>, ServiceError> {
    let avatar = state.app.avatar_use_case.get_avatar(&username).await?;
    Ok(Json(JsonAvatarResponse { avatar }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonChangePasswordRequest {
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
}

pub async fn change_password(
    Path(username): Path<String>,
    State(state): State<AppState>,
    claims: Claims,
    JsonBody(request): JsonBody<JsonChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    claims.ensure_subject(&username)?;
    state
        .app
        .change_password_use_case
        .change_password(&username, &request.current_password, &request.new_password)
        .await?;
    Ok(MessageResponse::new("Password changed successfully"))
}
