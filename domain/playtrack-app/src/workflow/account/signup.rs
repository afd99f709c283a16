use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        RepoCreateError, RepoRetrieveError,
        credentials::PasswordHasher,
        player::{
            DEFAULT_AGE, Player, PlayerRepository, PlayerValidationError, validate_email,
            validate_password, validate_username,
        },
    },
    services::projection::LeaderboardProjectionService,
    workflow::account::PlayerView,
};

#[derive(Clone, Debug, Default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub age: Option<u32>,
}

#[async_trait::async_trait]
pub trait SignupUseCase {
    async fn signup(&self, request: SignupRequest) -> Result<PlayerView, SignupError>;
}

#[derive(Debug, PartialEq)]
pub enum SignupError {
    Invalid(PlayerValidationError),
    UsernameTaken,
    EmailTaken,
    Internal,
}

pub struct SignupUseCaseImpl<PR: PlayerRepository, H: PasswordHasher, P: LeaderboardProjectionService>
{
    player_repository: Arc<PR>,
    password_hasher: Arc<H>,
    projection: Arc<P>,
}

impl<PR: PlayerRepository, H: PasswordHasher, P: LeaderboardProjectionService>
    SignupUseCaseImpl<PR, H, P>
{
    pub fn new(player_repository: Arc<PR>, password_hasher: Arc<H>, projection: Arc<P>) -> Self {
        Self {
            player_repository,
            password_hasher,
            projection,
        }
    }
}

#[async_trait::async_trait]
impl<PR, H, P> SignupUseCase for SignupUseCaseImpl<PR, H, P>
where
    PR: PlayerRepository + Send + Sync + 'static,
    H: PasswordHasher + Send + Sync + 'static,
    P: LeaderboardProjectionService + Send + Sync + 'static,
{
    async fn signup(&self, request: SignupRequest) -> Result<PlayerView, SignupError> {
        if request.username.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(SignupError::Invalid(PlayerValidationError::MissingFields));
        }
        let username = validate_username(&request.username).map_err(SignupError::Invalid)?;
        validate_password(&request.password).map_err(SignupError::Invalid)?;
        let email = validate_email(&request.email).map_err(SignupError::Invalid)?;

        match self.player_repository.get_player(&username).await {
            Ok(_) => return Err(SignupError::UsernameTaken),
            Err(RepoRetrieveError::NotFound) => {}
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to check username {}: {}", username, e);
                return Err(SignupError::Internal);
            }
        }

        let hasher = self.password_hasher.clone();
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| {
                log::error!("Password hashing task failed: {}", e);
                SignupError::Internal
            })?
            .map_err(|e| {
                log::error!("Failed to hash password for {}: {}", username, e);
                SignupError::Internal
            })?;

        let player = Player {
            username: username.clone(),
            email,
            password_hash,
            age: request.age.unwrap_or(DEFAULT_AGE),
            created_at: Utc::now(),
            avatar: None,
        };

        match self.player_repository.create_player(player.clone()).await {
            Ok(()) => {}
            Err(RepoCreateError::Conflict(field)) if field == "email" => {
                return Err(SignupError::EmailTaken);
            }
            Err(RepoCreateError::Conflict(_)) => return Err(SignupError::UsernameTaken),
            Err(RepoCreateError::StorageError(e)) => {
                log::error!("Failed to create player {}: {}", username, e);
                return Err(SignupError::Internal);
            }
        }

        log::info!("Player {} signed up", username);
        self.projection.player_changed(&username);
        Ok(player.into())
    }
}
