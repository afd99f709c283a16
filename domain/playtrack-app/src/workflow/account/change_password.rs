use std::sync::Arc;

use crate::domain::{
    RepoRetrieveError, RepoUpdateError,
    credentials::PasswordHasher,
    player::{PlayerRepository, PlayerValidationError, validate_password},
};

#[async_trait::async_trait]
pub trait ChangePasswordUseCase {
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ChangePasswordError>;
}

#[derive(Debug, PartialEq)]
pub enum ChangePasswordError {
    Invalid(PlayerValidationError),
    WrongPassword,
    NotFound,
    Internal,
}

pub struct ChangePasswordUseCaseImpl<PR: PlayerRepository, H: PasswordHasher> {
    player_repository: Arc<PR>,
    password_hasher: Arc<H>,
}

impl<PR: PlayerRepository, H: PasswordHasher> ChangePasswordUseCaseImpl<PR, H> {
    pub fn new(player_repository: Arc<PR>, password_hasher: Arc<H>) -> Self {
        Self {
            player_repository,
            password_hasher,
        }
    }
}

#[async_trait::async_trait]
impl<PR, H> ChangePasswordUseCase for ChangePasswordUseCaseImpl<PR, H>
where
    PR: PlayerRepository + Send + Sync + 'static,
    H: PasswordHasher + Send + Sync + 'static,
{
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ChangePasswordError> {
        validate_password(new_password).map_err(ChangePasswordError::Invalid)?;

        let player = match self.player_repository.get_player(username).await {
            Ok(player) => player,
            Err(RepoRetrieveError::NotFound) => return Err(ChangePasswordError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load player {}: {}", username, e);
                return Err(ChangePasswordError::Internal);
            }
        };

        let hasher = self.password_hasher.clone();
        let current = current_password.to_string();
        let new = new_password.to_string();
        let stored = player.password_hash;
        let new_hash = tokio::task::spawn_blocking(move || {
            if !hasher.verify_password(&current, &stored) {
                return Ok(None);
            }
            hasher.hash_password(&new).map(Some)
        })
        .await
        .map_err(|e| {
            log::error!("Password task failed: {}", e);
            ChangePasswordError::Internal
        })?
        .map_err(|e| {
            log::error!("Failed to hash new password for {}: {}", username, e);
            ChangePasswordError::Internal
        })?
        .ok_or(ChangePasswordError::WrongPassword)?;

        match self
            .player_repository
            .update_password_hash(username, new_hash)
            .await
        {
            Ok(()) => {
                log::info!("Password changed for {}", username);
                Ok(())
            }
            Err(RepoUpdateError::NotFound) => Err(ChangePasswordError::NotFound),
            Err(RepoUpdateError::StorageError(e)) => {
                log::error!("Failed to store new password for {}: {}", username, e);
                Err(ChangePasswordError::Internal)
            }
        }
    }
}
