use std::sync::Arc;

use crate::{
    domain::{RepoRetrieveError, credentials::PasswordHasher, player::PlayerRepository},
    workflow::account::PlayerView,
};

#[async_trait::async_trait]
pub trait LoginUseCase {
    async fn login(&self, username: &str, password: &str) -> Result<PlayerView, LoginError>;
}

#[derive(Debug, PartialEq)]
pub enum LoginError {
    MissingCredentials,
    InvalidCredentials,
    Internal,
}

pub struct LoginUseCaseImpl<PR: PlayerRepository, H: PasswordHasher> {
    player_repository: Arc<PR>,
    password_hasher: Arc<H>,
}

impl<PR: PlayerRepository, H: PasswordHasher> LoginUseCaseImpl<PR, H> {
    pub fn new(player_repository: Arc<PR>, password_hasher: Arc<H>) -> Self {
        Self {
            player_repository,
            password_hasher,
        }
    }
}

#[async_trait::async_trait]
impl<PR, H> LoginUseCase for LoginUseCaseImpl<PR, H>
where
    PR: PlayerRepository + Send + Sync + 'static,
    H: PasswordHasher + Send + Sync + 'static,
{
    async fn login(&self, username: &str, password: &str) -> Result<PlayerView, LoginError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }
        let player = match self.player_repository.get_player(username.trim()).await {
            Ok(player) => player,
            Err(RepoRetrieveError::NotFound) => return Err(LoginError::InvalidCredentials),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to load player {} for login: {}", username, e);
                return Err(LoginError::Internal);
            }
        };

        let hasher = self.password_hasher.clone();
        let password = password.to_string();
        let password_hash = player.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || {
            hasher.verify_password(&password, &password_hash)
        })
        .await
        .map_err(|e| {
            log::error!("Password verification task failed: {}", e);
            LoginError::Internal
        })?;

        if !valid {
            log::debug!("Rejected login for {}", player.username);
            return Err(LoginError::InvalidCredentials);
        }
        Ok(player.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGraph, MockHasher};

    #[tokio::test]
    async fn test_login() {
        let graph = MockGraph::default();
        graph.add_player("alice");
        let login = LoginUseCaseImpl::new(Arc::new(graph), Arc::new(MockHasher));

        let view = login.login("alice", "secret1").await.unwrap();
        assert_eq!(view.username, "alice");

        assert_eq!(
            login.login("alice", "wrong-password").await.err(),
            Some(LoginError::InvalidCredentials)
        );
        assert_eq!(
            login.login("nobody", "secret1").await.err(),
            Some(LoginError::InvalidCredentials)
        );
        assert_eq!(
            login.login("", "secret1").await.err(),
            Some(LoginError::MissingCredentials)
        );
    }
}
