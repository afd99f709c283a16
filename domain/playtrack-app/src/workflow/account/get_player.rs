use std::sync::Arc;

use crate::{
    domain::{RepoRetrieveError, player::PlayerRepository},
    workflow::account::PlayerView,
};

#[async_trait::async_trait]
pub trait GetPlayerUseCase {
    async fn get_player(&self, username: &str) -> Result<PlayerView, GetPlayerError>;
    async fn list_players(&self) -> Result<Vec<PlayerView>, GetPlayerError>;
}

#[derive(Debug, PartialEq)]
pub enum GetPlayerError {
    NotFound,
    RepositoryError,
}

pub struct GetPlayerUseCaseImpl<PR: PlayerRepository> {
    player_repository: Arc<PR>,
}

impl<PR: PlayerRepository> GetPlayerUseCaseImpl<PR> {
    pub fn new(player_repository: Arc<PR>) -> Self {
        Self { player_repository }
    }
}

#[async_trait::async_trait]
impl<PR: PlayerRepository + Send + Sync + 'static> GetPlayerUseCase for GetPlayerUseCaseImpl<PR> {
    async fn get_player(&self, username: &str) -> Result<PlayerView, GetPlayerError> {
        match self.player_repository.get_player(username).await {
            Ok(player) => Ok(player.into()),
            Err(RepoRetrieveError::NotFound) => Err(GetPlayerError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve player {}: {}", username, e);
                Err(GetPlayerError::RepositoryError)
            }
        }
    }

    async fn list_players(&self) -> Result<Vec<PlayerView>, GetPlayerError> {
        match self.player_repository.list_players().await {
            Ok(players) => Ok(players.into_iter().map(PlayerView::from).collect()),
            Err(e) => {
                log::error!("Failed to list players: {}", e);
                Err(GetPlayerError::RepositoryError)
            }
        }
    }
}
