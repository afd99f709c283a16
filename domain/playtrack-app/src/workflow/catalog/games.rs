use std::sync::Arc;

use crate::domain::{
    RepoCreateError,
    game::{Game, GameRepository},
};

#[async_trait::async_trait]
pub trait GameCatalogUseCase {
    async fn create_game(&self, game: Game) -> Result<Game, GameCatalogError>;
    async fn list_games(&self) -> Result<Vec<Game>, GameCatalogError>;
}

#[derive(Debug, PartialEq)]
pub enum GameCatalogError {
    MissingTitle,
    AlreadyExists,
    RepositoryError,
}

pub struct GameCatalogUseCaseImpl<GR: GameRepository> {
    game_repository: Arc<GR>,
}

impl<GR: GameRepository> GameCatalogUseCaseImpl<GR> {
    pub fn new(game_repository: Arc<GR>) -> Self {
        Self { game_repository }
    }
}

#[async_trait::async_trait]
impl<GR: GameRepository + Send + Sync + 'static> GameCatalogUseCase
    for GameCatalogUseCaseImpl<GR>
{
    async fn create_game(&self, game: Game) -> Result<Game, GameCatalogError> {
        let title = game.title.trim().to_string();
        if title.is_empty() {
            return Err(GameCatalogError::MissingTitle);
        }
        let game = Game {
            title,
            genre: game.genre.filter(|g| !g.trim().is_empty()),
            release_year: game.release_year,
        };
        match self.game_repository.create_game(game.clone()).await {
            Ok(()) => {
                log::info!("Game {} added to catalog", game.title);
                Ok(game)
            }
            Err(RepoCreateError::Conflict(_)) => Err(GameCatalogError::AlreadyExists),
            Err(RepoCreateError::StorageError(e)) => {
                log::error!("Failed to create game {}: {}", game.title, e);
                Err(GameCatalogError::RepositoryError)
            }
        }
    }

    async fn list_games(&self) -> Result<Vec<Game>, GameCatalogError> {
        self.game_repository.list_games().await.map_err(|e| {
            log::error!("Failed to list games: {}", e);
            GameCatalogError::RepositoryError
        })
    }
}
