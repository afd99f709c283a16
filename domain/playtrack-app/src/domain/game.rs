use crate::domain::{GameTitle, RepoCreateError, RepoError, RepoRetrieveError};

#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub title: GameTitle,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
}

#[async_trait::async_trait]
pub trait GameRepository {
    async fn create_game(&self, game: Game) -> Result<(), RepoCreateError>;
    async fn get_game(&self, title: &str) -> Result<Game, RepoRetrieveError>;
    async fn get_games(&self, titles: &[GameTitle]) -> Result<Vec<Game>, RepoError>;
    /// All games ordered by title.
    async fn list_games(&self) -> Result<Vec<Game>, RepoError>;
}
