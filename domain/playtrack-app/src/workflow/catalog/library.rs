use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        RepoError, RepoRetrieveError,
        analytics::ActivityKind,
        game::GameRepository,
        player::PlayerRepository,
        rating::{RatingRepository, Score},
    },
    services::projection::LeaderboardProjectionService,
};

#[async_trait::async_trait]
pub trait LibraryUseCase {
    async fn add_game(&self, username: &str, game_title: &str) -> Result<(), LibraryError>;
    /// Creates or replaces the player's score for the game.
    async fn rate_game(
        &self,
        username: &str,
        game_title: &str,
        score: i64,
    ) -> Result<Score, LibraryError>;
    async fn favorite_game(&self, username: &str, game_title: &str) -> Result<(), LibraryError>;
}

#[derive(Debug, PartialEq)]
pub enum LibraryError {
    MissingGameTitle,
    InvalidScore,
    PlayerNotFound,
    GameNotFound,
    Internal,
}

impl From<RepoError> for LibraryError {
    fn from(e: RepoError) -> Self {
        log::error!("Library update failed: {}", e);
        LibraryError::Internal
    }
}

pub struct LibraryUseCaseImpl<
    PR: PlayerRepository,
    GR: GameRepository,
    RR: RatingRepository,
    P: LeaderboardProjectionService,
> {
    player_repository: Arc<PR>,
    game_repository: Arc<GR>,
    rating_repository: Arc<RR>,
    projection: Arc<P>,
}

impl<PR, GR, RR, P> LibraryUseCaseImpl<PR, GR, RR, P>
where
    PR: PlayerRepository,
    GR: GameRepository,
    RR: RatingRepository,
    P: LeaderboardProjectionService,
{
    pub fn new(
        player_repository: Arc<PR>,
        game_repository: Arc<GR>,
        rating_repository: Arc<RR>,
        projection: Arc<P>,
    ) -> Self {
        Self {
            player_repository,
            game_repository,
            rating_repository,
            projection,
        }
    }

    async fn ensure_exists(&self, username: &str, game_title: &str) -> Result<(), LibraryError> {
        if game_title.trim().is_empty() {
            return Err(LibraryError::MissingGameTitle);
        }
        match self.player_repository.get_player(username).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(LibraryError::PlayerNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve player {}: {}", username, e);
                return Err(LibraryError::Internal);
            }
        }
        match self.game_repository.get_game(game_title).await {
            Ok(_) => Ok(()),
            Err(RepoRetrieveError::NotFound) => Err(LibraryError::GameNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve game {}: {}", game_title, e);
                Err(LibraryError::Internal)
            }
        }
    }
}

#[async_trait::async_trait]
impl<PR, GR, RR, P> LibraryUseCase for LibraryUseCaseImpl<PR, GR, RR, P>
where
    PR: PlayerRepository + Send + Sync + 'static,
    GR: GameRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
    P: LeaderboardProjectionService + Send + Sync + 'static,
{
    async fn add_game(&self, username: &str, game_title: &str) -> Result<(), LibraryError> {
        self.ensure_exists(username, game_title).await?;
        self.rating_repository
            .add_to_library(username, game_title, Utc::now())
            .await?;

        self.projection.player_changed(username);
        self.projection.award(username, ActivityKind::AddGame.into());
        Ok(())
    }

    async fn rate_game(
        &self,
        username: &str,
        game_title: &str,
        score: i64,
    ) -> Result<Score, LibraryError> {
        let score = Score::new(score).map_err(|_| LibraryError::InvalidScore)?;
        self.ensure_exists(username, game_title).await?;
        self.rating_repository
            .upsert_rating(username, game_title, score, Utc::now())
            .await?;
        log::debug!("{} rated {} with {}", username, game_title, score.value());

        self.projection.player_changed(username);
        self.projection.game_rated(username, game_title, score);
        self.projection.award(username, ActivityKind::RateGame.into());
        Ok(score)
    }

    async fn favorite_game(&self, username: &str, game_title: &str) -> Result<(), LibraryError> {
        self.ensure_exists(username, game_title).await?;
        self.rating_repository
            .add_favorite(username, game_title, Utc::now())
            .await?;
        Ok(())
    }
}
