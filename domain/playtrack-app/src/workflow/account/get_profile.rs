use std::{collections::HashMap, sync::Arc};

use crate::{
    domain::{
        GameTitle, RepoError, RepoRetrieveError, Username,
        game::GameRepository,
        player::PlayerRepository,
        rating::{RatingRepository, RatingSummary},
        social::SocialRepository,
    },
    workflow::account::PlayerView,
};

const TOP_RATED_LIMIT: usize = 10;
const FRIENDS_LIMIT: usize = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct LibraryGameView {
    pub title: GameTitle,
    pub genre: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FriendView {
    pub username: Username,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProfileStats {
    pub rated_games_count: usize,
    pub follows_count: usize,
    pub average_rating: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProfileView {
    pub player: PlayerView,
    /// Most recently rated or added first.
    pub all_games: Vec<LibraryGameView>,
    pub top_rated_games: Vec<LibraryGameView>,
    pub friends: Vec<FriendView>,
    pub favorites: Vec<GameTitle>,
    pub stats: ProfileStats,
}

#[async_trait::async_trait]
pub trait GetProfileUseCase {
    async fn get_profile(&self, username: &str) -> Result<ProfileView, GetProfileError>;
}

#[derive(Debug, PartialEq)]
pub enum GetProfileError {
    NotFound,
    RepositoryError,
}

impl From<RepoError> for GetProfileError {
    fn from(e: RepoError) -> Self {
        log::error!("Failed to assemble profile: {}", e);
        GetProfileError::RepositoryError
    }
}

pub struct GetProfileUseCaseImpl<
    PR: PlayerRepository,
    GR: GameRepository,
    RR: RatingRepository,
    SR: SocialRepository,
> {
    player_repository: Arc<PR>,
    game_repository: Arc<GR>,
    rating_repository: Arc<RR>,
    social_repository: Arc<SR>,
}

impl<PR: PlayerRepository, GR: GameRepository, RR: RatingRepository, SR: SocialRepository>
    GetProfileUseCaseImpl<PR, GR, RR, SR>
{
    pub fn new(
        player_repository: Arc<PR>,
        game_repository: Arc<GR>,
        rating_repository: Arc<RR>,
        social_repository: Arc<SR>,
    ) -> Self {
        Self {
            player_repository,
            game_repository,
            rating_repository,
            social_repository,
        }
    }
}

#[async_trait::async_trait]
impl<PR, GR, RR, SR> GetProfileUseCase for GetProfileUseCaseImpl<PR, GR, RR, SR>
where
    PR: PlayerRepository + Send + Sync + 'static,
    GR: GameRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
{
    async fn get_profile(&self, username: &str) -> Result<ProfileView, GetProfileError> {
        let player = match self.player_repository.get_player(username).await {
            Ok(player) => player,
            Err(RepoRetrieveError::NotFound) => return Err(GetProfileError::NotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve player {}: {}", username, e);
                return Err(GetProfileError::RepositoryError);
            }
        };

        let mut library = self.rating_repository.get_library(username).await?;
        library.sort_by(|a, b| b.last_touched().cmp(&a.last_touched()));

        let titles: Vec<GameTitle> = library.iter().map(|e| e.game_title.clone()).collect();
        let genres: HashMap<GameTitle, Option<String>> = self
            .game_repository
            .get_games(&titles)
            .await?
            .into_iter()
            .map(|g| (g.title, g.genre))
            .collect();

        let all_games: Vec<LibraryGameView> = library
            .iter()
            .map(|entry| LibraryGameView {
                title: entry.game_title.clone(),
                genre: genres.get(&entry.game_title).cloned().flatten(),
                rating: entry.score.map(|s| s.value()),
            })
            .collect();
        let top_rated_games: Vec<LibraryGameView> = all_games
            .iter()
            .filter(|g| g.rating.is_some())
            .take(TOP_RATED_LIMIT)
            .cloned()
            .collect();

        let followees = self.social_repository.get_followees(username).await?;
        let follows_count = followees.len();
        let shown: Vec<Username> = followees.into_iter().take(FRIENDS_LIMIT).collect();
        let friends = self
            .player_repository
            .get_players(&shown)
            .await?
            .into_iter()
            .map(|p| FriendView {
                username: p.username,
                email: p.email,
            })
            .collect();

        let favorites = self.rating_repository.get_favorites(username).await?;
        let summary = RatingSummary::from_entries(&library);

        Ok(ProfileView {
            player: player.into(),
            all_games,
            top_rated_games,
            friends,
            favorites,
            stats: ProfileStats {
                rated_games_count: summary.rated_games,
                follows_count,
                average_rating: summary.average_score,
            },
        })
    }
}
