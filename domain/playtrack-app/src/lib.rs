use std::sync::Arc;

use crate::{
    domain::{
        analytics::AnalyticsRepository, credentials::PasswordHasher, forum::ForumRepository,
        game::GameRepository, player::PlayerRepository, rating::RatingRepository,
        social::SocialRepository,
    },
    ports::avatar_storage::AvatarStoragePort,
    services::projection::LeaderboardProjectionServiceImpl,
    workflow::{
        account::{
            avatar::{AvatarUseCase, AvatarUseCaseImpl},
            change_password::{ChangePasswordUseCase, ChangePasswordUseCaseImpl},
            get_player::{GetPlayerUseCase, GetPlayerUseCaseImpl},
            get_profile::{GetProfileUseCase, GetProfileUseCaseImpl},
            login::{LoginUseCase, LoginUseCaseImpl},
            signup::{SignupUseCase, SignupUseCaseImpl},
        },
        catalog::{
            games::{GameCatalogUseCase, GameCatalogUseCaseImpl},
            library::{LibraryUseCase, LibraryUseCaseImpl},
        },
        forum::{
            comments::{CommentUseCase, CommentUseCaseImpl},
            topics::{TopicUseCase, TopicUseCaseImpl},
        },
        leaderboard::{
            query::{LeaderboardQueryUseCase, LeaderboardQueryUseCaseImpl},
            record::{LeaderboardRecordUseCase, LeaderboardRecordUseCaseImpl},
            sync_all::{SyncAllUseCase, SyncAllUseCaseImpl},
        },
        recommendation::{
            games::{GameRecommendationUseCase, GameRecommendationUseCaseImpl},
            topics::{TopicRecommendationUseCase, TopicRecommendationUseCaseImpl},
        },
        search::{SearchUseCase, SearchUseCaseImpl},
        social::{
            block::{BlockUseCase, BlockUseCaseImpl},
            follow::{FollowUseCase, FollowUseCaseImpl},
            social_distance::{SocialDistanceUseCase, SocialDistanceUseCaseImpl},
        },
    },
};

pub mod domain;
pub mod ports;
pub mod services;
pub mod workflow;

#[cfg(test)]
mod testing;

pub struct Application {
    pub signup_use_case: Box<dyn SignupUseCase + Send + Sync + 'static>,
    pub login_use_case: Box<dyn LoginUseCase + Send + Sync + 'static>,
    pub get_player_use_case: Box<dyn GetPlayerUseCase + Send + Sync + 'static>,
    pub get_profile_use_case: Box<dyn GetProfileUseCase + Send + Sync + 'static>,
    pub change_password_use_case: Box<dyn ChangePasswordUseCase + Send + Sync + 'static>,
    pub avatar_use_case: Box<dyn AvatarUseCase + Send + Sync + 'static>,

    pub game_catalog_use_case: Box<dyn GameCatalogUseCase + Send + Sync + 'static>,
    pub library_use_case: Box<dyn LibraryUseCase + Send + Sync + 'static>,

    pub follow_use_case: Box<dyn FollowUseCase + Send + Sync + 'static>,
    pub block_use_case: Box<dyn BlockUseCase + Send + Sync + 'static>,
    pub social_distance_use_case: Box<dyn SocialDistanceUseCase + Send + Sync + 'static>,

    pub game_recommendation_use_case: Box<dyn GameRecommendationUseCase + Send + Sync + 'static>,
    pub topic_recommendation_use_case:
        Box<dyn TopicRecommendationUseCase + Send + Sync + 'static>,

    pub topic_use_case: Box<dyn TopicUseCase + Send + Sync + 'static>,
    pub comment_use_case: Box<dyn CommentUseCase + Send + Sync + 'static>,
    pub search_use_case: Box<dyn SearchUseCase + Send + Sync + 'static>,

    pub leaderboard_query_use_case: Box<dyn LeaderboardQueryUseCase + Send + Sync + 'static>,
    pub leaderboard_record_use_case: Box<dyn LeaderboardRecordUseCase + Send + Sync + 'static>,
    pub sync_all_use_case: Box<dyn SyncAllUseCase + Send + Sync + 'static>,
}

pub fn build_application<
    PR: PlayerRepository + Send + Sync + 'static,
    GR: GameRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
    FR: ForumRepository + Send + Sync + 'static,
    A: AnalyticsRepository + Send + Sync + 'static,
    AV: AvatarStoragePort + Send + Sync + 'static,
    H: PasswordHasher + Send + Sync + 'static,
>(
    player_repository: Arc<PR>,
    game_repository: Arc<GR>,
    rating_repository: Arc<RR>,
    social_repository: Arc<SR>,
    forum_repository: Arc<FR>,
    analytics_repository: Arc<A>,
    avatar_storage: Arc<AV>,
    password_hasher: Arc<H>,
    max_frontier: usize,
) -> Application {
    let projection = Arc::new(LeaderboardProjectionServiceImpl::new(
        analytics_repository.clone(),
        rating_repository.clone(),
    ));

    Application {
        signup_use_case: Box::new(SignupUseCaseImpl::new(
            player_repository.clone(),
            password_hasher.clone(),
            projection.clone(),
        )),
        login_use_case: Box::new(LoginUseCaseImpl::new(
            player_repository.clone(),
            password_hasher.clone(),
        )),
        get_player_use_case: Box::new(GetPlayerUseCaseImpl::new(player_repository.clone())),
        get_profile_use_case: Box::new(GetProfileUseCaseImpl::new(
            player_repository.clone(),
            game_repository.clone(),
            rating_repository.clone(),
            social_repository.clone(),
        )),
        change_password_use_case: Box::new(ChangePasswordUseCaseImpl::new(
            player_repository.clone(),
            password_hasher.clone(),
        )),
        avatar_use_case: Box::new(AvatarUseCaseImpl::new(
            player_repository.clone(),
            avatar_storage.clone(),
        )),

        game_catalog_use_case: Box::new(GameCatalogUseCaseImpl::new(game_repository.clone())),
        library_use_case: Box::new(LibraryUseCaseImpl::new(
            player_repository.clone(),
            game_repository.clone(),
            rating_repository.clone(),
            projection.clone(),
        )),

        follow_use_case: Box::new(FollowUseCaseImpl::new(
            player_repository.clone(),
            social_repository.clone(),
            projection.clone(),
        )),
        block_use_case: Box::new(BlockUseCaseImpl::new(
            player_repository.clone(),
            social_repository.clone(),
        )),
        social_distance_use_case: Box::new(SocialDistanceUseCaseImpl::new(
            social_repository.clone(),
            rating_repository.clone(),
            max_frontier,
        )),

        game_recommendation_use_case: Box::new(GameRecommendationUseCaseImpl::new(
            game_repository.clone(),
            rating_repository.clone(),
            social_repository.clone(),
            max_frontier,
        )),
        topic_recommendation_use_case: Box::new(TopicRecommendationUseCaseImpl::new(
            forum_repository.clone(),
            rating_repository.clone(),
            social_repository.clone(),
        )),

        topic_use_case: Box::new(TopicUseCaseImpl::new(
            forum_repository.clone(),
            player_repository.clone(),
            projection.clone(),
        )),
        comment_use_case: Box::new(CommentUseCaseImpl::new(
            forum_repository.clone(),
            player_repository.clone(),
            projection.clone(),
        )),
        search_use_case: Box::new(SearchUseCaseImpl::new(
            player_repository.clone(),
            rating_repository.clone(),
            social_repository.clone(),
            forum_repository.clone(),
        )),

        leaderboard_query_use_case: Box::new(LeaderboardQueryUseCaseImpl::new(
            analytics_repository.clone(),
            player_repository.clone(),
            rating_repository.clone(),
            social_repository.clone(),
            forum_repository.clone(),
        )),
        leaderboard_record_use_case: Box::new(LeaderboardRecordUseCaseImpl::new(
            analytics_repository.clone(),
        )),
        sync_all_use_case: Box::new(SyncAllUseCaseImpl::new(
            analytics_repository,
            player_repository,
            rating_repository,
        )),
    }
}
