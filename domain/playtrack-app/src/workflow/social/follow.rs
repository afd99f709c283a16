use std::sync::Arc;

use crate::{
    domain::{
        RepoError, RepoRetrieveError, analytics::ActivityKind, player::PlayerRepository,
        social::SocialRepository,
    },
    services::projection::LeaderboardProjectionService,
};

#[async_trait::async_trait]
pub trait FollowUseCase {
    async fn follow(&self, follower: &str, followee: &str) -> Result<(), FollowError>;
    async fn unfollow(&self, follower: &str, followee: &str) -> Result<(), FollowError>;
    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, FollowError>;
}

#[derive(Debug, PartialEq)]
pub enum FollowError {
    MissingTarget,
    SelfFollow,
    PlayerNotFound,
    Internal,
}

impl From<RepoError> for FollowError {
    fn from(e: RepoError) -> Self {
        log::error!("Follow graph update failed: {}", e);
        FollowError::Internal
    }
}

pub struct FollowUseCaseImpl<
    PR: PlayerRepository,
    SR: SocialRepository,
    P: LeaderboardProjectionService,
> {
    player_repository: Arc<PR>,
    social_repository: Arc<SR>,
    projection: Arc<P>,
}

impl<PR: PlayerRepository, SR: SocialRepository, P: LeaderboardProjectionService>
    FollowUseCaseImpl<PR, SR, P>
{
    pub fn new(player_repository: Arc<PR>, social_repository: Arc<SR>, projection: Arc<P>) -> Self {
        Self {
            player_repository,
            social_repository,
            projection,
        }
    }
}

/// `NotFound` unless both players exist.
pub(crate) async fn ensure_both_exist<PR: PlayerRepository + ?Sized>(
    player_repository: &PR,
    first: &str,
    second: &str,
) -> Result<(), RepoRetrieveError> {
    futures::try_join!(
        player_repository.get_player(first),
        player_repository.get_player(second)
    )?;
    Ok(())
}

#[async_trait::async_trait]
impl<PR, SR, P> FollowUseCase for FollowUseCaseImpl<PR, SR, P>
where
    PR: PlayerRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
    P: LeaderboardProjectionService + Send + Sync + 'static,
{
    async fn follow(&self, follower: &str, followee: &str) -> Result<(), FollowError> {
        if followee.trim().is_empty() {
            return Err(FollowError::MissingTarget);
        }
        if follower == followee {
            return Err(FollowError::SelfFollow);
        }
        match ensure_both_exist(self.player_repository.as_ref(), follower, followee).await {
            Ok(()) => {}
            Err(RepoRetrieveError::NotFound) => return Err(FollowError::PlayerNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to look up {} or {}: {}", follower, followee, e);
                return Err(FollowError::Internal);
            }
        }

        self.social_repository.follow(follower, followee).await?;
        log::info!("{} now follows {}", follower, followee);

        self.projection.player_changed(follower);
        self.projection.award(follower, ActivityKind::AddFriend.into());
        Ok(())
    }

    async fn unfollow(&self, follower: &str, followee: &str) -> Result<(), FollowError> {
        if followee.trim().is_empty() {
            return Err(FollowError::MissingTarget);
        }
        if self.social_repository.unfollow(follower, followee).await? {
            log::info!("{} unfollowed {}", follower, followee);
        }
        self.projection.player_changed(follower);
        Ok(())
    }

    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, FollowError> {
        Ok(self.social_repository.is_following(follower, followee).await?)
    }
}
