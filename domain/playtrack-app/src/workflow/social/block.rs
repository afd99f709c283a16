use std::sync::Arc;

use crate::{
    domain::{RepoRetrieveError, player::PlayerRepository, social::SocialRepository},
    workflow::social::follow::ensure_both_exist,
};

#[async_trait::async_trait]
pub trait BlockUseCase {
    async fn block(&self, blocker: &str, blocked: &str) -> Result<(), BlockError>;
}

#[derive(Debug, PartialEq)]
pub enum BlockError {
    MissingTarget,
    PlayerNotFound,
    Internal,
}

pub struct BlockUseCaseImpl<PR: PlayerRepository, SR: SocialRepository> {
    player_repository: Arc<PR>,
    social_repository: Arc<SR>,
}

impl<PR: PlayerRepository, SR: SocialRepository> BlockUseCaseImpl<PR, SR> {
    pub fn new(player_repository: Arc<PR>, social_repository: Arc<SR>) -> Self {
        Self {
            player_repository,
            social_repository,
        }
    }
}

#[async_trait::async_trait]
impl<PR, SR> BlockUseCase for BlockUseCaseImpl<PR, SR>
where
    PR: PlayerRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
{
    async fn block(&self, blocker: &str, blocked: &str) -> Result<(), BlockError> {
        if blocked.trim().is_empty() {
            return Err(BlockError::MissingTarget);
        }
        match ensure_both_exist(self.player_repository.as_ref(), blocker, blocked).await {
            Ok(()) => {}
            Err(RepoRetrieveError::NotFound) => return Err(BlockError::PlayerNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to look up {} or {}: {}", blocker, blocked, e);
                return Err(BlockError::Internal);
            }
        }
        self.social_repository
            .block(blocker, blocked)
            .await
            .map_err(|e| {
                log::error!("Failed to store block {} -> {}: {}", blocker, blocked, e);
                BlockError::Internal
            })?;
        log::info!("{} blocked {}", blocker, blocked);
        Ok(())
    }
}
