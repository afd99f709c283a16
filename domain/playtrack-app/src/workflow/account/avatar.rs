use std::sync::Arc;

use crate::{
    domain::{
        RepoRetrieveError, RepoUpdateError,
        avatar::{AvatarError, AvatarImage, AvatarUpload},
        player::PlayerRepository,
    },
    ports::avatar_storage::AvatarStoragePort,
};

#[async_trait::async_trait]
pub trait AvatarUseCase {
    /// Stores the image and points the player's avatar at it. Returns the avatar URL.
    async fn upload_avatar(
        &self,
        username: &str,
        upload: AvatarUpload,
    ) -> Result<String, AvatarUseCaseError>;
    async fn get_avatar(&self, username: &str) -> Result<Option<String>, AvatarUseCaseError>;
}

#[derive(Debug, PartialEq)]
pub enum AvatarUseCaseError {
    Invalid(AvatarError),
    PlayerNotFound,
    Internal,
}

pub struct AvatarUseCaseImpl<PR: PlayerRepository, AV: AvatarStoragePort> {
    player_repository: Arc<PR>,
    avatar_storage: Arc<AV>,
}

impl<PR: PlayerRepository, AV: AvatarStoragePort> AvatarUseCaseImpl<PR, AV> {
    pub fn new(player_repository: Arc<PR>, avatar_storage: Arc<AV>) -> Self {
        Self {
            player_repository,
            avatar_storage,
        }
    }
}

#[async_trait::async_trait]
impl<PR, AV> AvatarUseCase for AvatarUseCaseImpl<PR, AV>
where
    PR: PlayerRepository + Send + Sync + 'static,
    AV: AvatarStoragePort + Send + Sync + 'static,
{
    async fn upload_avatar(
        &self,
        username: &str,
        upload: AvatarUpload,
    ) -> Result<String, AvatarUseCaseError> {
        let image = AvatarImage::from_upload(upload).map_err(AvatarUseCaseError::Invalid)?;
        self.get_avatar(username).await?;

        let url = self.avatar_storage.store_avatar(image).await.map_err(|e| {
            log::error!("Avatar upload for {} failed: {}", username, e);
            AvatarUseCaseError::Internal
        })?;

        match self.player_repository.set_avatar(username, url.clone()).await {
            Ok(()) => {
                log::info!("Avatar for {} set to {}", username, url);
                Ok(url)
            }
            Err(RepoUpdateError::NotFound) => Err(AvatarUseCaseError::PlayerNotFound),
            Err(RepoUpdateError::StorageError(e)) => {
                log::error!("Failed to set avatar for {}: {}", username, e);
                Err(AvatarUseCaseError::Internal)
            }
        }
    }

    async fn get_avatar(&self, username: &str) -> Result<Option<String>, AvatarUseCaseError> {
        match self.player_repository.get_player(username).await {
            Ok(player) => Ok(player.avatar),
            Err(RepoRetrieveError::NotFound) => Err(AvatarUseCaseError::PlayerNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve player {}: {}", username, e);
                Err(AvatarUseCaseError::Internal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAvatarStorage, MockGraph};

    fn png() -> AvatarUpload {
        AvatarUpload {
            file_name: Some("me.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[tokio::test]
    async fn test_upload_sets_avatar() {
        let graph = MockGraph::default();
        graph.add_player("alice");
        let storage = MockAvatarStorage::default();
        let use_case = AvatarUseCaseImpl::new(Arc::new(graph), Arc::new(storage.clone()));

        assert_eq!(use_case.get_avatar("alice").await, Ok(None));
        let url = use_case.upload_avatar("alice", png()).await.unwrap();
        assert_eq!(url, "/uploads/avatar-1.png");
        assert_eq!(use_case.get_avatar("alice").await, Ok(Some(url)));
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let graph = MockGraph::default();
        graph.add_player("alice");
        let storage = MockAvatarStorage::default();
        let use_case = AvatarUseCaseImpl::new(Arc::new(graph), Arc::new(storage.clone()));

        let mut text = png();
        text.content_type = Some("text/plain".to_string());
        assert_eq!(
            use_case.upload_avatar("alice", text).await,
            Err(AvatarUseCaseError::Invalid(AvatarError::UnsupportedType))
        );
        assert_eq!(
            use_case.upload_avatar("nobody", png()).await,
            Err(AvatarUseCaseError::PlayerNotFound)
        );
        assert!(storage.stored.lock().unwrap().is_empty());
    }
}
