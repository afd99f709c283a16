use crate::domain::avatar::AvatarImage;

#[async_trait::async_trait]
pub trait AvatarStoragePort {
    /// Persists the image and returns the public URL it is served under.
    async fn store_avatar(&self, image: AvatarImage) -> Result<String, AvatarStorageError>;
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to store avatar: {0}")]
pub struct AvatarStorageError(pub String);
