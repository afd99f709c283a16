use std::path::{Path, PathBuf};

use playtrack_app::{
    domain::avatar::AvatarImage,
    ports::avatar_storage::{AvatarStorageError, AvatarStoragePort},
};
use rand::Rng;

pub const PUBLIC_PREFIX: &str = "/uploads";

/// Writes avatars into a local directory that the HTTP layer serves under [`PUBLIC_PREFIX`].
pub struct FsAvatarStorage {
    dir: PathBuf,
}

impl FsAvatarStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(extension: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
        format!("{}-{}.{}", millis, suffix, extension)
    }
}

#[async_trait::async_trait]
impl AvatarStoragePort for FsAvatarStorage {
    async fn store_avatar(&self, image: AvatarImage) -> Result<String, AvatarStorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AvatarStorageError(e.to_string()))?;

        let file_name = Self::file_name(&image.extension);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| AvatarStorageError(e.to_string()))?;
        log::debug!("Stored avatar at {}", path.display());

        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }
}
