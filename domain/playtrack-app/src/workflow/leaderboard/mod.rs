pub mod query;
pub mod record;
pub mod sync_all;

use crate::domain::{RepoError, analytics::AnalyticsError};

pub const GLOBAL_LEADERBOARD_LIMIT: usize = 100;
pub const DEFAULT_GAME_LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, PartialEq)]
pub enum LeaderboardError {
    /// The analytics store has not connected yet.
    Unavailable,
    MissingFields,
    Internal,
}

impl From<AnalyticsError> for LeaderboardError {
    fn from(e: AnalyticsError) -> Self {
        match e {
            AnalyticsError::Unavailable => LeaderboardError::Unavailable,
            AnalyticsError::StorageError(e) => {
                log::error!("Analytics store error: {}", e);
                LeaderboardError::Internal
            }
        }
    }
}

impl From<RepoError> for LeaderboardError {
    fn from(e: RepoError) -> Self {
        log::error!("Graph store error: {}", e);
        LeaderboardError::Internal
    }
}
