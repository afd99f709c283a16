use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        Username,
        analytics::{ActivityRecord, AnalyticsRepository, GameScoreEntry, PlayerGameStats},
    },
    workflow::leaderboard::LeaderboardError,
};

const DEFAULT_LEVEL: i32 = 1;

#[derive(Clone, Debug, Default)]
pub struct PlayerStatsUpdate {
    pub username: Username,
    pub game_title: String,
    pub playtime: Option<i64>,
    pub achievements_count: Option<i32>,
    pub level: Option<i32>,
}

/// Direct writes into the analytics store, bypassing the graph store.
#[async_trait::async_trait]
pub trait LeaderboardRecordUseCase {
    async fn record_game_score(
        &self,
        game_title: &str,
        username: &str,
        score: i64,
    ) -> Result<(), LeaderboardError>;
    async fn record_player_stats(&self, update: PlayerStatsUpdate) -> Result<(), LeaderboardError>;
    /// Returns the player's new total score.
    async fn record_activity(
        &self,
        username: &str,
        activity_type: &str,
        points: i64,
    ) -> Result<i64, LeaderboardError>;
}

pub struct LeaderboardRecordUseCaseImpl<A: AnalyticsRepository> {
    analytics: Arc<A>,
}

impl<A: AnalyticsRepository> LeaderboardRecordUseCaseImpl<A> {
    pub fn new(analytics: Arc<A>) -> Self {
        Self { analytics }
    }
}

fn require(values: &[&str]) -> Result<(), LeaderboardError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        Err(LeaderboardError::MissingFields)
    } else {
        Ok(())
    }
}

#[async_trait::async_trait]
impl<A: AnalyticsRepository + Send + Sync + 'static> LeaderboardRecordUseCase
    for LeaderboardRecordUseCaseImpl<A>
{
    async fn record_game_score(
        &self,
        game_title: &str,
        username: &str,
        score: i64,
    ) -> Result<(), LeaderboardError> {
        require(&[game_title, username])?;
        self.analytics
            .upsert_game_score(GameScoreEntry {
                game_title: game_title.to_string(),
                username: username.to_string(),
                score,
                updated_at: Utc::now(),
            })
            .await?;
        Ok(())
    }

    async fn record_player_stats(&self, update: PlayerStatsUpdate) -> Result<(), LeaderboardError> {
        require(&[update.username.as_str(), update.game_title.as_str()])?;
        self.analytics
            .upsert_player_stats(PlayerGameStats {
                username: update.username,
                game_title: update.game_title,
                total_playtime: update.playtime.unwrap_or(0),
                achievements_count: update.achievements_count.unwrap_or(0),
                level: update.level.unwrap_or(DEFAULT_LEVEL),
                last_played: Utc::now(),
            })
            .await?;
        Ok(())
    }

    async fn record_activity(
        &self,
        username: &str,
        activity_type: &str,
        points: i64,
    ) -> Result<i64, LeaderboardError> {
        require(&[username, activity_type])?;
        let total = self
            .analytics
            .award_points(ActivityRecord {
                username: username.to_string(),
                activity_type: activity_type.to_string(),
                points,
                recorded_at: Utc::now(),
            })
            .await?;
        log::info!(
            "Activity tracked: {} earned {} points for {} (total: {})",
            username,
            points,
            activity_type,
            total
        );
        Ok(total)
    }
}
