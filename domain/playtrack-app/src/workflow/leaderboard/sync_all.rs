use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        analytics::{AnalyticsError, AnalyticsRepository, GameScoreEntry},
        player::PlayerRepository,
        rating::RatingRepository,
    },
    services::projection::{ProjectionError, sync_player_aggregate},
    workflow::leaderboard::LeaderboardError,
};

#[async_trait::async_trait]
pub trait SyncAllUseCase {
    /// Rebuilds every player's aggregate and game rows from the graph store.
    /// Returns the number of players synced.
    async fn sync_all(&self) -> Result<usize, LeaderboardError>;
}

pub struct SyncAllUseCaseImpl<A: AnalyticsRepository, PR: PlayerRepository, RR: RatingRepository> {
    analytics: Arc<A>,
    player_repository: Arc<PR>,
    rating_repository: Arc<RR>,
}

impl<A: AnalyticsRepository, PR: PlayerRepository, RR: RatingRepository> SyncAllUseCaseImpl<A, PR, RR> {
    pub fn new(analytics: Arc<A>, player_repository: Arc<PR>, rating_repository: Arc<RR>) -> Self {
        Self {
            analytics,
            player_repository,
            rating_repository,
        }
    }
}

impl From<ProjectionError> for LeaderboardError {
    fn from(e: ProjectionError) -> Self {
        match e {
            ProjectionError::Analytics(e) => e.into(),
            ProjectionError::Repository(e) => {
                log::error!("Graph store error during sync: {}", e);
                LeaderboardError::Internal
            }
        }
    }
}

#[async_trait::async_trait]
impl<A, PR, RR> SyncAllUseCase for SyncAllUseCaseImpl<A, PR, RR>
where
    A: AnalyticsRepository + Send + Sync + 'static,
    PR: PlayerRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
{
    async fn sync_all(&self) -> Result<usize, LeaderboardError> {
        if !self.analytics.is_ready() {
            return Err(AnalyticsError::Unavailable.into());
        }
        let players = self.player_repository.list_players().await?;
        let mut synced = 0;
        for player in &players {
            sync_player_aggregate(
                self.analytics.as_ref(),
                self.rating_repository.as_ref(),
                &player.username,
            )
            .await?;

            let library = self.rating_repository.get_library(&player.username).await?;
            for entry in library {
                let Some(score) = entry.score else {
                    continue;
                };
                self.analytics
                    .upsert_game_score(GameScoreEntry {
                        game_title: entry.game_title,
                        username: entry.username,
                        score: score.value() as i64,
                        updated_at: Utc::now(),
                    })
                    .await?;
            }
            synced += 1;
        }
        log::info!("Synced {} players to the analytics store", synced);
        Ok(synced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::analytics::{ActivityKind, ActivityRecord},
        testing::{MockAnalytics, MockGraph},
    };

    #[tokio::test]
    async fn test_sync_all_rebuilds_rows_and_keeps_totals() {
        let graph = MockGraph::default();
        graph.add_player("alice");
        graph.add_player("bob");
        graph.rate("alice", "Chess", 4);
        graph.rate("alice", "Go", 2);
        graph.add_unscored("bob", "Chess");

        let analytics = Arc::new(MockAnalytics::ready());
        analytics
            .award_points(ActivityRecord {
                username: "alice".to_string(),
                activity_type: ActivityKind::RateGame.name().to_string(),
                points: ActivityKind::RateGame.points(),
                recorded_at: Utc::now(),
            })
            .await
            .unwrap();

        let graph = Arc::new(graph);
        let use_case = SyncAllUseCaseImpl::new(analytics.clone(), graph.clone(), graph);
        assert_eq!(use_case.sync_all().await, Ok(2));

        let alice = analytics.get_player_aggregate("alice").await.unwrap().unwrap();
        assert_eq!(alice.total_score, 100);
        assert_eq!(alice.games_played, 2);
        assert!((alice.average_rating - 3.0).abs() < f64::EPSILON);
        let bob = analytics.get_player_aggregate("bob").await.unwrap().unwrap();
        assert_eq!(bob.games_played, 0);
        assert_eq!(analytics.game_leaderboard("Chess", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_all_requires_store() {
        let graph = Arc::new(MockGraph::default());
        let use_case =
            SyncAllUseCaseImpl::new(Arc::new(MockAnalytics::unavailable()), graph.clone(), graph);
        assert_eq!(use_case.sync_all().await, Err(LeaderboardError::Unavailable));
    }
}
