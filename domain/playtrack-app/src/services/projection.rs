use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::domain::{
    analytics::{Activity, ActivityRecord, AnalyticsError, AnalyticsRepository, GameScoreEntry},
    rating::{RatingRepository, RatingSummary, Score},
};

/// Best-effort mirror of graph mutations into the analytics store.
///
/// Every method returns immediately; the write happens on a detached task and failures
/// are only logged. The returned handle may be dropped.
pub trait LeaderboardProjectionService {
    fn player_changed(&self, username: &str) -> JoinHandle<()>;
    fn game_rated(&self, username: &str, game_title: &str, score: Score) -> JoinHandle<()>;
    fn award(&self, username: &str, activity: Activity) -> JoinHandle<()>;
}

#[derive(Debug)]
pub enum ProjectionError {
    Analytics(AnalyticsError),
    Repository(String),
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::Analytics(e) => write!(f, "{}", e),
            ProjectionError::Repository(e) => write!(f, "graph store error: {}", e),
        }
    }
}

pub struct LeaderboardProjectionServiceImpl<A: AnalyticsRepository, R: RatingRepository> {
    analytics: Arc<A>,
    ratings: Arc<R>,
}

impl<A: AnalyticsRepository, R: RatingRepository> LeaderboardProjectionServiceImpl<A, R> {
    pub fn new(analytics: Arc<A>, ratings: Arc<R>) -> Self {
        Self { analytics, ratings }
    }
}

/// Recomputes games played and average rating for one player from the graph store.
pub async fn sync_player_aggregate<A, R>(
    analytics: &A,
    ratings: &R,
    username: &str,
) -> Result<RatingSummary, ProjectionError>
where
    A: AnalyticsRepository + ?Sized,
    R: RatingRepository + ?Sized,
{
    let library = ratings
        .get_library(username)
        .await
        .map_err(|e| ProjectionError::Repository(e.to_string()))?;
    let summary = RatingSummary::from_entries(&library);
    analytics
        .upsert_player_aggregate(
            username,
            summary.rated_games as u32,
            summary.average_score,
            Utc::now(),
        )
        .await
        .map_err(ProjectionError::Analytics)?;
    Ok(summary)
}

fn log_failure(action: &str, username: &str, error: &ProjectionError) {
    match error {
        ProjectionError::Analytics(AnalyticsError::Unavailable) => {
            log::warn!(
                "Skipping {} for {}: analytics store not available",
                action,
                username
            );
        }
        _ => log::error!("Failed to {} for {}: {}", action, username, error),
    }
}

impl<A, R> LeaderboardProjectionService for LeaderboardProjectionServiceImpl<A, R>
where
    A: AnalyticsRepository + Send + Sync + 'static,
    R: RatingRepository + Send + Sync + 'static,
{
    fn player_changed(&self, username: &str) -> JoinHandle<()> {
        let analytics = self.analytics.clone();
        let ratings = self.ratings.clone();
        let username = username.to_string();
        tokio::spawn(async move {
            match sync_player_aggregate(analytics.as_ref(), ratings.as_ref(), &username).await {
                Ok(summary) => log::debug!(
                    "Leaderboard aggregate for {} synced (games: {}, avg: {:.2})",
                    username,
                    summary.rated_games,
                    summary.average_score
                ),
                Err(e) => log_failure("sync leaderboard aggregate", &username, &e),
            }
        })
    }

    fn game_rated(&self, username: &str, game_title: &str, score: Score) -> JoinHandle<()> {
        let analytics = self.analytics.clone();
        let entry = GameScoreEntry {
            game_title: game_title.to_string(),
            username: username.to_string(),
            score: score.value() as i64,
            updated_at: Utc::now(),
        };
        tokio::spawn(async move {
            let username = entry.username.clone();
            if let Err(e) = analytics.upsert_game_score(entry).await {
                log_failure("sync game leaderboard", &username, &ProjectionError::Analytics(e));
            }
        })
    }

    fn award(&self, username: &str, activity: Activity) -> JoinHandle<()> {
        let analytics = self.analytics.clone();
        let record = ActivityRecord {
            username: username.to_string(),
            activity_type: activity.activity_type,
            points: activity.points,
            recorded_at: Utc::now(),
        };
        tokio::spawn(async move {
            let username = record.username.clone();
            let activity_type = record.activity_type.clone();
            let points = record.points;
            match analytics.award_points(record).await {
                Ok(total) => log::info!(
                    "Activity tracked: {} earned {} points for {} (total: {})",
                    username,
                    points,
                    activity_type,
                    total
                ),
                Err(e) => log_failure("track activity", &username, &ProjectionError::Analytics(e)),
            }
        })
    }
}
