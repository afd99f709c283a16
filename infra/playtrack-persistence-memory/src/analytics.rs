use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use playtrack_app::domain::{
    GameTitle, Username,
    analytics::{
        ActivityRecord, AnalyticsError, AnalyticsRepository, GameScoreEntry, LeaderboardEntry,
        PlayerGameStats,
    },
};

/// Analytics store held in process memory; always ready.
#[derive(Default)]
pub struct InMemoryAnalytics {
    global: DashMap<Username, LeaderboardEntry>,
    activity: Mutex<Vec<ActivityRecord>>,
    game_scores: DashMap<(GameTitle, Username), GameScoreEntry>,
    player_stats: DashMap<(Username, GameTitle), PlayerGameStats>,
}

impl InMemoryAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    fn empty_entry(username: &str, updated_at: DateTime<Utc>) -> LeaderboardEntry {
        LeaderboardEntry {
            username: username.to_string(),
            total_score: 0,
            games_played: 0,
            average_rating: 0.0,
            updated_at,
        }
    }
}

#[async_trait::async_trait]
impl AnalyticsRepository for InMemoryAnalytics {
    fn is_ready(&self) -> bool {
        true
    }

    async fn upsert_player_aggregate(
        &self,
        username: &str,
        games_played: u32,
        average_rating: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AnalyticsError> {
        let mut entry = self
            .global
            .entry(username.to_string())
            .or_insert_with(|| Self::empty_entry(username, updated_at));
        entry.games_played = games_played;
        entry.average_rating = average_rating;
        entry.updated_at = updated_at;
        Ok(())
    }

    async fn get_player_aggregate(
        &self,
        username: &str,
    ) -> Result<Option<LeaderboardEntry>, AnalyticsError> {
        Ok(self.global.get(username).map(|e| e.clone()))
    }

    async fn award_points(&self, record: ActivityRecord) -> Result<i64, AnalyticsError> {
        let total = {
            let mut entry = self
                .global
                .entry(record.username.clone())
                .or_insert_with(|| Self::empty_entry(&record.username, record.recorded_at));
            entry.total_score += record.points;
            entry.updated_at = record.recorded_at;
            entry.total_score
        };
        self.activity.lock().push(record);
        Ok(total)
    }

    async fn get_activity_log(&self, username: &str) -> Result<Vec<ActivityRecord>, AnalyticsError> {
        Ok(self
            .activity
            .lock()
            .iter()
            .filter(|r| r.username == username)
            .cloned()
            .collect())
    }

    async fn top_players(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, AnalyticsError> {
        let mut entries: Vec<LeaderboardEntry> =
            self.global.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then_with(|| a.username.cmp(&b.username))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    async fn upsert_game_score(&self, entry: GameScoreEntry) -> Result<(), AnalyticsError> {
        self.game_scores
            .insert((entry.game_title.clone(), entry.username.clone()), entry);
        Ok(())
    }

    async fn game_leaderboard(
        &self,
        game_title: &str,
        limit: usize,
    ) -> Result<Vec<GameScoreEntry>, AnalyticsError> {
        let mut entries: Vec<GameScoreEntry> = self
            .game_scores
            .iter()
            .filter(|e| e.key().0 == game_title)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.username.cmp(&b.username)));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn upsert_player_stats(&self, stats: PlayerGameStats) -> Result<(), AnalyticsError> {
        self.player_stats
            .insert((stats.username.clone(), stats.game_title.clone()), stats);
        Ok(())
    }

    async fn get_player_stats(&self, username: &str) -> Result<Vec<PlayerGameStats>, AnalyticsError> {
        let mut stats: Vec<PlayerGameStats> = self
            .player_stats
            .iter()
            .filter(|e| e.key().0 == username)
            .map(|e| e.value().clone())
            .collect();
        stats.sort_by(|a, b| a.game_title.cmp(&b.game_title));
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, points: i64) -> ActivityRecord {
        ActivityRecord {
            username: username.to_string(),
            activity_type: "rate_game".to_string(),
            points,
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_aggregate_keeps_total_score() {
        let analytics = InMemoryAnalytics::new();
        assert_eq!(analytics.award_points(record("alice", 100)).await.unwrap(), 100);
        assert_eq!(analytics.award_points(record("alice", 50)).await.unwrap(), 150);
        analytics
            .upsert_player_aggregate("alice", 3, 4.0, Utc::now())
            .await
            .unwrap();

        let entry = analytics.get_player_aggregate("alice").await.unwrap().unwrap();
        assert_eq!((entry.total_score, entry.games_played), (150, 3));
        assert_eq!(analytics.get_activity_log("alice").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_top_players_limit() {
        let analytics = InMemoryAnalytics::new();
        for (username, points) in [("a", 10), ("b", 30), ("c", 20)] {
            analytics.award_points(record(username, points)).await.unwrap();
        }
        let top = analytics.top_players(2).await.unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }
}
