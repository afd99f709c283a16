use chrono::{DateTime, Utc};

use crate::domain::{GameTitle, Username};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    RateGame,
    AddGame,
    AddFriend,
    CreateTopic,
    Comment,
}

impl ActivityKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActivityKind::RateGame => "rate_game",
            ActivityKind::AddGame => "add_game",
            ActivityKind::AddFriend => "add_friend",
            ActivityKind::CreateTopic => "create_topic",
            ActivityKind::Comment => "comment",
        }
    }

    pub fn points(&self) -> i64 {
        match self {
            ActivityKind::RateGame => 100,
            ActivityKind::AddGame => 50,
            ActivityKind::AddFriend => 80,
            ActivityKind::CreateTopic => 150,
            ActivityKind::Comment => 75,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub activity_type: String,
    pub points: i64,
}

impl From<ActivityKind> for Activity {
    fn from(kind: ActivityKind) -> Self {
        Self {
            activity_type: kind.name().to_string(),
            points: kind.points(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityRecord {
    pub username: Username,
    pub activity_type: String,
    pub points: i64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardEntry {
    pub username: Username,
    pub total_score: i64,
    pub games_played: u32,
    pub average_rating: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameScoreEntry {
    pub game_title: GameTitle,
    pub username: Username,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerGameStats {
    pub username: Username,
    pub game_title: GameTitle,
    pub total_playtime: i64,
    pub achievements_count: i32,
    pub level: i32,
    pub last_played: DateTime<Utc>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics store is not available")]
    Unavailable,
    #[error("analytics storage error: {0}")]
    StorageError(String),
}

#[async_trait::async_trait]
pub trait AnalyticsRepository {
    fn is_ready(&self) -> bool;
    /// Writes games played and average rating, keeping the accumulated total score.
    async fn upsert_player_aggregate(
        &self,
        username: &str,
        games_played: u32,
        average_rating: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AnalyticsError>;
    async fn get_player_aggregate(
        &self,
        username: &str,
    ) -> Result<Option<LeaderboardEntry>, AnalyticsError>;
    /// Appends to the activity log and adds the points to the total. Returns the new total.
    async fn award_points(&self, record: ActivityRecord) -> Result<i64, AnalyticsError>;
    async fn get_activity_log(&self, username: &str) -> Result<Vec<ActivityRecord>, AnalyticsError>;
    /// Highest total score first.
    async fn top_players(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, AnalyticsError>;
    async fn upsert_game_score(&self, entry: GameScoreEntry) -> Result<(), AnalyticsError>;
    /// Highest score first, ties by username.
    async fn game_leaderboard(
        &self,
        game_title: &str,
        limit: usize,
    ) -> Result<Vec<GameScoreEntry>, AnalyticsError>;
    async fn upsert_player_stats(&self, stats: PlayerGameStats) -> Result<(), AnalyticsError>;
    async fn get_player_stats(&self, username: &str) -> Result<Vec<PlayerGameStats>, AnalyticsError>;
}
