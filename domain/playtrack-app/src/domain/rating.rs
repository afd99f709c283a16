use chrono::{DateTime, Utc};

use crate::domain::{GameTitle, RepoError, Username};

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Score must be an integer between 1 and 5")]
pub struct InvalidScore;

impl Score {
    pub fn new(value: i64) -> Result<Self, InvalidScore> {
        if (MIN_SCORE..=MAX_SCORE).contains(&value) {
            Ok(Score(value as u8))
        } else {
            Err(InvalidScore)
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// A RATED edge. Games added to a library without a score have `score == None`.
#[derive(Clone, Debug, PartialEq)]
pub struct LibraryEntry {
    pub username: Username,
    pub game_title: GameTitle,
    pub score: Option<Score>,
    pub rated_at: Option<DateTime<Utc>>,
    pub added_at: DateTime<Utc>,
}

impl LibraryEntry {
    /// The timestamp the profile view orders by.
    pub fn last_touched(&self) -> DateTime<Utc> {
        self.rated_at.unwrap_or(self.added_at)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RatingSummary {
    pub rated_games: usize,
    pub average_score: f64,
}

impl RatingSummary {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a LibraryEntry>) -> Self {
        let scores: Vec<u32> = entries
            .into_iter()
            .filter_map(|e| e.score.map(|s| s.value() as u32))
            .collect();
        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<u32>() as f64 / scores.len() as f64
        };
        Self {
            rated_games: scores.len(),
            average_score,
        }
    }
}

#[async_trait::async_trait]
pub trait RatingRepository {
    /// Creates a score-less RATED edge unless one already exists.
    async fn add_to_library(
        &self,
        username: &str,
        game_title: &str,
        added_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
    /// Upserts the RATED edge so that at most one exists per pair.
    async fn upsert_rating(
        &self,
        username: &str,
        game_title: &str,
        score: Score,
        rated_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
    async fn get_library(&self, username: &str) -> Result<Vec<LibraryEntry>, RepoError>;
    async fn get_libraries(&self, usernames: &[Username]) -> Result<Vec<LibraryEntry>, RepoError>;
    /// Scored entries for any of the given games.
    async fn get_ratings_for_games(
        &self,
        game_titles: &[GameTitle],
    ) -> Result<Vec<LibraryEntry>, RepoError>;
    /// The subset of `usernames` holding a RATED edge to the game, scored or not.
    async fn players_with_game(
        &self,
        usernames: &[Username],
        game_title: &str,
    ) -> Result<Vec<Username>, RepoError>;
    async fn add_favorite(
        &self,
        username: &str,
        game_title: &str,
        added_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;
    async fn get_favorites(&self, username: &str) -> Result<Vec<GameTitle>, RepoError>;
    async fn count_ratings(&self) -> Result<u64, RepoError>;
}
