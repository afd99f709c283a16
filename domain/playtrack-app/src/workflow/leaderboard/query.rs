use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};

use crate::{
    domain::{
        GameTitle, Username,
        analytics::{AnalyticsRepository, PlayerGameStats},
        forum::ForumRepository,
        player::PlayerRepository,
        rating::RatingRepository,
        social::SocialRepository,
    },
    workflow::leaderboard::{
        DEFAULT_GAME_LEADERBOARD_LIMIT, GLOBAL_LEADERBOARD_LIMIT, LeaderboardError,
    },
};

#[derive(Clone, Debug, PartialEq)]
pub struct RankedPlayer {
    pub rank: usize,
    pub username: Username,
    pub avatar: Option<String>,
    pub total_score: i64,
    pub games_played: u32,
    pub average_rating: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedGameScore {
    pub rank: usize,
    pub game_title: GameTitle,
    pub username: Username,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardSummary {
    pub total_ratings: u64,
    pub total_topics: u64,
    pub total_comments: u64,
    pub total_connections: u64,
    pub total_time_active: u64,
}

#[async_trait::async_trait]
pub trait LeaderboardQueryUseCase {
    async fn global_leaderboard(&self) -> Result<Vec<RankedPlayer>, LeaderboardError>;
    async fn game_leaderboard(
        &self,
        game_title: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RankedGameScore>, LeaderboardError>;
    async fn player_stats(&self, username: &str) -> Result<Vec<PlayerGameStats>, LeaderboardError>;
    /// Counts taken from the graph store; available without the analytics store.
    async fn summary(&self) -> Result<LeaderboardSummary, LeaderboardError>;
}

pub struct LeaderboardQueryUseCaseImpl<
    A: AnalyticsRepository,
    PR: PlayerRepository,
    RR: RatingRepository,
    SR: SocialRepository,
    FR: ForumRepository,
> {
    analytics: Arc<A>,
    player_repository: Arc<PR>,
    rating_repository: Arc<RR>,
    social_repository: Arc<SR>,
    forum_repository: Arc<FR>,
}

impl<A, PR, RR, SR, FR> LeaderboardQueryUseCaseImpl<A, PR, RR, SR, FR>
where
    A: AnalyticsRepository,
    PR: PlayerRepository,
    RR: RatingRepository,
    SR: SocialRepository,
    FR: ForumRepository,
{
    pub fn new(
        analytics: Arc<A>,
        player_repository: Arc<PR>,
        rating_repository: Arc<RR>,
        social_repository: Arc<SR>,
        forum_repository: Arc<FR>,
    ) -> Self {
        Self {
            analytics,
            player_repository,
            rating_repository,
            social_repository,
            forum_repository,
        }
    }
}

#[async_trait::async_trait]
impl<A, PR, RR, SR, FR> LeaderboardQueryUseCase for LeaderboardQueryUseCaseImpl<A, PR, RR, SR, FR>
where
    A: AnalyticsRepository + Send + Sync + 'static,
    PR: PlayerRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
    FR: ForumRepository + Send + Sync + 'static,
{
    async fn global_leaderboard(&self) -> Result<Vec<RankedPlayer>, LeaderboardError> {
        let mut rows = self.analytics.top_players(GLOBAL_LEADERBOARD_LIMIT).await?;
        rows.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then_with(|| a.username.cmp(&b.username))
        });

        let usernames: Vec<Username> = rows.iter().map(|r| r.username.clone()).collect();
        let avatars: HashMap<Username, Option<String>> = self
            .player_repository
            .get_players(&usernames)
            .await?
            .into_iter()
            .map(|p| (p.username, p.avatar))
            .collect();

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| RankedPlayer {
                rank: index + 1,
                avatar: avatars.get(&row.username).cloned().flatten(),
                username: row.username,
                total_score: row.total_score,
                games_played: row.games_played,
                average_rating: row.average_rating,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn game_leaderboard(
        &self,
        game_title: &str,
        limit: Option<usize>,
    ) -> Result<Vec<RankedGameScore>, LeaderboardError> {
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_GAME_LEADERBOARD_LIMIT);
        let rows = self.analytics.game_leaderboard(game_title, limit).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| RankedGameScore {
                rank: index + 1,
                game_title: row.game_title,
                username: row.username,
                score: row.score,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn player_stats(&self, username: &str) -> Result<Vec<PlayerGameStats>, LeaderboardError> {
        Ok(self.analytics.get_player_stats(username).await?)
    }

    async fn summary(&self) -> Result<LeaderboardSummary, LeaderboardError> {
        Ok(LeaderboardSummary {
            total_ratings: self.rating_repository.count_ratings().await?,
            total_topics: self.forum_repository.count_topics().await?,
            total_comments: self.forum_repository.count_comments().await?,
            total_connections: self.social_repository.count_follows().await?,
            total_time_active: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::analytics::{ActivityRecord, GameScoreEntry},
        testing::{MockAnalytics, MockGraph},
    };

    fn use_case(
        analytics: MockAnalytics,
        graph: &MockGraph,
    ) -> (
        Arc<MockAnalytics>,
        LeaderboardQueryUseCaseImpl<MockAnalytics, MockGraph, MockGraph, MockGraph, MockGraph>,
    ) {
        let analytics = Arc::new(analytics);
        let graph = Arc::new(graph.clone());
        let use_case = LeaderboardQueryUseCaseImpl::new(
            analytics.clone(),
            graph.clone(),
            graph.clone(),
            graph.clone(),
            graph,
        );
        (analytics, use_case)
    }

    async fn award(analytics: &MockAnalytics, username: &str, points: i64) {
        analytics
            .award_points(ActivityRecord {
                username: username.to_string(),
                activity_type: "custom".to_string(),
                points,
                recorded_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_global_leaderboard_ranks_and_avatars() {
        let graph = MockGraph::default();
        graph.add_player("alice");
        graph.add_player("bob");
        graph.set_avatar("bob", "/uploads/bob.png".to_string()).await.unwrap();
        let (analytics, use_case) = use_case(MockAnalytics::ready(), &graph);
        award(&analytics, "alice", 50).await;
        award(&analytics, "bob", 150).await;

        let board = use_case.global_leaderboard().await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!((board[0].rank, board[0].username.as_str()), (1, "bob"));
        assert_eq!(board[0].avatar.as_deref(), Some("/uploads/bob.png"));
        assert_eq!((board[1].rank, board[1].total_score), (2, 50));
        assert_eq!(board[1].avatar, None);
    }

    #[tokio::test]
    async fn test_game_leaderboard_ordering() {
        let graph = MockGraph::default();
        let (analytics, use_case) = use_case(MockAnalytics::ready(), &graph);
        for (username, score) in [("carol", 3), ("bob", 5), ("alice", 5)] {
            analytics
                .upsert_game_score(GameScoreEntry {
                    game_title: "Chess".to_string(),
                    username: username.to_string(),
                    score,
                    updated_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        let board = use_case.game_leaderboard("Chess", None).await.unwrap();
        let order: Vec<(usize, &str)> = board.iter().map(|r| (r.rank, r.username.as_str())).collect();
        assert_eq!(order, vec![(1, "alice"), (2, "bob"), (3, "carol")]);
        assert_eq!(use_case.game_leaderboard("Chess", Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let graph = MockGraph::default();
        graph.rate("alice", "Chess", 4);
        graph.add_follow("alice", "bob");
        let (_, use_case) = use_case(MockAnalytics::unavailable(), &graph);
        assert_eq!(
            use_case.global_leaderboard().await,
            Err(LeaderboardError::Unavailable)
        );
        assert_eq!(
            use_case.player_stats("alice").await,
            Err(LeaderboardError::Unavailable)
        );

        let summary = use_case.summary().await.unwrap();
        assert_eq!(summary.total_ratings, 1);
        assert_eq!(summary.total_connections, 1);
        assert_eq!(summary.total_time_active, 0);
    }
}
