use std::{collections::HashMap, sync::Arc};

use crate::domain::{
    RepoError, Username,
    forum::{ForumRepository, Topic},
    player::PlayerRepository,
    rating::RatingRepository,
    social::SocialRepository,
};

pub const MIN_QUERY_LEN: usize = 2;
pub const USER_SEARCH_LIMIT: usize = 50;
pub const TOPIC_SEARCH_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct UserSearchHit {
    pub username: Username,
    pub email: String,
    pub avatar: Option<String>,
    pub follows_count: usize,
    pub games_count: usize,
}

#[async_trait::async_trait]
pub trait SearchUseCase {
    async fn search_users(&self, query: &str) -> Result<Vec<UserSearchHit>, SearchError>;
    async fn search_topics(&self, query: &str) -> Result<Vec<Topic>, SearchError>;
}

#[derive(Debug, PartialEq)]
pub enum SearchError {
    RepositoryError,
}

impl From<RepoError> for SearchError {
    fn from(e: RepoError) -> Self {
        log::error!("Search failed: {}", e);
        SearchError::RepositoryError
    }
}

/// The trimmed query, or `None` when it is too short to run.
fn searchable(query: &str) -> Option<&str> {
    let query = query.trim();
    (query.chars().count() >= MIN_QUERY_LEN).then_some(query)
}

pub struct SearchUseCaseImpl<
    PR: PlayerRepository,
    RR: RatingRepository,
    SR: SocialRepository,
    FR: ForumRepository,
> {
    player_repository: Arc<PR>,
    rating_repository: Arc<RR>,
    social_repository: Arc<SR>,
    forum_repository: Arc<FR>,
}

impl<PR: PlayerRepository, RR: RatingRepository, SR: SocialRepository, FR: ForumRepository>
    SearchUseCaseImpl<PR, RR, SR, FR>
{
    pub fn new(
        player_repository: Arc<PR>,
        rating_repository: Arc<RR>,
        social_repository: Arc<SR>,
        forum_repository: Arc<FR>,
    ) -> Self {
        Self {
            player_repository,
            rating_repository,
            social_repository,
            forum_repository,
        }
    }
}

#[async_trait::async_trait]
impl<PR, RR, SR, FR> SearchUseCase for SearchUseCaseImpl<PR, RR, SR, FR>
where
    PR: PlayerRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
    FR: ForumRepository + Send + Sync + 'static,
{
    async fn search_users(&self, query: &str) -> Result<Vec<UserSearchHit>, SearchError> {
        let Some(query) = searchable(query) else {
            return Ok(Vec::new());
        };
        let mut players = self
            .player_repository
            .search_players(query, USER_SEARCH_LIMIT)
            .await?;
        players.sort_by(|a, b| a.username.cmp(&b.username));
        if players.is_empty() {
            return Ok(Vec::new());
        }

        let usernames: Vec<Username> = players.iter().map(|p| p.username.clone()).collect();
        let mut follows: HashMap<Username, usize> = HashMap::new();
        for edge in self.social_repository.get_outgoing_edges(&usernames).await? {
            *follows.entry(edge.from).or_default() += 1;
        }
        let mut games: HashMap<Username, usize> = HashMap::new();
        for entry in self.rating_repository.get_libraries(&usernames).await? {
            *games.entry(entry.username).or_default() += 1;
        }

        Ok(players
            .into_iter()
            .map(|p| UserSearchHit {
                follows_count: follows.get(&p.username).copied().unwrap_or(0),
                games_count: games.get(&p.username).copied().unwrap_or(0),
                username: p.username,
                email: p.email,
                avatar: p.avatar,
            })
            .collect())
    }

    async fn search_topics(&self, query: &str) -> Result<Vec<Topic>, SearchError> {
        let Some(query) = searchable(query) else {
            return Ok(Vec::new());
        };
        Ok(self
            .forum_repository
            .search_topics(query, TOPIC_SEARCH_LIMIT)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        domain::{TopicId, forum::DEFAULT_CATEGORY},
        testing::MockGraph,
    };

    fn use_case(graph: &MockGraph) -> SearchUseCaseImpl<MockGraph, MockGraph, MockGraph, MockGraph> {
        let graph = Arc::new(graph.clone());
        SearchUseCaseImpl::new(graph.clone(), graph.clone(), graph.clone(), graph)
    }

    #[tokio::test]
    async fn test_short_queries_return_nothing() {
        let graph = MockGraph::default();
        graph.add_player("al");
        let use_case = use_case(&graph);
        assert!(use_case.search_users("a").await.unwrap().is_empty());
        assert!(use_case.search_users("  a  ").await.unwrap().is_empty());
        assert!(use_case.search_topics("x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_search_counts() {
        let graph = MockGraph::default();
        for name in ["marko", "markus", "ana"] {
            graph.add_player(name);
        }
        graph.add_follow("markus", "ana");
        graph.add_follow("markus", "marko");
        graph.rate("marko", "Chess", 4);
        graph.add_unscored("marko", "Go");

        let hits = use_case(&graph).search_users(" MARK ").await.unwrap();
        let summary: Vec<(&str, usize, usize)> = hits
            .iter()
            .map(|h| (h.username.as_str(), h.follows_count, h.games_count))
            .collect();
        assert_eq!(summary, vec![("marko", 0, 2), ("markus", 2, 0)]);
    }

    #[tokio::test]
    async fn test_topic_search_matches_content() {
        let graph = MockGraph::default();
        let now = Utc::now();
        graph
            .create_topic(Topic {
                id: TopicId::new(),
                title: "Weekend plans".to_string(),
                content: "Anyone up for Chess?".to_string(),
                category: DEFAULT_CATEGORY.to_string(),
                author: "ana".to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let topics = use_case(&graph).search_topics("chess").await.unwrap();
        assert_eq!(topics.len(), 1);
    }
}
