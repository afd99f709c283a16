use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::domain::{
    GameTitle, RepoError, Username,
    game::GameRepository,
    rating::{LibraryEntry, RatingRepository},
    recommendation::{
        RECOMMENDATION_LIMIT, RecommendationExclusions, RecommendationKind, find_similar_players,
        rank_candidate_games,
    },
    social::SocialRepository,
    social_distance::SocialDistanceTraversal,
};

const EXTENDED_DEPTH: u8 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct GameRecommendation {
    pub title: GameTitle,
    pub genre: Option<String>,
    pub average_score: f64,
    /// Friends, reachable players or similar players backing the recommendation.
    pub supporters: usize,
}

#[async_trait::async_trait]
pub trait GameRecommendationUseCase {
    /// Returns an empty list for unknown players.
    async fn recommend(
        &self,
        username: &str,
        kind: RecommendationKind,
    ) -> Result<Vec<GameRecommendation>, RecommendationError>;
}

#[derive(Debug, PartialEq)]
pub enum RecommendationError {
    RepositoryError,
}

impl From<RepoError> for RecommendationError {
    fn from(e: RepoError) -> Self {
        log::error!("Recommendation query failed: {}", e);
        RecommendationError::RepositoryError
    }
}

pub struct GameRecommendationUseCaseImpl<
    GR: GameRepository,
    RR: RatingRepository,
    SR: SocialRepository,
> {
    game_repository: Arc<GR>,
    rating_repository: Arc<RR>,
    social_repository: Arc<SR>,
    max_frontier: usize,
}

impl<GR: GameRepository, RR: RatingRepository, SR: SocialRepository>
    GameRecommendationUseCaseImpl<GR, RR, SR>
{
    pub fn new(
        game_repository: Arc<GR>,
        rating_repository: Arc<RR>,
        social_repository: Arc<SR>,
        max_frontier: usize,
    ) -> Self {
        Self {
            game_repository,
            rating_repository,
            social_repository,
            max_frontier,
        }
    }
}

impl<GR, RR, SR> GameRecommendationUseCaseImpl<GR, RR, SR>
where
    GR: GameRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
{
    async fn reachable_players(&self, username: &str) -> Result<Vec<Username>, RepoError> {
        let mut traversal =
            SocialDistanceTraversal::new(username.to_string(), EXTENDED_DEPTH, self.max_frontier);
        while let Some(frontier) = traversal.pending_frontier() {
            let edges = self.social_repository.get_outgoing_edges(frontier).await?;
            traversal.expand(edges);
        }
        Ok(traversal.discovered_players())
    }

    async fn cohort(
        &self,
        username: &str,
        kind: RecommendationKind,
        own_library: &[LibraryEntry],
        blocked: &HashSet<Username>,
    ) -> Result<Vec<Username>, RepoError> {
        match kind {
            RecommendationKind::Friends => self.social_repository.get_followees(username).await,
            RecommendationKind::Extended => self.reachable_players(username).await,
            RecommendationKind::Similar => {
                let rated: Vec<GameTitle> = own_library
                    .iter()
                    .filter(|e| e.score.is_some())
                    .map(|e| e.game_title.clone())
                    .collect();
                if rated.is_empty() {
                    return Ok(Vec::new());
                }
                let shared = self.rating_repository.get_ratings_for_games(&rated).await?;
                Ok(find_similar_players(username, own_library, &shared, blocked))
            }
        }
    }
}

#[async_trait::async_trait]
impl<GR, RR, SR> GameRecommendationUseCase for GameRecommendationUseCaseImpl<GR, RR, SR>
where
    GR: GameRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
{
    async fn recommend(
        &self,
        username: &str,
        kind: RecommendationKind,
    ) -> Result<Vec<GameRecommendation>, RecommendationError> {
        let own_library = self.rating_repository.get_library(username).await?;
        let blocked = self.social_repository.get_blocked(username).await?;
        let exclusions = RecommendationExclusions::new(&own_library, blocked);

        let cohort = self
            .cohort(username, kind, &own_library, &exclusions.blocked_players)
            .await?;
        if cohort.is_empty() {
            return Ok(Vec::new());
        }
        let cohort_ratings = self.rating_repository.get_libraries(&cohort).await?;
        let candidates =
            rank_candidate_games(username, &cohort_ratings, &exclusions, RECOMMENDATION_LIMIT);

        let titles: Vec<GameTitle> = candidates.iter().map(|c| c.title.clone()).collect();
        let genres: HashMap<GameTitle, Option<String>> = self
            .game_repository
            .get_games(&titles)
            .await?
            .into_iter()
            .map(|g| (g.title, g.genre))
            .collect();

        Ok(candidates
            .into_iter()
            .map(|c| GameRecommendation {
                genre: genres.get(&c.title).cloned().flatten(),
                title: c.title,
                average_score: c.average_score,
                supporters: c.supporters,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGraph;

    fn use_case(graph: &MockGraph) -> GameRecommendationUseCaseImpl<MockGraph, MockGraph, MockGraph> {
        let graph = Arc::new(graph.clone());
        GameRecommendationUseCaseImpl::new(graph.clone(), graph.clone(), graph, 1000)
    }

    fn titles(recommendations: &[GameRecommendation]) -> Vec<&str> {
        recommendations.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_friends_recommendations_exclude_owned_and_blocked() {
        let graph = MockGraph::default();
        for game in ["Chess", "Go", "Doom", "Tetris"] {
            graph.add_game(game);
        }
        graph.add_follow("alice", "bob");
        graph.add_follow("alice", "carol");
        graph.add_block("alice", "carol");
        graph.rate("alice", "Chess", 3);
        graph.rate("bob", "Chess", 5);
        graph.rate("bob", "Go", 4);
        graph.rate("bob", "Tetris", 2);
        graph.rate("carol", "Doom", 5);

        let result = use_case(&graph)
            .recommend("alice", RecommendationKind::Friends)
            .await
            .unwrap();
        assert_eq!(titles(&result), vec!["Go"]);
        assert_eq!(result[0].genre.as_deref(), Some("Strategy"));
        assert_eq!(result[0].supporters, 1);
    }

    #[tokio::test]
    async fn test_extended_reaches_two_hops_only() {
        let graph = MockGraph::default();
        graph.add_follow("alice", "bob");
        graph.add_follow("bob", "carol");
        graph.add_follow("carol", "dave");
        graph.rate("carol", "Go", 5);
        graph.rate("dave", "Doom", 5);

        let result = use_case(&graph)
            .recommend("alice", RecommendationKind::Extended)
            .await
            .unwrap();
        assert_eq!(titles(&result), vec!["Go"]);
    }

    #[tokio::test]
    async fn test_similar_requires_two_close_games() {
        let graph = MockGraph::default();
        graph.rate("alice", "Chess", 5);
        graph.rate("alice", "Go", 2);
        graph.rate("bob", "Chess", 4);
        graph.rate("bob", "Go", 3);
        graph.rate("bob", "Doom", 5);
        graph.rate("carol", "Chess", 5);
        graph.rate("carol", "Go", 5);
        graph.rate("carol", "Tetris", 5);

        let result = use_case(&graph)
            .recommend("alice", RecommendationKind::Similar)
            .await
            .unwrap();
        assert_eq!(titles(&result), vec!["Doom"]);
        assert!((result[0].average_score - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unknown_player_gets_nothing() {
        let graph = MockGraph::default();
        graph.rate("bob", "Chess", 5);
        let result = use_case(&graph)
            .recommend("nobody", RecommendationKind::Similar)
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
