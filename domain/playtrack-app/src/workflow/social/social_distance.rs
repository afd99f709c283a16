use std::{collections::HashSet, sync::Arc};

use crate::domain::{
    RepoError, Username,
    rating::RatingRepository,
    social::SocialRepository,
    social_distance::{MAX_DEPTH, SocialDistance, SocialDistanceTraversal},
};

#[async_trait::async_trait]
pub trait SocialDistanceUseCase {
    /// Players within three FOLLOWS hops of `origin` who have `game_title` in their library.
    async fn query(
        &self,
        origin: &str,
        game_title: &str,
    ) -> Result<SocialDistance, SocialDistanceError>;
}

#[derive(Debug, PartialEq)]
pub enum SocialDistanceError {
    MissingOrigin,
    MissingGame,
    RepositoryError,
}

impl From<RepoError> for SocialDistanceError {
    fn from(e: RepoError) -> Self {
        log::error!("Social distance query failed: {}", e);
        SocialDistanceError::RepositoryError
    }
}

pub struct SocialDistanceUseCaseImpl<SR: SocialRepository, RR: RatingRepository> {
    social_repository: Arc<SR>,
    rating_repository: Arc<RR>,
    max_frontier: usize,
}

impl<SR: SocialRepository, RR: RatingRepository> SocialDistanceUseCaseImpl<SR, RR> {
    pub fn new(social_repository: Arc<SR>, rating_repository: Arc<RR>, max_frontier: usize) -> Self {
        Self {
            social_repository,
            rating_repository,
            max_frontier,
        }
    }
}

#[async_trait::async_trait]
impl<SR, RR> SocialDistanceUseCase for SocialDistanceUseCaseImpl<SR, RR>
where
    SR: SocialRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
{
    async fn query(
        &self,
        origin: &str,
        game_title: &str,
    ) -> Result<SocialDistance, SocialDistanceError> {
        let origin = origin.trim();
        let game_title = game_title.trim();
        if origin.is_empty() {
            return Err(SocialDistanceError::MissingOrigin);
        }
        if game_title.is_empty() {
            return Err(SocialDistanceError::MissingGame);
        }

        let mut traversal =
            SocialDistanceTraversal::new(origin.to_string(), MAX_DEPTH, self.max_frontier);
        while let Some(frontier) = traversal.pending_frontier() {
            let edges = self.social_repository.get_outgoing_edges(frontier).await?;
            traversal.expand(edges);
        }

        let discovered = traversal.discovered_players();
        let raters: HashSet<Username> = if discovered.is_empty() {
            HashSet::new()
        } else {
            self.rating_repository
                .players_with_game(&discovered, game_title)
                .await?
                .into_iter()
                .collect()
        };

        let outcome = traversal.finish(&raters);
        if outcome.is_empty() {
            return Ok(outcome.with_edges(Vec::new()));
        }
        let edges = self
            .social_repository
            .get_outgoing_edges(&outcome.members())
            .await?;
        let result = outcome.with_edges(edges);
        log::debug!(
            "Social distance {} / {}: {} connections, {} edges{}",
            origin,
            game_title,
            result.connections.len(),
            result.edges.len(),
            if result.truncated { " (truncated)" } else { "" }
        );
        Ok(result)
    }
}
