use std::{collections::HashSet, sync::Arc};

use crate::domain::{
    PaginatedResponse, Pagination, RepoError, Username,
    forum::{ForumRepository, TopicSummary, game_keywords, topic_relevance},
    rating::RatingRepository,
    social::SocialRepository,
};

#[derive(Clone, Debug, PartialEq)]
pub struct RecommendedTopic {
    pub summary: TopicSummary,
    pub relevance: u32,
    pub is_recommended: bool,
}

#[async_trait::async_trait]
pub trait TopicRecommendationUseCase {
    /// Every topic, most relevant to the player first.
    async fn recommend_topics(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<RecommendedTopic>, TopicRecommendationError>;
}

#[derive(Debug, PartialEq)]
pub enum TopicRecommendationError {
    RepositoryError,
}

impl From<RepoError> for TopicRecommendationError {
    fn from(e: RepoError) -> Self {
        log::error!("Topic recommendation failed: {}", e);
        TopicRecommendationError::RepositoryError
    }
}

pub struct TopicRecommendationUseCaseImpl<
    FR: ForumRepository,
    RR: RatingRepository,
    SR: SocialRepository,
> {
    forum_repository: Arc<FR>,
    rating_repository: Arc<RR>,
    social_repository: Arc<SR>,
}

impl<FR: ForumRepository, RR: RatingRepository, SR: SocialRepository>
    TopicRecommendationUseCaseImpl<FR, RR, SR>
{
    pub fn new(
        forum_repository: Arc<FR>,
        rating_repository: Arc<RR>,
        social_repository: Arc<SR>,
    ) -> Self {
        Self {
            forum_repository,
            rating_repository,
            social_repository,
        }
    }
}

#[async_trait::async_trait]
impl<FR, RR, SR> TopicRecommendationUseCase for TopicRecommendationUseCaseImpl<FR, RR, SR>
where
    FR: ForumRepository + Send + Sync + 'static,
    RR: RatingRepository + Send + Sync + 'static,
    SR: SocialRepository + Send + Sync + 'static,
{
    async fn recommend_topics(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<RecommendedTopic>, TopicRecommendationError> {
        let library = self.rating_repository.get_library(username).await?;
        let keywords = game_keywords(library.iter().map(|e| e.game_title.as_str()));
        let followees: HashSet<Username> = self
            .social_repository
            .get_followees(username)
            .await?
            .into_iter()
            .collect();

        let mut topics: Vec<RecommendedTopic> = self
            .forum_repository
            .list_all_topics()
            .await?
            .into_iter()
            .map(|summary| {
                let relevance = topic_relevance(&summary.topic, &keywords, &followees);
                RecommendedTopic {
                    summary,
                    relevance,
                    is_recommended: relevance > 0,
                }
            })
            .collect();
        topics.sort_by(|a, b| {
            b.relevance
                .cmp(&a.relevance)
                .then_with(|| b.summary.topic.created_at.cmp(&a.summary.topic.created_at))
        });

        Ok(PaginatedResponse {
            total_count: topics.len(),
            items: pagination.apply(topics),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{
        domain::{
            TopicId,
            forum::{DEFAULT_CATEGORY, Topic},
        },
        testing::MockGraph,
    };

    async fn post(graph: &MockGraph, title: &str, author: &str, minutes_ago: i64) {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        graph
            .create_topic(Topic {
                id: TopicId::new(),
                title: title.to_string(),
                content: "discussion".to_string(),
                category: DEFAULT_CATEGORY.to_string(),
                author: author.to_string(),
                created_at: at,
                updated_at: at,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_topics_ranked_by_relevance_then_recency() {
        let graph = MockGraph::default();
        graph.rate("alice", "Counter Strike", 5);
        graph.add_follow("alice", "bob");
        post(&graph, "Weather", "carol", 1).await;
        post(&graph, "Best CS2 maps", "bob", 30).await;
        post(&graph, "counterstrike tips", "carol", 10).await;
        post(&graph, "Hello", "bob", 5).await;

        let use_case = TopicRecommendationUseCaseImpl::new(
            Arc::new(graph.clone()),
            Arc::new(graph.clone()),
            Arc::new(graph.clone()),
        );
        let page = use_case
            .recommend_topics("alice", Pagination::default())
            .await
            .unwrap();

        let order: Vec<(&str, u32)> = page
            .items
            .iter()
            .map(|t| (t.summary.topic.title.as_str(), t.relevance))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Best CS2 maps", 3),
                ("counterstrike tips", 2),
                ("Hello", 1),
                ("Weather", 0)
            ]
        );
        assert!(!page.items[3].is_recommended);

        let second = use_case
            .recommend_topics("alice", Pagination::page(2, 3))
            .await
            .unwrap();
        assert_eq!(second.total_count, 4);
        assert_eq!(second.items.len(), 1);
    }
}
