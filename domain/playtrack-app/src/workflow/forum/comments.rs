use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        CommentId, RepoRetrieveError, TopicId, Username,
        analytics::ActivityKind,
        forum::{Comment, ForumRepository},
        player::PlayerRepository,
    },
    services::projection::LeaderboardProjectionService,
};

#[async_trait::async_trait]
pub trait CommentUseCase {
    async fn add_comment(
        &self,
        topic_id: TopicId,
        author: &str,
        content: &str,
    ) -> Result<Comment, CommentError>;
    async fn list_comments(&self, topic_id: TopicId) -> Result<Vec<Comment>, CommentError>;
}

#[derive(Debug, PartialEq)]
pub enum CommentError {
    MissingFields,
    TopicNotFound,
    AuthorNotFound,
    Internal,
}

pub struct CommentUseCaseImpl<
    FR: ForumRepository,
    PR: PlayerRepository,
    P: LeaderboardProjectionService,
> {
    forum_repository: Arc<FR>,
    player_repository: Arc<PR>,
    projection: Arc<P>,
}

impl<FR: ForumRepository, PR: PlayerRepository, P: LeaderboardProjectionService>
    CommentUseCaseImpl<FR, PR, P>
{
    pub fn new(forum_repository: Arc<FR>, player_repository: Arc<PR>, projection: Arc<P>) -> Self {
        Self {
            forum_repository,
            player_repository,
            projection,
        }
    }
}

#[async_trait::async_trait]
impl<FR, PR, P> CommentUseCase for CommentUseCaseImpl<FR, PR, P>
where
    FR: ForumRepository + Send + Sync + 'static,
    PR: PlayerRepository + Send + Sync + 'static,
    P: LeaderboardProjectionService + Send + Sync + 'static,
{
    async fn add_comment(
        &self,
        topic_id: TopicId,
        author: &str,
        content: &str,
    ) -> Result<Comment, CommentError> {
        let author = author.trim();
        if author.is_empty() || content.trim().is_empty() {
            return Err(CommentError::MissingFields);
        }
        match self.forum_repository.get_topic(topic_id).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(CommentError::TopicNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve topic {}: {}", topic_id, e);
                return Err(CommentError::Internal);
            }
        }
        match self.player_repository.get_player(author).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(CommentError::AuthorNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve player {}: {}", author, e);
                return Err(CommentError::Internal);
            }
        }

        let comment = Comment {
            id: CommentId::new(),
            topic_id,
            content: content.to_string(),
            author: Username::from(author),
            created_at: Utc::now(),
        };
        self.forum_repository
            .create_comment(comment.clone())
            .await
            .map_err(|e| {
                log::error!("Failed to store comment on {}: {}", topic_id, e);
                CommentError::Internal
            })?;

        self.projection.award(author, ActivityKind::Comment.into());
        Ok(comment)
    }

    async fn list_comments(&self, topic_id: TopicId) -> Result<Vec<Comment>, CommentError> {
        self.forum_repository
            .list_comments(topic_id)
            .await
            .map_err(|e| {
                log::error!("Failed to list comments of {}: {}", topic_id, e);
                CommentError::Internal
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::forum::{DEFAULT_CATEGORY, Topic},
        testing::{MockGraph, MockProjection},
    };

    async fn setup() -> (MockGraph, MockProjection, TopicId) {
        let graph = MockGraph::default();
        graph.add_player("alice");
        let now = Utc::now();
        let topic = Topic {
            id: TopicId::new(),
            title: "Openings".to_string(),
            content: "Which one?".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            author: "alice".to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = topic.id;
        graph.create_topic(topic).await.unwrap();
        (graph, MockProjection::default(), id)
    }

    #[tokio::test]
    async fn test_comments_listed_oldest_first() {
        let (graph, projection, id) = setup().await;
        let use_case = CommentUseCaseImpl::new(
            Arc::new(graph.clone()),
            Arc::new(graph.clone()),
            Arc::new(projection.clone()),
        );
        use_case.add_comment(id, "alice", "first").await.unwrap();
        use_case.add_comment(id, "alice", "second").await.unwrap();

        let contents: Vec<String> = use_case
            .list_comments(id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(projection.get_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_comment_rejections() {
        let (graph, projection, id) = setup().await;
        let use_case = CommentUseCaseImpl::new(
            Arc::new(graph.clone()),
            Arc::new(graph.clone()),
            Arc::new(projection.clone()),
        );
        assert_eq!(
            use_case.add_comment(id, "alice", "  ").await,
            Err(CommentError::MissingFields)
        );
        assert_eq!(
            use_case.add_comment(TopicId::new(), "alice", "hi").await,
            Err(CommentError::TopicNotFound)
        );
        assert_eq!(
            use_case.add_comment(id, "nobody", "hi").await,
            Err(CommentError::AuthorNotFound)
        );
        assert_eq!(graph.comment_count(), 0);
        assert!(projection.get_calls().is_empty());
    }
}
