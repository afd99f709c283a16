use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{
        PaginatedResponse, Pagination, RepoRetrieveError, RepoUpdateError, TopicId, Username,
        analytics::ActivityKind,
        forum::{DEFAULT_CATEGORY, ForumRepository, Topic, TopicQuery, TopicSummary, TopicUpdate},
        player::PlayerRepository,
    },
    services::projection::LeaderboardProjectionService,
};

/// Category filter value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Clone, Debug, Default)]
pub struct NewTopic {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub author: Username,
}

#[async_trait::async_trait]
pub trait TopicUseCase {
    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, TopicError>;
    async fn list_topics(
        &self,
        category: Option<String>,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<TopicSummary>, TopicError>;
    async fn get_topic(&self, id: TopicId) -> Result<Topic, TopicError>;
    /// Only the author may edit a topic.
    async fn update_topic(
        &self,
        id: TopicId,
        username: &str,
        update: TopicUpdate,
    ) -> Result<Topic, TopicError>;
    /// Only the author may delete a topic. Its comments go with it.
    async fn delete_topic(&self, id: TopicId, username: &str) -> Result<(), TopicError>;
}

#[derive(Debug, PartialEq)]
pub enum TopicError {
    MissingFields,
    AuthorNotFound,
    TopicNotFound,
    NotAuthor,
    Internal,
}

pub struct TopicUseCaseImpl<
    FR: ForumRepository,
    PR: PlayerRepository,
    P: LeaderboardProjectionService,
> {
    forum_repository: Arc<FR>,
    player_repository: Arc<PR>,
    projection: Arc<P>,
}

impl<FR: ForumRepository, PR: PlayerRepository, P: LeaderboardProjectionService>
    TopicUseCaseImpl<FR, PR, P>
{
    pub fn new(forum_repository: Arc<FR>, player_repository: Arc<PR>, projection: Arc<P>) -> Self {
        Self {
            forum_repository,
            player_repository,
            projection,
        }
    }
}

impl<FR, PR, P> TopicUseCaseImpl<FR, PR, P>
where
    FR: ForumRepository + Send + Sync + 'static,
    PR: PlayerRepository + Send + Sync + 'static,
    P: LeaderboardProjectionService + Send + Sync + 'static,
{
    async fn authored_topic(&self, id: TopicId, username: &str) -> Result<Topic, TopicError> {
        let topic = TopicUseCase::get_topic(self, id).await?;
        if topic.author != username {
            log::warn!("{} tried to modify topic {} owned by {}", username, id, topic.author);
            return Err(TopicError::NotAuthor);
        }
        Ok(topic)
    }
}

fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[async_trait::async_trait]
impl<FR, PR, P> TopicUseCase for TopicUseCaseImpl<FR, PR, P>
where
    FR: ForumRepository + Send + Sync + 'static,
    PR: PlayerRepository + Send + Sync + 'static,
    P: LeaderboardProjectionService + Send + Sync + 'static,
{
    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, TopicError> {
        let title = topic.title.trim();
        let author = topic.author.trim();
        if title.is_empty() || topic.content.trim().is_empty() || author.is_empty() {
            return Err(TopicError::MissingFields);
        }
        match self.player_repository.get_player(author).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => return Err(TopicError::AuthorNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve player {}: {}", author, e);
                return Err(TopicError::Internal);
            }
        }

        let now = Utc::now();
        let topic = Topic {
            id: TopicId::new(),
            title: title.to_string(),
            content: topic.content,
            category: normalize_category(topic.category)
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            author: author.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.forum_repository
            .create_topic(topic.clone())
            .await
            .map_err(|e| {
                log::error!("Failed to create topic: {}", e);
                TopicError::Internal
            })?;
        log::info!("Topic {} created by {}", topic.id, topic.author);

        self.projection.award(&topic.author, ActivityKind::CreateTopic.into());
        Ok(topic)
    }

    async fn list_topics(
        &self,
        category: Option<String>,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<TopicSummary>, TopicError> {
        let category = normalize_category(category).filter(|c| c != ALL_CATEGORIES);
        self.forum_repository
            .query_topics(TopicQuery {
                category,
                pagination,
            })
            .await
            .map_err(|e| {
                log::error!("Failed to list topics: {}", e);
                TopicError::Internal
            })
    }

    async fn get_topic(&self, id: TopicId) -> Result<Topic, TopicError> {
        match self.forum_repository.get_topic(id).await {
            Ok(topic) => Ok(topic),
            Err(RepoRetrieveError::NotFound) => Err(TopicError::TopicNotFound),
            Err(RepoRetrieveError::StorageError(e)) => {
                log::error!("Failed to retrieve topic {}: {}", id, e);
                Err(TopicError::Internal)
            }
        }
    }

    async fn update_topic(
        &self,
        id: TopicId,
        username: &str,
        update: TopicUpdate,
    ) -> Result<Topic, TopicError> {
        self.authored_topic(id, username).await?;
        let update = TopicUpdate {
            content: update.content.filter(|c| !c.trim().is_empty()),
            category: normalize_category(update.category),
        };
        match self
            .forum_repository
            .update_topic(id, update, Utc::now())
            .await
        {
            Ok(topic) => Ok(topic),
            Err(RepoUpdateError::NotFound) => Err(TopicError::TopicNotFound),
            Err(RepoUpdateError::StorageError(e)) => {
                log::error!("Failed to update topic {}: {}", id, e);
                Err(TopicError::Internal)
            }
        }
    }

    async fn delete_topic(&self, id: TopicId, username: &str) -> Result<(), TopicError> {
        self.authored_topic(id, username).await?;
        match self.forum_repository.delete_topic(id).await {
            Ok(()) => {
                log::info!("Topic {} deleted by {}", id, username);
                Ok(())
            }
            Err(RepoUpdateError::NotFound) => Err(TopicError::TopicNotFound),
            Err(RepoUpdateError::StorageError(e)) => {
                log::error!("Failed to delete topic {}: {}", id, e);
                Err(TopicError::Internal)
            }
        }
    }
}
