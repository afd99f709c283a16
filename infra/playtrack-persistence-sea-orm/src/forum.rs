use std::collections::HashMap;

use chrono::{DateTime, Utc};
use playtrack_app::domain::{
    CommentId, PaginatedResponse, RepoError, RepoRetrieveError, RepoUpdateError, TopicId,
    forum::{Comment, ForumRepository, Topic, TopicQuery, TopicSummary, TopicUpdate},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionError,
    TransactionTrait, prelude::Uuid,
};

use crate::{
    contains_pattern, create_db_pool,
    entity::{comment, topic},
};

pub struct ForumRepositoryImpl {
    db: DatabaseConnection,
}

impl ForumRepositoryImpl {
    pub async fn new() -> Self {
        let db = create_db_pool().await;
        Self { db }
    }

    fn model_to_topic(model: topic::Model) -> Topic {
        Topic {
            id: TopicId(model.id),
            title: model.title,
            content: model.content,
            category: model.category,
            author: model.author,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    fn model_to_comment(model: comment::Model) -> Comment {
        Comment {
            id: CommentId(model.id),
            topic_id: TopicId(model.topic_id),
            content: model.content,
            author: model.author,
            created_at: model.created_at,
        }
    }

    async fn summarize(&self, models: Vec<topic::Model>) -> Result<Vec<TopicSummary>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let comment_topics = comment::Entity::find()
            .select_only()
            .column(comment::Column::TopicId)
            .filter(comment::Column::TopicId.is_in(ids))
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;

        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for topic_id in comment_topics {
            *counts.entry(topic_id).or_default() += 1;
        }
        Ok(models
            .into_iter()
            .map(|model| TopicSummary {
                comment_count: counts.get(&model.id).copied().unwrap_or(0),
                topic: Self::model_to_topic(model),
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl ForumRepository for ForumRepositoryImpl {
    async fn create_topic(&self, topic: Topic) -> Result<(), RepoError> {
        let new_topic = topic::ActiveModel {
            id: Set(topic.id.0),
            title: Set(topic.title),
            content: Set(topic.content),
            category: Set(topic.category),
            author: Set(topic.author),
            created_at: Set(topic.created_at),
            updated_at: Set(topic.updated_at),
        };
        new_topic
            .insert(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Topic, RepoRetrieveError> {
        let model = topic::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        Ok(Self::model_to_topic(model))
    }

    async fn query_topics(
        &self,
        query: TopicQuery,
    ) -> Result<PaginatedResponse<TopicSummary>, RepoError> {
        let mut db_query = topic::Entity::find();
        if let Some(category) = query.category {
            db_query = db_query.filter(topic::Column::Category.eq(category));
        }

        let total_count = db_query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;

        db_query = db_query.order_by_desc(topic::Column::CreatedAt);
        if let Some(offset) = query.pagination.offset {
            db_query = db_query.offset(offset as u64);
        }
        if let Some(limit) = query.pagination.limit {
            db_query = db_query.limit(limit as u64);
        }

        let models = db_query
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;

        Ok(PaginatedResponse {
            total_count: total_count as usize,
            items: self.summarize(models).await?,
        })
    }

    async fn list_all_topics(&self) -> Result<Vec<TopicSummary>, RepoError> {
        let models = topic::Entity::find()
            .order_by_desc(topic::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        self.summarize(models).await
    }

    async fn search_topics(&self, query: &str, limit: usize) -> Result<Vec<Topic>, RepoError> {
        let models = topic::Entity::find()
            .filter(
                Condition::any()
                    .add(topic::Column::Title.like(contains_pattern(query)))
                    .add(topic::Column::Content.like(contains_pattern(query))),
            )
            .order_by_desc(topic::Column::CreatedAt)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_topic).collect())
    }

    async fn update_topic(
        &self,
        id: TopicId,
        update: TopicUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Topic, RepoUpdateError> {
        let model = topic::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?
            .ok_or(RepoUpdateError::NotFound)?;

        let mut active = model.into_active_model();
        if let Some(content) = update.content {
            active.content = Set(content);
        }
        if let Some(category) = update.category {
            active.category = Set(category);
        }
        active.updated_at = Set(updated_at);

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        Ok(Self::model_to_topic(model))
    }

    async fn delete_topic(&self, id: TopicId) -> Result<(), RepoUpdateError> {
        let res = self
            .db
            .transaction::<_, (), RepoUpdateError>(|c| {
                Box::pin(async move {
                    comment::Entity::delete_many()
                        .filter(comment::Column::TopicId.eq(id.0))
                        .exec(c)
                        .await
                        .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
                    let res = topic::Entity::delete_by_id(id.0)
                        .exec(c)
                        .await
                        .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
                    if res.rows_affected == 0 {
                        return Err(RepoUpdateError::NotFound);
                    }
                    Ok(())
                })
            })
            .await;

        match res {
            Ok(()) => Ok(()),
            Err(TransactionError::Transaction(e)) => Err(e),
            Err(TransactionError::Connection(e)) => {
                Err(RepoUpdateError::StorageError(e.to_string()))
            }
        }
    }

    async fn create_comment(&self, comment: Comment) -> Result<(), RepoError> {
        let new_comment = comment::ActiveModel {
            id: Set(comment.id.0),
            topic_id: Set(comment.topic_id.0),
            content: Set(comment.content),
            author: Set(comment.author),
            created_at: Set(comment.created_at),
        };
        new_comment
            .insert(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn list_comments(&self, topic_id: TopicId) -> Result<Vec<Comment>, RepoError> {
        let models = comment::Entity::find()
            .filter(comment::Column::TopicId.eq(topic_id.0))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_comment).collect())
    }

    async fn count_topics(&self) -> Result<u64, RepoError> {
        topic::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn count_comments(&self) -> Result<u64, RepoError> {
        comment::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}
