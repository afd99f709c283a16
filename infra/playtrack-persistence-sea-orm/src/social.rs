use playtrack_app::domain::{
    RepoError, Username,
    social::{FollowEdge, SocialRepository},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::{
    create_db_pool,
    entity::{block, follow},
    ignore_duplicate,
};

pub struct SocialRepositoryImpl {
    db: DatabaseConnection,
}

impl SocialRepositoryImpl {
    pub async fn new() -> Self {
        let db = create_db_pool().await;
        Self { db }
    }
}

#[async_trait::async_trait]
impl SocialRepository for SocialRepositoryImpl {
    async fn follow(&self, follower: &str, followee: &str) -> Result<(), RepoError> {
        let edge = follow::ActiveModel {
            follower: Set(follower.to_string()),
            followee: Set(followee.to_string()),
            created_at: Set(chrono::Utc::now()),
        };
        ignore_duplicate(edge.insert(&self.db).await)
    }

    async fn unfollow(&self, follower: &str, followee: &str) -> Result<bool, RepoError> {
        let res = follow::Entity::delete_many()
            .filter(follow::Column::Follower.eq(follower))
            .filter(follow::Column::Followee.eq(followee))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(res.rows_affected > 0)
    }

    async fn is_following(&self, follower: &str, followee: &str) -> Result<bool, RepoError> {
        let count = follow::Entity::find()
            .filter(follow::Column::Follower.eq(follower))
            .filter(follow::Column::Followee.eq(followee))
            .count(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(count > 0)
    }

    async fn get_followees(&self, follower: &str) -> Result<Vec<Username>, RepoError> {
        follow::Entity::find()
            .select_only()
            .column(follow::Column::Followee)
            .filter(follow::Column::Follower.eq(follower))
            .order_by_asc(follow::Column::Followee)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn get_outgoing_edges(&self, followers: &[Username]) -> Result<Vec<FollowEdge>, RepoError> {
        if followers.is_empty() {
            return Ok(Vec::new());
        }
        let rows = follow::Entity::find()
            .select_only()
            .column(follow::Column::Follower)
            .column(follow::Column::Followee)
            .filter(follow::Column::Follower.is_in(followers.iter().cloned()))
            .into_tuple::<(String, String)>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|(from, to)| FollowEdge { from, to })
            .collect())
    }

    async fn block(&self, blocker: &str, blocked: &str) -> Result<(), RepoError> {
        let edge = block::ActiveModel {
            blocker: Set(blocker.to_string()),
            blocked: Set(blocked.to_string()),
            created_at: Set(chrono::Utc::now()),
        };
        ignore_duplicate(edge.insert(&self.db).await)
    }

    async fn get_blocked(&self, blocker: &str) -> Result<Vec<Username>, RepoError> {
        block::Entity::find()
            .select_only()
            .column(block::Column::Blocked)
            .filter(block::Column::Blocker.eq(blocker))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn count_follows(&self) -> Result<u64, RepoError> {
        follow::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}
