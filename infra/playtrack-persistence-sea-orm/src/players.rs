use std::sync::Arc;

use crate::{contains_pattern, create_db_pool, entity::player, unique_violation};
use playtrack_app::domain::{
    RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, Username,
    player::{Player, PlayerRepository},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

pub struct PlayerRepositoryImpl {
    db: DatabaseConnection,
    player_cache: Arc<moka::future::Cache<Username, Player>>,
}

impl PlayerRepositoryImpl {
    pub async fn new() -> Self {
        let db = create_db_pool().await;
        let player_cache = Arc::new(
            moka::future::Cache::builder()
                .max_capacity(10_000)
                .time_to_live(std::time::Duration::from_secs(60 * 60))
                .build(),
        );
        Self { db, player_cache }
    }

    fn model_to_player(model: player::Model) -> Player {
        Player {
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            age: model.age.max(0) as u32,
            created_at: model.created_at,
            avatar: model.avatar,
        }
    }

    fn player_to_model(player: &Player) -> player::ActiveModel {
        player::ActiveModel {
            username: Set(player.username.clone()),
            email: Set(player.email.clone()),
            password_hash: Set(player.password_hash.clone()),
            age: Set(player.age as i32),
            created_at: Set(player.created_at),
            avatar: Set(player.avatar.clone()),
        }
    }

    async fn update_player(
        &self,
        username: &str,
        model: player::ActiveModel,
    ) -> Result<(), RepoUpdateError> {
        let res = player::Entity::update_many()
            .set(model)
            .filter(player::Column::Username.eq(username))
            .exec(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        self.player_cache.invalidate(username).await;
        if res.rows_affected == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlayerRepository for PlayerRepositoryImpl {
    async fn create_player(&self, player: Player) -> Result<(), RepoCreateError> {
        let new_player = Self::player_to_model(&player);
        new_player.insert(&self.db).await.map_err(|e| {
            if let Some(msg) = unique_violation(&e) {
                let field = if msg.contains("email") { "email" } else { "username" };
                return RepoCreateError::Conflict(field.to_string());
            }
            match e {
                sea_orm::DbErr::RecordNotInserted => {
                    RepoCreateError::Conflict("username".to_string())
                }
                _ => RepoCreateError::StorageError(e.to_string()),
            }
        })?;
        self.player_cache.invalidate(&player.username).await;
        Ok(())
    }

    async fn get_player(&self, username: &str) -> Result<Player, RepoRetrieveError> {
        if let Some(player) = self.player_cache.get(username).await {
            return Ok(player);
        }
        let model = player::Entity::find_by_id(username.to_string())
            .one(&self.db)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        let player = Self::model_to_player(model);
        self.player_cache
            .insert(player.username.clone(), player.clone())
            .await;
        Ok(player)
    }

    async fn get_players(&self, usernames: &[Username]) -> Result<Vec<Player>, RepoError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let models = player::Entity::find()
            .filter(player::Column::Username.is_in(usernames.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_player).collect())
    }

    async fn list_players(&self) -> Result<Vec<Player>, RepoError> {
        let models = player::Entity::find()
            .order_by_asc(player::Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_player).collect())
    }

    async fn search_players(&self, query: &str, limit: usize) -> Result<Vec<Player>, RepoError> {
        // LIKE is case-insensitive under the default MySQL collation.
        let models = player::Entity::find()
            .filter(
                Condition::any()
                    .add(player::Column::Username.like(contains_pattern(query)))
                    .add(player::Column::Email.like(contains_pattern(query))),
            )
            .order_by_asc(player::Column::Username)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_player).collect())
    }

    async fn update_password_hash(
        &self,
        username: &str,
        password_hash: String,
    ) -> Result<(), RepoUpdateError> {
        let model = player::ActiveModel {
            password_hash: Set(password_hash),
            ..Default::default()
        };
        self.update_player(username, model).await
    }

    async fn set_avatar(&self, username: &str, avatar_url: String) -> Result<(), RepoUpdateError> {
        let model = player::ActiveModel {
            avatar: Set(Some(avatar_url)),
            ..Default::default()
        };
        self.update_player(username, model).await
    }
}
