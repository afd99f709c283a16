use chrono::{DateTime, Utc};
use playtrack_app::domain::{
    GameTitle, RepoError, Username,
    rating::{LibraryEntry, RatingRepository, Score},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, sea_query::OnConflict,
};

use crate::{
    create_db_pool,
    entity::{favorite, rating},
    unique_violation,
};

pub struct RatingRepositoryImpl {
    db: DatabaseConnection,
}

impl RatingRepositoryImpl {
    pub async fn new() -> Self {
        let db = create_db_pool().await;
        Self { db }
    }

    fn model_to_entry(model: rating::Model) -> LibraryEntry {
        LibraryEntry {
            username: model.username,
            game_title: model.game_title,
            score: model.score.and_then(|s| Score::new(s as i64).ok()),
            rated_at: model.rated_at,
            added_at: model.added_at,
        }
    }

    async fn set_score(
        &self,
        username: &str,
        game_title: &str,
        score: Score,
        rated_at: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let model = rating::ActiveModel {
            score: Set(Some(score.value() as i32)),
            rated_at: Set(Some(rated_at)),
            ..Default::default()
        };
        let res = rating::Entity::update_many()
            .set(model)
            .filter(rating::Column::Username.eq(username))
            .filter(rating::Column::GameTitle.eq(game_title))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}

#[async_trait::async_trait]
impl RatingRepository for RatingRepositoryImpl {
    async fn add_to_library(
        &self,
        username: &str,
        game_title: &str,
        added_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let entry = rating::ActiveModel {
            username: Set(username.to_string()),
            game_title: Set(game_title.to_string()),
            score: Set(None),
            rated_at: Set(None),
            added_at: Set(added_at),
        };
        favorite::Entity::insert(entry)
            .on_conflict(
                OnConflict::columns([favorite::Column::Username, favorite::Column::GameTitle])
                    .update_column(favorite::Column::AddedAt)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn upsert_rating(
        &self,
        username: &str,
        game_title: &str,
        score: Score,
        rated_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let updated = self
            .set_score(username, game_title, score, rated_at)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        if updated > 0 {
            return Ok(());
        }

        let entry = rating::ActiveModel {
            username: Set(username.to_string()),
            game_title: Set(game_title.to_string()),
            score: Set(Some(score.value() as i32)),
            rated_at: Set(Some(rated_at)),
            added_at: Set(rated_at),
        };
        match entry.insert(&self.db).await {
            Ok(_) => Ok(()),
            // A concurrent writer created the edge between our update and insert.
            Err(e) if unique_violation(&e).is_some() => {
                self.set_score(username, game_title, score, rated_at)
                    .await
                    .map_err(|e| RepoError::StorageError(e.to_string()))?;
                Ok(())
            }
            Err(e) => Err(RepoError::StorageError(e.to_string())),
        }
    }

    async fn get_library(&self, username: &str) -> Result<Vec<LibraryEntry>, RepoError> {
        let models = rating::Entity::find()
            .filter(rating::Column::Username.eq(username))
            .order_by_asc(rating::Column::GameTitle)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_entry).collect())
    }

    async fn get_libraries(&self, usernames: &[Username]) -> Result<Vec<LibraryEntry>, RepoError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let models = rating::Entity::find()
            .filter(rating::Column::Username.is_in(usernames.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_entry).collect())
    }

    async fn get_ratings_for_games(
        &self,
        game_titles: &[GameTitle],
    ) -> Result<Vec<LibraryEntry>, RepoError> {
        if game_titles.is_empty() {
            return Ok(Vec::new());
        }
        let models = rating::Entity::find()
            .filter(rating::Column::GameTitle.is_in(game_titles.iter().cloned()))
            .filter(rating::Column::Score.is_not_null())
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_entry).collect())
    }

    async fn players_with_game(
        &self,
        usernames: &[Username],
        game_title: &str,
    ) -> Result<Vec<Username>, RepoError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        rating::Entity::find()
            .select_only()
            .column(rating::Column::Username)
            .filter(rating::Column::GameTitle.eq(game_title))
            .filter(rating::Column::Username.is_in(usernames.iter().cloned()))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn add_favorite(
        &self,
        username: &str,
        game_title: &str,
        added_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let entry = favorite::ActiveModel {
            username: Set(username.to_string()),
            game_title: Set(game_title.to_string()),
            added_at: Set(added_at),
        };
        favorite::Entity::insert(entry)
            .on_conflict(
                OnConflict::columns([favorite::Column::Username, favorite::Column::GameTitle])
                    .update_column(favorite::Column::AddedAt)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(())
    }

    async fn get_favorites(&self, username: &str) -> Result<Vec<GameTitle>, RepoError> {
        favorite::Entity::find()
            .select_only()
            .column(favorite::Column::GameTitle)
            .filter(favorite::Column::Username.eq(username))
            .order_by_asc(favorite::Column::GameTitle)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn count_ratings(&self) -> Result<u64, RepoError> {
        rating::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}
