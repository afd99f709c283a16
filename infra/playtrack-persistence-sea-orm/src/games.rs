use std::sync::Arc;

use crate::{create_db_pool, entity::game, unique_violation};
use playtrack_app::domain::{
    GameTitle, RepoCreateError, RepoError, RepoRetrieveError,
    game::{Game, GameRepository},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct GameRepositoryImpl {
    db: DatabaseConnection,
    game_cache: Arc<moka::future::Cache<GameTitle, Game>>,
}

impl GameRepositoryImpl {
    pub async fn new() -> Self {
        let db = create_db_pool().await;
        let game_cache = Arc::new(
            moka::future::Cache::builder()
                .max_capacity(10_000)
                .time_to_live(std::time::Duration::from_secs(60 * 60))
                .build(),
        );
        Self { db, game_cache }
    }

    fn model_to_game(model: game::Model) -> Game {
        Game {
            title: model.title,
            genre: model.genre,
            release_year: model.release_year,
        }
    }
}

#[async_trait::async_trait]
impl GameRepository for GameRepositoryImpl {
    async fn create_game(&self, game: Game) -> Result<(), RepoCreateError> {
        let new_game = game::ActiveModel {
            title: Set(game.title.clone()),
            genre: Set(game.genre.clone()),
            release_year: Set(game.release_year),
        };
        new_game.insert(&self.db).await.map_err(|e| {
            if unique_violation(&e).is_some() {
                return RepoCreateError::Conflict("title".to_string());
            }
            match e {
                sea_orm::DbErr::RecordNotInserted => RepoCreateError::Conflict("title".to_string()),
                _ => RepoCreateError::StorageError(e.to_string()),
            }
        })?;
        self.game_cache.invalidate(&game.title).await;
        Ok(())
    }

    async fn get_game(&self, title: &str) -> Result<Game, RepoRetrieveError> {
        if let Some(game) = self.game_cache.get(title).await {
            return Ok(game);
        }
        let model = game::Entity::find_by_id(title.to_string())
            .one(&self.db)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        let game = Self::model_to_game(model);
        self.game_cache.insert(game.title.clone(), game.clone()).await;
        Ok(game)
    }

    async fn get_games(&self, titles: &[GameTitle]) -> Result<Vec<Game>, RepoError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }
        let models = game::Entity::find()
            .filter(game::Column::Title.is_in(titles.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_game).collect())
    }

    async fn list_games(&self) -> Result<Vec<Game>, RepoError> {
        let models = game::Entity::find()
            .order_by_asc(game::Column::Title)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(models.into_iter().map(Self::model_to_game).collect())
    }
}
