use std::{sync::Arc, time::Duration};

use async_lock::OnceCell;
use chrono::{DateTime, Utc};
use playtrack_app::domain::analytics::{
    ActivityRecord, AnalyticsError, AnalyticsRepository, GameScoreEntry, LeaderboardEntry,
    PlayerGameStats,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, ExprTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
    TransactionError, TransactionTrait,
    prelude::{Expr, Uuid},
    sea_query::OnConflict,
};

use crate::entity::{activity_log, game_leaderboard, global_leaderboard, player_stats};

pub mod entity;

#[derive(Clone, Debug)]
pub struct AnalyticsConnectOptions {
    pub url: String,
    pub max_connections: u32,
    pub attempts: u32,
    pub retry_delay: Duration,
}

impl AnalyticsConnectOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            attempts: 10,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Analytics store whose connection is established in the background.
///
/// Until the connection succeeds every operation fails with [`AnalyticsError::Unavailable`],
/// so the rest of the service can run without it.
#[derive(Clone)]
pub struct AnalyticsRepositoryImpl {
    db: Arc<OnceCell<DatabaseConnection>>,
}

fn storage(e: DbErr) -> AnalyticsError {
    AnalyticsError::StorageError(e.to_string())
}

impl AnalyticsRepositoryImpl {
    /// A store that never becomes ready.
    pub fn disabled() -> Self {
        Self {
            db: Arc::new(OnceCell::new()),
        }
    }

    pub fn connect_in_background(options: AnalyticsConnectOptions) -> Self {
        let repo = Self::disabled();
        let cell = repo.db.clone();
        tokio::spawn(async move {
            let mut opt = ConnectOptions::new(&options.url);
            opt.max_connections(options.max_connections);

            for attempt in 1..=options.attempts {
                match Database::connect(opt.clone()).await {
                    Ok(db) => {
                        if let Err(e) = create_tables(&db).await {
                            log::error!("Failed to create analytics tables: {}", e);
                            return;
                        }
                        if cell.set(db).await.is_err() {
                            log::warn!("Analytics store was already connected");
                        }
                        log::info!("Connected to analytics store");
                        return;
                    }
                    Err(e) => {
                        log::warn!(
                            "Analytics store connection attempt {}/{} failed: {}",
                            attempt,
                            options.attempts,
                            e
                        );
                        if attempt < options.attempts {
                            tokio::time::sleep(options.retry_delay).await;
                        }
                    }
                }
            }
            log::error!(
                "Giving up on the analytics store after {} attempts",
                options.attempts
            );
        });
        repo
    }

    /// Connects once in the foreground, for maintenance tools that cannot run without the store.
    pub async fn connect(options: AnalyticsConnectOptions) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(&options.url);
        opt.max_connections(options.max_connections);
        let db = Database::connect(opt).await?;
        create_tables(&db).await?;
        Ok(Self {
            db: Arc::new(OnceCell::from(db)),
        })
    }

    fn db(&self) -> Result<&DatabaseConnection, AnalyticsError> {
        self.db.get().ok_or(AnalyticsError::Unavailable)
    }

    fn model_to_entry(model: global_leaderboard::Model) -> LeaderboardEntry {
        LeaderboardEntry {
            username: model.username,
            total_score: model.total_score,
            games_played: Ord::max(model.games_played, 0) as u32,
            average_rating: model.avg_rating,
            updated_at: model.updated_at,
        }
    }

    fn model_to_game_score(model: game_leaderboard::Model) -> GameScoreEntry {
        GameScoreEntry {
            game_title: model.game_title,
            username: model.username,
            score: model.score,
            updated_at: model.updated_at,
        }
    }

    fn model_to_stats(model: player_stats::Model) -> PlayerGameStats {
        PlayerGameStats {
            username: model.username,
            game_title: model.game_title,
            total_playtime: model.total_playtime,
            achievements_count: model.achievements_count,
            level: model.level,
            last_played: model.last_played,
        }
    }
}

/// Idempotent, so a restarted service can run it on every connect.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    let mut tables = vec![
        schema.create_table_from_entity(global_leaderboard::Entity),
        schema.create_table_from_entity(activity_log::Entity),
        schema.create_table_from_entity(game_leaderboard::Entity),
        schema.create_table_from_entity(player_stats::Entity),
    ];
    for table in tables.iter_mut() {
        db.execute(table.if_not_exists()).await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl AnalyticsRepository for AnalyticsRepositoryImpl {
    fn is_ready(&self) -> bool {
        self.db.get().is_some()
    }

    async fn upsert_player_aggregate(
        &self,
        username: &str,
        games_played: u32,
        average_rating: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AnalyticsError> {
        let db = self.db()?;
        let row = global_leaderboard::ActiveModel {
            username: Set(username.to_string()),
            total_score: Set(0),
            games_played: Set(games_played as i32),
            avg_rating: Set(average_rating),
            updated_at: Set(updated_at),
        };
        global_leaderboard::Entity::insert(row)
            .on_conflict(
                OnConflict::column(global_leaderboard::Column::Username)
                    .update_columns([
                        global_leaderboard::Column::GamesPlayed,
                        global_leaderboard::Column::AvgRating,
                        global_leaderboard::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn get_player_aggregate(
        &self,
        username: &str,
    ) -> Result<Option<LeaderboardEntry>, AnalyticsError> {
        let db = self.db()?;
        let model = global_leaderboard::Entity::find_by_id(username.to_string())
            .one(db)
            .await
            .map_err(storage)?;
        Ok(model.map(Self::model_to_entry))
    }

    async fn award_points(&self, record: ActivityRecord) -> Result<i64, AnalyticsError> {
        let db = self.db()?;
        let res = db
            .transaction::<_, i64, AnalyticsError>(|c| {
                Box::pin(async move {
                    activity_log::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        username: Set(record.username.clone()),
                        activity_type: Set(record.activity_type),
                        points: Set(record.points),
                        recorded_at: Set(record.recorded_at),
                    }
                    .insert(c)
                    .await
                    .map_err(storage)?;

                    let row = global_leaderboard::ActiveModel {
                        username: Set(record.username.clone()),
                        total_score: Set(record.points),
                        games_played: Set(0),
                        avg_rating: Set(0.0),
                        updated_at: Set(record.recorded_at),
                    };
                    global_leaderboard::Entity::insert(row)
                        .on_conflict(
                            OnConflict::column(global_leaderboard::Column::Username)
                                .value(
                                    global_leaderboard::Column::TotalScore,
                                    Expr::col(global_leaderboard::Column::TotalScore)
                                        .add(record.points),
                                )
                                .update_column(global_leaderboard::Column::UpdatedAt)
                                .to_owned(),
                        )
                        .exec_without_returning(c)
                        .await
                        .map_err(storage)?;

                    let total = global_leaderboard::Entity::find_by_id(record.username)
                        .one(c)
                        .await
                        .map_err(storage)?
                        .map(|m| m.total_score)
                        .unwrap_or(record.points);
                    Ok(total)
                })
            })
            .await;

        match res {
            Ok(total) => Ok(total),
            Err(TransactionError::Transaction(e)) => Err(e),
            Err(TransactionError::Connection(e)) => Err(storage(e)),
        }
    }

    async fn get_activity_log(&self, username: &str) -> Result<Vec<ActivityRecord>, AnalyticsError> {
        let db = self.db()?;
        let models = activity_log::Entity::find()
            .filter(activity_log::Column::Username.eq(username))
            .order_by_asc(activity_log::Column::RecordedAt)
            .all(db)
            .await
            .map_err(storage)?;
        Ok(models
            .into_iter()
            .map(|m| ActivityRecord {
                username: m.username,
                activity_type: m.activity_type,
                points: m.points,
                recorded_at: m.recorded_at,
            })
            .collect())
    }

    async fn top_players(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, AnalyticsError> {
        let db = self.db()?;
        let models = global_leaderboard::Entity::find()
            .order_by_desc(global_leaderboard::Column::TotalScore)
            .order_by_asc(global_leaderboard::Column::Username)
            .limit(limit as u64)
            .all(db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(Self::model_to_entry).collect())
    }

    async fn upsert_game_score(&self, entry: GameScoreEntry) -> Result<(), AnalyticsError> {
        let db = self.db()?;
        let row = game_leaderboard::ActiveModel {
            game_title: Set(entry.game_title),
            username: Set(entry.username),
            score: Set(entry.score),
            updated_at: Set(entry.updated_at),
        };
        game_leaderboard::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    game_leaderboard::Column::GameTitle,
                    game_leaderboard::Column::Username,
                ])
                .update_columns([
                    game_leaderboard::Column::Score,
                    game_leaderboard::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(db)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn game_leaderboard(
        &self,
        game_title: &str,
        limit: usize,
    ) -> Result<Vec<GameScoreEntry>, AnalyticsError> {
        let db = self.db()?;
        let models = game_leaderboard::Entity::find()
            .filter(game_leaderboard::Column::GameTitle.eq(game_title))
            .order_by_desc(game_leaderboard::Column::Score)
            .order_by_asc(game_leaderboard::Column::Username)
            .limit(limit as u64)
            .all(db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(Self::model_to_game_score).collect())
    }

    async fn upsert_player_stats(&self, stats: PlayerGameStats) -> Result<(), AnalyticsError> {
        let db = self.db()?;
        let row = player_stats::ActiveModel {
            username: Set(stats.username),
            game_title: Set(stats.game_title),
            total_playtime: Set(stats.total_playtime),
            achievements_count: Set(stats.achievements_count),
            level: Set(stats.level),
            last_played: Set(stats.last_played),
        };
        player_stats::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    player_stats::Column::Username,
                    player_stats::Column::GameTitle,
                ])
                .update_columns([
                    player_stats::Column::TotalPlaytime,
                    player_stats::Column::AchievementsCount,
                    player_stats::Column::Level,
                    player_stats::Column::LastPlayed,
                ])
                .to_owned(),
            )
            .exec_without_returning(db)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn get_player_stats(&self, username: &str) -> Result<Vec<PlayerGameStats>, AnalyticsError> {
        let db = self.db()?;
        let models = player_stats::Entity::find()
            .filter(player_stats::Column::Username.eq(username))
            .order_by_asc(player_stats::Column::GameTitle)
            .all(db)
            .await
            .map_err(storage)?;
        Ok(models.into_iter().map(Self::model_to_stats).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_store_is_unavailable() {
        let repo = AnalyticsRepositoryImpl::disabled();
        assert!(!repo.is_ready());
        assert!(matches!(
            repo.top_players(10).await,
            Err(AnalyticsError::Unavailable)
        ));
        assert!(matches!(
            repo.get_player_stats("alice").await,
            Err(AnalyticsError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_store_stays_unavailable() {
        let mut options = AnalyticsConnectOptions::new("mysql://nobody@127.0.0.1:1/analytics");
        options.attempts = 1;
        options.retry_delay = Duration::from_millis(1);
        let repo = AnalyticsRepositoryImpl::connect_in_background(options);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!repo.is_ready());
    }
}
