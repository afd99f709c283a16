use async_lock::OnceCell;
use playtrack_app::domain::RepoError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr, sea_query::LikeExpr};

pub mod entity;
pub mod forum;
pub mod games;
pub mod players;
pub mod ratings;
pub mod social;

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn create_db_pool() -> DatabaseConnection {
    DB_POOL
        .get_or_init(|| async move {
            let db_url =
                std::env::var("GRAPH_DATABASE_URL").expect("GRAPH_DATABASE_URL must be set");
            let max_connections = std::env::var("GRAPH_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10);

            let mut opt = ConnectOptions::new(&db_url);
            opt.max_connections(max_connections);

            Database::connect(opt)
                .await
                .expect("Failed to connect to graph database")
        })
        .await
        .clone()
}

/// The duplicate-key message for unique index violations, if that is what `e` is.
pub(crate) fn unique_violation(e: &DbErr) -> Option<String> {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => Some(msg),
        _ => None,
    }
}

/// Inserts that hit an existing key are treated as done.
pub(crate) fn ignore_duplicate<T>(result: Result<T, DbErr>) -> Result<(), RepoError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if unique_violation(&e).is_some() => Ok(()),
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(RepoError::StorageError(e.to_string())),
    }
}

const LIKE_ESCAPE: char = '\\';

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// `LIKE` pattern matching `query` literally anywhere in the column.
pub(crate) fn contains_pattern(query: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(query))).escape(LIKE_ESCAPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::player;
    use sea_orm::{ColumnTrait, DbBackend, EntityTrait, QueryFilter, QueryTrait};

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("x_"), "x\\_");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("alice"), "alice");
    }

    #[test]
    fn test_contains_pattern_declares_escape() {
        let sql = player::Entity::find()
            .filter(player::Column::Username.like(contains_pattern("x_")))
            .build(DbBackend::MySql)
            .to_string();
        assert!(sql.contains("LIKE"));
        assert!(sql.contains("ESCAPE"));
        assert!(!sql.contains("'%x_%'"));
    }
}
