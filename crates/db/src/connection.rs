use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, 5, 30).await
}

/// Opens a pool, creating the database file on first use. Foreign keys are enforced on
/// every connection so request rows cascade with their product.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let url = if database_url == ":memory:" { "sqlite::memory:" } else { database_url };
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_with(options)
        .await
}

#[cfg(test)]
mod tests {
    use super::connect_with_settings;

    #[tokio::test]
    async fn foreign_keys_are_enabled_on_pooled_connections() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");

        let (enabled,): (i64,) =
            sqlx::query_as("PRAGMA foreign_keys").fetch_one(&pool).await.expect("pragma");

        assert_eq!(enabled, 1);
        pool.close().await;
    }

    #[tokio::test]
    async fn bare_memory_alias_is_accepted() {
        let pool = connect_with_settings(":memory:", 1, 5).await.expect("connect");

        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await.expect("select");

        assert_eq!(one, 1);
        pool.close().await;
    }
}
