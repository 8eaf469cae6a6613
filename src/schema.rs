use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::Config;

const CREATE_DAILY_ELECTRICITY: &str = r#"
CREATE TABLE IF NOT EXISTS daily_electricity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    "date" TEXT NOT NULL DEFAULT CURRENT_DATE,
    electricity REAL NOT NULL,
    diff REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

// Not unique: the update path may legitimately move a row onto an existing date.
const CREATE_DATE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS daily_electricity_date_idx
ON daily_electricity ("date");
"#;

pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

/// Creates the table and its index if they do not exist yet.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_DAILY_ELECTRICITY).execute(pool).await?;
    sqlx::query(CREATE_DATE_INDEX).execute(pool).await?;
    Ok(())
}

/// Single-connection in-memory pool with the schema applied.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn init_is_repeatable() {
        let pool = memory_pool().await;
        init(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'daily_electricity'",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[actix_web::test]
    async fn applies_column_defaults() {
        let pool = memory_pool().await;
        sqlx::query("INSERT INTO daily_electricity (electricity) VALUES (42)")
            .execute(&pool)
            .await
            .unwrap();

        let (date, diff): (String, f64) =
            sqlx::query_as(r#"SELECT "date", diff FROM daily_electricity"#)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(date.len(), 10);
        assert_eq!(diff, 0.0);
    }
}
