//! SQLite-backed blob store using sqlx.
//!
//! Schema: `blobs(namespace, key, value_json, updated_at)` with composite
//! primary key `(namespace, key)`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use subwatch_types::{BlobStore, SubwatchError, traits::Result};

/// A persistent [`BlobStore`] backed by `SQLite`, scoped to one namespace.
pub struct SqliteBlobStore {
    /// Connection pool to the `SQLite` database.
    pool: SqlitePool,
    namespace: String,
}

impl SqliteBlobStore {
    /// Connects to a `SQLite` database (e.g. `"sqlite://subwatch.db"`).
    ///
    /// Automatically creates the database file if it does not exist and
    /// creates the `blobs` table.
    ///
    /// # Errors
    ///
    /// Returns a [`sqlx::Error`] if the connection or table creation fails.
    pub async fn new(
        database_url: &str,
        namespace: impl Into<String>,
    ) -> std::result::Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self {
            pool,
            namespace: namespace.into(),
        })
    }

    async fn migrate(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blobs (
                namespace   TEXT    NOT NULL,
                key         TEXT    NOT NULL,
                value_json  TEXT    NOT NULL,
                updated_at  INTEGER NOT NULL DEFAULT (unixepoch()),
                PRIMARY KEY (namespace, key)
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value_json FROM blobs WHERE namespace = ? AND key = ?")
                .bind(&self.namespace)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Ok(None),
            Some((json,)) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| SubwatchError::Storage(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        let json = serde_json::to_string(value)?;
        sqlx::query(
            "INSERT INTO blobs (namespace, key, value_json)
             VALUES (?, ?, ?)
             ON CONFLICT(namespace, key) DO UPDATE SET
                 value_json = excluded.value_json,
                 updated_at = unixepoch()",
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(&json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
