use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::User;

/// Slot holding the signed-in user, mirroring the single cached-user key of
/// the mobile client.
const CURRENT_USER_SLOT: &str = "user";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredSession {
    pub user: User,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url '{database_url}'"))?
            .create_if_missing(true);

        // Every connection to `sqlite::memory:` opens a fresh database, so the
        // pool must hold exactly one that never expires.
        let pool_options = if is_memory_url(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!(database_url, "session storage ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn save_session_user(&self, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user).context("failed to encode session user")?;
        sqlx::query(
            "INSERT INTO session_users (slot, user_json, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(slot) DO UPDATE SET user_json = excluded.user_json, updated_at = excluded.updated_at",
        )
        .bind(CURRENT_USER_SLOT)
        .bind(user_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("failed to save session user")?;
        Ok(())
    }

    pub async fn load_session_user(&self) -> Result<Option<StoredSession>> {
        let row = sqlx::query("SELECT user_json, updated_at FROM session_users WHERE slot = ?")
            .bind(CURRENT_USER_SLOT)
            .fetch_optional(&self.pool)
            .await
            .context("failed to read session user")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user_json: String = row.try_get(0)?;
        let updated_at: DateTime<Utc> = row.try_get(1)?;
        let user = serde_json::from_str(&user_json).context("stored session user is malformed")?;
        Ok(Some(StoredSession { user, updated_at }))
    }

    pub async fn clear_session_user(&self) -> Result<bool> {
        let result = sqlx::query("DELETE FROM session_users WHERE slot = ?")
            .bind(CURRENT_USER_SLOT)
            .execute(&self.pool)
            .await
            .context("failed to clear session user")?;
        Ok(result.rows_affected() > 0)
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
