//! Unauthorized login audit rows.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};

use super::DbPool;
use crate::Result;

/// Reason recorded when the caller does not supply one.
pub const DEFAULT_ATTEMPT_REASON: &str = "User not found in product_users table";

/// A rejected login attempt.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UnauthorizedLoginAttempt {
    /// Row ID.
    pub id: i64,
    /// Username that was tried.
    pub username: String,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// When the attempt happened.
    pub attempted_at: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Data for a new audit row.
#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    /// Username that was tried.
    pub username: String,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Attempt timestamp.
    pub attempted_at: String,
    /// Rejection reason.
    pub reason: String,
}

/// Append-only repository for the audit trail.
pub struct LoginAttemptRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> LoginAttemptRepository<'a> {
    /// Create a new LoginAttemptRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Append an audit row and return its ID.
    pub async fn insert(&self, attempt: &NewLoginAttempt) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO unauthorized_login_attempts
                (username, ip_address, user_agent, attempted_at, reason)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&attempt.username)
        .bind(&attempt.ip_address)
        .bind(&attempt.user_agent)
        .bind(&attempt.attempted_at)
        .bind(&attempt.reason)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// List attempts newest first, optionally for one username.
    pub async fn list(
        &self,
        username: Option<&str>,
        limit: i64,
    ) -> Result<Vec<UnauthorizedLoginAttempt>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, username, ip_address, user_agent, attempted_at, reason
             FROM unauthorized_login_attempts",
        );

        if let Some(username) = username {
            query.push(" WHERE username = ");
            query.push_bind(username);
        }

        query.push(" ORDER BY attempted_at DESC, id DESC LIMIT ");
        query.push_bind(limit);

        let attempts = query
            .build_query_as::<UnauthorizedLoginAttempt>()
            .fetch_all(self.pool)
            .await?;
        Ok(attempts)
    }

    /// Count attempts, optionally for one username.
    pub async fn count(&self, username: Option<&str>) -> Result<i64> {
        let count: i64 = match username {
            Some(username) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM unauthorized_login_attempts WHERE username = $1",
                )
                .bind(username)
                .fetch_one(self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM unauthorized_login_attempts")
                    .fetch_one(self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    /// Delete attempts older than `cutoff`.
    pub async fn delete_before(&self, cutoff: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM unauthorized_login_attempts WHERE attempted_at < $1")
            .bind(cutoff)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
