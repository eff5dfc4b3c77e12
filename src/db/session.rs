//! Login session rows and their repository.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};

use super::DbPool;
use crate::Result;

/// A persisted login session.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSession {
    /// Row ID.
    pub id: i64,
    /// Username the session belongs to.
    pub username: String,
    /// Opaque session token handed to the client.
    pub session_id: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last authenticated activity.
    pub last_activity: String,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Whether the session is still usable.
    pub is_active: bool,
}

/// Data for inserting a new active session.
#[derive(Debug, Clone)]
pub struct NewUserSession {
    /// Username.
    pub username: String,
    /// Session token.
    pub session_id: String,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Creation time, also the initial last activity.
    pub created_at: String,
}

/// Filter for listing sessions.
#[derive(Debug, Clone)]
pub struct SessionFilter {
    /// Only sessions of this username.
    pub username: Option<String>,
    /// Only active sessions.
    pub active_only: bool,
    /// Maximum number of rows.
    pub limit: i64,
}

impl Default for SessionFilter {
    fn default() -> Self {
        Self {
            username: None,
            active_only: false,
            limit: 100,
        }
    }
}

/// Aggregate session counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// All session rows.
    pub total_sessions: i64,
    /// Active session rows.
    pub active_sessions: i64,
    /// Distinct usernames with any session row.
    pub unique_users: i64,
    /// Sessions created after the "recent" cutoff.
    pub recent_sessions: i64,
}

const SESSION_COLUMNS: &str =
    "id, username, session_id, created_at, last_activity, ip_address, user_agent, is_active";

/// Repository for session rows.
pub struct SessionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new SessionRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Deactivate every active session of the username and insert a new
    /// active one, in a single transaction.
    ///
    /// Returns the number of sessions that were deactivated.
    pub async fn replace_active(&self, new_session: &NewUserSession) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let deactivated = sqlx::query(
            "UPDATE user_sessions SET is_active = $1 WHERE username = $2 AND is_active = $3",
        )
        .bind(false)
        .bind(&new_session.username)
        .bind(true)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            "INSERT INTO user_sessions
                (username, session_id, created_at, last_activity, ip_address, user_agent, is_active)
             VALUES ($1, $2, $3, $3, $4, $5, $6)",
        )
        .bind(&new_session.username)
        .bind(&new_session.session_id)
        .bind(&new_session.created_at)
        .bind(&new_session.ip_address)
        .bind(&new_session.user_agent)
        .bind(true)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(deactivated)
    }

    /// Get a session by token regardless of state.
    pub async fn get_by_token(&self, session_id: &str) -> Result<Option<UserSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM user_sessions WHERE session_id = $1");
        let session = sqlx::query_as::<_, UserSession>(&sql)
            .bind(session_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(session)
    }

    /// Get a session by token only if it is active.
    pub async fn get_active(&self, session_id: &str) -> Result<Option<UserSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE session_id = $1 AND is_active = $2"
        );
        let session = sqlx::query_as::<_, UserSession>(&sql)
            .bind(session_id)
            .bind(true)
            .fetch_optional(self.pool)
            .await?;
        Ok(session)
    }

    /// Check whether an active row with this token exists.
    pub async fn is_active(&self, session_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_sessions WHERE session_id = $1 AND is_active = $2)",
        )
        .bind(session_id)
        .bind(true)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Mark an active session inactive.
    ///
    /// Returns false if the token is unknown or already inactive.
    pub async fn deactivate(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = $1 WHERE session_id = $2 AND is_active = $3",
        )
        .bind(false)
        .bind(session_id)
        .bind(true)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `last_activity` on an active session.
    ///
    /// Returns false (and changes nothing) if the session is not active.
    pub async fn touch(&self, session_id: &str, now: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE user_sessions SET last_activity = $1 WHERE session_id = $2 AND is_active = $3",
        )
        .bind(now)
        .bind(session_id)
        .bind(true)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count active sessions of a username.
    pub async fn count_active_for(&self, username: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_sessions WHERE username = $1 AND is_active = $2",
        )
        .bind(username)
        .bind(true)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Delete sessions idle since before `idle_cutoff`, and inactive
    /// sessions created before `inactive_cutoff`.
    pub async fn sweep(&self, idle_cutoff: &str, inactive_cutoff: &str) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM user_sessions
             WHERE last_activity < $1
                OR (is_active = $2 AND created_at < $3)",
        )
        .bind(idle_cutoff)
        .bind(false)
        .bind(inactive_cutoff)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete inactive sessions created before `cutoff`.
    pub async fn delete_inactive_before(&self, cutoff: &str) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE created_at < $1 AND is_active = $2")
                .bind(cutoff)
                .bind(false)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// List sessions, newest first.
    pub async fn list(&self, filter: &SessionFilter) -> Result<Vec<UserSession>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {SESSION_COLUMNS} FROM user_sessions WHERE 1 = 1"));

        if let Some(ref username) = filter.username {
            query.push(" AND username = ");
            query.push_bind(username);
        }
        if filter.active_only {
            query.push(" AND is_active = ");
            query.push_bind(true);
        }

        query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        query.push_bind(filter.limit);

        let sessions = query
            .build_query_as::<UserSession>()
            .fetch_all(self.pool)
            .await?;
        Ok(sessions)
    }

    /// Aggregate counts; `recent_cutoff` bounds the recent window.
    pub async fn stats(&self, recent_cutoff: &str) -> Result<SessionStats> {
        let (total_sessions, active_sessions, unique_users, recent_sessions): (i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN is_active = $1 THEN 1 ELSE 0 END), 0),
                        COUNT(DISTINCT username),
                        COALESCE(SUM(CASE WHEN created_at > $2 THEN 1 ELSE 0 END), 0)
                 FROM user_sessions",
            )
            .bind(true)
            .bind(recent_cutoff)
            .fetch_one(self.pool)
            .await?;

        Ok(SessionStats {
            total_sessions,
            active_sessions,
            unique_users,
            recent_sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn new_session(username: &str, token: &str, created_at: &str) -> NewUserSession {
        NewUserSession {
            username: username.to_string(),
            session_id: token.to_string(),
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: Some("test-agent".to_string()),
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_replace_active_inserts() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        let deactivated = repo
            .replace_active(&new_session("alice", "t1", "2024-01-01 10:00:00"))
            .await
            .unwrap();
        assert_eq!(deactivated, 0);

        let session = repo.get_by_token("t1").await.unwrap().unwrap();
        assert!(session.is_active);
        assert_eq!(session.created_at, "2024-01-01 10:00:00");
        assert_eq!(session.last_activity, "2024-01-01 10:00:00");
        assert_eq!(session.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[tokio::test]
    async fn test_replace_active_evicts_previous() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        repo.replace_active(&new_session("alice", "t1", "2024-01-01 10:00:00"))
            .await
            .unwrap();
        let deactivated = repo
            .replace_active(&new_session("alice", "t2", "2024-01-01 11:00:00"))
            .await
            .unwrap();

        assert_eq!(deactivated, 1);
        assert!(!repo.is_active("t1").await.unwrap());
        assert!(repo.is_active("t2").await.unwrap());
        assert_eq!(repo.count_active_for("alice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replace_active_rolls_back_on_duplicate_token() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        repo.replace_active(&new_session("alice", "t1", "2024-01-01 10:00:00"))
            .await
            .unwrap();
        let result = repo
            .replace_active(&new_session("alice", "t1", "2024-01-01 11:00:00"))
            .await;

        assert!(result.is_err());
        // The deactivation was rolled back with the failed insert
        assert!(repo.is_active("t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_active_and_deactivate() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        repo.replace_active(&new_session("alice", "t1", "2024-01-01 10:00:00"))
            .await
            .unwrap();
        assert!(repo.get_active("t1").await.unwrap().is_some());

        assert!(repo.deactivate("t1").await.unwrap());
        assert!(repo.get_active("t1").await.unwrap().is_none());
        assert!(repo.get_by_token("t1").await.unwrap().is_some());

        assert!(!repo.deactivate("t1").await.unwrap());
        assert!(!repo.deactivate("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_touch_only_active() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        repo.replace_active(&new_session("alice", "t1", "2024-01-01 10:00:00"))
            .await
            .unwrap();

        assert!(repo.touch("t1", "2024-01-01 10:30:00").await.unwrap());
        let session = repo.get_by_token("t1").await.unwrap().unwrap();
        assert_eq!(session.last_activity, "2024-01-01 10:30:00");

        repo.deactivate("t1").await.unwrap();
        assert!(!repo.touch("t1", "2024-01-01 11:00:00").await.unwrap());
        let session = repo.get_by_token("t1").await.unwrap().unwrap();
        assert_eq!(session.last_activity, "2024-01-01 10:30:00");

        assert!(!repo.touch("missing", "2024-01-01 11:00:00").await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        // idle: last activity before the idle cutoff
        repo.replace_active(&new_session("idle", "idle", "2024-01-01 00:00:00"))
            .await
            .unwrap();
        // fresh: recent activity
        repo.replace_active(&new_session("fresh", "fresh", "2024-01-01 11:50:00"))
            .await
            .unwrap();
        // old inactive: created before the grace cutoff
        repo.replace_active(&new_session("gone", "gone", "2024-01-01 10:00:00"))
            .await
            .unwrap();
        repo.deactivate("gone").await.unwrap();
        // new inactive: created after the grace cutoff
        repo.replace_active(&new_session("left", "left", "2024-01-01 11:30:00"))
            .await
            .unwrap();
        repo.deactivate("left").await.unwrap();

        let deleted = repo
            .sweep("2024-01-01 03:00:00", "2024-01-01 11:00:00")
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert!(repo.get_by_token("idle").await.unwrap().is_none());
        assert!(repo.get_by_token("gone").await.unwrap().is_none());
        assert!(repo.get_by_token("fresh").await.unwrap().is_some());
        assert!(repo.get_by_token("left").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_inactive_before() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        repo.replace_active(&new_session("a", "old-inactive", "2024-01-01 00:00:00"))
            .await
            .unwrap();
        repo.deactivate("old-inactive").await.unwrap();
        repo.replace_active(&new_session("b", "old-active", "2024-01-01 00:00:00"))
            .await
            .unwrap();
        repo.replace_active(&new_session("c", "new-inactive", "2024-03-01 00:00:00"))
            .await
            .unwrap();
        repo.deactivate("new-inactive").await.unwrap();

        let deleted = repo.delete_inactive_before("2024-02-01 00:00:00").await.unwrap();

        assert_eq!(deleted, 1);
        assert!(repo.get_by_token("old-inactive").await.unwrap().is_none());
        assert!(repo.get_by_token("old-active").await.unwrap().is_some());
        assert!(repo.get_by_token("new-inactive").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        repo.replace_active(&new_session("alice", "a1", "2024-01-01 09:00:00"))
            .await
            .unwrap();
        repo.replace_active(&new_session("alice", "a2", "2024-01-01 10:00:00"))
            .await
            .unwrap();
        repo.replace_active(&new_session("bob", "b1", "2024-01-01 11:00:00"))
            .await
            .unwrap();

        let all = repo.list(&SessionFilter::default()).await.unwrap();
        let tokens: Vec<_> = all.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(tokens, vec!["b1", "a2", "a1"]);

        let alice = repo
            .list(&SessionFilter {
                username: Some("alice".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(alice.len(), 2);

        let alice_active = repo
            .list(&SessionFilter {
                username: Some("alice".to_string()),
                active_only: true,
                limit: 100,
            })
            .await
            .unwrap();
        assert_eq!(alice_active.len(), 1);
        assert_eq!(alice_active[0].session_id, "a2");

        let limited = repo
            .list(&SessionFilter {
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_stats() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SessionRepository::new(db.pool());

        let empty = repo.stats("2024-01-01 00:00:00").await.unwrap();
        assert_eq!(empty.total_sessions, 0);
        assert_eq!(empty.active_sessions, 0);

        repo.replace_active(&new_session("alice", "a1", "2024-01-01 09:00:00"))
            .await
            .unwrap();
        repo.replace_active(&new_session("alice", "a2", "2024-01-02 10:00:00"))
            .await
            .unwrap();
        repo.replace_active(&new_session("bob", "b1", "2024-01-02 11:00:00"))
            .await
            .unwrap();

        let stats = repo.stats("2024-01-02 00:00:00").await.unwrap();
        assert_eq!(
            stats,
            SessionStats {
                total_sessions: 3,
                active_sessions: 2,
                unique_users: 2,
                recent_sessions: 2,
            }
        );
    }
}
