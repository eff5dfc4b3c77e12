//! Audit trail management for administrators.

use chrono::Utc;
use tracing::info;

use super::{require_admin, retention, AdminError};
use crate::auth::AuthenticatedUser;
use crate::datetime::cutoff_db;
use crate::db::{DbPool, LoginAttemptRepository, UnauthorizedLoginAttempt};

/// Admin service for the rejected-login audit trail.
pub struct AuditAdminService<'a> {
    pool: &'a DbPool,
}

impl<'a> AuditAdminService<'a> {
    /// Create a new AuditAdminService.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// List rejected logins newest first.
    pub async fn list_login_attempts(
        &self,
        username: Option<&str>,
        limit: i64,
        admin: &AuthenticatedUser,
    ) -> Result<Vec<UnauthorizedLoginAttempt>, AdminError> {
        require_admin(admin)?;
        Ok(LoginAttemptRepository::new(self.pool)
            .list(username, limit)
            .await?)
    }

    /// Delete audit rows older than `days`.
    pub async fn cleanup_old_login_attempts(
        &self,
        days: u32,
        admin: &AuthenticatedUser,
    ) -> Result<u64, AdminError> {
        require_admin(admin)?;
        let cutoff = cutoff_db(&Utc::now(), retention(days)?);
        let deleted = LoginAttemptRepository::new(self.pool)
            .delete_before(&cutoff)
            .await?;

        info!(
            admin = %admin.username,
            days = days,
            deleted = deleted,
            "Old login attempts deleted"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::test_support::user_with;
    use crate::datetime::to_db;
    use crate::db::{NewLoginAttempt, DEFAULT_ATTEMPT_REASON};
    use crate::Database;

    async fn insert(db: &Database, username: &str, days_ago: i64) {
        let attempt = NewLoginAttempt {
            username: username.to_string(),
            ip_address: None,
            user_agent: None,
            attempted_at: to_db(&(Utc::now() - chrono::Duration::days(days_ago))),
            reason: DEFAULT_ATTEMPT_REASON.to_string(),
        };
        LoginAttemptRepository::new(db.pool())
            .insert(&attempt)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_login_attempts() {
        let db = Database::open_in_memory().await.unwrap();
        insert(&db, "mallory", 2).await;
        insert(&db, "eve", 1).await;

        let service = AuditAdminService::new(db.pool());
        let admin = user_with(&["admin"]);

        let all = service.list_login_attempts(None, 100, &admin).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].username, "eve");

        let mallory = service
            .list_login_attempts(Some("mallory"), 100, &admin)
            .await
            .unwrap();
        assert_eq!(mallory.len(), 1);
    }

    #[tokio::test]
    async fn test_list_login_attempts_non_admin() {
        let db = Database::open_in_memory().await.unwrap();
        let result = AuditAdminService::new(db.pool())
            .list_login_attempts(None, 100, &user_with(&["user"]))
            .await;
        assert!(matches!(result, Err(AdminError::Permission(_))));
    }

    #[tokio::test]
    async fn test_cleanup_old_login_attempts() {
        let db = Database::open_in_memory().await.unwrap();
        insert(&db, "old", 45).await;
        insert(&db, "new", 3).await;

        let service = AuditAdminService::new(db.pool());
        let admin = user_with(&["admin"]);

        assert_eq!(
            service.cleanup_old_login_attempts(30, &admin).await.unwrap(),
            1
        );
        let remaining = service.list_login_attempts(None, 100, &admin).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].username, "new");
    }
}
