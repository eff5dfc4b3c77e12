//! Session management for administrators.

use chrono::Utc;
use tracing::info;

use super::{require_admin, retention, AdminError};
use crate::auth::{AuthenticatedUser, SessionManager, SessionPolicy};
use crate::datetime::cutoff_db;
use crate::db::{DbPool, SessionFilter, SessionRepository, SessionStats, UserSession};

/// Admin service for login sessions.
pub struct SessionAdminService<'a> {
    pool: &'a DbPool,
    policy: SessionPolicy,
}

impl<'a> SessionAdminService<'a> {
    /// Create a new SessionAdminService.
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            policy: SessionPolicy::default(),
        }
    }

    /// Use a custom sweep policy for [`sweep_now`](Self::sweep_now).
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// List sessions newest first.
    pub async fn list_sessions(
        &self,
        filter: &SessionFilter,
        admin: &AuthenticatedUser,
    ) -> Result<Vec<UserSession>, AdminError> {
        require_admin(admin)?;
        Ok(SessionRepository::new(self.pool).list(filter).await?)
    }

    /// Session counts; "recent" covers the last 24 hours.
    pub async fn session_stats(
        &self,
        admin: &AuthenticatedUser,
    ) -> Result<SessionStats, AdminError> {
        require_admin(admin)?;
        let recent_cutoff = cutoff_db(&Utc::now(), chrono::Duration::hours(24));
        Ok(SessionRepository::new(self.pool)
            .stats(&recent_cutoff)
            .await?)
    }

    /// Delete inactive sessions created more than `days` ago.
    pub async fn cleanup_old_sessions(
        &self,
        days: u32,
        admin: &AuthenticatedUser,
    ) -> Result<u64, AdminError> {
        require_admin(admin)?;
        let cutoff = cutoff_db(&Utc::now(), retention(days)?);
        let deleted = SessionRepository::new(self.pool)
            .delete_inactive_before(&cutoff)
            .await?;

        info!(
            admin = %admin.username,
            days = days,
            deleted = deleted,
            "Old inactive sessions deleted"
        );
        Ok(deleted)
    }

    /// Run the expiry sweep immediately.
    pub async fn sweep_now(&self, admin: &AuthenticatedUser) -> Result<u64, AdminError> {
        require_admin(admin)?;
        let deleted = SessionManager::new(self.pool)
            .with_policy(self.policy)
            .sweep_expired()
            .await?;

        info!(admin = %admin.username, deleted = deleted, "Manual session sweep");
        Ok(deleted)
    }
}
