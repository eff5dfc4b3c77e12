//! Login session management.
//!
//! A username holds at most one active session: creating a session evicts
//! the previous one. Sessions are touched on each authenticated request and
//! swept once idle too long. Every rejected login appends an audit row.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::credentials::{CredentialVerifier, NO_CREDENTIALS};
use super::permission::{available_pages, Page};
use crate::config::SessionsConfig;
use crate::datetime::{age_from_secs, cutoff_db, now_db, to_db};
use crate::db::{
    AvailableProduct, DbPool, LoginAttemptRepository, NewLoginAttempt, NewUserSession,
    ProductRepository, SessionRepository, UserRepository, DEFAULT_ATTEMPT_REASON,
};
use crate::{PortalError, Result};

/// Audit reason for an unknown username.
pub const REASON_USER_NOT_FOUND: &str = "User not found in users table";

/// Audit reason for a known user without any product grant.
pub const REASON_NO_PRODUCT_ACCESS: &str = "User exists but has no access to any products";

/// Audit reason for a password rejected by the credential verifier.
pub const REASON_INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Maximum stored length of a client IP address (IPv6 text form).
pub const MAX_IP_ADDRESS_LEN: usize = 45;

/// Default idle timeout (9 hours).
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 9 * 60 * 60;

/// Default grace period for inactive sessions (1 hour).
pub const DEFAULT_INACTIVE_GRACE_SECS: u64 = 60 * 60;

/// Login rejections and store failures.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No user with this username.
    #[error("user not found")]
    UserNotFound,

    /// The user exists but holds no product grant.
    #[error("user has no access to any products")]
    NoProductAccess,

    /// The credential verifier rejected the password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Database failure.
    #[error(transparent)]
    Store(#[from] PortalError),
}

impl SessionError {
    /// Reason written to the audit trail for this rejection.
    pub fn audit_reason(&self) -> Option<&'static str> {
        match self {
            SessionError::UserNotFound => Some(REASON_USER_NOT_FOUND),
            SessionError::NoProductAccess => Some(REASON_NO_PRODUCT_ACCESS),
            SessionError::InvalidCredentials => Some(REASON_INVALID_CREDENTIALS),
            SessionError::Store(_) => None,
        }
    }
}

/// Client metadata recorded with sessions and audit rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client IP address, truncated to [`MAX_IP_ADDRESS_LEN`].
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Build client info, dropping empty values.
    pub fn new(ip_address: Option<&str>, user_agent: Option<&str>) -> Self {
        let ip_address = ip_address
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(|ip| ip.chars().take(MAX_IP_ADDRESS_LEN).collect());
        let user_agent = user_agent
            .filter(|agent| !agent.is_empty())
            .map(str::to_string);
        Self {
            ip_address,
            user_agent,
        }
    }
}

/// Idle and grace windows used by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Sessions whose last activity is older than this are deleted.
    pub idle_timeout_secs: u64,
    /// Inactive sessions created longer ago than this are deleted.
    pub inactive_grace_secs: u64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            inactive_grace_secs: DEFAULT_INACTIVE_GRACE_SECS,
        }
    }
}

impl From<&SessionsConfig> for SessionPolicy {
    fn from(config: &SessionsConfig) -> Self {
        Self {
            idle_timeout_secs: config.idle_timeout_secs,
            inactive_grace_secs: config.inactive_grace_secs,
        }
    }
}

/// A user allowed into the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Products the user holds a grant on.
    pub available_products: Vec<AvailableProduct>,
}

impl AuthenticatedUser {
    /// Pages this user may open.
    pub fn pages(&self) -> Vec<Page> {
        available_pages(&self.available_products)
    }

    /// Whether this user may open the page.
    pub fn can_view(&self, page: Page) -> bool {
        super::permission::require_page(&self.available_products, page).is_ok()
    }
}

/// Session manager over the session and audit tables.
pub struct SessionManager<'a> {
    pool: &'a DbPool,
    policy: SessionPolicy,
    verifier: &'a dyn CredentialVerifier,
}

impl<'a> SessionManager<'a> {
    /// Create a manager with the default policy.
    ///
    /// Until a verifier is set, every password is rejected.
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            policy: SessionPolicy::default(),
            verifier: &NO_CREDENTIALS,
        }
    }

    /// Use a custom sweep policy.
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a custom credential verifier.
    pub fn with_verifier(mut self, verifier: &'a dyn CredentialVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// The sweep policy in use.
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Authenticate a user.
    ///
    /// Rejections append one audit row carrying the rejection reason.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> std::result::Result<AuthenticatedUser, SessionError> {
        let user = match UserRepository::new(self.pool).get_by_username(username).await? {
            Some(user) => user,
            None => return Err(self.reject(username, client, SessionError::UserNotFound).await),
        };

        let products = ProductRepository::new(self.pool);
        if !products.has_any_grant(user.id).await? {
            return Err(self.reject(username, client, SessionError::NoProductAccess).await);
        }

        if !self.verifier.verify(username, password) {
            return Err(self.reject(username, client, SessionError::InvalidCredentials).await);
        }

        let available_products = products.available_for_user(user.id).await?;
        info!(
            username = %username,
            user_id = user.id,
            products = available_products.len(),
            "Authentication succeeded"
        );

        Ok(AuthenticatedUser {
            id: user.id,
            username: user.username,
            available_products,
        })
    }

    /// Record a rejection in the audit trail and hand the error back.
    async fn reject(&self, username: &str, client: &ClientInfo, err: SessionError) -> SessionError {
        warn!(
            username = %username,
            ip = client.ip_address.as_deref().unwrap_or("-"),
            reason = err.audit_reason().unwrap_or("-"),
            "Login rejected"
        );
        match self.log_unauthorized(username, client, err.audit_reason()).await {
            Ok(_) => err,
            Err(store) => SessionError::Store(store),
        }
    }

    /// Create a new active session, evicting any active session of the
    /// same username. Returns the new session token.
    pub async fn create_session(&self, username: &str, client: &ClientInfo) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let new_session = NewUserSession {
            username: username.to_string(),
            session_id: token.clone(),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            created_at: now_db(),
        };

        let evicted = SessionRepository::new(self.pool)
            .replace_active(&new_session)
            .await?;

        info!(
            username = %username,
            evicted = evicted,
            "Session created"
        );
        Ok(token)
    }

    /// True iff a row with this token exists and is active.
    pub async fn is_session_active(&self, token: &str) -> Result<bool> {
        SessionRepository::new(self.pool).is_active(token).await
    }

    /// Mark a session inactive. False if unknown or already inactive.
    pub async fn deactivate(&self, token: &str) -> Result<bool> {
        let deactivated = SessionRepository::new(self.pool).deactivate(token).await?;
        if deactivated {
            info!("Session deactivated");
        } else {
            debug!("Deactivate: session not found or already inactive");
        }
        Ok(deactivated)
    }

    /// Update last activity of an active session. False if not active.
    pub async fn touch(&self, token: &str) -> Result<bool> {
        SessionRepository::new(self.pool)
            .touch(token, &now_db())
            .await
    }

    /// Delete idle and stale inactive sessions as of now.
    pub async fn sweep_expired(&self) -> Result<u64> {
        self.sweep_expired_at(Utc::now()).await
    }

    /// Delete sessions idle since before `now - idle_timeout`, and inactive
    /// sessions created before `now - inactive_grace`.
    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<u64> {
        let idle_cutoff = cutoff_db(&now, age_from_secs(self.policy.idle_timeout_secs));
        let inactive_cutoff = cutoff_db(&now, age_from_secs(self.policy.inactive_grace_secs));

        let deleted = SessionRepository::new(self.pool)
            .sweep(&idle_cutoff, &inactive_cutoff)
            .await?;

        debug!(
            now = %to_db(&now),
            deleted = deleted,
            "Session sweep finished"
        );
        Ok(deleted)
    }

    /// Append an audit row. Returns its ID.
    pub async fn log_unauthorized(
        &self,
        username: &str,
        client: &ClientInfo,
        reason: Option<&str>,
    ) -> Result<i64> {
        let attempt = NewLoginAttempt {
            username: username.to_string(),
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            attempted_at: now_db(),
            reason: reason.unwrap_or(DEFAULT_ATTEMPT_REASON).to_string(),
        };
        LoginAttemptRepository::new(self.pool).insert(&attempt).await
    }

    /// Number of active sessions of a username (0 or 1 under the policy).
    pub async fn active_session_count(&self, username: &str) -> Result<i64> {
        SessionRepository::new(self.pool)
            .count_active_for(username)
            .await
    }

    /// User info for a username that exists and holds a grant.
    ///
    /// Does not write to the audit trail.
    pub async fn user_info(&self, username: &str) -> Result<Option<AuthenticatedUser>> {
        let user = match UserRepository::new(self.pool).get_by_username(username).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        let available_products = ProductRepository::new(self.pool)
            .available_for_user(user.id)
            .await?;
        if available_products.is_empty() {
            return Ok(None);
        }

        Ok(Some(AuthenticatedUser {
            id: user.id,
            username: user.username,
            available_products,
        }))
    }

    /// Touch an active session and return its user.
    ///
    /// None if the session is not active, or its user no longer exists or
    /// lost every grant.
    pub async fn resume(&self, token: &str) -> Result<Option<AuthenticatedUser>> {
        if !self.touch(token).await? {
            return Ok(None);
        }

        let session = match SessionRepository::new(self.pool).get_active(token).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        self.user_info(&session.username).await
    }
}
