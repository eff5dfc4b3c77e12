//! Authentication handlers.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::admin::DEFAULT_RETENTION_DAYS;
use crate::auth::{CredentialVerifier, HashedCredentials, SessionManager, SessionPolicy};
use crate::web::dto::{ApiResponse, LoginRequest, LoginResponse, LogoutResponse, UserInfo};
use crate::web::dto::ValidatedJson;
use crate::web::error::ApiError;
use crate::web::middleware::{client_info, BearerToken, SessionUser};
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database.
    pub db: Database,
    /// Session sweep policy.
    pub policy: SessionPolicy,
    /// Password check used at login.
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Default retention window for the admin cleanups.
    pub retention_days: u32,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The default verifier has no credentials and rejects every password.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            policy: SessionPolicy::default(),
            verifier: Arc::new(HashedCredentials::default()),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    /// Set the session sweep policy.
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the credential verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Set the default retention window.
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Session manager over this state's database.
    pub fn session_manager(&self) -> SessionManager<'_> {
        SessionManager::new(self.db.pool())
            .with_policy(self.policy)
            .with_verifier(&*self.verifier)
    }
}

/// POST /api/auth/login - User login.
///
/// Replaces any active session of the same username.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let client = client_info(&headers);
    let manager = state.session_manager();

    let user = manager
        .authenticate(&req.username, &req.password, &client)
        .await?;
    let session_id = manager.create_session(&user.username, &client).await?;

    Ok(Json(ApiResponse::new(LoginResponse {
        session_id,
        user: user.into(),
    })))
}

/// POST /api/auth/logout - End the session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<LogoutResponse>>, ApiError> {
    let logged_out = state.session_manager().deactivate(&token).await?;
    Ok(Json(ApiResponse::new(LogoutResponse { logged_out })))
}

/// GET /api/auth/me - Current user.
pub async fn me(session: SessionUser) -> Json<ApiResponse<UserInfo>> {
    Json(ApiResponse::new(session.user.into()))
}
