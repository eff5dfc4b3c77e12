//! Admin handlers for Web API.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::admin::{AuditAdminService, SessionAdminService};
use crate::db::{SessionFilter, SessionStats};
use crate::web::dto::{
    clamp_limit, username_filter, ApiResponse, DeletedResponse, LoginAttemptQuery,
    LoginAttemptResponse, RetentionQuery, SessionListQuery, SessionResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionUser;

fn session_service(state: &AppState) -> SessionAdminService<'_> {
    SessionAdminService::new(state.db.pool()).with_policy(state.policy)
}

// ============================================================================
// Sessions
// ============================================================================

/// GET /api/admin/sessions - List sessions.
pub async fn admin_list_sessions(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, ApiError> {
    let filter = SessionFilter {
        username: username_filter(&query.username).map(str::to_string),
        active_only: query.active_only,
        limit: clamp_limit(query.limit),
    };

    let sessions = session_service(&state)
        .list_sessions(&filter, &session.user)
        .await?;

    Ok(Json(ApiResponse::new(
        sessions.into_iter().map(SessionResponse::from).collect(),
    )))
}

/// GET /api/admin/sessions/stats - Session counts.
pub async fn admin_session_stats(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
) -> Result<Json<ApiResponse<SessionStats>>, ApiError> {
    let stats = session_service(&state).session_stats(&session.user).await?;
    Ok(Json(ApiResponse::new(stats)))
}

/// POST /api/admin/sessions/sweep - Run the expiry sweep now.
pub async fn admin_sweep_sessions(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let deleted = session_service(&state).sweep_now(&session.user).await?;
    Ok(Json(ApiResponse::new(DeletedResponse { deleted })))
}

/// DELETE /api/admin/sessions?days=N - Delete old inactive sessions.
pub async fn admin_cleanup_sessions(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
    Query(query): Query<RetentionQuery>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let days = query.days_or(state.retention_days);
    let deleted = session_service(&state)
        .cleanup_old_sessions(days, &session.user)
        .await?;
    Ok(Json(ApiResponse::new(DeletedResponse { deleted })))
}

// ============================================================================
// Audit trail
// ============================================================================

/// GET /api/admin/login-attempts - List rejected logins.
pub async fn admin_list_login_attempts(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
    Query(query): Query<LoginAttemptQuery>,
) -> Result<Json<ApiResponse<Vec<LoginAttemptResponse>>>, ApiError> {
    let attempts = AuditAdminService::new(state.db.pool())
        .list_login_attempts(
            username_filter(&query.username),
            clamp_limit(query.limit),
            &session.user,
        )
        .await?;

    Ok(Json(ApiResponse::new(
        attempts.into_iter().map(LoginAttemptResponse::from).collect(),
    )))
}

/// DELETE /api/admin/login-attempts?days=N - Delete old audit rows.
pub async fn admin_cleanup_login_attempts(
    State(state): State<Arc<AppState>>,
    session: SessionUser,
    Query(query): Query<RetentionQuery>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let days = query.days_or(state.retention_days);
    let deleted = AuditAdminService::new(state.db.pool())
        .cleanup_old_login_attempts(days, &session.user)
        .await?;
    Ok(Json(ApiResponse::new(DeletedResponse { deleted })))
}
