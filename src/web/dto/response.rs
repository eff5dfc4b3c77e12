//! Response DTOs for Web API.

use serde::Serialize;

use crate::auth::{AuthenticatedUser, Page};
use crate::datetime::to_rfc3339;
use crate::db::{AvailableProduct, ProductRole, UnauthorizedLoginAttempt, UserSession};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Auth DTOs
// ============================================================================

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token, sent back as a bearer token.
    pub session_id: String,
    /// User information.
    pub user: UserInfo,
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Whether an active session was ended.
    pub logged_out: bool,
}

/// Product entry in user info.
#[derive(Debug, Serialize)]
pub struct ProductInfo {
    /// Product ID.
    pub id: i64,
    /// Product name.
    pub name: String,
    /// Product description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The user's role on the product.
    pub role: ProductRole,
}

impl From<AvailableProduct> for ProductInfo {
    fn from(p: AvailableProduct) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            role: p.role,
        }
    }
}

/// User information in responses.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Products the user holds a grant on.
    pub products: Vec<ProductInfo>,
    /// Pages the user may open.
    pub pages: Vec<Page>,
}

impl From<AuthenticatedUser> for UserInfo {
    fn from(user: AuthenticatedUser) -> Self {
        let pages = user.pages();
        Self {
            id: user.id,
            username: user.username,
            products: user
                .available_products
                .into_iter()
                .map(ProductInfo::from)
                .collect(),
            pages,
        }
    }
}

/// Page access response.
#[derive(Debug, Serialize)]
pub struct PageAccessResponse {
    /// Requested page.
    pub page: Page,
    /// Always true; denied access is a 403.
    pub allowed: bool,
}

// ============================================================================
// Admin DTOs
// ============================================================================

/// Session row in admin listings.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Row ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Session token.
    pub session_id: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last activity timestamp.
    pub last_activity: String,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Client user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Whether the session is active.
    pub is_active: bool,
}

impl From<UserSession> for SessionResponse {
    fn from(s: UserSession) -> Self {
        Self {
            id: s.id,
            username: s.username,
            session_id: s.session_id,
            created_at: to_rfc3339(&s.created_at),
            last_activity: to_rfc3339(&s.last_activity),
            ip_address: s.ip_address,
            user_agent: s.user_agent,
            is_active: s.is_active,
        }
    }
}

/// Audit row in admin listings.
#[derive(Debug, Serialize)]
pub struct LoginAttemptResponse {
    /// Row ID.
    pub id: i64,
    /// Username that was tried.
    pub username: String,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Client user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Attempt timestamp.
    pub attempted_at: String,
    /// Rejection reason.
    pub reason: String,
}

impl From<UnauthorizedLoginAttempt> for LoginAttemptResponse {
    fn from(a: UnauthorizedLoginAttempt) -> Self {
        Self {
            id: a.id,
            username: a.username,
            ip_address: a.ip_address,
            user_agent: a.user_agent,
            attempted_at: to_rfc3339(&a.attempted_at),
            reason: a.reason,
        }
    }
}

/// Result of a delete operation.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    /// Number of deleted rows.
    pub deleted: u64,
}
