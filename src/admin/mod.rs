//! Administration module for the portal.
//!
//! This module provides administrative functionality including:
//! - Session management (list, stats, sweep, retention cleanup)
//! - Audit trail management (list rejected logins, retention cleanup)
//!
//! Every operation requires the caller to have access to the admin page.

mod audit;
mod session;

pub use audit::AuditAdminService;
pub use session::SessionAdminService;

use thiserror::Error;

use crate::auth::{require_page, AuthenticatedUser, Page, PermissionError};
use crate::PortalError;

/// Default retention window for the cleanups, in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default number of rows returned by the listings.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Admin-related errors.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Permission denied for the operation.
    #[error("{0}")]
    Permission(#[from] PermissionError),

    /// Invalid argument.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Database error.
    #[error(transparent)]
    Store(#[from] PortalError),
}

/// Require admin page access.
pub fn require_admin(user: &AuthenticatedUser) -> std::result::Result<(), PermissionError> {
    require_page(&user.available_products, Page::Admin)
}

/// Check if a user can perform admin operations.
pub fn is_admin(user: &AuthenticatedUser) -> bool {
    require_admin(user).is_ok()
}

/// Check a retention window and turn it into a cutoff duration.
fn retention(days: u32) -> std::result::Result<chrono::Duration, AdminError> {
    if days == 0 {
        return Err(AdminError::InvalidOperation(
            "retention must be at least one day".to_string(),
        ));
    }
    Ok(crate::datetime::age_from_secs(u64::from(days) * 24 * 60 * 60))
}
