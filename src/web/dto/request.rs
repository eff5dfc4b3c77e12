//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::admin::DEFAULT_LIST_LIMIT;

/// Maximum username length accepted at login.
pub const MAX_USERNAME_LEN: usize = 255;

/// Maximum rows a listing may request.
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(custom(function = "valid_username"))]
    pub username: String,
    /// Password. May be empty when checked upstream.
    #[serde(default)]
    pub password: String,
}

/// Username must be non-blank, at most [`MAX_USERNAME_LEN`] characters and
/// free of control characters.
fn valid_username(value: &str) -> Result<(), validator::ValidationError> {
    not_empty_trimmed(value)?;
    if value.chars().count() > MAX_USERNAME_LEN {
        return Err(validator::ValidationError::new("length")
            .with_message("Username is too long".into()));
    }
    no_control_chars(value)
}

/// Query for the session listing.
#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    /// Only sessions of this username.
    #[serde(default)]
    pub username: Option<String>,
    /// Maximum number of rows.
    #[serde(default)]
    pub limit: Option<i64>,
    /// Only active sessions.
    #[serde(default)]
    pub active_only: bool,
}

/// Query for the audit trail listing.
#[derive(Debug, Deserialize)]
pub struct LoginAttemptQuery {
    /// Only attempts for this username.
    #[serde(default)]
    pub username: Option<String>,
    /// Maximum number of rows.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query for the retention cleanups.
#[derive(Debug, Deserialize)]
pub struct RetentionQuery {
    /// Rows older than this many days are deleted.
    #[serde(default)]
    pub days: Option<u32>,
}

impl RetentionQuery {
    /// Requested window, or the default.
    pub fn days_or(&self, default: u32) -> u32 {
        self.days.unwrap_or(default)
    }
}

/// Clamp a requested listing size to `1..=MAX_LIST_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Treat an empty username filter as no filter.
pub fn username_filter(username: &Option<String>) -> Option<&str> {
    username.as_deref().map(str::trim).filter(|u| !u.is_empty())
}
