//! Authentication module for the portal.
//!
//! This module provides login checks, single-session management, the
//! page-access gate and the background session sweeper.

mod credentials;
pub mod password;
pub mod permission;
mod session;
mod sweeper;

pub use credentials::{
    verifier_from_config, CredentialVerifier, HashedCredentials, StaticCredentials,
    UpstreamVerified,
};
pub use password::{hash_password, verify_password, PasswordError};
pub use permission::{available_pages, has_access, require_page, Page, PermissionError};
pub use session::{
    AuthenticatedUser, ClientInfo, SessionError, SessionManager, SessionPolicy,
    DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_INACTIVE_GRACE_SECS, MAX_IP_ADDRESS_LEN,
    REASON_INVALID_CREDENTIALS, REASON_NO_PRODUCT_ACCESS, REASON_USER_NOT_FOUND,
};
pub use sweeper::{start_session_sweeper, SessionSweeper, DEFAULT_SWEEP_INTERVAL_SECS};
