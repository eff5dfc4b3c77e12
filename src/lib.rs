//! product-portal - backend for a multi-page product dashboard.
//!
//! Users hold grants on products; a product's name is the role it confers
//! on dashboard pages. Each username keeps at most one active login
//! session, idle sessions are swept, and rejected logins are audited.

pub mod admin;
pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use admin::{AdminError, AuditAdminService, SessionAdminService};
pub use auth::{
    hash_password, AuthenticatedUser, ClientInfo, CredentialVerifier, HashedCredentials, Page,
    PermissionError, SessionError, SessionManager, SessionPolicy, SessionSweeper,
    StaticCredentials, UpstreamVerified,
};
pub use config::Config;
pub use db::{
    Database, NewProduct, NewUser, Product, ProductRepository, ProductRole, User, UserRepository,
};
pub use error::{PortalError, Result};
pub use web::WebServer;
