//! Web API module for the portal.
//!
//! This module provides the JSON API used by the dashboard front end:
//! login and logout, page access checks and the admin views.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
