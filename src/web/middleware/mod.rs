//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{client_info, BearerToken, SessionUser};
pub use cors::create_cors_layer;
