//! API handlers for the portal.

pub mod admin;
pub mod auth;
pub mod pages;

pub use admin::*;
pub use auth::*;
pub use pages::*;
