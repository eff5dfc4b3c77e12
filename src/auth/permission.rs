//! Page access gate.
//!
//! Each dashboard page lists the roles allowed to view it. A user's roles
//! are the names of the products they hold a grant on.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::db::AvailableProduct;

/// Permission-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The user holds none of the roles the page requires.
    #[error("access to the {0} page is not permitted")]
    PageDenied(Page),

    /// Unknown page name.
    #[error("unknown page: {0}")]
    UnknownPage(String),
}

/// Dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// Landing page.
    Home,
    /// Administration page (sessions, audit trail).
    Admin,
}

/// Page → permitted roles, in display order.
const PAGE_PERMISSIONS: &[(Page, &[&str])] = &[
    (Page::Home, &["admin", "user"]),
    (Page::Admin, &["admin"]),
];

impl Page {
    /// All pages in display order.
    pub fn all() -> impl Iterator<Item = Page> {
        PAGE_PERMISSIONS.iter().map(|(page, _)| *page)
    }

    /// URL-safe name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Admin => "admin",
        }
    }

    /// Roles allowed to view this page.
    pub fn allowed_roles(&self) -> &'static [&'static str] {
        PAGE_PERMISSIONS
            .iter()
            .find(|(page, _)| page == self)
            .map(|(_, roles)| *roles)
            .unwrap_or(&[])
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Page {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home" => Ok(Page::Home),
            "admin" => Ok(Page::Admin),
            _ => Err(PermissionError::UnknownPage(s.to_string())),
        }
    }
}

/// Check whether a single role may view a page.
pub fn has_access(page: Page, role: &str) -> bool {
    page.allowed_roles().contains(&role)
}

/// Pages reachable from any of the user's products, in display order.
pub fn available_pages(products: &[AvailableProduct]) -> Vec<Page> {
    Page::all()
        .filter(|page| products.iter().any(|p| has_access(*page, &p.name)))
        .collect()
}

/// Require that one of the user's products grants the page.
pub fn require_page(products: &[AvailableProduct], page: Page) -> Result<(), PermissionError> {
    if products.iter().any(|p| has_access(page, &p.name)) {
        Ok(())
    } else {
        Err(PermissionError::PageDenied(page))
    }
}
