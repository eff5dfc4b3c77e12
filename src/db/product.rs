//! Product, grant and ownership models.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Role a user holds on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductRole {
    /// Read-only access.
    #[default]
    Viewer,
    /// Read-write access.
    Editor,
}

impl ProductRole {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductRole::Viewer => "viewer",
            ProductRole::Editor => "editor",
        }
    }
}

impl fmt::Display for ProductRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProductRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viewer" => Ok(ProductRole::Viewer),
            "editor" => Ok(ProductRole::Editor),
            _ => Err(format!("unknown product role: {s}")),
        }
    }
}

impl TryFrom<String> for ProductRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A product users can be granted access to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: i64,
    /// Product name. Also the access role it confers on the page gate.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Data for creating a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Product name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl NewProduct {
    /// Create a new product without description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A grant row: `user_id` holds `role` on `product_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductUser {
    /// Grant ID.
    pub id: i64,
    /// Product ID.
    pub product_id: i64,
    /// User ID.
    pub user_id: i64,
    /// Granted role.
    #[sqlx(try_from = "String")]
    pub role: ProductRole,
}

/// An ownership row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductOwner {
    /// Ownership ID.
    pub id: i64,
    /// Product ID.
    pub product_id: i64,
    /// Owner user ID.
    pub user_id: i64,
}

/// A product available to a user, with the role they hold on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AvailableProduct {
    /// Product ID.
    pub id: i64,
    /// Product name.
    pub name: String,
    /// Product description.
    pub description: Option<String>,
    /// Role granted to the user.
    #[sqlx(try_from = "String")]
    pub role: ProductRole,
}
