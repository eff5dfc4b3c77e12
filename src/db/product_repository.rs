//! Product repository.
//!
//! Products, per-user grants and ownership.

use super::product::{AvailableProduct, NewProduct, Product, ProductOwner, ProductRole, ProductUser};
use super::DbPool;
use crate::{PortalError, Result};

/// Repository for products and their grants.
pub struct ProductRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new ProductRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new product.
    pub async fn create(&self, new_product: &NewProduct) -> Result<Product> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&new_product.name)
        .bind(&new_product.description)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| PortalError::NotFound("product".to_string()))
    }

    /// Get a product by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, created_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// List all products ordered by name.
    pub async fn list_all(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, created_at FROM products ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Grant a user a role on a product.
    pub async fn grant(&self, product_id: i64, user_id: i64, role: ProductRole) -> Result<ProductUser> {
        let grant = sqlx::query_as::<_, ProductUser>(
            "INSERT INTO product_users (product_id, user_id, role) VALUES ($1, $2, $3)
             RETURNING id, product_id, user_id, role",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(grant)
    }

    /// Remove every grant a user holds on a product.
    ///
    /// Returns true if any grant was removed.
    pub async fn revoke(&self, product_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM product_users WHERE product_id = $1 AND user_id = $2")
            .bind(product_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether a user holds at least one grant.
    pub async fn has_any_grant(&self, user_id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM product_users WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Products available to a user, with the granted role.
    pub async fn available_for_user(&self, user_id: i64) -> Result<Vec<AvailableProduct>> {
        let products = sqlx::query_as::<_, AvailableProduct>(
            "SELECT p.id, p.name, p.description, pu.role
             FROM product_users pu
             JOIN products p ON p.id = pu.product_id
             WHERE pu.user_id = $1
             ORDER BY pu.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Record a user as owner of a product.
    pub async fn add_owner(&self, product_id: i64, user_id: i64) -> Result<ProductOwner> {
        let owner = sqlx::query_as::<_, ProductOwner>(
            "INSERT INTO product_owners (product_id, user_id) VALUES ($1, $2)
             RETURNING id, product_id, user_id",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(owner)
    }

    /// Products owned by a user.
    pub async fn owned_by(&self, user_id: i64) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT p.id, p.name, p.description, p.created_at
             FROM product_owners po
             JOIN products p ON p.id = po.product_id
             WHERE po.user_id = $1
             ORDER BY p.name, p.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice"))
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_product() {
        let (db, _) = setup().await;
        let repo = ProductRepository::new(db.pool());

        let product = repo
            .create(&NewProduct::new("admin").with_description("Administration"))
            .await
            .unwrap();

        assert_eq!(product.name, "admin");
        assert_eq!(product.description.as_deref(), Some("Administration"));
        assert!(repo.get_by_id(product.id).await.unwrap().is_some());
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all() {
        let (db, _) = setup().await;
        let repo = ProductRepository::new(db.pool());

        repo.create(&NewProduct::new("user")).await.unwrap();
        repo.create(&NewProduct::new("admin")).await.unwrap();

        let names: Vec<_> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["admin", "user"]);
    }

    #[tokio::test]
    async fn test_grant_and_available() {
        let (db, user_id) = setup().await;
        let repo = ProductRepository::new(db.pool());

        assert!(!repo.has_any_grant(user_id).await.unwrap());

        let admin = repo.create(&NewProduct::new("admin")).await.unwrap();
        let user = repo.create(&NewProduct::new("user")).await.unwrap();
        let grant = repo.grant(admin.id, user_id, ProductRole::Editor).await.unwrap();
        assert_eq!(grant.role, ProductRole::Editor);
        repo.grant(user.id, user_id, ProductRole::Viewer).await.unwrap();

        assert!(repo.has_any_grant(user_id).await.unwrap());

        let available = repo.available_for_user(user_id).await.unwrap();
        assert_eq!(available.len(), 2);
        assert_eq!(available[0].name, "admin");
        assert_eq!(available[0].role, ProductRole::Editor);
        assert_eq!(available[1].name, "user");
        assert_eq!(available[1].role, ProductRole::Viewer);
    }

    #[tokio::test]
    async fn test_revoke() {
        let (db, user_id) = setup().await;
        let repo = ProductRepository::new(db.pool());

        let product = repo.create(&NewProduct::new("user")).await.unwrap();
        repo.grant(product.id, user_id, ProductRole::Viewer).await.unwrap();

        assert!(repo.revoke(product.id, user_id).await.unwrap());
        assert!(!repo.has_any_grant(user_id).await.unwrap());
        assert!(!repo.revoke(product.id, user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_unknown_user_fails() {
        let (db, _) = setup().await;
        let repo = ProductRepository::new(db.pool());

        let product = repo.create(&NewProduct::new("user")).await.unwrap();
        let result = repo.grant(product.id, 999, ProductRole::Viewer).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_owners() {
        let (db, user_id) = setup().await;
        let repo = ProductRepository::new(db.pool());

        let product = repo.create(&NewProduct::new("reports")).await.unwrap();
        repo.create(&NewProduct::new("other")).await.unwrap();

        let owner = repo.add_owner(product.id, user_id).await.unwrap();
        assert_eq!(owner.product_id, product.id);

        let owned = repo.owned_by(user_id).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "reports");

        // Ownership alone is not a grant
        assert!(!repo.has_any_grant(user_id).await.unwrap());
    }
}
