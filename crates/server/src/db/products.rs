use breadbox_core::{Price, ProductId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Product;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    stock: i32,
    has_image: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            has_image: row.has_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists the catalog. Image blobs stay in the database; only the
    /// `has_image` flag travels with the rows.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, stock,
                    (image IS NOT NULL) AS has_image, created_at, updated_at
             FROM products
             ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, stock,
                    (image IS NOT NULL) AS has_image, created_at, updated_at
             FROM products
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Fetches the image blob. Outer `None` means the product does not
    /// exist; inner `None` means it exists but has no image.
    pub async fn get_image(
        &self,
        id: ProductId,
    ) -> Result<Option<Option<Vec<u8>>>, RepositoryError> {
        let image = sqlx::query_scalar::<_, Option<Vec<u8>>>(
            "SELECT image FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(image)
    }

    pub async fn create(
        &self,
        name: &str,
        description: &str,
        price: Price,
        stock: i32,
        image: Option<&[u8]>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, description, price, stock, image)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, description, price, stock,
                       (image IS NOT NULL) AS has_image, created_at, updated_at",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(image)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Updates a product. A `None` image keeps the stored blob; `Some`
    /// replaces it.
    pub async fn update(
        &self,
        id: ProductId,
        name: &str,
        description: &str,
        price: Price,
        stock: i32,
        image: Option<&[u8]>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products
             SET name = $2, description = $3, price = $4, stock = $5,
                 image = COALESCE($6, image), updated_at = now()
             WHERE id = $1
             RETURNING id, name, description, price, stock,
                       (image IS NOT NULL) AS has_image, created_at, updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(image)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Deletes a product. Cart entries cascade away; sale lines keep
    /// their snapshots and only lose the foreign key.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
