//! Catalog reads and admin product management.

use breadbox_core::{Price, PriceError, ProductId};
use sqlx::PgPool;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::{Product, ProductInput};

const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    #[error("product not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// The image blob for a product. A missing product and a product
    /// without an image both surface as `NotFound`.
    pub async fn image(&self, id: ProductId) -> Result<Vec<u8>, CatalogError> {
        match self.products.get_image(id).await? {
            Some(Some(bytes)) => Ok(bytes),
            _ => Err(CatalogError::NotFound),
        }
    }

    pub async fn create(&self, input: ProductInput) -> Result<Product, CatalogError> {
        let (name, price) = validate_input(&input)?;
        let product = self
            .products
            .create(name, &input.description, price, input.stock, input.image.as_deref())
            .await?;
        Ok(product)
    }

    pub async fn update(&self, id: ProductId, input: ProductInput) -> Result<Product, CatalogError> {
        let (name, price) = validate_input(&input)?;
        self.products
            .update(id, name, &input.description, price, input.stock, input.image.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::NotFound,
                other => CatalogError::Repository(other),
            })
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        self.products.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => CatalogError::NotFound,
            other => CatalogError::Repository(other),
        })
    }
}

fn validate_input(input: &ProductInput) -> Result<(&str, Price), CatalogError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation(
            "name must not be empty".to_owned(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(CatalogError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    if input.stock < 0 {
        return Err(CatalogError::Validation(format!(
            "stock must not be negative, got {}",
            input.stock
        )));
    }
    let price = Price::new(input.price)?;
    Ok((name, price))
}
