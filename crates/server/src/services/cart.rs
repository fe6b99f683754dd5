//! Cart mutations with stock-aware validation.
//!
//! The checks here are best-effort reads against live stock so shoppers
//! get early feedback. Checkout re-validates everything under row locks;
//! only that validation is authoritative.

use breadbox_core::{CartEntryId, ProductId, UserId};
use sqlx::PgPool;

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::CartLine;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("product not found")]
    ProductNotFound,

    #[error("cart entry not found")]
    EntryNotFound,

    #[error("quantity must be a positive integer, got {0}")]
    InvalidQuantity(i32),

    #[error("insufficient stock for {product}: {available} available, {requested} requested")]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Adds `quantity` of a product, merging with any existing entry.
    /// The merged quantity must fit the product's current stock.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartLine, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        let in_cart = self
            .carts
            .entry_quantity(user_id, product_id)
            .await?
            .unwrap_or(0);
        let requested = in_cart
            .checked_add(quantity)
            .ok_or(CartError::InvalidQuantity(quantity))?;
        if requested > product.stock {
            return Err(CartError::InsufficientStock {
                product: product.name,
                available: product.stock,
                requested,
            });
        }

        let (entry_id, merged) = self.carts.upsert_entry(user_id, product_id, quantity).await?;
        Ok(CartLine {
            entry_id,
            product_id,
            name: product.name,
            price: product.price,
            quantity: merged,
        })
    }

    /// Replaces the quantity of an entry the user owns.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        entry_id: CartEntryId,
        quantity: i32,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let entry = self
            .carts
            .entry_product(user_id, entry_id)
            .await?
            .ok_or(CartError::EntryNotFound)?;
        if quantity > entry.stock {
            return Err(CartError::InsufficientStock {
                product: entry.product_name,
                available: entry.stock,
                requested: quantity,
            });
        }

        self.carts
            .set_quantity(user_id, entry_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::EntryNotFound,
                other => CartError::Repository(other),
            })
    }

    /// Removes an entry. Succeeds even when the entry is already gone.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        entry_id: CartEntryId,
    ) -> Result<(), CartError> {
        self.carts.remove(user_id, entry_id).await?;
        Ok(())
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, CartError> {
        Ok(self.carts.list(user_id).await?)
    }
}
