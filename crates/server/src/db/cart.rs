use breadbox_core::{CartEntryId, Price, ProductId, UserId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::CartLine;

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    entry_id: CartEntryId,
    product_id: ProductId,
    name: String,
    price: Price,
    quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            entry_id: row.entry_id,
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
        }
    }
}

/// Product facts behind a cart entry, read when validating a quantity
/// change.
#[derive(Debug, sqlx::FromRow)]
pub struct EntryProduct {
    pub product_name: String,
    pub stock: i32,
}

pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Quantity already in the cart for a product, if any.
    pub async fn entry_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<i32>, RepositoryError> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM cart_entries WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(quantity)
    }

    /// Adds `quantity` to the cart, merging into the existing entry for
    /// the product when there is one. Returns the entry id and the
    /// merged quantity.
    pub async fn upsert_entry(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(CartEntryId, i32), RepositoryError> {
        let row = sqlx::query_as::<_, (CartEntryId, i32)>(
            "INSERT INTO cart_entries (user_id, product_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET quantity = cart_entries.quantity + EXCLUDED.quantity,
                           updated_at = now()
             RETURNING id, quantity",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Product name and stock for an entry, scoped to its owner. `None`
    /// when the entry does not exist or belongs to someone else.
    pub async fn entry_product(
        &self,
        user_id: UserId,
        entry_id: CartEntryId,
    ) -> Result<Option<EntryProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, EntryProduct>(
            "SELECT p.name AS product_name, p.stock
             FROM cart_entries c
             JOIN products p ON p.id = c.product_id
             WHERE c.id = $1 AND c.user_id = $2",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    pub async fn set_quantity(
        &self,
        user_id: UserId,
        entry_id: CartEntryId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_entries
             SET quantity = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2",
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Removes an entry. Deleting an entry that is already gone is not
    /// an error; removal is idempotent.
    pub async fn remove(&self, user_id: UserId, entry_id: CartEntryId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// The user's cart joined with live product names and prices.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT c.id AS entry_id, c.product_id, p.name, p.price, c.quantity
             FROM cart_entries c
             JOIN products p ON p.id = c.product_id
             WHERE c.user_id = $1
             ORDER BY c.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }
}
