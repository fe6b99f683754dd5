//! The checkout engine.
//!
//! Converts a cart into a recorded sale inside one Postgres transaction:
//! stock validation, ledger writes, stock decrements, the funds charge,
//! and the cart wipe all commit together or not at all. Every error path
//! returns before commit, dropping the transaction and rolling back.
//!
//! Cart products and the buyer row are read `FOR UPDATE`, so concurrent
//! checkouts against the same products serialize instead of overselling.
//! Products are locked in id order to keep lock acquisition consistent
//! across competing transactions.

use breadbox_core::{Price, ProductId, SaleId, UserId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::db::RepositoryError;
use crate::models::CheckoutReceipt;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("insufficient stock for {product}: {available} available, {requested} requested")]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("buyer account not found")]
    BuyerNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// A cart entry joined with the product facts read under lock.
#[derive(Debug, sqlx::FromRow)]
struct CheckoutLine {
    product_id: ProductId,
    quantity: i32,
    name: String,
    price: Price,
    stock: i32,
}

/// Runs checkouts. Unlike the repositories, this service owns its
/// transaction; the whole purchase is one unit of work against the pool.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Purchases the user's entire cart at current catalog prices.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` when there is nothing to buy,
    /// `InsufficientStock` naming the first short product in id order,
    /// `InsufficientFunds` with the required and available amounts, or
    /// `BuyerNotFound` when the account vanished mid-session. Nothing is
    /// persisted on any of these.
    pub async fn checkout(&self, user_id: UserId) -> Result<CheckoutReceipt, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        // Lock the cart rows and their products together. A competing
        // checkout of the same cart blocks here and then sees either an
        // empty cart or the reduced stock.
        let lines = sqlx::query_as::<_, CheckoutLine>(
            "SELECT c.product_id, c.quantity, p.name, p.price, p.stock
             FROM cart_entries c
             JOIN products p ON p.id = c.product_id
             WHERE c.user_id = $1
             ORDER BY c.product_id
             FOR UPDATE OF c, p",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for line in &lines {
            if line.quantity > line.stock {
                return Err(CheckoutError::InsufficientStock {
                    product: line.name.clone(),
                    available: line.stock,
                    requested: line.quantity,
                });
            }
        }

        let total = order_total(&lines);

        let funds = sqlx::query_scalar::<_, Decimal>(
            "SELECT funds FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CheckoutError::BuyerNotFound)?;

        if funds < total {
            return Err(CheckoutError::InsufficientFunds {
                required: total,
                available: funds,
            });
        }

        let sale_id = sqlx::query_scalar::<_, SaleId>(
            "INSERT INTO sales (user_id, total) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO sale_lines (sale_id, product_id, product_name, quantity, unit_price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE products SET stock = stock - $2, updated_at = now() WHERE id = $1",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        let remaining_funds = sqlx::query_scalar::<_, Decimal>(
            "UPDATE users SET funds = funds - $2, updated_at = now()
             WHERE id = $1
             RETURNING funds",
        )
        .bind(user_id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart_entries WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            sale_id = %sale_id,
            total = %total,
            "Checkout committed"
        );

        Ok(CheckoutReceipt {
            sale_id,
            total,
            remaining_funds,
        })
    }
}

/// Sums quantity times unit price across the cart.
fn order_total(lines: &[CheckoutLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.price.as_decimal() * Decimal::from(line.quantity))
        .sum()
}
