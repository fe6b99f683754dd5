//! Database access layer.
//!
//! Repositories over the Breadbox schema:
//! - `users` - accounts, credentials, roles, prepaid funds
//! - `products` - catalog entries with optional image blobs
//! - `cart_entries` - open carts, one row per (user, product)
//! - `sales` / `sale_lines` - the immutable sale ledger
//!
//! Schema changes live in `crates/server/migrations/` and are applied
//! explicitly via `cargo run -p breadbox-cli -- migrate`, never at
//! server startup.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

mod cart;
mod products;
mod sales;
mod users;

pub use cart::{CartRepository, EntryProduct};
pub use products::ProductRepository;
pub use sales::SaleRepository;
pub use users::UserRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Creates the shared connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the database is unreachable.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
