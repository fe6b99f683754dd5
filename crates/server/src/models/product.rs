use breadbox_core::{Price, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A catalog entry.
///
/// Image bytes live in the same row but are never loaded alongside the
/// product; `has_image` reports whether a blob exists so clients know
/// when to fetch the image endpoint.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parsed fields of an admin product form, validated by the catalog
/// service before they reach the database.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    /// `None` on update means "keep the stored image".
    pub image: Option<Vec<u8>>,
}
