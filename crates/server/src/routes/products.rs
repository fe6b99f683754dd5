//! Public catalog endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use breadbox_core::{Price, ProductId};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::Product;
use crate::services::CatalogService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            has_image: product.has_image,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// GET /products
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    let catalog = CatalogService::new(state.pool());
    let products = catalog.list().await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

/// GET /products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>> {
    let catalog = CatalogService::new(state.pool());
    let product = catalog.get(id).await?;
    Ok(Json(product.into()))
}

/// GET /products/{id}/image
///
/// Serves the stored blob. Uploads are JPEG, so the content type is
/// fixed. 404 when the product or its image is missing.
pub async fn image(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let catalog = CatalogService::new(state.pool());
    let bytes = catalog.image(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}
