//! Cart and checkout endpoints.
//!
//! Mutations require a logged-in user. Reading the cart anonymously
//! returns an empty list so storefront clients can render without a
//! session.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use breadbox_core::{CartEntryId, Price, ProductId, SaleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CartLine;
use crate::services::{CartService, CheckoutService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub id: CartEntryId,
    pub product_id: ProductId,
    pub name: String,
    /// Live catalog price; carts reprice on every read.
    pub price: Price,
    pub quantity: i32,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.entry_id,
            product_id: line.product_id,
            name: line.name,
            price: line.price,
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub sale_id: SaleId,
    pub total_charged: Decimal,
    pub remaining_funds: Decimal,
}

/// GET /cart
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Vec<CartLineResponse>>> {
    let Some(user) = user else {
        return Ok(Json(Vec::new()));
    };

    let cart = CartService::new(state.pool());
    let lines = cart.list(user.id).await?;
    Ok(Json(lines.into_iter().map(CartLineResponse::from).collect()))
}

/// POST /cart/items
///
/// Adds a product, merging with any existing entry for it. Responds
/// with the merged line.
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartLineResponse>)> {
    let cart = CartService::new(state.pool());
    let line = cart.add_item(user.id, req.product_id, req.quantity).await?;
    Ok((StatusCode::CREATED, Json(line.into())))
}

/// PUT /cart/items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(entry_id): Path<CartEntryId>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<StatusCode> {
    let cart = CartService::new(state.pool());
    cart.update_quantity(user.id, entry_id, req.quantity).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart/items/{id}
///
/// Idempotent; removing an entry that is already gone still succeeds.
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(entry_id): Path<CartEntryId>,
) -> Result<StatusCode> {
    let cart = CartService::new(state.pool());
    cart.remove_item(user.id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /cart/checkout
///
/// Purchases the whole cart in one transaction and responds with the
/// receipt.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let engine = CheckoutService::new(state.pool());
    let receipt = engine.checkout(user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            sale_id: receipt.sale_id,
            total_charged: receipt.total,
            remaining_funds: receipt.remaining_funds,
        }),
    ))
}
