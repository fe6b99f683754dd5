//! Purchase history endpoints for customers.

use axum::Json;
use axum::extract::{Path, State};
use breadbox_core::{Price, SaleId, UserRole};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::SaleRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Sale, SaleLine};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub id: SaleId,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            total: sale.total,
            created_at: sale.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleLineResponse {
    pub name: String,
    pub quantity: i32,
    /// Unit price at the time of purchase, not the current catalog
    /// price.
    pub unit_price: Price,
}

impl From<SaleLine> for SaleLineResponse {
    fn from(line: SaleLine) -> Self {
        Self {
            name: line.product_name,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaleDetailResponse {
    pub id: SaleId,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SaleLineResponse>,
}

/// GET /sales
///
/// The caller's purchases, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<SaleResponse>>> {
    let sales = SaleRepository::new(state.pool());
    let mine = sales.list_for_user(user.id).await.map_err(AppError::Database)?;
    Ok(Json(mine.into_iter().map(SaleResponse::from).collect()))
}

/// GET /sales/{id}
///
/// One sale with its lines. Customers only see their own sales; a sale
/// belonging to someone else reads as missing rather than forbidden.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<SaleId>,
) -> Result<Json<SaleDetailResponse>> {
    let sales = SaleRepository::new(state.pool());
    let detail = sales
        .get_detail(id)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("sale {id}")))?;

    if detail.sale.user_id != user.id && user.role != UserRole::Admin {
        return Err(AppError::NotFound(format!("sale {id}")));
    }

    Ok(Json(SaleDetailResponse {
        id: detail.sale.id,
        total: detail.sale.total,
        created_at: detail.sale.created_at,
        lines: detail
            .lines
            .into_iter()
            .map(SaleLineResponse::from)
            .collect(),
    }))
}
