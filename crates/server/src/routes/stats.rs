//! Admin reporting endpoints over the sale ledger.
//!
//! Each endpoint is a thin wrapper over one aggregate query; the row
//! shapes in `models::stats` serialize straight to the response.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::db::SaleRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{
    BigSpender, BuyerActivity, DailySales, MonthlyRevenue, ProductSales, SalesSummary, StockVsSold,
};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn clamped(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// GET /admin/stats/top-products
pub async fn top_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ProductSales>>> {
    let sales = SaleRepository::new(state.pool());
    let rows = sales
        .top_products(query.clamped())
        .await
        .map_err(AppError::Database)?;
    Ok(Json(rows))
}

/// GET /admin/stats/top-buyers
pub async fn top_buyers(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<BuyerActivity>>> {
    let sales = SaleRepository::new(state.pool());
    let rows = sales
        .top_buyers(query.clamped())
        .await
        .map_err(AppError::Database)?;
    Ok(Json(rows))
}

/// GET /admin/stats/weekly-sales
pub async fn weekly_sales(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<DailySales>>> {
    let sales = SaleRepository::new(state.pool());
    let rows = sales.weekly_sales().await.map_err(AppError::Database)?;
    Ok(Json(rows))
}

/// GET /admin/stats/monthly-revenue
pub async fn monthly_revenue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<MonthlyRevenue>>> {
    let sales = SaleRepository::new(state.pool());
    let rows = sales.monthly_revenue().await.map_err(AppError::Database)?;
    Ok(Json(rows))
}

/// GET /admin/stats/top-spenders
pub async fn top_spenders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<BigSpender>>> {
    let sales = SaleRepository::new(state.pool());
    let rows = sales
        .top_spenders(query.clamped())
        .await
        .map_err(AppError::Database)?;
    Ok(Json(rows))
}

/// GET /admin/stats/stock-vs-sold
pub async fn stock_vs_sold(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<StockVsSold>>> {
    let sales = SaleRepository::new(state.pool());
    let rows = sales.stock_vs_sold().await.map_err(AppError::Database)?;
    Ok(Json(rows))
}

/// GET /admin/stats/summary
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<SalesSummary>> {
    let sales = SaleRepository::new(state.pool());
    let totals = sales.summary().await.map_err(AppError::Database)?;
    Ok(Json(totals))
}
