//! Reporting projections over the sale ledger.
//!
//! Each struct is both the row shape of an aggregate query and the JSON
//! body the admin stats endpoints return, so they derive `FromRow` and
//! `Serialize` together.

use breadbox_core::{Email, ProductId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Units sold per product across the whole ledger.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductSales {
    pub product_name: String,
    pub units_sold: i64,
}

/// Purchase counts per customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BuyerActivity {
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
    pub purchases: i64,
}

/// Sale count and revenue for one day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub day: DateTime<Utc>,
    pub sales: i64,
    pub revenue: Decimal,
}

/// Revenue for one calendar month.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthlyRevenue {
    pub month: DateTime<Utc>,
    pub revenue: Decimal,
}

/// Lifetime spend per customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BigSpender {
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
    pub total_spent: Decimal,
}

/// Remaining stock next to lifetime units sold, per product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockVsSold {
    pub product_id: ProductId,
    pub name: String,
    pub stock: i32,
    pub units_sold: i64,
}

/// Ledger-wide sale count and revenue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesSummary {
    pub total_sales: i64,
    pub total_revenue: Decimal,
}
