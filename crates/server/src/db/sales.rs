use breadbox_core::{Price, ProductId, SaleId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{
    BigSpender, BuyerActivity, DailySales, MonthlyRevenue, ProductSales, Sale, SaleDetail,
    SaleLine, SalesSummary, StockVsSold,
};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: SaleId,
    user_id: UserId,
    total: Decimal,
    created_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            total: row.total,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    product_id: Option<ProductId>,
    product_name: String,
    quantity: i32,
    unit_price: Price,
}

impl From<SaleLineRow> for SaleLine {
    fn from(row: SaleLineRow) -> Self {
        Self {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

/// Read access to the sale ledger. Writing happens only inside the
/// checkout transaction.
pub struct SaleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SaleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_detail(&self, id: SaleId) -> Result<Option<SaleDetail>, RepositoryError> {
        let Some(sale) = sqlx::query_as::<_, SaleRow>(
            "SELECT id, user_id, total, created_at FROM sales WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, SaleLineRow>(
            "SELECT product_id, product_name, quantity, unit_price
             FROM sale_lines
             WHERE sale_id = $1
             ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(SaleDetail {
            sale: sale.into(),
            lines: lines.into_iter().map(SaleLine::from).collect(),
        }))
    }

    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Sale>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, user_id, total, created_at
             FROM sales
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }

    /// Sales within `[from, to)`, optionally narrowed to one customer.
    pub async fn list_filtered(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        user_id: Option<UserId>,
    ) -> Result<Vec<Sale>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, user_id, total, created_at
             FROM sales
             WHERE created_at >= $1 AND created_at < $2
               AND ($3::INTEGER IS NULL OR user_id = $3)
             ORDER BY created_at DESC",
        )
        .bind(from)
        .bind(to)
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }

    // ===== Aggregates for the admin stats endpoints =====

    /// Best sellers by lifetime units sold. Grouped by the snapshotted
    /// name, so deleted products still show up in the ranking.
    pub async fn top_products(&self, limit: i64) -> Result<Vec<ProductSales>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductSales>(
            "SELECT l.product_name, SUM(l.quantity)::BIGINT AS units_sold
             FROM sale_lines l
             GROUP BY l.product_name
             ORDER BY units_sold DESC, l.product_name
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn top_buyers(&self, limit: i64) -> Result<Vec<BuyerActivity>, RepositoryError> {
        let rows = sqlx::query_as::<_, BuyerActivity>(
            "SELECT u.id AS user_id, u.name, u.email, COUNT(s.id)::BIGINT AS purchases
             FROM sales s
             JOIN users u ON u.id = s.user_id
             GROUP BY u.id, u.name, u.email
             ORDER BY purchases DESC, u.id
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-day sale counts and revenue over the trailing seven days.
    /// Days without sales produce no row.
    pub async fn weekly_sales(&self) -> Result<Vec<DailySales>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailySales>(
            "SELECT date_trunc('day', s.created_at) AS day,
                    COUNT(s.id)::BIGINT AS sales,
                    SUM(s.total) AS revenue
             FROM sales s
             WHERE s.created_at >= now() - INTERVAL '7 days'
             GROUP BY day
             ORDER BY day",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            "SELECT date_trunc('month', s.created_at) AS month, SUM(s.total) AS revenue
             FROM sales s
             GROUP BY month
             ORDER BY month",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn top_spenders(&self, limit: i64) -> Result<Vec<BigSpender>, RepositoryError> {
        let rows = sqlx::query_as::<_, BigSpender>(
            "SELECT u.id AS user_id, u.name, u.email, SUM(s.total) AS total_spent
             FROM sales s
             JOIN users u ON u.id = s.user_id
             GROUP BY u.id, u.name, u.email
             ORDER BY total_spent DESC, u.id
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Remaining stock next to lifetime units sold for every product
    /// still in the catalog.
    pub async fn stock_vs_sold(&self) -> Result<Vec<StockVsSold>, RepositoryError> {
        let rows = sqlx::query_as::<_, StockVsSold>(
            "SELECT p.id AS product_id, p.name, p.stock,
                    COALESCE(SUM(l.quantity), 0)::BIGINT AS units_sold
             FROM products p
             LEFT JOIN sale_lines l ON l.product_id = p.id
             GROUP BY p.id, p.name, p.stock
             ORDER BY p.id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn summary(&self) -> Result<SalesSummary, RepositoryError> {
        let summary = sqlx::query_as::<_, SalesSummary>(
            "SELECT COUNT(s.id)::BIGINT AS total_sales,
                    COALESCE(SUM(s.total), 0) AS total_revenue
             FROM sales s",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(summary)
    }
}
