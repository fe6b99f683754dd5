use breadbox_core::{Price, ProductId, SaleId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A completed purchase. Sales are append-only; nothing updates or
/// deletes them after checkout commits.
#[derive(Debug, Clone)]
pub struct Sale {
    pub id: SaleId,
    pub user_id: UserId,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One product position within a sale.
///
/// `product_name` and `unit_price` are snapshots taken at checkout, so
/// the line stays meaningful if the product is renamed, repriced, or
/// deleted. `product_id` goes `None` when the product is deleted.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Price,
}

/// A sale with its lines.
#[derive(Debug, Clone)]
pub struct SaleDetail {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

/// What checkout hands back to the buyer.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub sale_id: SaleId,
    pub total: Decimal,
    pub remaining_funds: Decimal,
}
