use breadbox_core::{Email, UserId, UserRole};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A Breadbox account. Customers and admins share the table; `role`
/// decides what the account may do.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    /// Prepaid balance charged at checkout.
    pub funds: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
