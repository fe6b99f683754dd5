//! Domain models shared between the database layer, services, and routes.

pub mod cart;
pub mod product;
pub mod sale;
pub mod session;
pub mod stats;
pub mod user;

pub use cart::CartLine;
pub use product::{Product, ProductInput};
pub use sale::{CheckoutReceipt, Sale, SaleDetail, SaleLine};
pub use session::{CurrentUser, keys as session_keys};
pub use stats::{
    BigSpender, BuyerActivity, DailySales, MonthlyRevenue, ProductSales, SalesSummary, StockVsSold,
};
pub use user::User;
