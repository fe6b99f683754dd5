//! Business logic, kept out of the route handlers.
//!
//! Services borrow the shared pool per request and hold no state of
//! their own. The checkout service is the only one that opens its own
//! transaction; everything else is single-statement work delegated to
//! the repositories.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod funds;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogService};
pub use checkout::{CheckoutError, CheckoutService};
pub use funds::{FundsError, FundsService};
