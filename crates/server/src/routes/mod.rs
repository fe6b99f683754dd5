//! # Route Structure
//!
//! ```text
//! GET  /health                        liveness probe
//! GET  /ready                        readiness probe (checks Postgres)
//!
//! POST /auth/register                 create a customer account
//! POST /auth/login                    verify credentials, open a session
//! POST /auth/logout                   destroy the session (idempotent)
//! GET  /auth/me                       account behind the session   [auth]
//!
//! GET  /products                      catalog without image bytes
//! GET  /products/{id}                 one product
//! GET  /products/{id}/image           image blob as image/jpeg
//!
//! GET  /cart                          cart lines ([] when anonymous)
//! POST /cart/items                    add a product                [auth]
//! PUT  /cart/items/{id}               change an entry's quantity   [auth]
//! DELETE /cart/items/{id}             remove an entry              [auth]
//! POST /cart/checkout                 purchase the whole cart      [auth]
//!
//! POST /funds/top-up                  credit the prepaid balance   [auth]
//!
//! GET  /sales                         own purchases, newest first  [auth]
//! GET  /sales/{id}                    one purchase with lines      [auth]
//!
//! GET  /admin/users                   all accounts                 [admin]
//! POST /admin/users                   create account with role     [admin]
//! POST /admin/products                create product (multipart)   [admin]
//! PUT  /admin/products/{id}           update product (multipart)   [admin]
//! DELETE /admin/products/{id}         delete product               [admin]
//! GET  /admin/sales                   ledger with range filters    [admin]
//! GET  /admin/stats/top-products      best sellers by units        [admin]
//! GET  /admin/stats/top-buyers        customers by purchase count  [admin]
//! GET  /admin/stats/weekly-sales      daily totals, trailing week  [admin]
//! GET  /admin/stats/monthly-revenue   revenue per calendar month   [admin]
//! GET  /admin/stats/top-spenders      customers by lifetime spend  [admin]
//! GET  /admin/stats/stock-vs-sold     stock against units sold     [admin]
//! GET  /admin/stats/summary           ledger-wide count and revenue [admin]
//! ```

use axum::Router;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod funds;
pub mod products;
pub mod sales;
pub mod stats;

/// Body cap for the admin product form; leaves headroom over the 5 MiB
/// image limit for the text fields and multipart framing.
const MAX_PRODUCT_FORM_BYTES: usize = 8 * 1024 * 1024;

/// The complete application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(readiness))
        .merge(auth_routes())
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(funds_routes())
        .merge(sales_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/image", get(products::image))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::list))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/cart/checkout", post(cart::checkout))
}

fn funds_routes() -> Router<AppState> {
    Router::new().route("/funds/top-up", post(funds::top_up))
}

fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(sales::list_mine))
        .route("/sales/{id}", get(sales::show))
}

fn admin_routes() -> Router<AppState> {
    let product_management = Router::new()
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .layer(DefaultBodyLimit::max(MAX_PRODUCT_FORM_BYTES));

    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/sales", get(admin::list_sales))
        .merge(product_management)
        .nest("/stats", stats_routes())
}

fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/top-products", get(stats::top_products))
        .route("/top-buyers", get(stats::top_buyers))
        .route("/weekly-sales", get(stats::weekly_sales))
        .route("/monthly-revenue", get(stats::monthly_revenue))
        .route("/top-spenders", get(stats::top_spenders))
        .route("/stock-vs-sold", get(stats::stock_vs_sold))
        .route("/summary", get(stats::summary))
}

async fn health() -> &'static str {
    "ok"
}

async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::error!("Readiness check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
