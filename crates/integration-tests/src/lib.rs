#![cfg_attr(not(test), forbid(unsafe_code))]
// Helpers panic to fail the calling test.
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

//! Shared harness for Breadbox integration tests.
//!
//! The tests in `tests/` drive a running server over HTTP. They require:
//!
//! - A `PostgreSQL` database with migrations applied
//!   (`cargo run -p breadbox-cli -- migrate`)
//! - The API server running against it (`cargo run -p breadbox-server`)
//!
//! ```bash
//! cargo test -p breadbox-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `BREADBOX_BASE_URL` - server under test (default `http://localhost:3000`)
//! - `BREADBOX_DATABASE_URL` or `DATABASE_URL` - used to promote test
//!   accounts to admin
//!
//! Every test registers its own throwaway accounts, so runs are safe
//! against a shared development database.

use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every throwaway test account.
pub const TEST_PASSWORD: &str = "breadbox-test-password";

/// Base URL for the API server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("BREADBOX_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Fresh HTTP client with its own cookie jar.
///
/// Each signed-in identity needs its own client so session cookies do
/// not bleed between them.
#[must_use]
pub fn http_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Unique email per call so tests never collide on the users table.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4())
}

/// Direct database handle, used to promote test accounts to admin.
pub async fn db_pool() -> PgPool {
    let url = std::env::var("BREADBOX_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("BREADBOX_DATABASE_URL or DATABASE_URL must be set");

    breadbox_server::db::create_pool(&url)
        .await
        .expect("Failed to connect to test database")
}

/// A registered account and the client holding its session cookie.
pub struct TestUser {
    pub client: Client,
    pub email: String,
    pub id: i64,
}

/// Registers a fresh customer account and signs it in.
pub async fn signed_in_customer(prefix: &str) -> TestUser {
    let client = http_client();
    let email = unique_email(prefix);
    register(&client, &email).await;

    let user = login(&client, &email).await;
    let id = user["id"].as_i64().expect("user id missing from login response");
    TestUser { client, email, id }
}

/// Registers a fresh account, promotes it to admin directly in the
/// database, then signs it in.
///
/// The session snapshots the role at login time, so the promotion has
/// to happen before the login call.
pub async fn signed_in_admin() -> TestUser {
    let client = http_client();
    let email = unique_email("admin");
    register(&client, &email).await;

    let pool = db_pool().await;
    sqlx::query("UPDATE users SET role = 'admin' WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .expect("Failed to promote test account to admin");

    let user = login(&client, &email).await;
    let id = user["id"].as_i64().expect("user id missing from login response");
    TestUser { client, email, id }
}

/// Registers an account with [`TEST_PASSWORD`], asserting success.
pub async fn register(client: &Client, email: &str) {
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "name": "Integration Test",
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(resp.status(), StatusCode::CREATED, "register failed for {email}");
}

/// Signs an existing account in on the given client, returning the
/// user payload from the login response.
pub async fn login(client: &Client, email: &str) -> Value {
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");
    resp.json().await.expect("Failed to parse login response")
}

/// Creates a catalog product through the admin API, returning its id.
pub async fn create_product(admin: &Client, name: &str, price: &str, stock: i32) -> i64 {
    let form = Form::new()
        .text("name", name.to_string())
        .text("description", "Created by integration tests")
        .text("price", price.to_string())
        .text("stock", stock.to_string());

    let resp = admin
        .post(format!("{}/admin/products", base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send product create request");

    assert_eq!(resp.status(), StatusCode::CREATED, "product create failed for {name}");
    let body: Value = resp.json().await.expect("Failed to parse product response");
    body["id"].as_i64().expect("product id missing from response")
}

/// Adds a product to the signed-in user's cart.
///
/// Returns the raw response so callers can assert success or rejection.
pub async fn add_to_cart(client: &Client, product_id: i64, quantity: i32) -> reqwest::Response {
    client
        .post(format!("{}/cart/items", base_url()))
        .json(&json!({ "product_id": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("Failed to send add-to-cart request")
}

/// Tops up the signed-in user's balance.
///
/// Returns the raw response so callers can assert success or rejection.
pub async fn top_up(client: &Client, amount: &str) -> reqwest::Response {
    client
        .post(format!("{}/funds/top-up", base_url()))
        .json(&json!({ "amount": amount }))
        .send()
        .await
        .expect("Failed to send top-up request")
}

/// Fetches the signed-in user's profile from `/auth/me`.
pub async fn me(client: &Client) -> Value {
    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .send()
        .await
        .expect("Failed to send /auth/me request");

    assert_eq!(resp.status(), StatusCode::OK, "/auth/me failed");
    resp.json().await.expect("Failed to parse /auth/me response")
}

/// Fetches the signed-in user's cart lines.
pub async fn cart_lines(client: &Client) -> Vec<Value> {
    let resp = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to send cart request");

    assert_eq!(resp.status(), StatusCode::OK, "cart list failed");
    let body: Value = resp.json().await.expect("Failed to parse cart response");
    body.as_array().expect("cart response is not an array").clone()
}

/// Fetches a product from the public catalog.
pub async fn get_product(client: &Client, product_id: i64) -> Value {
    let resp = client
        .get(format!("{}/products/{product_id}", base_url()))
        .send()
        .await
        .expect("Failed to send product request");

    assert_eq!(resp.status(), StatusCode::OK, "product {product_id} fetch failed");
    resp.json().await.expect("Failed to parse product response")
}
