//! Integration tests for the admin API: user management, product
//! management, sales listings, and statistics.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//!   (cargo run -p breadbox-cli -- migrate)
//! - The API server running (cargo run -p breadbox-server)
//!
//! Run with: cargo test -p breadbox-integration-tests -- --ignored

use breadbox_integration_tests::{
    TEST_PASSWORD, add_to_cart, base_url, create_product, http_client, login, signed_in_admin,
    signed_in_customer, top_up, unique_email,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, header};
use serde_json::{Value, json};

/// A tiny stand-in for an uploaded JPEG. The server stores the blob
/// verbatim and never inspects it.
const IMAGE_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x42, 0x72, 0x65, 0x61, 0x64, 0xFF, 0xD9];

/// Test helper: multipart form for the product endpoints.
fn product_form(name: &str, price: &str, stock: i32) -> Form {
    Form::new()
        .text("name", name.to_string())
        .text("description", "Admin API test product".to_string())
        .text("price", price.to_string())
        .text("stock", stock.to_string())
}

/// Test helper: attach an image part to a product form.
fn with_image(form: Form, bytes: Vec<u8>) -> Form {
    let part = Part::bytes(bytes)
        .file_name("product.jpg")
        .mime_str("image/jpeg")
        .expect("Failed to build image part");
    form.part("image", part)
}

/// Test helper: run a checkout so the sales tables have data.
async fn place_order(admin: &Client, buyer: &Client, price: &str) -> i64 {
    let product = create_product(admin, "Stats Fixture Loaf", price, 10).await;
    assert_eq!(top_up(buyer, "100.00").await.status(), StatusCode::OK);
    assert_eq!(add_to_cart(buyer, product, 1).await.status(), StatusCode::CREATED);

    let resp = buyer
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let receipt: Value = resp.json().await.expect("Failed to parse receipt");
    receipt["sale_id"].as_i64().expect("sale id missing")
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_admin_routes_require_admin_role() {
    let base = base_url();

    // Anonymous requests are unauthorized
    let client = http_client();
    let resp = client
        .get(format!("{base}/admin/users"))
        .send()
        .await
        .expect("Failed to send admin request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Signed-in customers are forbidden
    let customer = signed_in_customer("not-admin").await;
    for path in ["/admin/users", "/admin/sales", "/admin/stats/summary"] {
        let resp = customer
            .client
            .get(format!("{base}{path}"))
            .send()
            .await
            .expect("Failed to send admin request");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "customer reached {path}");
    }

    let resp = customer
        .client
        .post(format!("{base}/admin/products"))
        .multipart(product_form("Forbidden Bread", "1.00", 1))
        .send()
        .await
        .expect("Failed to send product create");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// User Management
// ============================================================================

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_admin_creates_and_lists_users() {
    let admin = signed_in_admin().await;
    let base = base_url();

    let customer_email = unique_email("created-customer");
    let resp = admin
        .client
        .post(format!("{base}/admin/users"))
        .json(&json!({
            "name": "Created Customer",
            "email": customer_email,
            "password": TEST_PASSWORD,
            "role": "customer",
        }))
        .send()
        .await
        .expect("Failed to send user create");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse user response");
    assert_eq!(body["role"], "customer");

    let admin_email = unique_email("created-admin");
    let resp = admin
        .client
        .post(format!("{base}/admin/users"))
        .json(&json!({
            "name": "Created Admin",
            "email": admin_email,
            "password": TEST_PASSWORD,
            "role": "admin",
        }))
        .send()
        .await
        .expect("Failed to send user create");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse user response");
    assert_eq!(body["role"], "admin");

    // Both show up in the listing
    let resp = admin
        .client
        .get(format!("{base}/admin/users"))
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Value = resp.json().await.expect("Failed to parse user list");
    let emails: Vec<&str> = users
        .as_array()
        .expect("user list is not an array")
        .iter()
        .filter_map(|u| u["email"].as_str())
        .collect();
    assert!(emails.contains(&customer_email.as_str()));
    assert!(emails.contains(&admin_email.as_str()));

    // The created admin account works end to end
    let second_admin = http_client();
    login(&second_admin, &admin_email).await;
    let resp = second_admin
        .get(format!("{base}/admin/users"))
        .send()
        .await
        .expect("Failed to list users as new admin");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Product Management
// ============================================================================

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_product_crud_roundtrip() {
    let admin = signed_in_admin().await;
    let base = base_url();

    let resp = admin
        .client
        .post(format!("{base}/admin/products"))
        .multipart(product_form("Crud Croissant", "3.80", 12))
        .send()
        .await
        .expect("Failed to send product create");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse product");
    let id = created["id"].as_i64().expect("product id missing");
    assert_eq!(created["name"], "Crud Croissant");
    assert_eq!(created["price"], "3.80");
    assert_eq!(created["stock"], 12);
    assert_eq!(created["has_image"], false);

    // Publicly visible without a session
    let public = http_client();
    let resp = public
        .get(format!("{base}/products/{id}"))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(fetched["name"], "Crud Croissant");
    assert_eq!(fetched["description"], "Admin API test product");

    // Update replaces the text fields
    let resp = admin
        .client
        .put(format!("{base}/admin/products/{id}"))
        .multipart(product_form("Renamed Croissant", "4.20", 8))
        .send()
        .await
        .expect("Failed to send product update");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(updated["name"], "Renamed Croissant");
    assert_eq!(updated["price"], "4.20");
    assert_eq!(updated["stock"], 8);

    // Delete removes it from the catalog
    let resp = admin
        .client
        .delete(format!("{base}/admin/products/{id}"))
        .send()
        .await
        .expect("Failed to send product delete");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = public
        .get(format!("{base}/products/{id}"))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_product_image_upload_and_replacement() {
    let admin = signed_in_admin().await;
    let base = base_url();

    let form = with_image(product_form("Photogenic Loaf", "6.50", 5), IMAGE_BYTES.to_vec());
    let resp = admin
        .client
        .post(format!("{base}/admin/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send product create");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Failed to parse product");
    let id = created["id"].as_i64().expect("product id missing");
    assert_eq!(created["has_image"], true);

    // The blob comes back byte for byte
    let public = http_client();
    let resp = public
        .get(format!("{base}/products/{id}/image"))
        .send()
        .await
        .expect("Failed to fetch image");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(header::CONTENT_TYPE)
            .expect("content-type missing"),
        "image/jpeg"
    );
    let bytes = resp.bytes().await.expect("Failed to read image body");
    assert_eq!(bytes.as_ref(), IMAGE_BYTES);

    // An update without an image part keeps the stored blob
    let resp = admin
        .client
        .put(format!("{base}/admin/products/{id}"))
        .multipart(product_form("Photogenic Loaf", "6.50", 4))
        .send()
        .await
        .expect("Failed to send product update");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Failed to parse product");
    assert_eq!(updated["has_image"], true);

    let resp = public
        .get(format!("{base}/products/{id}/image"))
        .send()
        .await
        .expect("Failed to fetch image");
    let bytes = resp.bytes().await.expect("Failed to read image body");
    assert_eq!(bytes.as_ref(), IMAGE_BYTES);

    // An update with a new image part replaces it
    let replacement = vec![0xFF, 0xD8, 0xFF, 0xD9];
    let form = with_image(product_form("Photogenic Loaf", "6.50", 4), replacement.clone());
    let resp = admin
        .client
        .put(format!("{base}/admin/products/{id}"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send product update");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = public
        .get(format!("{base}/products/{id}/image"))
        .send()
        .await
        .expect("Failed to fetch image");
    let bytes = resp.bytes().await.expect("Failed to read image body");
    assert_eq!(bytes.as_ref(), replacement.as_slice());
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_product_without_image_returns_not_found() {
    let admin = signed_in_admin().await;
    let id = create_product(&admin.client, "Camera Shy Rye", "5.75", 3).await;

    let resp = http_client()
        .get(format!("{}/products/{id}/image", base_url()))
        .send()
        .await
        .expect("Failed to fetch image");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_create_product_validation() {
    let admin = signed_in_admin().await;
    let base = base_url();

    // Price must be positive
    let resp = admin
        .client
        .post(format!("{base}/admin/products"))
        .multipart(product_form("Free Bread", "0.00", 1))
        .send()
        .await
        .expect("Failed to send product create");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Stock cannot be negative
    let resp = admin
        .client
        .post(format!("{base}/admin/products"))
        .multipart(product_form("Phantom Stock", "2.00", -1))
        .send()
        .await
        .expect("Failed to send product create");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Name is required
    let form = Form::new()
        .text("description", "No name".to_string())
        .text("price", "2.00".to_string())
        .text("stock", "1".to_string());
    let resp = admin
        .client
        .post(format!("{base}/admin/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send product create");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Sales & Statistics
// ============================================================================

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_admin_sales_listing_and_filters() {
    let admin = signed_in_admin().await;
    let buyer = signed_in_customer("sales-filter").await;
    place_order(&admin.client, &buyer.client, "12.00").await;

    let base = base_url();

    // Preset window
    let resp = admin
        .client
        .get(format!("{base}/admin/sales?range=7d"))
        .send()
        .await
        .expect("Failed to list sales");
    assert_eq!(resp.status(), StatusCode::OK);

    // Wide explicit window filtered to the buyer
    let resp = admin
        .client
        .get(format!(
            "{base}/admin/sales?start=2020-01-01&end=2030-01-01&user_id={}",
            buyer.id
        ))
        .send()
        .await
        .expect("Failed to list sales");
    assert_eq!(resp.status(), StatusCode::OK);
    let sales: Value = resp.json().await.expect("Failed to parse sales list");
    let sales = sales.as_array().expect("sales list is not an array");
    assert!(!sales.is_empty(), "buyer's sale missing from filtered listing");
    assert!(sales.iter().all(|s| s["user_id"].as_i64() == Some(buyer.id)));

    // Reversed date windows are rejected
    let resp = admin
        .client
        .get(format!("{base}/admin/sales?start=2026-02-01&end=2026-01-01"))
        .send()
        .await
        .expect("Failed to list sales");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_stats_endpoints_report_sales() {
    let admin = signed_in_admin().await;
    let buyer = signed_in_customer("stats").await;
    place_order(&admin.client, &buyer.client, "9.00").await;

    let base = base_url();

    let resp = admin
        .client
        .get(format!("{base}/admin/stats/summary"))
        .send()
        .await
        .expect("Failed to fetch summary");
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: Value = resp.json().await.expect("Failed to parse summary");
    assert!(summary["total_sales"].as_i64().expect("total_sales missing") >= 1);
    assert!(summary["total_revenue"].is_string());

    let resp = admin
        .client
        .get(format!("{base}/admin/stats/top-products?limit=3"))
        .send()
        .await
        .expect("Failed to fetch top products");
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Value = resp.json().await.expect("Failed to parse top products");
    let rows = rows.as_array().expect("top products is not an array");
    assert!(rows.len() <= 3, "limit was not applied");
    assert!(rows.iter().all(|r| r["product_name"].is_string() && r["units_sold"].is_i64()));

    // The remaining aggregate endpoints respond with arrays
    for path in [
        "/admin/stats/top-buyers",
        "/admin/stats/weekly-sales",
        "/admin/stats/monthly-revenue",
        "/admin/stats/top-spenders",
        "/admin/stats/stock-vs-sold",
    ] {
        let resp = admin
            .client
            .get(format!("{base}{path}"))
            .send()
            .await
            .expect("Failed to fetch stats endpoint");
        assert_eq!(resp.status(), StatusCode::OK, "{path} failed");
        let rows: Value = resp.json().await.expect("Failed to parse stats response");
        assert!(rows.is_array(), "{path} did not return an array");
    }
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_sale_detail_visibility() {
    let admin = signed_in_admin().await;
    let buyer = signed_in_customer("sale-owner").await;
    let sale_id = place_order(&admin.client, &buyer.client, "7.50").await;

    let base = base_url();

    // The owner and admins can read the receipt
    let resp = buyer
        .client
        .get(format!("{base}/sales/{sale_id}"))
        .send()
        .await
        .expect("Failed to fetch sale");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin
        .client
        .get(format!("{base}/sales/{sale_id}"))
        .send()
        .await
        .expect("Failed to fetch sale");
    assert_eq!(resp.status(), StatusCode::OK);

    // Everyone else sees a missing resource, not a forbidden one
    let stranger = signed_in_customer("sale-stranger").await;
    let resp = stranger
        .client
        .get(format!("{base}/sales/{sale_id}"))
        .send()
        .await
        .expect("Failed to fetch sale");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = admin
        .client
        .get(format!("{base}/sales/999999999"))
        .send()
        .await
        .expect("Failed to fetch sale");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
