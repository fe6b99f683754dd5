//! Integration tests for the cart and the checkout engine.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//!   (cargo run -p breadbox-cli -- migrate)
//! - The API server running with default funds limits
//!   (cargo run -p breadbox-server)
//!
//! Run with: cargo test -p breadbox-integration-tests -- --ignored

use breadbox_integration_tests::{
    add_to_cart, base_url, cart_lines, create_product, get_product, http_client, me,
    signed_in_admin, signed_in_customer, top_up,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_checkout_charges_funds_and_decrements_stock() {
    let admin = signed_in_admin().await;
    let loaf = create_product(&admin.client, "Checkout Loaf", "30.00", 5).await;
    let tart = create_product(&admin.client, "Checkout Tart", "20.00", 1).await;

    let buyer = signed_in_customer("checkout").await;
    let resp = top_up(&buyer.client, "100.00").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = add_to_cart(&buyer.client, loaf, 2).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = add_to_cart(&buyer.client, tart, 1).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(cart_lines(&buyer.client).await.len(), 2);

    let resp = buyer
        .client
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let receipt: Value = resp.json().await.expect("Failed to parse receipt");
    assert_eq!(receipt["total_charged"], "80.00");
    assert_eq!(receipt["remaining_funds"], "20.00");
    let sale_id = receipt["sale_id"].as_i64().expect("sale id missing");

    // Funds, stock, and the cart all reflect the sale
    let profile = me(&buyer.client).await;
    assert_eq!(profile["funds"], "20.00");
    assert_eq!(get_product(&buyer.client, loaf).await["stock"], 3);
    assert_eq!(get_product(&buyer.client, tart).await["stock"], 0);
    assert!(cart_lines(&buyer.client).await.is_empty());

    // The sale shows up in the buyer's ledger
    let resp = buyer
        .client
        .get(format!("{}/sales", base_url()))
        .send()
        .await
        .expect("Failed to list sales");
    assert_eq!(resp.status(), StatusCode::OK);
    let sales: Value = resp.json().await.expect("Failed to parse sales list");
    let sales = sales.as_array().expect("sales list is not an array");
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0]["total"], "80.00");

    let resp = buyer
        .client
        .get(format!("{}/sales/{sale_id}", base_url()))
        .send()
        .await
        .expect("Failed to fetch sale detail");
    assert_eq!(resp.status(), StatusCode::OK);
    let detail: Value = resp.json().await.expect("Failed to parse sale detail");
    let lines = detail["lines"].as_array().expect("sale lines missing");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["name"], "Checkout Loaf");
    assert_eq!(lines[0]["quantity"], 2);
    assert_eq!(lines[0]["unit_price"], "30.00");
    assert_eq!(lines[1]["name"], "Checkout Tart");
    assert_eq!(lines[1]["quantity"], 1);
    assert_eq!(lines[1]["unit_price"], "20.00");
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_checkout_uses_current_catalog_price() {
    let admin = signed_in_admin().await;
    let brioche = create_product(&admin.client, "Repriced Brioche", "5.00", 10).await;

    let buyer = signed_in_customer("reprice").await;
    assert_eq!(top_up(&buyer.client, "20.00").await.status(), StatusCode::OK);
    assert_eq!(add_to_cart(&buyer.client, brioche, 2).await.status(), StatusCode::CREATED);

    // Price changes after the item is carted
    let form = reqwest::multipart::Form::new()
        .text("name", "Repriced Brioche".to_string())
        .text("description", "Created by integration tests".to_string())
        .text("price", "7.50".to_string())
        .text("stock", "10".to_string());
    let resp = admin
        .client
        .put(format!("{}/admin/products/{brioche}", base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send product update");
    assert_eq!(resp.status(), StatusCode::OK);

    // Checkout charges the catalog price at checkout time, not the
    // price when the item was added
    let resp = buyer
        .client
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let receipt: Value = resp.json().await.expect("Failed to parse receipt");
    assert_eq!(receipt["total_charged"], "15.00");
    assert_eq!(receipt["remaining_funds"], "5.00");

    // The sale line snapshots the charged unit price
    let sale_id = receipt["sale_id"].as_i64().expect("sale id missing");
    let resp = buyer
        .client
        .get(format!("{}/sales/{sale_id}", base_url()))
        .send()
        .await
        .expect("Failed to fetch sale detail");
    assert_eq!(resp.status(), StatusCode::OK);
    let detail: Value = resp.json().await.expect("Failed to parse sale detail");
    assert_eq!(detail["lines"][0]["unit_price"], "7.50");
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_checkout_empty_cart_bad_request() {
    let buyer = signed_in_customer("empty-cart").await;

    let resp = buyer
        .client
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_checkout_insufficient_funds_leaves_cart_intact() {
    let admin = signed_in_admin().await;
    let cake = create_product(&admin.client, "Expensive Cake", "50.00", 3).await;

    let buyer = signed_in_customer("broke").await;
    let resp = top_up(&buyer.client, "10.00").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = add_to_cart(&buyer.client, cake, 1).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = buyer
        .client
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    let message = body["error"].as_str().expect("error should be a string");
    assert!(
        message.contains("50.00") && message.contains("10.00"),
        "error should carry required and available amounts: {message}"
    );

    // Nothing was charged or consumed
    assert_eq!(me(&buyer.client).await["funds"], "10.00");
    assert_eq!(cart_lines(&buyer.client).await.len(), 1);
    assert_eq!(get_product(&buyer.client, cake).await["stock"], 3);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_checkout_conflicts_when_another_buyer_takes_last_unit() {
    let admin = signed_in_admin().await;
    let last_bun = create_product(&admin.client, "Last Bun", "15.00", 1).await;

    let first = signed_in_customer("fast-buyer").await;
    let second = signed_in_customer("slow-buyer").await;
    assert_eq!(top_up(&first.client, "20.00").await.status(), StatusCode::OK);
    assert_eq!(top_up(&second.client, "20.00").await.status(), StatusCode::OK);

    // Both carts pass the best-effort stock check while stock is still 1
    assert_eq!(add_to_cart(&first.client, last_bun, 1).await.status(), StatusCode::CREATED);
    assert_eq!(add_to_cart(&second.client, last_bun, 1).await.status(), StatusCode::CREATED);

    let resp = first
        .client
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("Failed to send first checkout");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The stock check under row locks catches the second buyer
    let resp = second
        .client
        .post(format!("{}/cart/checkout", base_url()))
        .send()
        .await
        .expect("Failed to send second checkout");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    let message = body["error"].as_str().expect("error should be a string");
    assert!(message.contains("Last Bun"), "error should name the product: {message}");
    assert!(message.contains("0 available"), "error should report stock: {message}");

    // The failed checkout rolled back completely
    assert_eq!(me(&second.client).await["funds"], "20.00");
    assert_eq!(cart_lines(&second.client).await.len(), 1);
    assert_eq!(get_product(&second.client, last_bun).await["stock"], 0);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_concurrent_checkout_charges_once() {
    let admin = signed_in_admin().await;
    let roll = create_product(&admin.client, "Race Roll", "10.00", 5).await;

    let buyer = signed_in_customer("double-submit").await;
    assert_eq!(top_up(&buyer.client, "50.00").await.status(), StatusCode::OK);
    assert_eq!(add_to_cart(&buyer.client, roll, 1).await.status(), StatusCode::CREATED);

    // A double-submitted checkout must charge exactly once; the loser
    // finds the cart already cleared
    let url = format!("{}/cart/checkout", base_url());
    let (first, second) = tokio::join!(
        buyer.client.post(&url).send(),
        buyer.client.post(&url).send(),
    );
    let statuses = [
        first.expect("Failed to send first checkout").status(),
        second.expect("Failed to send second checkout").status(),
    ];
    assert!(statuses.contains(&StatusCode::CREATED), "no checkout succeeded: {statuses:?}");
    assert!(
        statuses.contains(&StatusCode::BAD_REQUEST),
        "both checkouts succeeded: {statuses:?}"
    );

    assert_eq!(me(&buyer.client).await["funds"], "40.00");
    assert_eq!(get_product(&buyer.client, roll).await["stock"], 4);
}

// ============================================================================
// Cart Management
// ============================================================================

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_add_to_cart_exceeding_stock_conflicts() {
    let admin = signed_in_admin().await;
    let scone = create_product(&admin.client, "Scarce Scone", "4.00", 2).await;

    let buyer = signed_in_customer("greedy").await;
    let resp = add_to_cart(&buyer.client, scone, 3).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(cart_lines(&buyer.client).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_add_to_cart_accumulates_quantity() {
    let admin = signed_in_admin().await;
    let bagel = create_product(&admin.client, "Stacking Bagel", "2.50", 10).await;

    let buyer = signed_in_customer("stacker").await;
    assert_eq!(add_to_cart(&buyer.client, bagel, 1).await.status(), StatusCode::CREATED);

    let resp = add_to_cart(&buyer.client, bagel, 2).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let line: Value = resp.json().await.expect("Failed to parse cart line");
    assert_eq!(line["quantity"], 3);

    let lines = cart_lines(&buyer.client).await;
    assert_eq!(lines.len(), 1, "same product should merge into one line");
    assert_eq!(lines[0]["quantity"], 3);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_add_unknown_product_not_found() {
    let buyer = signed_in_customer("ghost-product").await;

    let resp = add_to_cart(&buyer.client, 999_999_999, 1).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_update_cart_quantity() {
    let admin = signed_in_admin().await;
    let pretzel = create_product(&admin.client, "Update Pretzel", "3.00", 4).await;

    let buyer = signed_in_customer("updater").await;
    let resp = add_to_cart(&buyer.client, pretzel, 1).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let line: Value = resp.json().await.expect("Failed to parse cart line");
    let entry_id = line["id"].as_i64().expect("cart entry id missing");

    let base = base_url();
    let resp = buyer
        .client
        .put(format!("{base}/cart/items/{entry_id}"))
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .expect("Failed to send quantity update");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let lines = cart_lines(&buyer.client).await;
    assert_eq!(lines[0]["quantity"], 4);

    // Zero is rejected; removal is a DELETE
    let resp = buyer
        .client
        .put(format!("{base}/cart/items/{entry_id}"))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send quantity update");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // More than the available stock is rejected
    let resp = buyer
        .client
        .put(format!("{base}/cart/items/{entry_id}"))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .expect("Failed to send quantity update");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_update_foreign_cart_entry_not_found() {
    let admin = signed_in_admin().await;
    let donut = create_product(&admin.client, "Private Donut", "2.00", 5).await;

    let owner = signed_in_customer("cart-owner").await;
    let resp = add_to_cart(&owner.client, donut, 1).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let line: Value = resp.json().await.expect("Failed to parse cart line");
    let entry_id = line["id"].as_i64().expect("cart entry id missing");

    // Another user cannot touch the entry
    let intruder = signed_in_customer("cart-intruder").await;
    let resp = intruder
        .client
        .put(format!("{}/cart/items/{entry_id}", base_url()))
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .expect("Failed to send quantity update");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert_eq!(cart_lines(&owner.client).await[0]["quantity"], 1);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_remove_cart_item_is_idempotent() {
    let admin = signed_in_admin().await;
    let muffin = create_product(&admin.client, "Removable Muffin", "3.50", 5).await;

    let buyer = signed_in_customer("remover").await;
    let resp = add_to_cart(&buyer.client, muffin, 1).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let line: Value = resp.json().await.expect("Failed to parse cart line");
    let entry_id = line["id"].as_i64().expect("cart entry id missing");

    let base = base_url();
    let resp = buyer
        .client
        .delete(format!("{base}/cart/items/{entry_id}"))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(cart_lines(&buyer.client).await.is_empty());

    // Deleting again is a no-op, not an error
    let resp = buyer
        .client
        .delete(format!("{base}/cart/items/{entry_id}"))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_cart_access_for_anonymous_users() {
    let client = http_client();
    let base = base_url();

    // The cart listing tolerates anonymous users and reads as empty
    let resp = client
        .get(format!("{base}/cart"))
        .send()
        .await
        .expect("Failed to send cart request");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse cart response");
    assert_eq!(body, json!([]));

    // Mutations require a session
    let resp = client
        .post(format!("{base}/cart/items"))
        .json(&json!({ "product_id": 1, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to send add-to-cart request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base}/cart/checkout"))
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Funds Top-Up
// ============================================================================

#[tokio::test]
#[ignore = "Requires running breadbox server with default funds limits"]
async fn test_topup_rejects_invalid_amounts() {
    let buyer = signed_in_customer("topup-validation").await;

    let resp = top_up(&buyer.client, "0.00").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = top_up(&buyer.client, "-5.00").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Over the per-call cap (default 1000.00)
    let resp = top_up(&buyer.client, "1000.01").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(me(&buyer.client).await["funds"], "0.00");
}

#[tokio::test]
#[ignore = "Requires running breadbox server with default funds limits"]
async fn test_topup_stops_at_balance_ceiling() {
    let buyer = signed_in_customer("ceiling").await;

    // Default ceiling is 10000.00, reached by ten maximum top-ups
    for _ in 0..10 {
        let resp = top_up(&buyer.client, "1000.00").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
    assert_eq!(me(&buyer.client).await["funds"], "10000.00");

    let resp = top_up(&buyer.client, "1000.00").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(me(&buyer.client).await["funds"], "10000.00");
}

#[tokio::test]
#[ignore = "Requires running breadbox server"]
async fn test_topup_returns_new_balance() {
    let buyer = signed_in_customer("topup-balance").await;

    let resp = top_up(&buyer.client, "25.50").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse top-up response");
    assert_eq!(body["new_balance"], "25.50");

    let resp = top_up(&buyer.client, "4.50").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse top-up response");
    assert_eq!(body["new_balance"], "30.00");
}
