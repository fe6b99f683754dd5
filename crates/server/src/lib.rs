//! Breadbox storefront API server.
//!
//! A JSON HTTP API for a small bakery shop: session-based authentication,
//! a product catalog with image blobs, per-user carts, a transactional
//! checkout that converts a cart into a recorded sale, prepaid funds, and
//! admin reporting over the sale ledger.
//!
//! The binary in `main.rs` wires configuration, tracing, Sentry, the
//! Postgres pool, and the session layer around the routers defined here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
