//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! BREADBOX_ADMIN_PASSWORD='...' breadbox-cli admin create \
//!     -e owner@breadbox.test -n "Shop Owner"
//! ```
//!
//! # Environment Variables
//!
//! - `BREADBOX_DATABASE_URL` (or `DATABASE_URL`) - Postgres connection
//!   string
//! - `BREADBOX_ADMIN_PASSWORD` - password for the new account

use breadbox_core::UserRole;
use breadbox_server::db;
use breadbox_server::services::{AuthError, AuthService};
use secrecy::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Creates an admin account.
///
/// Runs the same validation and Argon2 hashing as the registration
/// endpoint; the only difference is the role.
///
/// # Errors
///
/// Returns `AdminError` if configuration is missing, validation fails,
/// or the email is already registered.
pub async fn create(email: &str, name: &str) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let password = std::env::var("BREADBOX_ADMIN_PASSWORD")
        .map_err(|_| AdminError::MissingEnvVar("BREADBOX_ADMIN_PASSWORD"))?;

    let database_url = std::env::var("BREADBOX_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| AdminError::MissingEnvVar("BREADBOX_DATABASE_URL or DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating admin account: {email}");
    let auth = AuthService::new(&pool);
    let user = auth
        .create_user(name, email, &password, UserRole::Admin)
        .await?;

    tracing::info!(
        "Admin account created! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(())
}
