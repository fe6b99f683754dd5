//! Session layer configuration.
//!
//! Sessions live in Postgres via `tower-sessions-sqlx-store` and are
//! referenced by a signed cookie. The backing table is created by the
//! sessions migration, not at server startup.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::Config;

pub const SESSION_COOKIE_NAME: &str = "breadbox_session";

/// Sessions idle for a week expire.
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Builds the session layer.
///
/// The signing key is derived from `SESSION_SECRET`; config guarantees
/// at least 32 bytes of material before this runs. Cookies are marked
/// Secure when the public base URL is https.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &Config,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let store = PostgresStore::new(pool.clone());
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
