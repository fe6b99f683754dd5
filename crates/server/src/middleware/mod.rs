//! HTTP middleware and request extractors.
//!
//! Layer order, outermost first: Sentry request scope, the trace span,
//! CORS, then the session layer, with the routers innermost. CORS sits
//! outside the session layer so preflight requests never touch the
//! session store.

pub mod auth;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
