//! Application-wide error handling.
//!
//! Every service error converts into [`AppError`], which maps to an
//! HTTP status and a `{"error": "<message>"}` body. Validation problems
//! are 400, missing resources 404, and business conflicts (stock, funds,
//! duplicate email) 409. Infrastructure failures become a generic 500;
//! their details go to tracing and Sentry, never to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, CatalogError, CheckoutError, FundsError};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    #[error("checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("funds error: {0}")]
    Funds(#[from] FundsError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_)
                | AuthError::InvalidName(_)
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Catalog(e) => match e {
                CatalogError::Validation(_) | CatalogError::InvalidPrice(_) => {
                    StatusCode::BAD_REQUEST
                }
                CatalogError::NotFound => StatusCode::NOT_FOUND,
                CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Cart(e) => match e {
                CartError::ProductNotFound | CartError::EntryNotFound => StatusCode::NOT_FOUND,
                CartError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CartError::InsufficientStock { .. } => StatusCode::CONFLICT,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(e) => match e {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::InsufficientStock { .. }
                | CheckoutError::InsufficientFunds { .. } => StatusCode::CONFLICT,
                CheckoutError::BuyerNotFound => StatusCode::NOT_FOUND,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Funds(e) => match e {
                FundsError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                FundsError::CeilingExceeded { .. } => StatusCode::CONFLICT,
                FundsError::UserNotFound => StatusCode::NOT_FOUND,
                FundsError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The message clients see. Business errors keep their specifics
    /// (amounts, product names); infrastructure errors do not reach
    /// this method.
    fn public_message(&self) -> String {
        match self {
            Self::Auth(e) => e.to_string(),
            Self::Catalog(e) => e.to_string(),
            Self::Cart(e) => e.to_string(),
            Self::Checkout(e) => e.to_string(),
            Self::Funds(e) => e.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request error");
            "Internal server error".to_owned()
        } else {
            self.public_message()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Attaches the authenticated user to the Sentry scope so errors carry
/// who hit them.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("sale 7".to_owned());
        assert_eq!(err.to_string(), "not found: sale 7");

        let err = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "authentication error: invalid credentials");
    }

    #[test]
    fn test_validation_errors_are_bad_request() {
        let status = AppError::Checkout(CheckoutError::EmptyCart)
            .into_response()
            .status();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let status = AppError::Cart(CartError::InvalidQuantity(0))
            .into_response()
            .status();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_business_conflicts_are_409() {
        let status = AppError::Checkout(CheckoutError::InsufficientFunds {
            required: dec!(80.00),
            available: dec!(50.00),
        })
        .into_response()
        .status();
        assert_eq!(status, StatusCode::CONFLICT);

        let status = AppError::Cart(CartError::InsufficientStock {
            product: "Rye".to_owned(),
            available: 0,
            requested: 1,
        })
        .into_response()
        .status();
        assert_eq!(status, StatusCode::CONFLICT);

        let status = AppError::Auth(AuthError::UserAlreadyExists)
            .into_response()
            .status();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_missing_resources_are_404() {
        let status = AppError::Catalog(CatalogError::NotFound)
            .into_response()
            .status();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let status = AppError::Cart(CartError::EntryNotFound)
            .into_response()
            .status();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_credentials_are_401() {
        let status = AppError::Auth(AuthError::InvalidCredentials)
            .into_response()
            .status();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_infrastructure_errors_hide_details() {
        let err = AppError::Internal("pool exhausted".to_owned());
        let status = err.into_response().status();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
