//! Prepaid funds top-ups.

use breadbox_core::UserId;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::config::FundsLimits;
use crate::db::{RepositoryError, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum FundsError {
    #[error("{0}")]
    InvalidAmount(String),

    #[error(
        "top-up would exceed the balance ceiling: \
         balance {current}, requested {requested}, ceiling {max_balance}"
    )]
    CeilingExceeded {
        current: Decimal,
        requested: Decimal,
        max_balance: Decimal,
    },

    #[error("user not found")]
    UserNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct FundsService<'a> {
    users: UserRepository<'a>,
    limits: FundsLimits,
}

impl<'a> FundsService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, limits: FundsLimits) -> Self {
        Self {
            users: UserRepository::new(pool),
            limits,
        }
    }

    /// Credits `amount` to the account and returns the new balance.
    ///
    /// The ceiling check and the credit are one conditional UPDATE, so
    /// concurrent top-ups cannot stack past the ceiling. When the update
    /// matches no row, a follow-up read decides between a missing
    /// account and a ceiling rejection.
    pub async fn top_up(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, FundsError> {
        validate_amount(amount, self.limits.max_topup)?;

        if let Some(balance) = self
            .users
            .add_funds(user_id, amount, self.limits.max_balance)
            .await?
        {
            return Ok(balance);
        }

        match self.users.get_funds(user_id).await? {
            Some(current) => Err(FundsError::CeilingExceeded {
                current,
                requested: amount,
                max_balance: self.limits.max_balance,
            }),
            None => Err(FundsError::UserNotFound),
        }
    }
}

fn validate_amount(amount: Decimal, max_topup: Decimal) -> Result<(), FundsError> {
    if amount <= Decimal::ZERO {
        return Err(FundsError::InvalidAmount(format!(
            "top-up amount must be positive, got {amount}"
        )));
    }
    if amount > max_topup {
        return Err(FundsError::InvalidAmount(format!(
            "top-up amount must not exceed {max_topup}, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_validate_amount_rejects_non_positive() {
        assert!(matches!(
            validate_amount(dec!(0), dec!(1000)),
            Err(FundsError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(dec!(-5.00), dec!(1000)),
            Err(FundsError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_amount_rejects_over_topup_limit() {
        assert!(matches!(
            validate_amount(dec!(1000.01), dec!(1000)),
            Err(FundsError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_amount_accepts_in_range() {
        assert!(validate_amount(dec!(50.00), dec!(1000)).is_ok());
        assert!(validate_amount(dec!(1000), dec!(1000)).is_ok());
    }
}
