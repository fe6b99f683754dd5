//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The amount is zero or negative.
    #[error("price must be greater than zero, got {0}")]
    NotPositive(Decimal),
}

/// A strictly positive monetary amount.
///
/// Prices are stored as fixed-point decimals so arithmetic never drifts
/// the way it would with floats. Serializes as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting zero and negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] if `amount <= 0`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive(amount));
        }
        Ok(Self(amount))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid.
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_positive_price() {
        let price = Price::new(dec!(19.99)).unwrap();
        assert_eq!(price.as_decimal(), dec!(19.99));
        assert_eq!(price.to_string(), "19.99");
    }

    #[test]
    fn test_zero_price_rejected() {
        assert!(matches!(
            Price::new(Decimal::ZERO),
            Err(PriceError::NotPositive(_))
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(matches!(
            Price::new(dec!(-1.50)),
            Err(PriceError::NotPositive(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let price = Price::new(dec!(4.25)).unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"4.25\"");

        let parsed: Price = serde_json::from_str("\"4.25\"").unwrap();
        assert_eq!(parsed, price);
    }

    #[test]
    fn test_ordering() {
        let cheap = Price::new(dec!(1.00)).unwrap();
        let dear = Price::new(dec!(2.00)).unwrap();
        assert!(cheap < dear);
    }
}
