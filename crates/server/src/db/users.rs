use breadbox_core::{Email, UserId, UserRole};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    role: UserRole,
    funds: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| RepositoryError::DataCorruption(format!("user {}: {e}", row.id)))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            role: row.role,
            funds: row.funds,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new account with a zero funds balance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the email is already
    /// registered.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, role, funds, created_at, updated_at",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, funds, created_at, updated_at
             FROM users
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Fetches an account together with its password hash for credential
    /// verification. Only the auth service should call this.
    pub async fn get_by_email_with_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            "SELECT id, name, email, role, funds, created_at, updated_at, password_hash
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some((row.user.try_into()?, row.password_hash))),
            None => Ok(None),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, funds, created_at, updated_at
             FROM users
             ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Credits `amount` to the account, unless the result would exceed
    /// `max_balance`. The check and the update are one atomic statement;
    /// concurrent top-ups cannot overshoot the ceiling.
    ///
    /// Returns the new balance, or `None` when no row qualified (account
    /// missing or ceiling exceeded). Callers disambiguate with a
    /// follow-up read.
    pub async fn add_funds(
        &self,
        id: UserId,
        amount: Decimal,
        max_balance: Decimal,
    ) -> Result<Option<Decimal>, RepositoryError> {
        let new_balance = sqlx::query_scalar::<_, Decimal>(
            "UPDATE users
             SET funds = funds + $2, updated_at = now()
             WHERE id = $1 AND funds + $2 <= $3
             RETURNING funds",
        )
        .bind(id)
        .bind(amount)
        .bind(max_balance)
        .fetch_optional(self.pool)
        .await?;

        Ok(new_balance)
    }

    pub async fn get_funds(&self, id: UserId) -> Result<Option<Decimal>, RepositoryError> {
        let funds = sqlx::query_scalar::<_, Decimal>("SELECT funds FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(funds)
    }
}
