//! Admin endpoints: user management, product management, and the sale
//! ledger.
//!
//! Product create/update accepts `multipart/form-data` with text fields
//! `name`, `description`, `price`, `stock` and an optional `image` file
//! part, matching what the admin dashboard posts.

use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use breadbox_core::{ProductId, SaleId, UserId, UserRole};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{SaleRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{ProductInput, Sale};
use crate::routes::auth::UserResponse;
use crate::routes::products::ProductResponse;
use crate::services::{AuthService, CatalogService};
use crate::state::AppState;

/// Product images are capped at 5 MiB.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

// ===== Users =====

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserResponse>>> {
    let users = UserRepository::new(state.pool());
    let all = users.list_all().await.map_err(AppError::Database)?;
    Ok(Json(all.into_iter().map(UserResponse::from).collect()))
}

/// POST /admin/users
///
/// Creates an account with an explicit role. This is how additional
/// admins are minted; public registration only produces customers.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .create_user(&req.name, &req.email, &req.password, req.role)
        .await?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        role = %user.role,
        "User created by admin"
    );
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ===== Products =====

/// POST /admin/products
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let input = parse_product_form(multipart).await?;
    let catalog = CatalogService::new(state.pool());
    let product = catalog.create(input).await?;

    tracing::info!(admin_id = %admin.id, product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /admin/products/{id}
///
/// Full replace of the text fields; the image is only replaced when the
/// form carries a new file part.
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>> {
    let input = parse_product_form(multipart).await?;
    let catalog = CatalogService::new(state.pool());
    let product = catalog.update(id, input).await?;

    tracing::info!(admin_id = %admin.id, product_id = %product.id, "Product updated");
    Ok(Json(product.into()))
}

/// DELETE /admin/products/{id}
///
/// Cart entries holding the product cascade away; sale lines keep their
/// snapshots.
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let catalog = CatalogService::new(state.pool());
    catalog.delete(id).await?;

    tracing::info!(admin_id = %admin.id, product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ===== Sales ledger =====

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub user_id: Option<UserId>,
}

impl SalesQuery {
    /// Resolves the filter to a half-open `[from, to)` window.
    ///
    /// Explicit `start`/`end` dates (`YYYY-MM-DD`, both inclusive) win
    /// over the `range` presets. Unknown presets fall back to the
    /// default trailing 30 days.
    fn to_bounds(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        if let (Some(start), Some(end)) = (self.start.as_deref(), self.end.as_deref()) {
            let start_day = parse_date(start)?;
            let end_day = parse_date(end)?;
            if end_day < start_day {
                return Err(AppError::BadRequest(
                    "end date is before start date".to_owned(),
                ));
            }

            let from = start_day.and_time(NaiveTime::MIN).and_utc();
            let to = end_day
                .succ_opt()
                .ok_or_else(|| AppError::BadRequest(format!("date out of range: {end}")))?
                .and_time(NaiveTime::MIN)
                .and_utc();
            return Ok((from, to));
        }

        let from = match self.range.as_deref() {
            Some("7d") => now - chrono::Duration::days(7),
            Some("90d") => now - chrono::Duration::days(90),
            Some("ytd") => NaiveDate::from_ymd_opt(now.year(), 1, 1)
                .ok_or_else(|| AppError::Internal("year start out of range".to_owned()))?
                .and_time(NaiveTime::MIN)
                .and_utc(),
            _ => now - chrono::Duration::days(30),
        };

        Ok((from, now))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date: {raw}, expected YYYY-MM-DD")))
}

#[derive(Debug, Serialize)]
pub struct AdminSaleResponse {
    pub id: SaleId,
    pub user_id: UserId,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Sale> for AdminSaleResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            user_id: sale.user_id,
            total: sale.total,
            created_at: sale.created_at,
        }
    }
}

/// GET /admin/sales
pub async fn list_sales(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<SalesQuery>,
) -> Result<Json<Vec<AdminSaleResponse>>> {
    let (from, to) = query.to_bounds(Utc::now())?;
    let sales = SaleRepository::new(state.pool());
    let rows = sales
        .list_filtered(from, to, query.user_id)
        .await
        .map_err(AppError::Database)?;

    Ok(Json(rows.into_iter().map(AdminSaleResponse::from).collect()))
}

// ===== Multipart parsing =====

async fn parse_product_form(mut multipart: Multipart) -> Result<ProductInput> {
    let mut name = None;
    let mut description = None;
    let mut price = None;
    let mut stock = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(field_name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        match field_name.as_str() {
            "name" => name = Some(text_field(field, "name").await?),
            "description" => description = Some(text_field(field, "description").await?),
            "price" => {
                let raw = text_field(field, "price").await?;
                let parsed = raw
                    .trim()
                    .parse::<Decimal>()
                    .map_err(|_| AppError::BadRequest(format!("invalid price: {raw}")))?;
                price = Some(parsed);
            }
            "stock" => {
                let raw = text_field(field, "stock").await?;
                let parsed = raw
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| AppError::BadRequest(format!("invalid stock: {raw}")))?;
                stock = Some(parsed);
            }
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read image: {e}")))?;
                if bytes.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::BadRequest(format!(
                        "image exceeds the {MAX_IMAGE_BYTES} byte limit"
                    )));
                }
                // Browsers send an empty part when no file is chosen.
                if !bytes.is_empty() {
                    image = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    Ok(ProductInput {
        name: required(name, "name")?,
        description: description.unwrap_or_default(),
        price: required(price, "price")?,
        stock: required(stock, "stock")?,
        image,
    })
}

async fn text_field(field: Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid field {name}: {e}")))
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| AppError::BadRequest(format!("missing field: {name}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(
        range: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> SalesQuery {
        SalesQuery {
            range: range.map(ToOwned::to_owned),
            start: start.map(ToOwned::to_owned),
            end: end.map(ToOwned::to_owned),
            user_id: None,
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-08-21T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_bounds_custom_dates_include_end_day() {
        let (from, to) = query(None, Some("2026-08-01"), Some("2026-08-10"))
            .to_bounds(now())
            .unwrap();
        assert_eq!(from, "2026-08-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(to, "2026-08-11T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_bounds_custom_dates_win_over_range() {
        let (from, _) = query(Some("7d"), Some("2026-01-01"), Some("2026-01-31"))
            .to_bounds(now())
            .unwrap();
        assert_eq!(from, "2026-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_bounds_rejects_reversed_dates() {
        let result = query(None, Some("2026-08-10"), Some("2026-08-01")).to_bounds(now());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_bounds_rejects_malformed_date() {
        let result = query(None, Some("08/01/2026"), Some("2026-08-10")).to_bounds(now());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_bounds_default_is_trailing_30_days() {
        let (from, to) = query(None, None, None).to_bounds(now()).unwrap();
        assert_eq!(to, now());
        assert_eq!(to - from, chrono::Duration::days(30));
    }

    #[test]
    fn test_bounds_ytd_starts_january_first() {
        let (from, _) = query(Some("ytd"), None, None).to_bounds(now()).unwrap();
        assert_eq!(from, "2026-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }
}
