//! Prepaid funds endpoints.

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::FundsService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TopUpResponse {
    pub new_balance: Decimal,
}

/// POST /funds/top-up
pub async fn top_up(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<TopUpRequest>,
) -> Result<Json<TopUpResponse>> {
    let funds = FundsService::new(state.pool(), state.config().funds);
    let new_balance = funds.top_up(user.id, req.amount).await?;

    tracing::info!(user_id = %user.id, amount = %req.amount, "Funds top-up");
    Ok(Json(TopUpResponse { new_balance }))
}
