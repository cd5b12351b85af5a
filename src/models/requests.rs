//! Request bodies posted to the authority.
//!
//! All bodies are flat key-value JSON objects. Amounts go out as JSON
//! numbers because the authority parses them as floats.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{DealAction, DealId, DealType, UserId};

/// Body of the three fetch endpoints (`/api/user`, `/api/deals`, `/api/history`).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserQuery {
    pub user_id: UserId,
}

/// Body of `/api/topup`.
#[derive(Debug, Clone, Serialize)]
pub struct TopupRequest {
    pub user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub tx_hash: String,
}

/// Body of `/api/withdraw`.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawRequest {
    pub user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub address: String,
}

/// Body of `/api/create-deal`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDealRequest {
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub deal_type: DealType,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Body of `/api/deal-action`.
#[derive(Debug, Clone, Serialize)]
pub struct DealActionRequest {
    pub user_id: UserId,
    pub deal_id: DealId,
    pub action: DealAction,
}
