//! User balance snapshot returned by `/api/user`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Custodied funds of one participant at fetch time.
///
/// The authority may also send an `available` field; it is ignored and
/// always re-derived from `balance - frozen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct BalanceSnapshot {
    /// Total custodied funds.
    #[serde(default)]
    pub balance: Decimal,
    /// Portion locked in active deals.
    #[serde(default)]
    pub frozen: Decimal,
}

impl BalanceSnapshot {
    pub fn new(balance: Decimal, frozen: Decimal) -> Self {
        Self { balance, frozen }
    }

    /// Funds not locked in deals. May be negative if the authority sent
    /// inconsistent data; see [`crate::engine::projection::project_balance`].
    pub fn available(&self) -> Decimal {
        self.balance - self.frozen
    }
}
