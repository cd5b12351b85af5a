//! Pre-flight input validation for submissions.
//!
//! Checks amounts, required fields and available funds against the latest
//! balance snapshot before anything is sent. The authority repeats every
//! check; this layer only saves futile round-trips.

pub mod config;

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{BalanceSnapshot, DealType};
use config::LimitsConfig;

/// Validates form input against configured limits.
#[derive(Debug, Clone, Default)]
pub struct PreflightGuard {
    limits: LimitsConfig,
}

impl PreflightGuard {
    /// Creates a new guard with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Returns a reference to the limits configuration.
    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Validates a top-up request.
    pub fn check_topup(&self, amount: Decimal, tx_hash: &str) -> Result<(), ValidationError> {
        // 1. Reject non-positive amount
        require_positive(amount)?;

        // 2. Reject amount above the ceiling
        if amount > self.limits.max_topup_amount {
            return Err(ValidationError::AmountAboveCeiling {
                amount,
                max: self.limits.max_topup_amount,
            });
        }

        // 3. Transaction hash is mandatory
        require_field("tx_hash", tx_hash)
    }

    /// Validates a withdrawal request against the current snapshot.
    pub fn check_withdraw(
        &self,
        amount: Decimal,
        address: &str,
        balance: &BalanceSnapshot,
    ) -> Result<(), ValidationError> {
        require_positive(amount)?;
        require_funds(amount, balance)?;
        require_field("address", address)
    }

    /// Validates a new deal. Only sell deals lock the creator's funds, so
    /// buy deals skip the funds check.
    pub fn check_create_deal(
        &self,
        deal_type: DealType,
        name: &str,
        amount: Decimal,
        balance: &BalanceSnapshot,
    ) -> Result<(), ValidationError> {
        if deal_type == DealType::Unknown {
            return Err(ValidationError::UnknownDealType);
        }
        require_field("name", name)?;
        require_positive(amount)?;

        if amount < self.limits.min_deal_amount {
            return Err(ValidationError::AmountBelowMinimum {
                amount,
                min: self.limits.min_deal_amount,
            });
        }

        if deal_type == DealType::Sell {
            require_funds(amount, balance)?;
        }

        Ok(())
    }

    /// Validates joining a deal of `sum`; the joiner's stake is locked
    /// from available funds.
    pub fn check_join(
        &self,
        sum: Decimal,
        balance: &BalanceSnapshot,
    ) -> Result<(), ValidationError> {
        require_funds(sum, balance)
    }
}

fn require_positive(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount { amount });
    }
    Ok(())
}

fn require_funds(amount: Decimal, balance: &BalanceSnapshot) -> Result<(), ValidationError> {
    let available = balance.available();
    if amount > available {
        return Err(ValidationError::InsufficientFunds {
            requested: amount,
            available,
        });
    }
    Ok(())
}

fn require_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}
