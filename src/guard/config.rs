//! Input limits configuration types and loading.

use std::fmt::Write;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Default ceiling for a single top-up request.
const DEFAULT_MAX_TOPUP: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);
/// Default smallest deal sum.
const DEFAULT_MIN_DEAL: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Client-side input limits, optionally loaded from a JSON document.
///
/// Missing fields fall back to the defaults the authority enforces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest amount accepted in one top-up request.
    pub max_topup_amount: Decimal,
    /// Smallest sum a new deal may carry.
    pub min_deal_amount: Decimal,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_topup_amount: DEFAULT_MAX_TOPUP,
            min_deal_amount: DEFAULT_MIN_DEAL,
        }
    }
}

impl LimitsConfig {
    /// Loads limits from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// limits are not positive.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::GarantError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> crate::Result<()> {
        if self.max_topup_amount <= Decimal::ZERO {
            return Err(crate::GarantError::Config(format!(
                "max_topup_amount must be positive, got {}",
                self.max_topup_amount
            )));
        }
        if self.min_deal_amount <= Decimal::ZERO {
            return Err(crate::GarantError::Config(format!(
                "min_deal_amount must be positive, got {}",
                self.min_deal_amount
            )));
        }
        Ok(())
    }

    /// Returns a human-readable description of the limits.
    pub fn describe_limits(&self) -> String {
        let mut out = String::from("Input limits:\n");
        let _ = writeln!(out, "  max_topup_amount: {}", self.max_topup_amount);
        let _ = writeln!(out, "  min_deal_amount: {}", self.min_deal_amount);
        out
    }
}
