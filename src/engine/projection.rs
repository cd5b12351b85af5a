//! Display aggregates derived from balance snapshots and ledger entries.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::error::ValidationError;
use crate::models::{BalanceSnapshot, HistoryEntry, HistoryKind};

/// Fixed number of decimal places for every displayed amount.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Balance figures ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceProjection {
    pub total: Decimal,
    pub available: Decimal,
    pub frozen: Decimal,
    /// Authority-side inconsistencies found in the snapshot.
    pub warnings: Vec<BalanceWarning>,
}

impl BalanceProjection {
    pub fn is_consistent(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Inconsistency in a balance snapshot. Values are reported as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceWarning {
    NegativeTotal { total: Decimal },
    NegativeFrozen { frozen: Decimal },
    /// `frozen > total`.
    NegativeAvailable { available: Decimal },
}

impl fmt::Display for BalanceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeTotal { total } => write!(f, "total balance is negative ({total})"),
            Self::NegativeFrozen { frozen } => write!(f, "frozen amount is negative ({frozen})"),
            Self::NegativeAvailable { available } => {
                write!(f, "frozen exceeds total, available is {available}")
            }
        }
    }
}

/// Derives `{total, available, frozen}` from a snapshot.
///
/// A negative component is never clamped: it is reported in
/// [`BalanceProjection::warnings`] and logged.
pub fn project_balance(snapshot: &BalanceSnapshot) -> BalanceProjection {
    let total = snapshot.balance;
    let frozen = snapshot.frozen;
    let available = snapshot.available();

    let mut warnings = Vec::new();
    if total < Decimal::ZERO {
        warnings.push(BalanceWarning::NegativeTotal { total });
    }
    if frozen < Decimal::ZERO {
        warnings.push(BalanceWarning::NegativeFrozen { frozen });
    }
    if available < Decimal::ZERO {
        warnings.push(BalanceWarning::NegativeAvailable { available });
    }

    for warning in &warnings {
        warn!(%total, %frozen, %available, "Inconsistent balance snapshot: {warning}");
    }

    BalanceProjection {
        total,
        available,
        frozen,
        warnings,
    }
}

/// Icon group a history row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconCategory {
    Topup,
    Withdraw,
    Deal,
    Commission,
    Other,
}

impl From<HistoryKind> for IconCategory {
    fn from(kind: HistoryKind) -> Self {
        match kind {
            HistoryKind::Topup => IconCategory::Topup,
            HistoryKind::Withdraw => IconCategory::Withdraw,
            HistoryKind::Deal => IconCategory::Deal,
            HistoryKind::Commission => IconCategory::Commission,
            HistoryKind::Unknown => IconCategory::Other,
        }
    }
}

/// Direction of a ledger movement, taken from the sign of its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Credit,
    Debit,
    Neutral,
}

impl Polarity {
    pub fn of(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Polarity::Credit
        } else if amount < Decimal::ZERO {
            Polarity::Debit
        } else {
            Polarity::Neutral
        }
    }
}

/// A history row ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDisplay {
    pub category: IconCategory,
    pub polarity: Polarity,
    /// Signed, two decimals: `+100.00`, `-1.25`, `0.00`.
    pub formatted_amount: String,
}

/// Derives the display row for a ledger entry from its type and the sign
/// of its amount only.
pub fn project_history_display(entry: &HistoryEntry) -> HistoryDisplay {
    let polarity = Polarity::of(entry.amount);
    let formatted = format_amount(entry.amount);
    let formatted_amount = match polarity {
        Polarity::Credit => format!("+{formatted}"),
        Polarity::Debit | Polarity::Neutral => formatted,
    };

    HistoryDisplay {
        category: entry.kind.into(),
        polarity,
        formatted_amount,
    }
}

/// Formats an amount with exactly two decimals, rounding half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // drops the sign of -0.00
        rounded = Decimal::ZERO;
    }
    rounded.rescale(DISPLAY_DECIMALS);
    rounded.to_string()
}

/// Parses a user-entered amount. Accepts an optional leading `+` and
/// surrounding whitespace; rejects anything else that is not a plain
/// decimal number.
pub fn parse_amount(input: &str) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ValidationError::EmptyField { field: "amount" });
    }
    Decimal::from_str(digits).map_err(|_| ValidationError::InvalidAmount {
        input: input.to_string(),
    })
}

/// Which history rows to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Only(HistoryKind),
}

impl FromStr for HistoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(HistoryFilter::All);
        }
        s.parse().map(HistoryFilter::Only)
    }
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Only(kind) => entry.kind == *kind,
        }
    }
}

/// Keeps the entries matching `filter`, preserving authority order.
pub fn filter_history(entries: &[HistoryEntry], filter: HistoryFilter) -> Vec<&HistoryEntry> {
    entries.iter().filter(|e| filter.matches(e)).collect()
}
