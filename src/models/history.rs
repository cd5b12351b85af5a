//! Ledger history entries returned by `/api/history`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Topup,
    Withdraw,
    Deal,
    Commission,
    #[serde(other)]
    Unknown,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Topup => "topup",
            HistoryKind::Withdraw => "withdraw",
            HistoryKind::Deal => "deal",
            HistoryKind::Commission => "commission",
            HistoryKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topup" => Ok(HistoryKind::Topup),
            "withdraw" => Ok(HistoryKind::Withdraw),
            "deal" => Ok(HistoryKind::Deal),
            "commission" => Ok(HistoryKind::Commission),
            other => Err(format!("unknown history type {other:?}")),
        }
    }
}

/// One ledger movement. The sign of `amount` is its direction: positive
/// credits the user, negative debits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub date: Option<String>,
    /// Authority-side processing state (`pending`, `frozen`, ...).
    #[serde(default)]
    pub status: Option<String>,
}
