//! Wire models for the escrow authority API.
//!
//! Every endpoint answers with the same [`Envelope`]: a `success` flag, an
//! optional `data` payload and an optional human-readable `message`.
//! Entity shapes live in the submodules; request bodies in [`requests`].

pub mod balance;
pub mod deal;
pub mod history;
pub mod requests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use balance::BalanceSnapshot;
pub use deal::{Deal, DealAction, DealInvariant, DealStatus, DealType};
pub use history::{HistoryEntry, HistoryKind};

/// Unit every amount is denominated in.
pub const CURRENCY: &str = "TON";

/// Participant identifier assigned by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

/// Opaque deal identifier. The authority sends either a number or a string
/// and expects the same form back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DealId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealId::Numeric(n) => write!(f, "{n}"),
            DealId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for DealId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u64>() {
            Ok(n) => DealId::Numeric(n),
            Err(_) => DealId::Text(s.to_string()),
        })
    }
}

/// Response envelope shared by every authority endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// A failed envelope carrying the authority's explanation.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// `data` of `/api/deals`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DealsData {
    #[serde(default)]
    pub deals: Vec<Deal>,
}

/// `data` of `/api/history`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HistoryData {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// `data` of a submission acknowledgement. Only create-deal fills it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AckData {
    #[serde(default)]
    pub deal_id: Option<DealId>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub version: String,
}
