//! Escrow deal entity and its lifecycle states.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DealId, UserId};

/// Which side of the trade the creator takes. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealType {
    /// Creator delivers the item; the counterparty pays.
    Sell,
    /// Creator pays; the counterparty delivers the item.
    Buy,
    /// Any value this client does not recognise.
    #[serde(other)]
    Unknown,
}

impl DealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealType::Sell => "sell",
            DealType::Buy => "buy",
            DealType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sell" => Ok(DealType::Sell),
            "buy" => Ok(DealType::Buy),
            other => Err(format!("unknown deal type {other:?}, expected sell or buy")),
        }
    }
}

/// Lifecycle state of a deal.
///
/// ```text
/// waiting ──► joined ──► frozen ──► completed
///    │          │          │
///    └──────────┴──────────┴──► cancelled
/// ```
///
/// `completed` and `cancelled` are terminal. What moves a deal from
/// `joined` to `frozen` and from `frozen` to `completed` is decided by the
/// authority and is not observable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    Waiting,
    Joined,
    Frozen,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Waiting => "waiting",
            DealStatus::Joined => "joined",
            DealStatus::Frozen => "frozen",
            DealStatus::Completed => "completed",
            DealStatus::Cancelled => "cancelled",
            DealStatus::Unknown => "unknown",
        }
    }

    /// True for states with no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DealStatus::Completed | DealStatus::Cancelled)
    }

    /// True while a counterparty is attached and delivery is pending.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, DealStatus::Joined | DealStatus::Frozen)
    }

    /// States reachable in one step.
    pub fn successors(&self) -> &'static [DealStatus] {
        match self {
            DealStatus::Waiting => &[DealStatus::Joined, DealStatus::Cancelled],
            DealStatus::Joined => &[DealStatus::Frozen, DealStatus::Cancelled],
            DealStatus::Frozen => &[DealStatus::Completed, DealStatus::Cancelled],
            DealStatus::Completed | DealStatus::Cancelled | DealStatus::Unknown => &[],
        }
    }

    pub fn can_transition_to(&self, next: DealStatus) -> bool {
        self.successors().contains(&next)
    }

    /// Whether a deal in this state must have a `buyer_id`.
    ///
    /// `None` means unconstrained (a deal may be cancelled before or after a
    /// buyer joins).
    pub fn requires_buyer(&self) -> Option<bool> {
        match self {
            DealStatus::Waiting => Some(false),
            DealStatus::Joined | DealStatus::Frozen | DealStatus::Completed => Some(true),
            DealStatus::Cancelled | DealStatus::Unknown => None,
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action a participant can ask the authority to apply to a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DealAction {
    Cancel,
    Join,
    SendGift,
    Confirm,
}

impl DealAction {
    pub const ALL: [DealAction; 4] = [
        DealAction::Cancel,
        DealAction::Join,
        DealAction::SendGift,
        DealAction::Confirm,
    ];

    /// Wire name, as sent in the `action` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            DealAction::Cancel => "cancel",
            DealAction::Join => "join",
            DealAction::SendGift => "send-gift",
            DealAction::Confirm => "confirm",
        }
    }
}

impl fmt::Display for DealAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DealAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| format!("unknown deal action {s:?}"))
    }
}

/// A single escrow deal as last reported by the authority.
///
/// Immutable on the client: changes come from a fresh fetch, never from
/// local patching.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Deal {
    pub id: DealId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub deal_type: DealType,
    pub sum: Decimal,
    pub status: DealStatus,
    pub creator_id: UserId,
    #[serde(default)]
    pub buyer_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Invitation link for the counterparty.
    #[serde(default)]
    pub link: Option<String>,
}

/// A broken entity invariant in a deal received from the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealInvariant {
    NonPositiveSum { sum: Decimal },
    MissingBuyer { status: DealStatus },
    UnexpectedBuyer { status: DealStatus },
}

impl fmt::Display for DealInvariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveSum { sum } => write!(f, "sum must be positive, got {sum}"),
            Self::MissingBuyer { status } => write!(f, "{status} deal has no buyer"),
            Self::UnexpectedBuyer { status } => write!(f, "{status} deal already has a buyer"),
        }
    }
}

impl Deal {
    /// The participant who must hand over the item.
    pub fn deliverer(&self) -> Option<UserId> {
        match self.deal_type {
            DealType::Sell => Some(self.creator_id),
            DealType::Buy => self.buyer_id,
            DealType::Unknown => None,
        }
    }

    /// The participant who must accept delivery.
    pub fn receiver(&self) -> Option<UserId> {
        match self.deal_type {
            DealType::Sell => self.buyer_id,
            DealType::Buy => Some(self.creator_id),
            DealType::Unknown => None,
        }
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.creator_id == user || self.buyer_id == Some(user)
    }

    /// Lists every entity invariant this deal violates.
    pub fn invariant_violations(&self) -> Vec<DealInvariant> {
        let mut violations = Vec::new();

        if self.sum <= Decimal::ZERO {
            violations.push(DealInvariant::NonPositiveSum { sum: self.sum });
        }

        match (self.status.requires_buyer(), self.buyer_id) {
            (Some(true), None) => violations.push(DealInvariant::MissingBuyer {
                status: self.status,
            }),
            (Some(false), Some(_)) => violations.push(DealInvariant::UnexpectedBuyer {
                status: self.status,
            }),
            _ => {}
        }

        violations
    }
}
