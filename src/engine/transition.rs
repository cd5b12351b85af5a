//! Pre-flight transition check for a single deal action.
//!
//! A local `Ok` only means the request is not obviously futile. The
//! authority re-validates independently and only its response may change
//! what is displayed.

use std::fmt;

use crate::models::{Deal, DealAction, DealStatus, UserId};

use super::eligibility::is_eligible;

/// Status the deal is expected to reach if the authority accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusHint {
    /// The next status follows directly from the action.
    Definite(DealStatus),
    /// The authority picks the next status from these candidates.
    AuthorityDetermined(Vec<DealStatus>),
}

/// Reason a deal action was refused before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The deal is completed or cancelled.
    Terminal {
        action: DealAction,
        status: DealStatus,
    },
    /// The action is not eligible for this actor in the current state.
    NotPermitted {
        action: DealAction,
        status: DealStatus,
    },
}

impl Rejection {
    /// Machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Terminal { .. } => "terminal",
            Self::NotPermitted { .. } => "not-permitted",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal { action, status } => {
                write!(f, "{action} rejected (terminal): deal is already {status}")
            }
            Self::NotPermitted { action, status } => {
                write!(
                    f,
                    "{action} rejected (not-permitted): not available to this participant on a {status} deal"
                )
            }
        }
    }
}

impl std::error::Error for Rejection {}

/// Checks whether `actor` may submit `action` on `deal`.
///
/// Terminal deals are rejected first, regardless of actor or action.
pub fn validate(deal: &Deal, action: DealAction, actor: UserId) -> Result<StatusHint, Rejection> {
    let status = deal.status;

    if status.is_terminal() {
        return Err(Rejection::Terminal { action, status });
    }

    if !is_eligible(deal, action, actor) {
        return Err(Rejection::NotPermitted { action, status });
    }

    let hint = match action {
        DealAction::Join => StatusHint::Definite(DealStatus::Joined),
        DealAction::Cancel => StatusHint::Definite(DealStatus::Cancelled),
        DealAction::SendGift | DealAction::Confirm => StatusHint::AuthorityDetermined(
            status
                .successors()
                .iter()
                .copied()
                .filter(|s| *s != DealStatus::Cancelled)
                .collect(),
        ),
    };

    Ok(hint)
}
