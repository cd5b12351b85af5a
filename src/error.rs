//! Crate-level error types.
//!
//! [`GarantError`] unifies every error source (configuration, input
//! validation, authority rejection, transport) behind a single enum so
//! callers can match on the variant they care about while still using the
//! `?` operator for easy propagation.

use rust_decimal::Decimal;

use crate::engine::transition::Rejection;
use crate::models::DealId;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GarantError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum GarantError {
    /// Environment or limits file could not be read or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input was refused locally; no request was sent.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The authority answered with `success: false`.
    #[error("{message}")]
    Authority { message: String },

    /// The authority could not be reached or answered outside the protocol.
    #[error("transport failure: {0}")]
    Transport(String),

    /// HTTP client construction or request failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The authority reported success but the payload was unusable.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Local state became unusable, e.g. a poisoned lock.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GarantError {
    /// True for failures where the authority was never heard from.
    ///
    /// Callers must report these as outages and must not substitute data.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http(_))
    }

    /// True when the request was blocked before leaving the client.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Reason a request was blocked client-side before submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Decimal },

    #[error("amount {amount} exceeds the maximum of {max}")]
    AmountAboveCeiling { amount: Decimal, max: Decimal },

    #[error("amount {amount} is below the minimum of {min}")]
    AmountBelowMinimum { amount: Decimal, min: Decimal },

    #[error("{field} is required")]
    EmptyField { field: &'static str },

    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("deal type must be sell or buy")]
    UnknownDealType,

    #[error("deal {deal_id} is not among the viewer's deals")]
    UnknownDeal { deal_id: DealId },

    #[error("not a valid amount: {input:?}")]
    InvalidAmount { input: String },

    /// The deal action is not eligible for this participant.
    #[error(transparent)]
    Action(#[from] Rejection),
}
