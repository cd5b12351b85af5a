//! Transport to the escrow authority.
//!
//! [`Authority`] is the seam between the desk and the network. Every
//! method returns the authority's [`Envelope`] untouched; an `Err` means
//! the authority was not heard from (or answered outside the protocol).
//! Interpreting `success: false` is left to [`Envelope::into_data`] and
//! [`Envelope::into_ack`] so all implementations report rejections the
//! same way.
//!
//! - [`http::HttpAuthority`]: JSON over HTTP
//! - [`demo::DemoAuthority`]: in-memory stand-in, opt-in only

pub mod demo;
pub mod http;

use std::future::Future;

use crate::models::{
    AckData, BalanceSnapshot, DealId, DealsData, Envelope, HistoryData,
    requests::{CreateDealRequest, DealActionRequest, TopupRequest, UserQuery, WithdrawRequest},
};
use crate::{GarantError, Result};

/// Authority API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    User,
    Deals,
    History,
    Topup,
    Withdraw,
    CreateDeal,
    DealAction,
    Health,
}

impl Endpoint {
    /// Path relative to the authority base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::User => "/api/user",
            Endpoint::Deals => "/api/deals",
            Endpoint::History => "/api/history",
            Endpoint::Topup => "/api/topup",
            Endpoint::Withdraw => "/api/withdraw",
            Endpoint::CreateDeal => "/api/create-deal",
            Endpoint::DealAction => "/api/deal-action",
            Endpoint::Health => "/api/health",
        }
    }

    /// Shown when the authority rejects without a message.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Endpoint::User => "Failed to load user data",
            Endpoint::Deals => "Failed to load deals",
            Endpoint::History => "Failed to load history",
            Endpoint::Topup | Endpoint::Withdraw => "Failed to create request",
            Endpoint::CreateDeal => "Failed to create deal",
            Endpoint::DealAction => "Failed to perform action",
            Endpoint::Health => "Health check failed",
        }
    }

    /// Shown when the authority accepts a submission without a message.
    pub fn success_message(&self) -> &'static str {
        match self {
            Endpoint::Topup => "Top-up request submitted",
            Endpoint::Withdraw => "Withdrawal request created",
            Endpoint::CreateDeal => "Deal created",
            Endpoint::DealAction => "Action completed",
            Endpoint::User | Endpoint::Deals | Endpoint::History | Endpoint::Health => "OK",
        }
    }
}

/// Accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Authority message, or the endpoint's default.
    pub message: String,
    /// Identifier of a newly created deal, when the authority sends one.
    pub deal_id: Option<DealId>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload of a successful fetch.
    ///
    /// # Errors
    ///
    /// [`GarantError::Authority`] with the authority's message (or the
    /// endpoint fallback) when `success` is false;
    /// [`GarantError::MalformedResponse`] when `data` is missing.
    pub fn into_data(self, endpoint: Endpoint) -> Result<T> {
        if !self.success {
            return Err(rejection(endpoint, self.message));
        }
        self.data.ok_or_else(|| {
            GarantError::MalformedResponse(format!("{} returned no data", endpoint.path()))
        })
    }
}

impl Envelope<AckData> {
    /// Converts a submission reply into an [`Ack`].
    ///
    /// # Errors
    ///
    /// [`GarantError::Authority`] when `success` is false.
    pub fn into_ack(self, endpoint: Endpoint) -> Result<Ack> {
        if !self.success {
            return Err(rejection(endpoint, self.message));
        }
        Ok(Ack {
            message: non_empty(self.message)
                .unwrap_or_else(|| endpoint.success_message().to_string()),
            deal_id: self.data.and_then(|d| d.deal_id),
        })
    }
}

fn rejection(endpoint: Endpoint, message: Option<String>) -> GarantError {
    GarantError::Authority {
        message: non_empty(message).unwrap_or_else(|| endpoint.failure_message().to_string()),
    }
}

fn non_empty(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

/// Remote escrow authority.
///
/// Implementations must never fabricate a successful envelope when the
/// authority is unreachable; they return an error instead.
pub trait Authority: Send + Sync {
    fn fetch_user(
        &self,
        query: &UserQuery,
    ) -> impl Future<Output = Result<Envelope<BalanceSnapshot>>> + Send;

    fn fetch_deals(
        &self,
        query: &UserQuery,
    ) -> impl Future<Output = Result<Envelope<DealsData>>> + Send;

    fn fetch_history(
        &self,
        query: &UserQuery,
    ) -> impl Future<Output = Result<Envelope<HistoryData>>> + Send;

    fn submit_topup(
        &self,
        request: &TopupRequest,
    ) -> impl Future<Output = Result<Envelope<AckData>>> + Send;

    fn submit_withdraw(
        &self,
        request: &WithdrawRequest,
    ) -> impl Future<Output = Result<Envelope<AckData>>> + Send;

    fn submit_create_deal(
        &self,
        request: &CreateDealRequest,
    ) -> impl Future<Output = Result<Envelope<AckData>>> + Send;

    fn submit_deal_action(
        &self,
        request: &DealActionRequest,
    ) -> impl Future<Output = Result<Envelope<AckData>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejection_message_is_verbatim() {
        let env: Envelope<BalanceSnapshot> = Envelope::failed("Недостаточно средств");
        let err = env.into_data(Endpoint::User).unwrap_err();
        assert!(matches!(err, GarantError::Authority { ref message } if message == "Недостаточно средств"));
    }

    #[test]
    fn rejection_without_message_uses_fallback() {
        let env: Envelope<AckData> = Envelope {
            success: false,
            data: None,
            message: Some("  ".into()),
        };
        let err = env.into_ack(Endpoint::CreateDeal).unwrap_err();
        assert_eq!(err.to_string(), "Failed to create deal");
    }

    #[test]
    fn success_without_data_is_malformed() {
        let env: Envelope<BalanceSnapshot> = Envelope {
            success: true,
            data: None,
            message: None,
        };
        assert!(matches!(
            env.into_data(Endpoint::User),
            Err(GarantError::MalformedResponse(_))
        ));
    }

    #[test]
    fn success_data_unwraps() {
        let env = Envelope::ok(BalanceSnapshot::new(dec!(1), dec!(0)));
        assert_eq!(env.into_data(Endpoint::User).unwrap().balance, dec!(1));
    }

    #[test]
    fn ack_defaults_and_deal_id() {
        let env: Envelope<AckData> = serde_json::from_str(
            r#"{"success": true, "message": "Сделка создана успешно", "data": {"deal_id": 4}}"#,
        )
        .unwrap();
        let ack = env.into_ack(Endpoint::CreateDeal).unwrap();
        assert_eq!(ack.message, "Сделка создана успешно");
        assert_eq!(ack.deal_id, Some(DealId::Numeric(4)));

        let bare: Envelope<AckData> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        let ack = bare.into_ack(Endpoint::Withdraw).unwrap();
        assert_eq!(ack.message, "Withdrawal request created");
        assert!(ack.deal_id.is_none());
    }
}
