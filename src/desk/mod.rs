//! Caller-facing deal desk.
//!
//! [`Desk`] ties the pre-flight guard, the lifecycle engine and an
//! [`Authority`] together for a single viewer. Submissions that the guard
//! or the transition validator refuse never leave the client. Fetches are
//! last-request-wins: a reply that arrives after a newer fetch of the same
//! resource was issued comes back as [`Fetched::Superseded`].

pub mod sequence;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::authority::{Ack, Authority, Endpoint};
use crate::engine::{ActionSet, StatusHint, eligible_actions, validate};
use crate::error::ValidationError;
use crate::guard::PreflightGuard;
use crate::models::{
    BalanceSnapshot, Deal, DealAction, DealId, DealType, Envelope, HistoryEntry, UserId,
    requests::{CreateDealRequest, DealActionRequest, TopupRequest, UserQuery, WithdrawRequest},
};
use crate::Result;
use sequence::{FetchSequencer, Resource, Ticket};

/// Outcome of a fetch under last-request-wins.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// Reply to the newest request for this resource.
    Current(T),
    /// A newer request was issued before this reply arrived.
    Superseded,
}

impl<T> Fetched<T> {
    pub fn into_current(self) -> Option<T> {
        match self {
            Fetched::Current(value) => Some(value),
            Fetched::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Fetched::Superseded)
    }
}

/// Deal desk for one viewer.
#[derive(Debug)]
pub struct Desk<A> {
    authority: A,
    guard: PreflightGuard,
    viewer: UserId,
    sequencer: FetchSequencer,
}

impl<A: Authority> Desk<A> {
    pub fn new(authority: A, guard: PreflightGuard, viewer: UserId) -> Self {
        Self {
            authority,
            guard,
            viewer,
            sequencer: FetchSequencer::new(),
        }
    }

    pub fn viewer(&self) -> UserId {
        self.viewer
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub fn guard(&self) -> &PreflightGuard {
        &self.guard
    }

    fn query(&self) -> UserQuery {
        UserQuery {
            user_id: self.viewer,
        }
    }

    /// Fetches the viewer's balance snapshot.
    ///
    /// # Errors
    ///
    /// Transport failures, authority rejections and malformed replies for
    /// the newest request. Errors of superseded requests are discarded.
    pub async fn load_balance(&self) -> Result<Fetched<BalanceSnapshot>> {
        let ticket = self.sequencer.issue(Resource::User);
        let reply = self.authority.fetch_user(&self.query()).await;
        self.settle(ticket, Endpoint::User, reply)
    }

    /// Fetches the viewer's deals.
    ///
    /// Deals that break the entity invariants are logged and returned as
    /// received.
    pub async fn load_deals(&self) -> Result<Fetched<Vec<Deal>>> {
        let ticket = self.sequencer.issue(Resource::Deals);
        let reply = self.authority.fetch_deals(&self.query()).await;
        let fetched = self.settle(ticket, Endpoint::Deals, reply)?;

        Ok(match fetched {
            Fetched::Current(data) => {
                for deal in &data.deals {
                    for violation in deal.invariant_violations() {
                        warn!(deal_id = %deal.id, %violation, "Deal violates invariant");
                    }
                }
                Fetched::Current(data.deals)
            }
            Fetched::Superseded => Fetched::Superseded,
        })
    }

    /// Fetches the viewer's transaction history, newest first as sent.
    pub async fn load_history(&self) -> Result<Fetched<Vec<HistoryEntry>>> {
        let ticket = self.sequencer.issue(Resource::History);
        let reply = self.authority.fetch_history(&self.query()).await;
        let fetched = self.settle(ticket, Endpoint::History, reply)?;

        Ok(match fetched {
            Fetched::Current(data) => Fetched::Current(data.history),
            Fetched::Superseded => Fetched::Superseded,
        })
    }

    fn settle<T>(
        &self,
        ticket: Ticket,
        endpoint: Endpoint,
        reply: Result<Envelope<T>>,
    ) -> Result<Fetched<T>> {
        if !self.sequencer.is_current(ticket) {
            debug!(
                endpoint = endpoint.path(),
                seq = ticket.seq(),
                "Discarding superseded reply"
            );
            return Ok(Fetched::Superseded);
        }
        reply?.into_data(endpoint).map(Fetched::Current)
    }

    /// Actions the viewer may offer on `deal`.
    pub fn actions_for(&self, deal: &Deal) -> ActionSet {
        eligible_actions(deal, self.viewer)
    }

    /// Requests a top-up credited after the authority verifies `tx_hash`.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] without contacting the authority when the amount
    /// is out of range or the hash is empty.
    pub async fn submit_topup(&self, amount: Decimal, tx_hash: &str) -> Result<Ack> {
        self.guard.check_topup(amount, tx_hash)?;

        let request = TopupRequest {
            user_id: self.viewer,
            amount,
            tx_hash: tx_hash.trim().to_string(),
        };
        info!(%amount, "Submitting top-up");
        self.authority
            .submit_topup(&request)
            .await?
            .into_ack(Endpoint::Topup)
    }

    /// Requests a withdrawal to `address`, checked against `balance`.
    pub async fn submit_withdraw(
        &self,
        balance: &BalanceSnapshot,
        amount: Decimal,
        address: &str,
    ) -> Result<Ack> {
        self.guard.check_withdraw(amount, address, balance)?;

        let request = WithdrawRequest {
            user_id: self.viewer,
            amount,
            address: address.trim().to_string(),
        };
        info!(%amount, "Submitting withdrawal");
        self.authority
            .submit_withdraw(&request)
            .await?
            .into_ack(Endpoint::Withdraw)
    }

    /// Creates a deal. Sell deals need `amount` available in `balance`.
    pub async fn create_deal(
        &self,
        balance: &BalanceSnapshot,
        deal_type: DealType,
        name: &str,
        amount: Decimal,
    ) -> Result<Ack> {
        self.guard
            .check_create_deal(deal_type, name, amount, balance)?;

        let request = CreateDealRequest {
            user_id: self.viewer,
            deal_type,
            name: name.trim().to_string(),
            amount,
        };
        info!(%deal_type, %amount, "Submitting deal creation");
        self.authority
            .submit_create_deal(&request)
            .await?
            .into_ack(Endpoint::CreateDeal)
    }

    /// Performs `action` on `deal` as the viewer.
    ///
    /// Joining locks the deal's sum, so a join is checked against
    /// `balance` first. The local status hint is advisory; callers must
    /// re-fetch to learn the deal's actual status.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Action`] without contacting the authority when
    /// the action is not available to the viewer, and
    /// [`ValidationError::InsufficientFunds`] for a join the viewer cannot
    /// cover.
    pub async fn perform_action(
        &self,
        balance: &BalanceSnapshot,
        deal: &Deal,
        action: DealAction,
    ) -> Result<Ack> {
        let hint = validate(deal, action, self.viewer).map_err(ValidationError::from)?;
        if action == DealAction::Join {
            self.guard.check_join(deal.sum, balance)?;
        }
        match &hint {
            StatusHint::Definite(status) => {
                debug!(deal_id = %deal.id, %action, expected = %status, "Action pre-validated");
            }
            StatusHint::AuthorityDetermined(candidates) => {
                debug!(
                    deal_id = %deal.id,
                    %action,
                    candidates = candidates.len(),
                    "Action pre-validated, outcome decided by authority"
                );
            }
        }

        self.submit_action(deal.id.clone(), action).await
    }

    /// Performs `action` on the deal identified by `deal_id`.
    ///
    /// `deals` is the viewer's latest listing. The listing only holds deals
    /// the viewer takes part in, so a deal shared by link is absent until
    /// joined: an unlisted join goes straight to the authority, which owns
    /// the funds and status checks for it. Any other action on an unlisted
    /// deal is refused locally.
    pub async fn perform_action_by_id(
        &self,
        balance: &BalanceSnapshot,
        deals: &[Deal],
        deal_id: &DealId,
        action: DealAction,
    ) -> Result<Ack> {
        match deals.iter().find(|d| &d.id == deal_id) {
            Some(deal) => self.perform_action(balance, deal, action).await,
            None if action == DealAction::Join => {
                debug!(%deal_id, "Deal not listed, joining by id");
                self.submit_action(deal_id.clone(), action).await
            }
            None => Err(ValidationError::UnknownDeal {
                deal_id: deal_id.clone(),
            }
            .into()),
        }
    }

    async fn submit_action(&self, deal_id: DealId, action: DealAction) -> Result<Ack> {
        info!(%deal_id, %action, "Submitting deal action");
        let request = DealActionRequest {
            user_id: self.viewer,
            deal_id,
            action,
        };
        self.authority
            .submit_deal_action(&request)
            .await?
            .into_ack(Endpoint::DealAction)
    }
}
