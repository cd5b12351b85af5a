//! Shared test utilities, fixtures and a scripted authority.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tokio::sync::Notify;

use garant::authority::Authority;
use garant::models::{
    AckData, BalanceSnapshot, Deal, DealId, DealStatus, DealType, DealsData, Envelope,
    HistoryData, UserId,
    requests::{CreateDealRequest, DealActionRequest, TopupRequest, UserQuery, WithdrawRequest},
};
use garant::{GarantError, Result};

pub const USER_JSON: &str = include_str!("../fixtures/user.json");
pub const DEALS_JSON: &str = include_str!("../fixtures/deals.json");
pub const HISTORY_JSON: &str = include_str!("../fixtures/history.json");
pub const REJECTION_JSON: &str = include_str!("../fixtures/rejection.json");

/// Viewer the fixtures are written for.
pub const VIEWER: UserId = UserId(42);
/// Counterparty in the fixtures.
pub const OTHER: UserId = UserId(123456);

/// Builds a deal with a positive sum and no metadata.
pub fn deal(
    deal_type: DealType,
    status: DealStatus,
    creator: UserId,
    buyer: Option<UserId>,
) -> Deal {
    Deal {
        id: DealId::Numeric(1),
        name: "Steam Gift Card $50".to_string(),
        deal_type,
        sum: Decimal::new(2500, 2),
        status,
        creator_id: creator,
        buyer_id: buyer,
        created_at: None,
        link: None,
    }
}

/// Envelope JSON for a balance fetch.
pub fn balance_reply(balance: &str, frozen: &str) -> String {
    format!(r#"{{"success": true, "data": {{"balance": {balance}, "frozen": {frozen}}}}}"#)
}

/// Authority that answers from canned JSON and counts submissions.
pub struct ScriptedAuthority {
    user_replies: Mutex<VecDeque<String>>,
    deals: String,
    history: String,
    ack: String,
    unreachable: bool,
    hold_first_user_fetch: bool,
    user_fetches: AtomicUsize,
    submissions: AtomicUsize,
    released: AtomicBool,
    release: Notify,
}

impl ScriptedAuthority {
    pub fn new() -> Self {
        Self {
            user_replies: Mutex::new(VecDeque::new()),
            deals: DEALS_JSON.to_string(),
            history: HISTORY_JSON.to_string(),
            ack: r#"{"success": true}"#.to_string(),
            unreachable: false,
            hold_first_user_fetch: false,
            user_fetches: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
            released: AtomicBool::new(false),
            release: Notify::new(),
        }
    }

    /// Replies for successive balance fetches. Once exhausted, `user.json`
    /// is served.
    pub fn with_user_replies(self, replies: &[String]) -> Self {
        *self.user_replies.lock().unwrap() = replies.iter().cloned().collect();
        self
    }

    /// Reply to every submission.
    pub fn with_ack(mut self, json: &str) -> Self {
        self.ack = json.to_string();
        self
    }

    /// Every call fails as if the network were down.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// The first balance fetch does not answer until a later one has.
    pub fn holding_first_user_fetch(mut self) -> Self {
        self.hold_first_user_fetch = true;
        self
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    fn reply<T: DeserializeOwned>(&self, json: &str) -> Result<Envelope<T>> {
        if self.unreachable {
            return Err(GarantError::Transport("connection refused".to_string()));
        }
        Ok(serde_json::from_str(json)?)
    }

    fn submit(&self) -> Result<Envelope<AckData>> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.reply(&self.ack)
    }
}

impl Authority for ScriptedAuthority {
    async fn fetch_user(&self, _query: &UserQuery) -> Result<Envelope<BalanceSnapshot>> {
        let call = self.user_fetches.fetch_add(1, Ordering::SeqCst);
        let json = self
            .user_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| USER_JSON.to_string());

        if self.hold_first_user_fetch {
            if call == 0 {
                if !self.released.load(Ordering::SeqCst) {
                    self.release.notified().await;
                }
            } else {
                self.released.store(true, Ordering::SeqCst);
                self.release.notify_one();
            }
        }

        self.reply(&json)
    }

    async fn fetch_deals(&self, _query: &UserQuery) -> Result<Envelope<DealsData>> {
        self.reply(&self.deals)
    }

    async fn fetch_history(&self, _query: &UserQuery) -> Result<Envelope<HistoryData>> {
        self.reply(&self.history)
    }

    async fn submit_topup(&self, _request: &TopupRequest) -> Result<Envelope<AckData>> {
        self.submit()
    }

    async fn submit_withdraw(&self, _request: &WithdrawRequest) -> Result<Envelope<AckData>> {
        self.submit()
    }

    async fn submit_create_deal(&self, _request: &CreateDealRequest) -> Result<Envelope<AckData>> {
        self.submit()
    }

    async fn submit_deal_action(&self, _request: &DealActionRequest) -> Result<Envelope<AckData>> {
        self.submit()
    }
}
