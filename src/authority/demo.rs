//! In-memory authority for demonstrations.
//!
//! Enabled only by an explicit flag (`GARANT_DEMO_MODE` or `--demo`); it is
//! never used as a fallback when the real authority is unreachable. The
//! demo keeps a small ledger for a single viewer and answers with the same
//! envelopes the real authority would, so the desk cannot tell them apart.

use std::sync::Mutex;

use rust_decimal::Decimal;
use tracing::info;

use super::Authority;
use crate::engine::transition::validate;
use crate::models::{
    AckData, BalanceSnapshot, Deal, DealAction, DealId, DealStatus, DealType, DealsData, Envelope,
    HistoryData, HistoryEntry, HistoryKind, UserId,
    requests::{CreateDealRequest, DealActionRequest, TopupRequest, UserQuery, WithdrawRequest},
};
use crate::{GarantError, Result};

/// Counterparty used by the seeded deals.
const DEMO_COUNTERPARTY: UserId = UserId(123456);
/// Deposit ceiling enforced by the demo, matching the real authority.
const DEMO_MAX_TOPUP: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);
/// Service commission taken from the deliverer on completion (5%).
const DEMO_COMMISSION_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

#[derive(Debug)]
struct Ledger {
    viewer: UserId,
    balance: Decimal,
    frozen: Decimal,
    deals: Vec<Deal>,
    history: Vec<HistoryEntry>,
    next_deal_id: u64,
    pending_topup: bool,
    pending_withdrawal: bool,
}

/// Authority stand-in seeded with sample data for one viewer.
#[derive(Debug)]
pub struct DemoAuthority {
    ledger: Mutex<Ledger>,
}

impl DemoAuthority {
    /// Creates a demo authority with a funded balance, one open sell deal
    /// by `viewer`, one joined buy deal where `viewer` is the buyer, and
    /// one open sell deal by a counterparty that `viewer` may join.
    ///
    /// Open deals lock funds: a sell creator's stake from creation, and
    /// every joiner's stake from joining. The seeded frozen amount covers
    /// the viewer's stakes in deals 1 and 2.
    #[must_use]
    pub fn new(viewer: UserId) -> Self {
        let deals = vec![
            Deal {
                id: DealId::Numeric(1),
                name: "Steam Gift Card $50".to_string(),
                deal_type: DealType::Sell,
                sum: Decimal::new(2500, 2),
                status: DealStatus::Waiting,
                creator_id: viewer,
                buyer_id: None,
                created_at: None,
                link: None,
            },
            Deal {
                id: DealId::Numeric(2),
                name: "PlayStation Store Gift Card".to_string(),
                deal_type: DealType::Buy,
                sum: Decimal::new(1500, 2),
                status: DealStatus::Joined,
                creator_id: DEMO_COUNTERPARTY,
                buyer_id: Some(viewer),
                created_at: None,
                link: None,
            },
            Deal {
                id: DealId::Numeric(3),
                name: "Telegram Premium 3 months".to_string(),
                deal_type: DealType::Sell,
                sum: Decimal::new(1000, 2),
                status: DealStatus::Waiting,
                creator_id: DEMO_COUNTERPARTY,
                buyer_id: None,
                created_at: None,
                link: None,
            },
        ];

        let history = vec![
            history_entry(
                HistoryKind::Topup,
                "Balance top-up",
                "TX: abc123...",
                Decimal::new(10000, 2),
            ),
            history_entry(
                HistoryKind::Deal,
                "Deal created",
                "Steam Gift Card $50",
                Decimal::new(-2500, 2),
            ),
            history_entry(
                HistoryKind::Commission,
                "Service commission",
                "For deal #1",
                Decimal::new(-125, 2),
            ),
        ];

        Self {
            ledger: Mutex::new(Ledger {
                viewer,
                balance: Decimal::new(15075, 2),
                frozen: Decimal::new(4000, 2),
                deals,
                history,
                next_deal_id: 4,
                pending_topup: false,
                pending_withdrawal: false,
            }),
        }
    }

    fn with_ledger<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> Result<R> {
        let mut ledger = self
            .ledger
            .lock()
            .map_err(|_| GarantError::Internal("demo ledger is poisoned".into()))?;
        Ok(f(&mut ledger))
    }
}

fn history_entry(
    kind: HistoryKind,
    title: &str,
    description: &str,
    amount: Decimal,
) -> HistoryEntry {
    HistoryEntry {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        amount,
        date: None,
        status: None,
    }
}

impl Ledger {
    fn owns(&self, user: UserId) -> bool {
        self.viewer == user
    }

    fn available(&self) -> Decimal {
        self.balance - self.frozen
    }

    fn visible_deals(&self, user: UserId) -> Vec<Deal> {
        self.deals
            .iter()
            .filter(|d| d.is_participant(user))
            .cloned()
            .collect()
    }

    fn topup(&mut self, request: &TopupRequest) -> Envelope<AckData> {
        if request.amount <= Decimal::ZERO || request.amount > DEMO_MAX_TOPUP {
            return Envelope::failed("Invalid amount");
        }
        if self.pending_topup {
            return Envelope::failed("A top-up request is already pending");
        }
        self.pending_topup = true;
        let mut entry = history_entry(
            HistoryKind::Topup,
            "Top-up request",
            &format!("TX: {}", request.tx_hash),
            request.amount,
        );
        entry.status = Some("pending".to_string());
        self.history.insert(0, entry);
        Envelope::ok(AckData::default()).with_message("Top-up request created")
    }

    fn withdraw(&mut self, request: &WithdrawRequest) -> Envelope<AckData> {
        if request.amount <= Decimal::ZERO {
            return Envelope::failed("Invalid amount");
        }
        if request.amount > self.available() {
            return Envelope::failed("Insufficient funds");
        }
        if self.pending_withdrawal {
            return Envelope::failed("A withdrawal request is already pending");
        }
        self.pending_withdrawal = true;
        let mut entry = history_entry(
            HistoryKind::Withdraw,
            "Withdrawal request",
            &format!("Address: {}", request.address),
            -request.amount,
        );
        entry.status = Some("pending".to_string());
        self.history.insert(0, entry);
        Envelope::ok(AckData::default()).with_message("Withdrawal request created")
    }

    fn create_deal(&mut self, request: &CreateDealRequest) -> Envelope<AckData> {
        if request.amount <= Decimal::ZERO || request.name.trim().is_empty() {
            return Envelope::failed("Missing required fields");
        }
        if request.deal_type == DealType::Sell {
            if request.amount > self.available() {
                return Envelope::failed("Insufficient funds to create the deal");
            }
            self.frozen += request.amount;
        }

        let id = DealId::Numeric(self.next_deal_id);
        self.next_deal_id += 1;
        self.deals.push(Deal {
            id: id.clone(),
            name: request.name.trim().to_string(),
            deal_type: request.deal_type,
            sum: request.amount,
            status: DealStatus::Waiting,
            creator_id: request.user_id,
            buyer_id: None,
            created_at: None,
            link: None,
        });

        Envelope::ok(AckData { deal_id: Some(id) }).with_message("Deal created successfully")
    }

    fn apply_action(&mut self, request: &DealActionRequest) -> Envelope<AckData> {
        let Some(index) = self.deals.iter().position(|d| d.id == request.deal_id) else {
            return Envelope::failed("Deal not found");
        };

        if let Err(rejection) = validate(&self.deals[index], request.action, request.user_id) {
            return Envelope::failed(rejection.to_string());
        }

        let (status, sum) = (self.deals[index].status, self.deals[index].sum);
        match request.action {
            DealAction::Join => {
                if self.owns(request.user_id) {
                    if sum > self.available() {
                        return Envelope::failed("Insufficient funds");
                    }
                    self.frozen += sum;
                }
                let deal = &mut self.deals[index];
                deal.buyer_id = Some(request.user_id);
                deal.status = DealStatus::Joined;
                Envelope::ok(AckData::default()).with_message("Joined the deal")
            }
            DealAction::Cancel => {
                let deal = &mut self.deals[index];
                deal.status = DealStatus::Cancelled;
                if deal.deal_type == DealType::Sell && self.viewer == deal.creator_id {
                    self.frozen -= sum;
                }
                Envelope::ok(AckData::default()).with_message("Deal cancelled")
            }
            DealAction::SendGift => {
                if status != DealStatus::Joined {
                    return Envelope::failed("Gift has already been sent");
                }
                self.deals[index].status = DealStatus::Frozen;
                Envelope::ok(AckData::default()).with_message("Gift marked as sent")
            }
            DealAction::Confirm => {
                if status != DealStatus::Frozen {
                    return Envelope::failed("Gift has not been sent yet");
                }
                self.deals[index].status = DealStatus::Completed;
                self.settle(index);
                Envelope::ok(AckData::default()).with_message("Deal completed")
            }
        }
    }

    /// Books a completed deal against the viewer: releases the viewer's
    /// stakes, charges the receiver and pays the deliverer less commission.
    fn settle(&mut self, index: usize) {
        let deal = self.deals[index].clone();
        let viewer = self.viewer;

        if deal.deal_type == DealType::Sell && deal.creator_id == viewer {
            self.frozen -= deal.sum;
        }
        if deal.buyer_id == Some(viewer) {
            self.frozen -= deal.sum;
        }

        if deal.receiver() == Some(viewer) {
            self.balance -= deal.sum;
            self.history.insert(
                0,
                history_entry(HistoryKind::Deal, "Deal payment", &deal.name, -deal.sum),
            );
        } else if deal.deliverer() == Some(viewer) {
            let commission = (deal.sum * DEMO_COMMISSION_RATE).round_dp(2);
            self.balance += deal.sum - commission;
            self.history.insert(
                0,
                history_entry(HistoryKind::Deal, "Deal completed", &deal.name, deal.sum),
            );
            self.history.insert(
                0,
                history_entry(
                    HistoryKind::Commission,
                    "Service commission",
                    &format!("For deal #{}", deal.id),
                    -commission,
                ),
            );
        }
    }
}

impl Authority for DemoAuthority {
    async fn fetch_user(&self, query: &UserQuery) -> Result<Envelope<BalanceSnapshot>> {
        self.with_ledger(|ledger| {
            if !ledger.owns(query.user_id) {
                return Envelope::ok(BalanceSnapshot::default());
            }
            Envelope::ok(BalanceSnapshot::new(ledger.balance, ledger.frozen))
        })
    }

    async fn fetch_deals(&self, query: &UserQuery) -> Result<Envelope<DealsData>> {
        self.with_ledger(|ledger| {
            Envelope::ok(DealsData {
                deals: ledger.visible_deals(query.user_id),
            })
        })
    }

    async fn fetch_history(&self, query: &UserQuery) -> Result<Envelope<HistoryData>> {
        self.with_ledger(|ledger| {
            let history = if ledger.owns(query.user_id) {
                ledger.history.clone()
            } else {
                Vec::new()
            };
            Envelope::ok(HistoryData { history })
        })
    }

    async fn submit_topup(&self, request: &TopupRequest) -> Result<Envelope<AckData>> {
        info!(amount = %request.amount, "Demo top-up");
        self.with_ledger(|ledger| ledger.topup(request))
    }

    async fn submit_withdraw(&self, request: &WithdrawRequest) -> Result<Envelope<AckData>> {
        info!(amount = %request.amount, "Demo withdrawal");
        self.with_ledger(|ledger| ledger.withdraw(request))
    }

    async fn submit_create_deal(&self, request: &CreateDealRequest) -> Result<Envelope<AckData>> {
        info!(deal_type = %request.deal_type, amount = %request.amount, "Demo deal creation");
        self.with_ledger(|ledger| ledger.create_deal(request))
    }

    async fn submit_deal_action(&self, request: &DealActionRequest) -> Result<Envelope<AckData>> {
        info!(deal_id = %request.deal_id, action = %request.action, "Demo deal action");
        self.with_ledger(|ledger| ledger.apply_action(request))
    }
}
