//! Lifecycle engine properties.

mod common;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use garant::engine::{
    HistoryFilter, IconCategory, Polarity, Rejection, StatusHint, eligible_actions,
    filter_history, format_amount, parse_amount, project_balance, project_history_display,
    validate,
};
use garant::models::{
    BalanceSnapshot, Deal, DealAction, DealStatus, DealType, Envelope, HistoryData, HistoryKind,
    UserId,
};

use common::{HISTORY_JSON, OTHER, VIEWER, deal};

fn status() -> impl Strategy<Value = DealStatus> {
    prop_oneof![
        Just(DealStatus::Waiting),
        Just(DealStatus::Joined),
        Just(DealStatus::Frozen),
        Just(DealStatus::Completed),
        Just(DealStatus::Cancelled),
        Just(DealStatus::Unknown),
    ]
}

fn deal_type() -> impl Strategy<Value = DealType> {
    prop_oneof![Just(DealType::Sell), Just(DealType::Buy), Just(DealType::Unknown)]
}

fn action() -> impl Strategy<Value = DealAction> {
    prop_oneof![
        Just(DealAction::Cancel),
        Just(DealAction::Join),
        Just(DealAction::SendGift),
        Just(DealAction::Confirm),
    ]
}

/// Deals among three users so viewers collide with participants often.
fn any_deal() -> impl Strategy<Value = Deal> {
    (deal_type(), status(), 1i64..4, proptest::option::of(1i64..4)).prop_map(
        |(deal_type, status, creator, buyer)| {
            deal(deal_type, status, UserId(creator), buyer.map(UserId))
        },
    )
}

proptest! {
    #[test]
    fn waiting_deal_offers_exactly_one_action(
        deal_type in deal_type(),
        creator in 1i64..4,
        viewer in 1i64..4,
    ) {
        let d = deal(deal_type, DealStatus::Waiting, UserId(creator), None);
        let actions = eligible_actions(&d, UserId(viewer));
        prop_assert_eq!(actions.len(), 1);
        if creator == viewer {
            prop_assert!(actions.contains(&DealAction::Cancel));
        } else {
            prop_assert!(actions.contains(&DealAction::Join));
        }
    }

    #[test]
    fn terminal_deal_offers_nothing(
        d in any_deal().prop_filter("terminal", |d| d.status.is_terminal()),
        viewer in 1i64..4,
    ) {
        prop_assert!(eligible_actions(&d, UserId(viewer)).is_empty());
    }

    #[test]
    fn send_gift_and_confirm_never_together(d in any_deal(), viewer in 1i64..4) {
        let actions = eligible_actions(&d, UserId(viewer));
        prop_assert!(
            !(actions.contains(&DealAction::SendGift) && actions.contains(&DealAction::Confirm))
        );
    }

    #[test]
    fn terminal_is_checked_first(
        d in any_deal().prop_filter("terminal", |d| d.status.is_terminal()),
        action in action(),
        actor in 1i64..4,
    ) {
        let rejection = validate(&d, action, UserId(actor)).unwrap_err();
        prop_assert_eq!(rejection.reason(), "terminal");
    }

    #[test]
    fn validate_agrees_with_eligibility(d in any_deal(), action in action(), actor in 1i64..4) {
        let eligible = eligible_actions(&d, UserId(actor)).contains(&action);
        match validate(&d, action, UserId(actor)) {
            Ok(_) => prop_assert!(eligible),
            Err(Rejection::NotPermitted { .. }) => prop_assert!(!eligible),
            Err(Rejection::Terminal { .. }) => prop_assert!(d.status.is_terminal()),
        }
    }

    #[test]
    fn format_then_parse_is_within_a_cent(cents in -10_000_000i64..10_000_000, extra in 0u32..100) {
        // up to four decimals so rounding is exercised
        let amount = Decimal::new(cents * 100 + i64::from(extra), 4);
        let parsed = parse_amount(&format_amount(amount)).unwrap();
        prop_assert!((parsed - amount).abs() <= dec!(0.01));
    }
}

#[test]
fn sell_joined_deliverer_and_receiver() {
    let d = deal(DealType::Sell, DealStatus::Joined, VIEWER, Some(OTHER));

    let creator = eligible_actions(&d, VIEWER);
    assert!(creator.contains(&DealAction::SendGift));
    assert!(!creator.contains(&DealAction::Confirm));

    let buyer = eligible_actions(&d, OTHER);
    assert!(buyer.contains(&DealAction::Confirm));
    assert!(!buyer.contains(&DealAction::SendGift));
}

#[test]
fn buy_joined_scenario() {
    let a = UserId(1);
    let b = UserId(2);
    let d = deal(DealType::Buy, DealStatus::Joined, a, Some(b));

    assert_eq!(
        eligible_actions(&d, a).into_iter().collect::<Vec<_>>(),
        vec![DealAction::Confirm]
    );
    assert_eq!(
        eligible_actions(&d, b).into_iter().collect::<Vec<_>>(),
        vec![DealAction::SendGift]
    );
}

#[test]
fn cancel_by_creator_only() {
    let d = deal(DealType::Sell, DealStatus::Waiting, VIEWER, None);
    assert_eq!(
        validate(&d, DealAction::Cancel, VIEWER),
        Ok(StatusHint::Definite(DealStatus::Cancelled))
    );

    let rejection = validate(&d, DealAction::Cancel, OTHER).unwrap_err();
    assert_eq!(rejection.reason(), "not-permitted");
}

#[test]
fn join_hints_joined() {
    let d = deal(DealType::Buy, DealStatus::Waiting, VIEWER, None);
    assert_eq!(
        validate(&d, DealAction::Join, OTHER),
        Ok(StatusHint::Definite(DealStatus::Joined))
    );
}

#[test]
fn delivery_outcome_is_left_to_authority() {
    let d = deal(DealType::Sell, DealStatus::Joined, VIEWER, Some(OTHER));
    assert_eq!(
        validate(&d, DealAction::SendGift, VIEWER),
        Ok(StatusHint::AuthorityDetermined(vec![DealStatus::Frozen]))
    );
}

#[test]
fn any_action_on_cancelled_is_terminal() {
    let d = deal(DealType::Buy, DealStatus::Cancelled, VIEWER, Some(OTHER));
    for action in DealAction::ALL {
        for actor in [VIEWER, OTHER, UserId(9)] {
            assert_eq!(validate(&d, action, actor).unwrap_err().reason(), "terminal");
        }
    }
}

#[test]
fn balance_projection() {
    let projection = project_balance(&BalanceSnapshot::new(dec!(150.75), dec!(25.00)));
    assert_eq!(projection.available, dec!(125.75));
    assert_eq!(projection.total, dec!(150.75));
    assert!(projection.is_consistent());
}

#[test]
fn overdrawn_balance_is_reported_not_clamped() {
    let projection = project_balance(&BalanceSnapshot::new(dec!(10), dec!(12.5)));
    assert_eq!(projection.available, dec!(-2.5));
    assert!(!projection.is_consistent());
}

#[test]
fn fixture_history_display_and_filter() {
    let envelope: Envelope<HistoryData> = serde_json::from_str(HISTORY_JSON).unwrap();
    let history = envelope.data.unwrap().history;

    let rows: Vec<_> = history.iter().map(project_history_display).collect();
    assert_eq!(rows[0].category, IconCategory::Withdraw);
    assert_eq!(rows[0].polarity, Polarity::Debit);
    assert_eq!(rows[0].formatted_amount, "-10.00");
    assert_eq!(rows[1].formatted_amount, "+100.00");
    assert_eq!(rows[2].formatted_amount, "+47.50");
    assert_eq!(rows[3].category, IconCategory::Commission);

    let commissions = filter_history(&history, HistoryFilter::Only(HistoryKind::Commission));
    assert_eq!(commissions.len(), 1);
    assert_eq!(commissions[0].amount, dec!(-1.25));
    assert_eq!(filter_history(&history, HistoryFilter::All).len(), 4);
}
