//! Action eligibility: `(deal, viewer) → set of permitted actions`.

use std::collections::BTreeSet;

use crate::models::{Deal, DealAction, DealStatus, UserId};

/// Actions a viewer may currently attempt, in wire order.
pub type ActionSet = BTreeSet<DealAction>;

/// Returns every action `viewer` may attempt on `deal`.
///
/// - `cancel`: waiting deal, viewer is the creator
/// - `join`: waiting deal, viewer is anyone else
/// - `send-gift`: joined or frozen deal, viewer must deliver the item
/// - `confirm`: joined or frozen deal, viewer must accept delivery
///
/// Terminal and unknown statuses, and unknown deal types once past
/// `waiting`, yield the empty set. Never panics.
pub fn eligible_actions(deal: &Deal, viewer: UserId) -> ActionSet {
    let mut actions = ActionSet::new();

    match deal.status {
        DealStatus::Waiting => {
            if deal.creator_id == viewer {
                actions.insert(DealAction::Cancel);
            } else {
                actions.insert(DealAction::Join);
            }
        }
        DealStatus::Joined | DealStatus::Frozen => {
            // A viewer is either the deliverer or the receiver, never both.
            let obligation = if deal.deliverer() == Some(viewer) {
                Some(DealAction::SendGift)
            } else if deal.receiver() == Some(viewer) {
                Some(DealAction::Confirm)
            } else {
                None
            };
            actions.extend(obligation);
        }
        DealStatus::Completed | DealStatus::Cancelled | DealStatus::Unknown => {}
    }

    actions
}

/// Whether `action` is currently available to `viewer`.
pub fn is_eligible(deal: &Deal, action: DealAction, viewer: UserId) -> bool {
    eligible_actions(deal, viewer).contains(&action)
}
