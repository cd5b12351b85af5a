//! Last-request-wins bookkeeping for fetches.
//!
//! Each resource has its own monotonic counter. A fetch takes a ticket
//! before it is sent and checks it when the reply arrives; if a newer
//! ticket was issued for the same resource in between, the reply is stale.

use std::sync::atomic::{AtomicU64, Ordering};

/// Resources fetched from the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Deals,
    History,
}

impl Resource {
    fn slot(self) -> usize {
        match self {
            Resource::User => 0,
            Resource::Deals => 1,
            Resource::History => 2,
        }
    }
}

/// Proof of issue order for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    resource: Resource,
    seq: u64,
}

impl Ticket {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Per-resource ticket counters.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: [AtomicU64; 3],
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket strictly newer than every earlier one for `resource`.
    pub fn issue(&self, resource: Resource) -> Ticket {
        let seq = self.latest[resource.slot()].fetch_add(1, Ordering::AcqRel) + 1;
        Ticket { resource, seq }
    }

    /// True while no newer ticket exists for the ticket's resource.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest[ticket.resource.slot()].load(Ordering::Acquire) == ticket.seq
    }
}
