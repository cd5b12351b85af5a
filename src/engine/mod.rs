//! Deal lifecycle engine.
//!
//! Pure, synchronous decision logic re-run on every render pass against the
//! latest authority snapshot:
//!
//! - [`eligibility`]: which actions a viewer may attempt on a deal
//! - [`transition`]: pre-flight check of a single action, with a status hint
//! - [`projection`]: balance aggregates and history display rows
//!
//! Nothing here performs I/O or holds state between calls.

pub mod eligibility;
pub mod projection;
pub mod transition;

pub use eligibility::{ActionSet, eligible_actions, is_eligible};
pub use projection::{
    BalanceProjection, BalanceWarning, HistoryDisplay, HistoryFilter, IconCategory, Polarity,
    filter_history, format_amount, parse_amount, project_balance, project_history_display,
};
pub use transition::{Rejection, StatusHint, validate};
