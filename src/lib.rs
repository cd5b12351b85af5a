//! Client for an escrow deal desk.
//!
//! Provides the deal lifecycle engine (action eligibility, transition
//! pre-validation, balance and history projection), a pre-flight guard
//! for submissions, and async clients for the remote escrow authority.

pub mod authority;
pub mod config;
pub mod desk;
pub mod engine;
pub mod error;
pub mod guard;
pub mod models;

pub use error::{GarantError, Result, ValidationError};
