//! Review module: verdict classification and the bounded review gate
//!
//! The reviewer's free-text reply is classified into a [`ReviewVerdict`] by a
//! [`VerdictPolicy`]; the [`ReviewGate`] alternates review and revision until
//! a review passes or the revision budget runs out.

pub mod gate;
pub mod verdict;

pub use gate::{GateEvent, GateOutcome, ReviewGate, Reviewer, Reviser};
pub use verdict::{ReviewOutcome, ReviewVerdict, VerdictPolicy};
