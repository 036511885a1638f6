//! Expense split calculation.
//!
//! Divides an expense total among participants under one of four policies:
//!
//! - EQUAL: everyone owes the same truncated amount
//! - EXACT: participants supply the amounts they owe
//! - PERCENTAGE: participants supply percentages summing to 100
//! - SHARE: participants supply share counts
//!
//! Participants are ordered by ascending id and the last one absorbs the
//! rounding remainder, so the owed amounts always sum to the total exactly.

pub mod calculator;
pub mod error;
pub mod types;

#[cfg(test)]
mod props;

pub use calculator::SplitCalculator;
pub use error::SplitError;
pub use types::{SplitParticipant, SplitPolicy};
