//! Balance aggregation.
//!
//! Turns a group's expenses and payments into:
//! - Pairwise balances between an observer and each peer
//! - Each participant's net position within the group
//! - An overall summary across every group an observer belongs to

pub mod aggregator;
pub mod types;

#[cfg(test)]
mod props;

pub use aggregator::{BalanceAggregator, Contributions};
pub use types::{NetBalances, OverallSummary, PeerBalance};
