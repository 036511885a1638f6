//! Debt simplification.
//!
//! Turns net balances into a short list of suggested transfers that settles
//! everyone up.

pub mod error;
pub mod simplifier;
pub mod types;

#[cfg(test)]
mod props;

pub use error::SettlementError;
pub use simplifier::DebtSimplifier;
pub use types::SimplifiedPayment;
