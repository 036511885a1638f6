//! Balance result types.

use std::collections::BTreeMap;

use divvy_shared::types::{Currency, Money, UserId};
use serde::Serialize;

/// Signed position of every participant in one scope.
///
/// Positive: the participant is owed money. Negative: the participant owes.
pub type NetBalances = BTreeMap<UserId, Money>;

/// Balance between an observer and one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeerBalance {
    /// The other participant.
    pub peer: UserId,
    /// Positive: the peer owes the observer. Negative: the observer owes the peer.
    pub balance: Money,
}

/// Totals across every group an observer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverallSummary {
    /// Sum of everything peers owe the observer.
    pub owed_to_observer: Money,
    /// Sum of everything the observer owes peers.
    pub owed_by_observer: Money,
    /// Currency of both totals.
    pub currency: Currency,
}

impl OverallSummary {
    /// Net position: owed to the observer minus owed by the observer.
    #[must_use]
    pub fn net(&self) -> Money {
        Money::new(
            self.owed_to_observer.amount - self.owed_by_observer.amount,
            self.currency,
        )
    }
}
