//! Settlement result types.

use divvy_shared::types::{Money, UserId};
use serde::Serialize;

/// A suggested settlement transfer. The amount is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimplifiedPayment {
    /// Debtor who sends the money.
    pub from: UserId,
    /// Creditor who receives it.
    pub to: UserId,
    /// Amount to transfer.
    pub amount: Money,
}
