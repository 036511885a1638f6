//! Expense and payment records.
//!
//! Records are immutable values handed to the core by the persistence layer.
//! They are validated once, on construction or when a snapshot is built.

use std::collections::BTreeSet;

use divvy_shared::types::{
    Currency, ExpenseId, GroupId, Money, PaymentId, UserId, is_negligible,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use crate::split::SplitPolicy;

/// Amount one participant paid towards an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerShare {
    /// The payer.
    pub user_id: UserId,
    /// Amount paid.
    pub amount_paid: Money,
}

/// Amount one participant owes for an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwedShare {
    /// The participant.
    pub user_id: UserId,
    /// Amount owed.
    pub amount_owed: Money,
}

/// A shared expense with its payers and owed amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Expense ID.
    pub id: ExpenseId,
    /// Owning group, `None` for a direct expense between friends.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Expense total.
    pub total: Money,
    /// Policy the owed amounts were computed with.
    pub policy: SplitPolicy,
    /// Who paid, and how much.
    pub payers: Vec<PayerShare>,
    /// Who owes, and how much.
    pub owed: Vec<OwedShare>,
}

impl ExpenseRecord {
    /// Creates a validated expense record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the record violates an expense invariant.
    pub fn new(
        id: ExpenseId,
        group_id: Option<GroupId>,
        total: Money,
        policy: SplitPolicy,
        payers: Vec<PayerShare>,
        owed: Vec<OwedShare>,
    ) -> Result<Self, LedgerError> {
        let record = Self {
            id,
            group_id,
            total,
            policy,
            payers,
            owed,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks the expense invariants.
    ///
    /// - total is positive
    /// - payers and owed shares are non-empty and non-negative
    /// - every amount is in the currency of the total
    /// - amounts paid sum to the total exactly
    /// - amounts owed sum to the total, exactly for EXACT and within the
    ///   rounding tolerance otherwise
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`LedgerError`].
    pub fn validate(&self) -> Result<(), LedgerError> {
        let total = self.total.amount;
        if total <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(total));
        }
        if self.payers.is_empty() {
            return Err(LedgerError::EmptyPayers);
        }
        if self.owed.is_empty() {
            return Err(LedgerError::EmptyParticipants);
        }

        let shares = self
            .payers
            .iter()
            .map(|p| (p.user_id, p.amount_paid))
            .chain(self.owed.iter().map(|o| (o.user_id, o.amount_owed)));
        for (user_id, amount) in shares {
            if amount.currency != self.total.currency {
                return Err(LedgerError::CurrencyMismatch {
                    expected: self.total.currency,
                    found: amount.currency,
                });
            }
            if amount.is_negative() {
                return Err(LedgerError::NegativeShare {
                    user_id,
                    amount: amount.amount,
                });
            }
        }

        let paid: Decimal = self.payers.iter().map(|p| p.amount_paid.amount).sum();
        if paid != total {
            return Err(LedgerError::PaidSumMismatch { paid, total });
        }

        let owed: Decimal = self.owed.iter().map(|o| o.amount_owed.amount).sum();
        let owed_matches = match self.policy {
            SplitPolicy::Exact => owed == total,
            _ => is_negligible(owed - total),
        };
        if !owed_matches {
            return Err(LedgerError::OwedSumMismatch { owed, total });
        }

        Ok(())
    }

    /// Currency of the expense.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.total.currency
    }

    /// Everyone who paid or owes, in ascending id order.
    #[must_use]
    pub fn participants(&self) -> BTreeSet<UserId> {
        self.payers
            .iter()
            .map(|p| p.user_id)
            .chain(self.owed.iter().map(|o| o.user_id))
            .collect()
    }
}

/// A direct settlement payment from one participant to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment ID.
    pub id: PaymentId,
    /// Owning group, `None` for a direct payment between friends.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Who sent the money.
    pub payer: UserId,
    /// Who received the money.
    pub payee: UserId,
    /// Amount sent.
    pub amount: Money,
}

impl PaymentRecord {
    /// Creates a validated payment record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the amount is not positive or the payer
    /// pays themselves.
    pub fn new(
        id: PaymentId,
        group_id: Option<GroupId>,
        payer: UserId,
        payee: UserId,
        amount: Money,
    ) -> Result<Self, LedgerError> {
        let record = Self {
            id,
            group_id,
            payer,
            payee,
            amount,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks the payment invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the amount is not positive or the payer
    /// pays themselves.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount(self.amount.amount));
        }
        if self.payer == self.payee {
            return Err(LedgerError::SelfPayment(self.payer));
        }
        Ok(())
    }

    /// Currency of the payment.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.amount.currency
    }
}
