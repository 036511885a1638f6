//! Ledger error types for record validation and snapshot loading.

use divvy_shared::AppError;
use divvy_shared::types::{Currency, GroupId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while validating records or loading a snapshot.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Record Validation Errors ==========
    /// Expense has no payers.
    #[error("Expense must have at least one payer")]
    EmptyPayers,

    /// Expense has no owing participants.
    #[error("Expense must have at least one participant")]
    EmptyParticipants,

    /// Expense total or payment amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// A paid or owed share is negative.
    #[error("Share of {user_id} cannot be negative, got {amount}")]
    NegativeShare {
        /// The participant.
        user_id: UserId,
        /// The offending amount.
        amount: Decimal,
    },

    /// Amounts paid do not add up to the expense total.
    #[error("sum of amounts paid {paid} does not match total {total}")]
    PaidSumMismatch {
        /// Sum of the amounts paid.
        paid: Decimal,
        /// Expense total.
        total: Decimal,
    },

    /// Amounts owed do not add up to the expense total.
    #[error("sum of amounts owed {owed} does not match total {total}")]
    OwedSumMismatch {
        /// Sum of the amounts owed.
        owed: Decimal,
        /// Expense total.
        total: Decimal,
    },

    /// Payment from a participant to themselves.
    #[error("Payer and payee cannot be the same participant: {0}")]
    SelfPayment(UserId),

    // ========== Scope Errors ==========
    /// Records of one computation carry different currencies.
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency of the computation.
        expected: Currency,
        /// Currency of the offending record.
        found: Currency,
    },

    /// A record does not belong to the group being loaded.
    #[error("Record belongs to group {found:?}, expected {expected}")]
    GroupMismatch {
        /// Group being loaded.
        expected: GroupId,
        /// Group of the offending record.
        found: Option<GroupId>,
    },

    // ========== Collaborator Errors ==========
    /// The record source failed.
    #[error(transparent)]
    Source(#[from] AppError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPayers => "EMPTY_PAYERS",
            Self::EmptyParticipants => "EMPTY_PARTICIPANTS",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::NegativeShare { .. } => "NEGATIVE_SHARE",
            Self::PaidSumMismatch { .. } => "PAID_SUM_MISMATCH",
            Self::OwedSumMismatch { .. } => "OWED_SUM_MISMATCH",
            Self::SelfPayment(_) => "SELF_PAYMENT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::GroupMismatch { .. } => "GROUP_MISMATCH",
            Self::Source(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Source(err) => err.status_code(),
            _ => 400,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Source(inner) => inner,
            other => Self::Validation(other.to_string()),
        }
    }
}
