//! Split error types.
//!
//! Every variant except `RemainderMismatch` is an input validation failure
//! raised before any amount is computed.

use divvy_shared::AppError;
use divvy_shared::types::{Currency, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::SplitPolicy;

/// Errors that can occur while splitting an expense.
#[derive(Debug, Error)]
pub enum SplitError {
    // ========== Participant Errors ==========
    /// No participants were supplied.
    #[error("At least one participant is required")]
    EmptyParticipants,

    /// The same participant appears more than once.
    #[error("Participant {0} appears more than once")]
    DuplicateParticipant(UserId),

    /// A participant is missing the value its policy requires.
    #[error("Participant {user_id} has no value for {policy} split")]
    MissingValue {
        /// The split policy.
        policy: SplitPolicy,
        /// The participant without a value.
        user_id: UserId,
    },

    /// A participant supplied a negative value.
    #[error("Participant {user_id} has negative value {value}")]
    NegativeValue {
        /// The participant.
        user_id: UserId,
        /// The offending value.
        value: Decimal,
    },

    // ========== Amount Errors ==========
    /// Expense total must be positive.
    #[error("Expense total must be positive, got {0}")]
    NonPositiveTotal(Decimal),

    /// Expense total carries more than two decimal places.
    #[error("Expense total {0} has more than two decimal places")]
    SubCentTotal(Decimal),

    /// A sum or product of the supplied values exceeds the decimal range.
    #[error("Split values are too large to compute")]
    AmountOverflow,

    /// Exact amounts do not add up to the total.
    #[error("sum of exact amounts {sum} does not match total {total}")]
    ExactSumMismatch {
        /// Sum of the supplied amounts.
        sum: Decimal,
        /// Expense total.
        total: Decimal,
    },

    /// Percentages do not add up to 100.
    #[error("percentages sum to {sum}, expected 100")]
    PercentageSumMismatch {
        /// Sum of the supplied percentages.
        sum: Decimal,
    },

    /// Share counts add up to zero.
    #[error("Total shares must be greater than zero")]
    ZeroShares,

    // ========== Payer Errors ==========
    /// No payers were supplied.
    #[error("At least one payer is required")]
    NoPayers,

    /// Amounts paid do not add up to the total.
    #[error("sum of amounts paid {paid} does not match total {total}")]
    PayerSumMismatch {
        /// Sum of the amounts paid.
        paid: Decimal,
        /// Expense total.
        total: Decimal,
    },

    /// A payer amount is in a different currency than the total.
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency of the expense total.
        expected: Currency,
        /// Currency of the payer amount.
        found: Currency,
    },

    // ========== Policy Errors ==========
    /// Policy name is not recognised.
    #[error("Unknown split policy: {0}")]
    UnknownPolicy(String),

    // ========== Internal Errors ==========
    /// Remainder absorption failed to reproduce the total.
    #[error("{policy} split sums to {sum}, expected {total}")]
    RemainderMismatch {
        /// The split policy.
        policy: SplitPolicy,
        /// Sum of the computed amounts.
        sum: Decimal,
        /// Expense total.
        total: Decimal,
    },
}

impl SplitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyParticipants => "EMPTY_PARTICIPANTS",
            Self::DuplicateParticipant(_) => "DUPLICATE_PARTICIPANT",
            Self::MissingValue { .. } => "MISSING_SPLIT_VALUE",
            Self::NegativeValue { .. } => "NEGATIVE_SPLIT_VALUE",
            Self::NonPositiveTotal(_) => "NON_POSITIVE_TOTAL",
            Self::SubCentTotal(_) => "SUB_CENT_TOTAL",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::ExactSumMismatch { .. } => "EXACT_SUM_MISMATCH",
            Self::PercentageSumMismatch { .. } => "PERCENTAGE_SUM_MISMATCH",
            Self::ZeroShares => "ZERO_SHARES",
            Self::NoPayers => "NO_PAYERS",
            Self::PayerSumMismatch { .. } => "PAYER_SUM_MISMATCH",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::UnknownPolicy(_) => "UNKNOWN_SPLIT_POLICY",
            Self::RemainderMismatch { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::RemainderMismatch { .. } => 500,
            _ => 400,
        }
    }
}

impl From<SplitError> for AppError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::RemainderMismatch { .. } => Self::Internal(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages_name_the_input() {
        let err = SplitError::ExactSumMismatch {
            sum: dec!(50.01),
            total: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "sum of exact amounts 50.01 does not match total 50.00"
        );

        let err = SplitError::PercentageSumMismatch { sum: dec!(100.1) };
        assert_eq!(err.to_string(), "percentages sum to 100.1, expected 100");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SplitError::EmptyParticipants.error_code(), "EMPTY_PARTICIPANTS");
        assert_eq!(SplitError::ZeroShares.error_code(), "ZERO_SHARES");
        assert_eq!(SplitError::AmountOverflow.error_code(), "AMOUNT_OVERFLOW");
        assert_eq!(
            SplitError::UnknownPolicy("X".into()).error_code(),
            "UNKNOWN_SPLIT_POLICY"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(SplitError::ZeroShares.http_status_code(), 400);
        assert_eq!(SplitError::AmountOverflow.http_status_code(), 400);
        assert_eq!(SplitError::SubCentTotal(dec!(10.005)).http_status_code(), 400);
        assert_eq!(
            SplitError::RemainderMismatch {
                policy: SplitPolicy::Share,
                sum: dec!(1),
                total: dec!(2),
            }
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = SplitError::NoPayers.into();
        assert!(matches!(app, AppError::Validation(ref msg) if msg == "At least one payer is required"));
        assert_eq!(app.status_code(), 400);
    }
}
