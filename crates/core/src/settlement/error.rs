//! Settlement error types.

use divvy_shared::AppError;
use divvy_shared::types::{Currency, MoneyError};
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors that can occur while computing a settlement.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Balances or payments carry different currencies.
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency of the first balance.
        expected: Currency,
        /// Currency of the offending amount.
        found: Currency,
    },

    /// The group could not be loaded.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl SettlementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::Ledger(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::CurrencyMismatch { .. } => 400,
            Self::Ledger(err) => err.http_status_code(),
        }
    }
}

impl From<MoneyError> for SettlementError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::CurrencyMismatch { expected, found } => {
                Self::CurrencyMismatch { expected, found }
            }
        }
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::Ledger(inner) => inner.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}
