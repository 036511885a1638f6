//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` and is always held at a scale of
//! two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places every monetary amount is stored with.
pub const MONETARY_SCALE: u32 = 2;

/// Number of decimal places intermediate split calculations are carried at.
pub const CALCULATION_SCALE: u32 = 10;

/// Residual amounts strictly below this magnitude are treated as zero.
pub const ZERO_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
/// Deserialization goes through [`Money::new`], so decoded amounts are
/// rounded half-up to two decimals as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawMoney")]
pub struct Money {
    /// The amount, always at [`MONETARY_SCALE`] decimal places.
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD", "EUR").
    pub currency: Currency,
}

/// Wire form of [`Money`] before the scale is pinned.
#[derive(Deserialize)]
struct RawMoney {
    amount: Decimal,
    currency: Currency,
}

impl From<RawMoney> for Money {
    fn from(raw: RawMoney) -> Self {
        Self::new(raw.amount, raw.currency)
    }
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Pound Sterling
    Gbp,
    /// Indian Rupee
    Inr,
    /// Canadian Dollar
    Cad,
    /// Australian Dollar
    Aud,
    /// Singapore Dollar
    Sgd,
}

/// Errors raised by arithmetic between two [`Money`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The operands carry different currencies.
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency of the left-hand operand.
        expected: Currency,
        /// Currency of the right-hand operand.
        found: Currency,
    },
}

impl Money {
    /// Creates a new Money instance, rounding half-up to two decimals.
    #[must_use]
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: round_half_up(amount),
            currency,
        }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns true if the amount is below the rounding tolerance.
    #[must_use]
    pub fn is_negligible(&self) -> bool {
        is_negligible(self.amount)
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self::new(self.amount.abs(), self.currency)
    }

    /// Returns the amount with its sign flipped.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self::new(-self.amount, self.currency)
    }

    /// Adds two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] if the currencies differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Subtracts `other` from `self`; both must share a currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] if the currencies differ.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    fn ensure_same_currency(&self, other: &Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                expected: self.currency,
                found: other.currency,
            })
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Rounds to two decimals, midpoints away from zero, and pins the scale to two.
#[must_use]
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONETARY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONETARY_SCALE);
    rounded
}

/// Truncates toward zero at two decimals.
#[must_use]
pub fn truncate(value: Decimal) -> Decimal {
    let mut truncated = value.round_dp_with_strategy(MONETARY_SCALE, RoundingStrategy::ToZero);
    truncated.rescale(MONETARY_SCALE);
    truncated
}

/// Returns true when `|value|` is strictly below [`ZERO_THRESHOLD`].
#[must_use]
pub fn is_negligible(value: Decimal) -> bool {
    value.abs() < ZERO_THRESHOLD
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Gbp => write!(f, "GBP"),
            Self::Inr => write!(f, "INR"),
            Self::Cad => write!(f, "CAD"),
            Self::Aud => write!(f, "AUD"),
            Self::Sgd => write!(f, "SGD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "INR" => Ok(Self::Inr),
            "CAD" => Ok(Self::Cad),
            "AUD" => Ok(Self::Aud),
            "SGD" => Ok(Self::Sgd),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
