//! Domain types for split calculation.

use divvy_shared::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::SplitError;

/// How an expense total is divided among its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitPolicy {
    /// Everyone owes the same amount; one participant absorbs the remainder.
    Equal,
    /// Each participant supplies the exact amount they owe.
    Exact,
    /// Each participant supplies a percentage of the total.
    Percentage,
    /// Each participant supplies a share count.
    Share,
}

impl SplitPolicy {
    /// Returns true if participants must supply a value under this policy.
    #[must_use]
    pub const fn requires_values(self) -> bool {
        !matches!(self, Self::Equal)
    }
}

impl std::fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equal => write!(f, "EQUAL"),
            Self::Exact => write!(f, "EXACT"),
            Self::Percentage => write!(f, "PERCENTAGE"),
            Self::Share => write!(f, "SHARE"),
        }
    }
}

impl std::str::FromStr for SplitPolicy {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EQUAL" => Ok(Self::Equal),
            "EXACT" => Ok(Self::Exact),
            "PERCENTAGE" => Ok(Self::Percentage),
            "SHARE" => Ok(Self::Share),
            _ => Err(SplitError::UnknownPolicy(s.to_string())),
        }
    }
}

/// One participant of a split request.
///
/// `value` is an amount for EXACT, a percentage for PERCENTAGE, a share
/// count for SHARE, and ignored for EQUAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitParticipant {
    /// The participant.
    pub user_id: UserId,
    /// Policy-specific input value.
    #[serde(default)]
    pub value: Option<Decimal>,
}

impl SplitParticipant {
    /// A participant of an EQUAL split.
    #[must_use]
    pub const fn equal(user_id: UserId) -> Self {
        Self {
            user_id,
            value: None,
        }
    }

    /// A participant with a policy-specific value.
    #[must_use]
    pub const fn with_value(user_id: UserId, value: Decimal) -> Self {
        Self {
            user_id,
            value: Some(value),
        }
    }
}
