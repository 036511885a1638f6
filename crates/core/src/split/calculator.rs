//! Split calculation with last-participant remainder absorption.
//!
//! Participants are always processed in ascending id order. Every participant
//! but the last is rounded to two decimals; the last one receives
//! `total - sum(others)`, so the owed amounts add up to the total exactly.

use std::collections::BTreeSet;

use divvy_shared::types::{
    CALCULATION_SCALE, ExpenseId, GroupId, Money, UserId, is_negligible, round_half_up, truncate,
};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use super::error::SplitError;
use super::types::{SplitParticipant, SplitPolicy};
use crate::ledger::{ExpenseRecord, OwedShare, PayerShare};

/// Split calculator.
///
/// Pure and stateless: the same input always yields the same output.
pub struct SplitCalculator;

impl SplitCalculator {
    /// Divide `total` among `participants` according to `policy`.
    ///
    /// # Returns
    ///
    /// One [`OwedShare`] per participant, in ascending participant id order,
    /// whose amounts sum to `total` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError`] if the input is malformed or inconsistent.
    /// Nothing is computed when validation fails.
    ///
    /// # Example
    ///
    /// ```
    /// use divvy_core::split::{SplitCalculator, SplitParticipant, SplitPolicy};
    /// use divvy_shared::types::{Currency, Money, UserId};
    /// use rust_decimal_macros::dec;
    ///
    /// let total = Money::new(dec!(10.01), Currency::Usd);
    /// let participants = [
    ///     SplitParticipant::equal(UserId::new()),
    ///     SplitParticipant::equal(UserId::new()),
    /// ];
    /// let owed = SplitCalculator::compute_split(total, SplitPolicy::Equal, &participants).unwrap();
    /// let sum: rust_decimal::Decimal = owed.iter().map(|s| s.amount_owed.amount).sum();
    /// assert_eq!(sum, dec!(10.01));
    /// ```
    pub fn compute_split(
        total: Money,
        policy: SplitPolicy,
        participants: &[SplitParticipant],
    ) -> Result<Vec<OwedShare>, SplitError> {
        let ordered = Self::validate(total, policy, participants)?;

        let amounts = match policy {
            SplitPolicy::Equal => Self::split_equal(total.amount, ordered.len()),
            SplitPolicy::Exact => Self::split_exact(total.amount, &ordered)?,
            SplitPolicy::Percentage => Self::split_percentage(total.amount, &ordered)?,
            SplitPolicy::Share => Self::split_share(total.amount, &ordered)?,
        };

        let sum: Decimal = amounts.iter().copied().sum();
        if sum != total.amount {
            return Err(SplitError::RemainderMismatch {
                policy,
                sum,
                total: total.amount,
            });
        }

        let owed: Vec<OwedShare> = ordered
            .iter()
            .zip(amounts)
            .map(|((user_id, _), amount)| OwedShare {
                user_id: *user_id,
                amount_owed: Money::new(amount, total.currency),
            })
            .collect();

        debug!(%policy, total = %total, participants = owed.len(), "computed split");
        Ok(owed)
    }

    /// Validate that `payers` cover `total` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError`] if there are no payers, a payer amount is not
    /// positive or in another currency, or the amounts paid do not sum to
    /// the total at two decimals.
    pub fn validate_payers(total: Money, payers: &[PayerShare]) -> Result<(), SplitError> {
        if payers.is_empty() {
            return Err(SplitError::NoPayers);
        }

        let mut seen = BTreeSet::new();
        let mut paid = Decimal::ZERO;
        for payer in payers {
            if !seen.insert(payer.user_id) {
                return Err(SplitError::DuplicateParticipant(payer.user_id));
            }
            if payer.amount_paid.currency != total.currency {
                return Err(SplitError::CurrencyMismatch {
                    expected: total.currency,
                    found: payer.amount_paid.currency,
                });
            }
            if payer.amount_paid.amount < Decimal::ZERO {
                return Err(SplitError::NegativeValue {
                    user_id: payer.user_id,
                    value: payer.amount_paid.amount,
                });
            }
            paid = paid
                .checked_add(payer.amount_paid.amount)
                .ok_or(SplitError::AmountOverflow)?;
        }

        let paid = round_half_up(paid);
        if paid != total.amount {
            return Err(SplitError::PayerSumMismatch {
                paid,
                total: total.amount,
            });
        }
        Ok(())
    }

    /// Build a validated expense record at creation or edit time.
    ///
    /// Validates the payers, then computes the owed amounts with
    /// [`Self::compute_split`].
    ///
    /// # Errors
    ///
    /// Returns [`SplitError`] if either the payers or the split are invalid.
    pub fn build_expense(
        id: ExpenseId,
        group_id: Option<GroupId>,
        total: Money,
        policy: SplitPolicy,
        payers: Vec<PayerShare>,
        participants: &[SplitParticipant],
    ) -> Result<ExpenseRecord, SplitError> {
        Self::validate_payers(total, &payers)?;
        let owed = Self::compute_split(total, policy, participants)?;

        Ok(ExpenseRecord {
            id,
            group_id,
            total,
            policy,
            payers,
            owed,
        })
    }

    /// Validate the request and return participants sorted by id.
    ///
    /// Values are defaulted to zero for EQUAL, where they are ignored.
    fn validate(
        total: Money,
        policy: SplitPolicy,
        participants: &[SplitParticipant],
    ) -> Result<Vec<(UserId, Decimal)>, SplitError> {
        if total.amount <= Decimal::ZERO {
            return Err(SplitError::NonPositiveTotal(total.amount));
        }
        if round_half_up(total.amount) != total.amount {
            return Err(SplitError::SubCentTotal(total.amount));
        }
        if participants.is_empty() {
            return Err(SplitError::EmptyParticipants);
        }

        let mut seen = BTreeSet::new();
        let mut ordered = Vec::with_capacity(participants.len());
        for participant in participants {
            if !seen.insert(participant.user_id) {
                return Err(SplitError::DuplicateParticipant(participant.user_id));
            }

            let value = match (policy.requires_values(), participant.value) {
                (false, _) => Decimal::ZERO,
                (true, Some(value)) => value,
                (true, None) => {
                    return Err(SplitError::MissingValue {
                        policy,
                        user_id: participant.user_id,
                    });
                }
            };
            if value < Decimal::ZERO {
                return Err(SplitError::NegativeValue {
                    user_id: participant.user_id,
                    value,
                });
            }
            ordered.push((participant.user_id, value));
        }

        ordered.sort_by_key(|(user_id, _)| *user_id);
        Ok(ordered)
    }

    /// Everyone gets `truncate(total / n)`; the last participant takes the rest.
    fn split_equal(total: Decimal, count: usize) -> Vec<Decimal> {
        let base = truncate(total / Decimal::from(count));
        let others = base * Decimal::from(count - 1);

        let mut amounts = vec![base; count - 1];
        amounts.push(round_half_up(total - others));
        amounts
    }

    fn split_exact(total: Decimal, ordered: &[(UserId, Decimal)]) -> Result<Vec<Decimal>, SplitError> {
        let sum = round_half_up(checked_sum(ordered.iter().map(|(_, value)| *value))?);
        if sum != total {
            return Err(SplitError::ExactSumMismatch { sum, total });
        }

        // Amounts given with more than two decimals can drift by rounding;
        // the last participant absorbs that drift like every other policy.
        let raw: Vec<Decimal> = ordered.iter().map(|(_, value)| *value).collect();
        Ok(Self::absorb_remainder(total, &raw))
    }

    fn split_percentage(
        total: Decimal,
        ordered: &[(UserId, Decimal)],
    ) -> Result<Vec<Decimal>, SplitError> {
        let sum = checked_sum(ordered.iter().map(|(_, pct)| *pct))?;
        if !is_negligible(sum - Decimal::ONE_HUNDRED) {
            return Err(SplitError::PercentageSumMismatch { sum });
        }

        let raw = ordered
            .iter()
            .map(|(_, pct)| {
                total
                    .checked_mul(*pct)
                    .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                    .map(precise)
                    .ok_or(SplitError::AmountOverflow)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::absorb_remainder(total, &raw))
    }

    fn split_share(total: Decimal, ordered: &[(UserId, Decimal)]) -> Result<Vec<Decimal>, SplitError> {
        let total_shares = checked_sum(ordered.iter().map(|(_, shares)| *shares))?;
        if total_shares.is_zero() {
            return Err(SplitError::ZeroShares);
        }

        let value_per_share = total
            .checked_div(total_shares)
            .map(precise)
            .ok_or(SplitError::AmountOverflow)?;
        let raw = ordered
            .iter()
            .map(|(_, shares)| {
                shares
                    .checked_mul(value_per_share)
                    .ok_or(SplitError::AmountOverflow)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::absorb_remainder(total, &raw))
    }

    /// Round all but the last raw amount; the last becomes `total - sum(others)`.
    fn absorb_remainder(total: Decimal, raw: &[Decimal]) -> Vec<Decimal> {
        let Some((_, others)) = raw.split_last() else {
            return Vec::new();
        };

        let mut amounts: Vec<Decimal> = others.iter().map(|amount| round_half_up(*amount)).collect();
        let allocated: Decimal = amounts.iter().copied().sum();
        amounts.push(round_half_up(total - allocated));
        amounts
    }
}

/// Sum caller-supplied values without panicking on overflow.
fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal, SplitError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or(SplitError::AmountOverflow)
}

/// Round an intermediate value to the internal calculation precision.
fn precise(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CALCULATION_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
