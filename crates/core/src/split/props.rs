//! Property-based tests for split calculation.
//!
//! - Owed amounts always sum to the total exactly
//! - Output order and amounts are deterministic in the input order

use divvy_shared::types::{Currency, Money, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::calculator::SplitCalculator;
use super::types::{SplitParticipant, SplitPolicy};

/// Strategy to generate positive totals (0.01 to 1,000,000.00).
fn positive_total() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate distinct participant ids (1 to 20 of them).
fn participant_ids() -> impl Strategy<Value = Vec<UserId>> {
    prop::collection::btree_set(any::<u128>(), 1..20).prop_map(|ids| {
        ids.into_iter()
            .map(|n| UserId::from_uuid(Uuid::from_u128(n)))
            .collect()
    })
}

/// Strategy to generate share counts with at least one non-zero share.
fn share_counts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(0u32..10, 1..20)
        .prop_filter("at least one share", |shares| shares.iter().any(|s| *s > 0))
        .prop_map(|shares| shares.into_iter().map(Decimal::from).collect())
}

/// Strategy to generate percentages (two decimals) that sum to exactly 100.
fn percentages() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(100u32..1000, 1..20).prop_map(|weights| {
        let sum: u32 = weights.iter().sum();
        let mut allocated = Decimal::ZERO;
        let mut pcts: Vec<Decimal> = weights[..weights.len() - 1]
            .iter()
            .map(|w| {
                let pct = (Decimal::from(*w) * Decimal::ONE_HUNDRED / Decimal::from(sum))
                    .round_dp(2);
                allocated += pct;
                pct
            })
            .collect();
        pcts.push(Decimal::ONE_HUNDRED - allocated);
        pcts
    })
}

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::Usd)
}

fn owed_sum(owed: &[crate::ledger::OwedShare]) -> Decimal {
    owed.iter().map(|s| s.amount_owed.amount).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// EQUAL splits always reproduce the total.
    #[test]
    fn prop_equal_split_sums_to_total(total in positive_total(), ids in participant_ids()) {
        let participants: Vec<_> = ids.iter().map(|id| SplitParticipant::equal(*id)).collect();
        let owed = SplitCalculator::compute_split(usd(total), SplitPolicy::Equal, &participants)
            .unwrap();

        prop_assert_eq!(owed_sum(&owed), total);
        prop_assert_eq!(owed.len(), participants.len());
    }

    /// EQUAL splits never differ by more than the absorbed remainder.
    #[test]
    fn prop_equal_split_non_last_amounts_match(total in positive_total(), ids in participant_ids()) {
        let participants: Vec<_> = ids.iter().map(|id| SplitParticipant::equal(*id)).collect();
        let owed = SplitCalculator::compute_split(usd(total), SplitPolicy::Equal, &participants)
            .unwrap();

        let first = owed[0].amount_owed.amount;
        for share in &owed[..owed.len() - 1] {
            prop_assert_eq!(share.amount_owed.amount, first);
        }
        prop_assert!(owed[owed.len() - 1].amount_owed.amount >= first);
    }

    /// SHARE splits always reproduce the total.
    #[test]
    fn prop_share_split_sums_to_total(total in positive_total(), shares in share_counts()) {
        let participants: Vec<_> = shares
            .iter()
            .enumerate()
            .map(|(i, s)| SplitParticipant::with_value(UserId::from_uuid(Uuid::from_u128(i as u128 + 1)), *s))
            .collect();
        let owed = SplitCalculator::compute_split(usd(total), SplitPolicy::Share, &participants)
            .unwrap();

        prop_assert_eq!(owed_sum(&owed), total);
    }

    /// PERCENTAGE splits always reproduce the total.
    #[test]
    fn prop_percentage_split_sums_to_total(total in positive_total(), pcts in percentages()) {
        let participants: Vec<_> = pcts
            .iter()
            .enumerate()
            .map(|(i, p)| SplitParticipant::with_value(UserId::from_uuid(Uuid::from_u128(i as u128 + 1)), *p))
            .collect();
        let owed = SplitCalculator::compute_split(usd(total), SplitPolicy::Percentage, &participants)
            .unwrap();

        prop_assert_eq!(owed_sum(&owed), total);
    }

    /// Input order does not change the result.
    #[test]
    fn prop_split_is_order_independent(total in positive_total(), shares in share_counts()) {
        let participants: Vec<_> = shares
            .iter()
            .enumerate()
            .map(|(i, s)| SplitParticipant::with_value(UserId::from_uuid(Uuid::from_u128(i as u128 + 1)), *s))
            .collect();
        let mut reversed = participants.clone();
        reversed.reverse();

        let forward = SplitCalculator::compute_split(usd(total), SplitPolicy::Share, &participants)
            .unwrap();
        let backward = SplitCalculator::compute_split(usd(total), SplitPolicy::Share, &reversed)
            .unwrap();

        prop_assert_eq!(forward, backward);
    }
}
