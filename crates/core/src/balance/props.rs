//! Property-based tests for balance aggregation.
//!
//! - Pairwise balances are antisymmetric
//! - Group net balances of a closed group sum to zero

use divvy_shared::types::{Currency, ExpenseId, GroupId, Money, PaymentId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::aggregator::BalanceAggregator;
use crate::ledger::{ExpenseRecord, GroupSnapshot, PayerShare, PaymentRecord};
use crate::split::{SplitCalculator, SplitParticipant, SplitPolicy};

const MEMBERS: u128 = 5;

fn user(n: u128) -> UserId {
    UserId::from_uuid(Uuid::from_u128(n))
}

fn group_id() -> GroupId {
    GroupId::from_uuid(Uuid::from_u128(1))
}

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::Usd)
}

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate one group expense: payer, total, participant subset.
///
/// Payer `MEMBERS + 1` is an outsider who is not a group member.
fn expense() -> impl Strategy<Value = ExpenseRecord> {
    let members: Vec<u128> = (1..=MEMBERS).collect();
    (
        1..=MEMBERS + 1,
        amount(),
        prop::sample::subsequence(members, 1..=MEMBERS as usize),
    )
        .prop_map(|(payer, total, participants)| {
            let participants: Vec<_> = participants
                .into_iter()
                .map(|n| SplitParticipant::equal(user(n)))
                .collect();
            SplitCalculator::build_expense(
                ExpenseId::new(),
                Some(group_id()),
                usd(total),
                SplitPolicy::Equal,
                vec![PayerShare {
                    user_id: user(payer),
                    amount_paid: usd(total),
                }],
                &participants,
            )
            .unwrap()
        })
}

/// Strategy to generate one group payment between two distinct members.
fn payment() -> impl Strategy<Value = PaymentRecord> {
    (1..=MEMBERS, 1..MEMBERS, amount()).prop_map(|(payer, offset, amount)| {
        let payee = (payer - 1 + offset) % MEMBERS + 1;
        PaymentRecord::new(PaymentId::new(), Some(group_id()), user(payer), user(payee), usd(amount))
            .unwrap()
    })
}

fn group_snapshot() -> impl Strategy<Value = GroupSnapshot> {
    (
        prop::collection::vec(expense(), 0..8),
        prop::collection::vec(payment(), 0..5),
    )
        .prop_map(|(expenses, payments)| {
            GroupSnapshot::new(
                group_id(),
                (1..=MEMBERS).map(user).collect(),
                expenses,
                payments,
                Currency::Usd,
            )
            .unwrap()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// balance(a, b) == -balance(b, a) for every pair of members.
    #[test]
    fn prop_pairwise_balance_is_antisymmetric(snapshot in group_snapshot()) {
        for a in 1..=MEMBERS {
            for b in 1..=MEMBERS {
                let ab = BalanceAggregator::pairwise_balance(&snapshot, user(a), user(b));
                let ba = BalanceAggregator::pairwise_balance(&snapshot, user(b), user(a));
                prop_assert_eq!(ab.amount, -ba.amount);
            }
        }
    }

    /// Group balances agree with the pairwise balance of each listed peer.
    #[test]
    fn prop_group_balances_match_pairwise(snapshot in group_snapshot()) {
        for observer in 1..=MEMBERS {
            for entry in BalanceAggregator::group_balances(&snapshot, user(observer)) {
                prop_assert!(!entry.balance.is_zero());
                prop_assert_eq!(
                    entry.balance,
                    BalanceAggregator::pairwise_balance(&snapshot, user(observer), entry.peer)
                );
            }
        }
    }

    /// Everything paid is owed by someone, so net positions cancel out.
    #[test]
    fn prop_group_net_balances_sum_to_zero(snapshot in group_snapshot()) {
        let nets = BalanceAggregator::group_net_balances(&snapshot);
        let sum: Decimal = nets.values().map(|m| m.amount).sum();
        prop_assert_eq!(sum, Decimal::ZERO);
    }
}
