//! Greedy debt simplification.
//!
//! Debtors and creditors are each ordered by decreasing magnitude, ties
//! broken by ascending participant id. The largest remaining debtor pays the
//! largest remaining creditor until one list runs out. This is a heuristic:
//! it usually needs few transfers but does not guarantee the minimum.

use divvy_shared::types::{
    Currency, GroupId, Money, UserId, ZERO_THRESHOLD, is_negligible, round_half_up,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::error::SettlementError;
use super::types::SimplifiedPayment;
use crate::balance::{BalanceAggregator, NetBalances};
use crate::ledger::{GroupSnapshot, LedgerSource};

/// Debt simplifier.
pub struct DebtSimplifier;

impl DebtSimplifier {
    /// Suggests transfers that settle every balance in `balances`.
    ///
    /// Balances are expected to sum to roughly zero. An already settled map
    /// yields no transfers, and identical input always yields identical
    /// transfers.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::CurrencyMismatch`] if the balances are not
    /// all in one currency.
    pub fn simplify(balances: &NetBalances) -> Result<Vec<SimplifiedPayment>, SettlementError> {
        let Some(currency) = single_currency(balances)? else {
            return Ok(Vec::new());
        };

        let mut debtors: Vec<(UserId, Decimal)> = balances
            .iter()
            .filter(|(_, balance)| balance.amount < -ZERO_THRESHOLD)
            .map(|(user_id, balance)| (*user_id, balance.amount.abs()))
            .collect();
        let mut creditors: Vec<(UserId, Decimal)> = balances
            .iter()
            .filter(|(_, balance)| balance.amount > ZERO_THRESHOLD)
            .map(|(user_id, balance)| (*user_id, balance.amount))
            .collect();
        sort_largest_first(&mut debtors);
        sort_largest_first(&mut creditors);

        let mut payments = Vec::new();
        let (mut d, mut c) = (0, 0);
        while d < debtors.len() && c < creditors.len() {
            let (debtor, owes) = debtors[d];
            let (creditor, due) = creditors[c];

            let transfer = round_half_up(owes.min(due));
            if transfer < ZERO_THRESHOLD {
                // Rounding dust on both sides; skip the smaller one.
                if owes < due {
                    d += 1;
                } else {
                    c += 1;
                }
                continue;
            }

            debug!(from = %debtor, to = %creditor, %transfer, "suggested payment");
            payments.push(SimplifiedPayment {
                from: debtor,
                to: creditor,
                amount: Money::new(transfer, currency),
            });
            debtors[d].1 -= transfer;
            creditors[c].1 -= transfer;

            if is_negligible(debtors[d].1) {
                d += 1;
            }
            if is_negligible(creditors[c].1) {
                c += 1;
            }
        }

        info!(
            participants = balances.len(),
            payments = payments.len(),
            "generated simplified payments"
        );
        Ok(payments)
    }

    /// Suggests transfers that settle a group, from its net balances.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError`] if the balances cannot be simplified.
    pub fn simplify_snapshot(
        snapshot: &GroupSnapshot,
    ) -> Result<Vec<SimplifiedPayment>, SettlementError> {
        let balances = BalanceAggregator::group_net_balances(snapshot);
        Self::simplify(&balances)
    }

    /// Loads a group from `source` and suggests transfers that settle it.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::Ledger`] if the group cannot be loaded.
    pub fn simplify_group<S: LedgerSource + ?Sized>(
        source: &S,
        group_id: GroupId,
        default_currency: Currency,
    ) -> Result<Vec<SimplifiedPayment>, SettlementError> {
        let snapshot = GroupSnapshot::load(source, group_id, default_currency)?;
        info!(%group_id, "simplifying group debts");
        Self::simplify_snapshot(&snapshot)
    }

    /// Applies `payments` to `balances`.
    ///
    /// The sender's balance rises by the amount and the receiver's falls.
    /// Applying the output of [`Self::simplify`] leaves every balance
    /// negligible.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::CurrencyMismatch`] if a payment is in a
    /// different currency than the balance it touches.
    pub fn apply(
        balances: &NetBalances,
        payments: &[SimplifiedPayment],
    ) -> Result<NetBalances, SettlementError> {
        let mut result = balances.clone();
        for payment in payments {
            let zero = Money::zero(payment.amount.currency);

            let from = result.entry(payment.from).or_insert(zero);
            *from = from.checked_add(&payment.amount)?;

            let to = result.entry(payment.to).or_insert(zero);
            *to = to.checked_sub(&payment.amount)?;
        }
        Ok(result)
    }
}

/// Currency shared by every balance, or `None` for an empty map.
fn single_currency(balances: &NetBalances) -> Result<Option<Currency>, SettlementError> {
    let mut currencies = balances.values().map(|balance| balance.currency);
    let Some(expected) = currencies.next() else {
        return Ok(None);
    };
    match currencies.find(|found| *found != expected) {
        Some(found) => Err(SettlementError::CurrencyMismatch { expected, found }),
        None => Ok(Some(expected)),
    }
}

/// Orders by decreasing amount, then ascending participant id.
fn sort_largest_first(entries: &mut [(UserId, Decimal)]) {
    entries.sort_by(|(a_id, a_amount), (b_id, b_amount)| {
        b_amount.cmp(a_amount).then_with(|| a_id.cmp(b_id))
    });
}
