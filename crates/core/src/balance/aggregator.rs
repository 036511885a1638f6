//! Balance aggregation over group snapshots.
//!
//! Pairwise balances are built expense by expense: for each expense the
//! observer and a peer only exchange money when one of them came out ahead
//! and the other behind, and then only `min(|ahead|, |behind|)`. Direct
//! payments between the two are added on top.

use std::collections::BTreeMap;

use divvy_shared::types::{Currency, GroupId, Money, UserId, is_negligible, round_half_up};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::types::{NetBalances, OverallSummary, PeerBalance};
use crate::ledger::{ExpenseRecord, GroupSnapshot, LedgerError, LedgerSource};

/// Per-participant net contribution to a single expense.
pub type Contributions = BTreeMap<UserId, Decimal>;

/// Balance aggregator.
///
/// Stateless; every operation is a pure function of its snapshot.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Net contribution of each participant to one expense.
    ///
    /// `paid - owed` per participant: positive for those who fronted money,
    /// negative for those who consumed more than they paid.
    #[must_use]
    pub fn net_contributions(expense: &ExpenseRecord) -> Contributions {
        let mut contributions = Contributions::new();
        for payer in &expense.payers {
            *contributions.entry(payer.user_id).or_default() += payer.amount_paid.amount;
        }
        for share in &expense.owed {
            *contributions.entry(share.user_id).or_default() -= share.amount_owed.amount;
        }
        contributions
    }

    /// Balances between `observer` and every other group member.
    ///
    /// Only non-negligible balances are returned, rounded half-up, in
    /// ascending peer id order. An observer who is not a member has no
    /// balances in the group.
    #[must_use]
    pub fn group_balances(snapshot: &GroupSnapshot, observer: UserId) -> Vec<PeerBalance> {
        if !snapshot.is_member(observer) {
            debug!(%observer, group_id = %snapshot.group_id(), "observer is not a group member");
            return Vec::new();
        }

        let contributions = Self::all_contributions(snapshot);
        let balances: Vec<PeerBalance> = snapshot
            .members()
            .iter()
            .filter(|member| **member != observer)
            .filter_map(|peer| {
                let raw = Self::raw_pairwise(snapshot, &contributions, observer, *peer);
                Self::settle_amount(raw).map(|amount| PeerBalance {
                    peer: *peer,
                    balance: Money::new(amount, snapshot.currency()),
                })
            })
            .collect();

        info!(
            %observer,
            group_id = %snapshot.group_id(),
            balances = balances.len(),
            "calculated group balances"
        );
        balances
    }

    /// Balance between `observer` and `peer` within a group.
    ///
    /// Positive when `peer` owes `observer`. Always the negation of
    /// `pairwise_balance(snapshot, peer, observer)`. Zero unless both are
    /// members, and zero when the balance is negligible.
    #[must_use]
    pub fn pairwise_balance(snapshot: &GroupSnapshot, observer: UserId, peer: UserId) -> Money {
        if observer == peer || !snapshot.is_member(observer) || !snapshot.is_member(peer) {
            return Money::zero(snapshot.currency());
        }

        let contributions = Self::all_contributions(snapshot);
        let raw = Self::raw_pairwise(snapshot, &contributions, observer, peer);
        let amount = Self::settle_amount(raw).unwrap_or(Decimal::ZERO);
        Money::new(amount, snapshot.currency())
    }

    /// Loads `group_id` from `source` and returns `observer`'s balances in it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the group cannot be loaded.
    pub fn group_balances_for_group<S: LedgerSource + ?Sized>(
        source: &S,
        observer: UserId,
        group_id: GroupId,
        default_currency: Currency,
    ) -> Result<Vec<PeerBalance>, LedgerError> {
        let snapshot = GroupSnapshot::load(source, group_id, default_currency)?;
        Ok(Self::group_balances(&snapshot, observer))
    }

    /// Loads `group_id` from `source` and returns the balance between
    /// `observer` and `peer` in it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the group cannot be loaded.
    pub fn pairwise_balance_for_group<S: LedgerSource + ?Sized>(
        source: &S,
        observer: UserId,
        peer: UserId,
        group_id: GroupId,
        default_currency: Currency,
    ) -> Result<Money, LedgerError> {
        let snapshot = GroupSnapshot::load(source, group_id, default_currency)?;
        Ok(Self::pairwise_balance(&snapshot, observer, peer))
    }

    /// Returns true if nothing is owed either way between the two.
    #[must_use]
    pub fn is_settled(snapshot: &GroupSnapshot, observer: UserId, peer: UserId) -> bool {
        Self::pairwise_balance(snapshot, observer, peer).is_zero()
    }

    /// Each participant's overall position within a group.
    ///
    /// `paid - owed` over all expenses, plus payments sent, minus payments
    /// received. Participants whose position is negligible are left out.
    #[must_use]
    pub fn group_net_balances(snapshot: &GroupSnapshot) -> NetBalances {
        let mut raw: BTreeMap<UserId, Decimal> = snapshot
            .members()
            .iter()
            .map(|member| (*member, Decimal::ZERO))
            .collect();

        for expense in snapshot.expenses() {
            for (user_id, net) in Self::net_contributions(expense) {
                *raw.entry(user_id).or_default() += net;
            }
        }
        for payment in snapshot.payments() {
            *raw.entry(payment.payer).or_default() += payment.amount.amount;
            *raw.entry(payment.payee).or_default() -= payment.amount.amount;
        }

        let balances: NetBalances = raw
            .into_iter()
            .filter(|(_, amount)| !is_negligible(*amount))
            .map(|(user_id, amount)| (user_id, Money::new(amount, snapshot.currency())))
            .collect();

        debug!(
            group_id = %snapshot.group_id(),
            participants = balances.len(),
            "calculated group net balances"
        );
        balances
    }

    /// Totals owed to and by `observer` across all of their groups.
    ///
    /// Per-peer balances are summed across groups before being split into
    /// the two totals. Expenses and payments outside any group are not
    /// included.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if a group cannot be loaded, or if the
    /// observer's groups do not share one currency.
    pub fn overall_summary<S: LedgerSource + ?Sized>(
        source: &S,
        observer: UserId,
        default_currency: Currency,
    ) -> Result<OverallSummary, LedgerError> {
        let group_ids = source.groups_for_user(observer)?;
        debug!(%observer, groups = group_ids.len(), "aggregating group balances");

        let mut currency: Option<Currency> = None;
        let mut per_peer: BTreeMap<UserId, Decimal> = BTreeMap::new();
        for group_id in group_ids {
            let snapshot = GroupSnapshot::load(source, group_id, default_currency)?;
            let balances = Self::group_balances(&snapshot, observer);
            if balances.is_empty() {
                continue;
            }
            Self::ensure_currency(&mut currency, snapshot.currency(), group_id)?;

            for entry in balances {
                *per_peer.entry(entry.peer).or_default() += entry.balance.amount;
            }
        }

        warn!(%observer, "overall balance only covers group expenses and payments");

        let currency = currency.unwrap_or(default_currency);
        let (owed_to, owed_by) = per_peer.values().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(to, by), amount| {
                if *amount > Decimal::ZERO {
                    (to + *amount, by)
                } else {
                    (to, by + amount.abs())
                }
            },
        );

        let summary = OverallSummary {
            owed_to_observer: Money::new(owed_to, currency),
            owed_by_observer: Money::new(owed_by, currency),
            currency,
        };
        info!(
            %observer,
            owed_to_observer = %summary.owed_to_observer,
            owed_by_observer = %summary.owed_by_observer,
            "calculated overall balance summary"
        );
        Ok(summary)
    }

    fn all_contributions(snapshot: &GroupSnapshot) -> Vec<Contributions> {
        snapshot.expenses().iter().map(Self::net_contributions).collect()
    }

    /// Unrounded balance of `peer` towards `observer`; positive when the peer owes.
    fn raw_pairwise(
        snapshot: &GroupSnapshot,
        contributions: &[Contributions],
        observer: UserId,
        peer: UserId,
    ) -> Decimal {
        let mut balance = Decimal::ZERO;

        for (expense, nets) in snapshot.expenses().iter().zip(contributions) {
            let observer_net = nets.get(&observer).copied().unwrap_or_default();
            let peer_net = nets.get(&peer).copied().unwrap_or_default();

            let delta = if observer_net > Decimal::ZERO && peer_net < Decimal::ZERO {
                observer_net.min(peer_net.abs())
            } else if observer_net < Decimal::ZERO && peer_net > Decimal::ZERO {
                -observer_net.abs().min(peer_net)
            } else {
                Decimal::ZERO
            };

            if !delta.is_zero() {
                debug!(expense_id = %expense.id, %observer, %peer, %delta, "expense transfer");
                balance += delta;
            }
        }

        for payment in snapshot.payments() {
            if payment.payer == observer && payment.payee == peer {
                balance += payment.amount.amount;
            } else if payment.payer == peer && payment.payee == observer {
                balance -= payment.amount.amount;
            }
        }

        balance
    }

    /// Rounds a balance half-up, or returns `None` if it is negligible.
    fn settle_amount(raw: Decimal) -> Option<Decimal> {
        (!is_negligible(raw)).then(|| round_half_up(raw))
    }

    fn ensure_currency(
        current: &mut Option<Currency>,
        found: Currency,
        group_id: GroupId,
    ) -> Result<(), LedgerError> {
        match *current {
            Some(expected) if expected != found => {
                debug!(%group_id, %expected, %found, "group currency differs");
                Err(LedgerError::CurrencyMismatch { expected, found })
            }
            Some(_) => Ok(()),
            None => {
                *current = Some(found);
                Ok(())
            }
        }
    }
}
