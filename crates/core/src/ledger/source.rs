//! Record source port and immutable group snapshots.
//!
//! The persistence layer implements [`LedgerSource`]. Balance computations
//! never talk to it directly; they work on a [`GroupSnapshot`] loaded once per
//! request, so every computation sees one consistent view of a group.

use std::collections::BTreeMap;

use divvy_shared::types::{Currency, GroupId, UserId};
use divvy_shared::{AppError, AppResult};
use tracing::debug;

use super::error::LedgerError;
use super::records::{ExpenseRecord, PaymentRecord};

/// Source of group records.
///
/// Every method returns fully materialised data.
pub trait LedgerSource: Send + Sync {
    /// Current members of a group.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the group does not exist.
    fn group_members(&self, group_id: GroupId) -> AppResult<Vec<UserId>>;

    /// All expenses recorded in a group.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the group does not exist.
    fn group_expenses(&self, group_id: GroupId) -> AppResult<Vec<ExpenseRecord>>;

    /// All direct payments recorded in a group.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the group does not exist.
    fn group_payments(&self, group_id: GroupId) -> AppResult<Vec<PaymentRecord>>;

    /// Groups the user is a member of.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>>;
}

/// Immutable view of one group's members and records.
///
/// Only built through [`GroupSnapshot::new`] or [`GroupSnapshot::load`], so
/// members are always sorted and every record has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    group_id: GroupId,
    currency: Currency,
    members: Vec<UserId>,
    expenses: Vec<ExpenseRecord>,
    payments: Vec<PaymentRecord>,
}

impl GroupSnapshot {
    /// Builds a validated snapshot.
    ///
    /// The currency is taken from the first record; `default_currency` only
    /// applies to a group without records.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if a record is invalid, belongs to another
    /// group, or is in a different currency than the rest.
    pub fn new(
        group_id: GroupId,
        mut members: Vec<UserId>,
        expenses: Vec<ExpenseRecord>,
        payments: Vec<PaymentRecord>,
        default_currency: Currency,
    ) -> Result<Self, LedgerError> {
        members.sort_unstable();
        members.dedup();

        let currency = expenses
            .first()
            .map(ExpenseRecord::currency)
            .or_else(|| payments.first().map(PaymentRecord::currency))
            .unwrap_or(default_currency);

        let check_scope = |record_group: Option<GroupId>, record_currency: Currency| {
            if record_group != Some(group_id) {
                return Err(LedgerError::GroupMismatch {
                    expected: group_id,
                    found: record_group,
                });
            }
            if record_currency != currency {
                return Err(LedgerError::CurrencyMismatch {
                    expected: currency,
                    found: record_currency,
                });
            }
            Ok(())
        };

        for expense in &expenses {
            expense.validate()?;
            check_scope(expense.group_id, expense.currency())?;
        }
        for payment in &payments {
            payment.validate()?;
            check_scope(payment.group_id, payment.currency())?;
        }

        Ok(Self {
            group_id,
            currency,
            members,
            expenses,
            payments,
        })
    }

    /// Loads a snapshot of `group_id` from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Source`] if the source fails, or a validation
    /// error if the loaded records are inconsistent.
    pub fn load<S: LedgerSource + ?Sized>(
        source: &S,
        group_id: GroupId,
        default_currency: Currency,
    ) -> Result<Self, LedgerError> {
        let members = source.group_members(group_id)?;
        let expenses = source.group_expenses(group_id)?;
        let payments = source.group_payments(group_id)?;

        debug!(
            %group_id,
            members = members.len(),
            expenses = expenses.len(),
            payments = payments.len(),
            "loaded group snapshot"
        );

        Self::new(group_id, members, expenses, payments, default_currency)
    }

    /// The group.
    #[must_use]
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Currency every record of the group is in.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Members in ascending id order, without duplicates.
    #[must_use]
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Group expenses.
    #[must_use]
    pub fn expenses(&self) -> &[ExpenseRecord] {
        &self.expenses
    }

    /// Group payments.
    #[must_use]
    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    /// Returns true if `user_id` is a member of the group.
    #[must_use]
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.binary_search(&user_id).is_ok()
    }
}

#[derive(Debug, Clone, Default)]
struct GroupRecords {
    members: Vec<UserId>,
    expenses: Vec<ExpenseRecord>,
    payments: Vec<PaymentRecord>,
}

/// In-memory [`LedgerSource`].
///
/// Records without a group are kept apart as direct records; they are never
/// returned by the group queries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    groups: BTreeMap<GroupId, GroupRecords>,
    direct_expenses: Vec<ExpenseRecord>,
    direct_payments: Vec<PaymentRecord>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group with its members, replacing any previous members.
    pub fn add_group(&mut self, group_id: GroupId, members: impl IntoIterator<Item = UserId>) {
        self.groups.entry(group_id).or_default().members = members.into_iter().collect();
    }

    /// Adds a member to an existing group.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the group does not exist.
    pub fn add_member(&mut self, group_id: GroupId, user_id: UserId) -> AppResult<()> {
        let group = self.group_mut(group_id)?;
        if !group.members.contains(&user_id) {
            group.members.push(user_id);
        }
        Ok(())
    }

    /// Removes a member from a group. Their records stay.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the group does not exist.
    pub fn remove_member(&mut self, group_id: GroupId, user_id: UserId) -> AppResult<()> {
        self.group_mut(group_id)?.members.retain(|m| *m != user_id);
        Ok(())
    }

    /// Stores an expense under its group, or as a direct expense.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the expense names an unknown group.
    pub fn record_expense(&mut self, expense: ExpenseRecord) -> AppResult<()> {
        match expense.group_id {
            Some(group_id) => self.group_mut(group_id)?.expenses.push(expense),
            None => self.direct_expenses.push(expense),
        }
        Ok(())
    }

    /// Stores a payment under its group, or as a direct payment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the payment names an unknown group.
    pub fn record_payment(&mut self, payment: PaymentRecord) -> AppResult<()> {
        match payment.group_id {
            Some(group_id) => self.group_mut(group_id)?.payments.push(payment),
            None => self.direct_payments.push(payment),
        }
        Ok(())
    }

    /// Expenses not tied to any group.
    #[must_use]
    pub fn direct_expenses(&self) -> &[ExpenseRecord] {
        &self.direct_expenses
    }

    /// Payments not tied to any group.
    #[must_use]
    pub fn direct_payments(&self) -> &[PaymentRecord] {
        &self.direct_payments
    }

    fn group(&self, group_id: GroupId) -> AppResult<&GroupRecords> {
        self.groups
            .get(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("Group {group_id}")))
    }

    fn group_mut(&mut self, group_id: GroupId) -> AppResult<&mut GroupRecords> {
        self.groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("Group {group_id}")))
    }
}

impl LedgerSource for InMemoryLedger {
    fn group_members(&self, group_id: GroupId) -> AppResult<Vec<UserId>> {
        Ok(self.group(group_id)?.members.clone())
    }

    fn group_expenses(&self, group_id: GroupId) -> AppResult<Vec<ExpenseRecord>> {
        Ok(self.group(group_id)?.expenses.clone())
    }

    fn group_payments(&self, group_id: GroupId) -> AppResult<Vec<PaymentRecord>> {
        Ok(self.group(group_id)?.payments.clone())
    }

    fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        Ok(self
            .groups
            .iter()
            .filter(|(_, group)| group.members.contains(&user_id))
            .map(|(group_id, _)| *group_id)
            .collect())
    }
}
