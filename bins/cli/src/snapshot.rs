//! Group snapshot files.
//!
//! A snapshot file is the JSON form of one group: its members, expenses, and
//! payments. Files are loaded into an [`InMemoryLedger`] so the core sees the
//! same record source it would behind a real persistence layer.

use std::path::Path;

use anyhow::Context;
use divvy_core::ledger::{ExpenseRecord, InMemoryLedger, PaymentRecord};
use divvy_shared::types::{Currency, GroupId, UserId};
use serde::Deserialize;

/// One group as stored on disk.
#[derive(Debug, Deserialize)]
pub struct SnapshotFile {
    /// The group.
    pub group_id: GroupId,
    /// Group currency, when the file wants to pin one.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Current members.
    pub members: Vec<UserId>,
    /// Group expenses.
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    /// Group payments.
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

impl SnapshotFile {
    /// Reads and parses a snapshot file.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))
    }
}

/// Loads every snapshot into one ledger.
///
/// Records without a group are tagged with the group of their file.
pub fn load_ledger(files: Vec<SnapshotFile>) -> anyhow::Result<InMemoryLedger> {
    let mut ledger = InMemoryLedger::new();
    for file in files {
        ledger.add_group(file.group_id, file.members);
        for mut expense in file.expenses {
            expense.group_id.get_or_insert(file.group_id);
            ledger.record_expense(expense)?;
        }
        for mut payment in file.payments {
            payment.group_id.get_or_insert(file.group_id);
            ledger.record_payment(payment)?;
        }
    }
    Ok(ledger)
}
