//! Expense and payment records.
//!
//! This module holds the plain values the rest of the core computes over:
//! - Expense and payment records with their invariants
//! - The record source port implemented by the persistence layer
//! - Immutable group snapshots
//! - An in-memory record source
//! - Error types for record validation

pub mod error;
pub mod records;
pub mod source;

pub use error::LedgerError;
pub use records::{ExpenseRecord, OwedShare, PayerShare, PaymentRecord};
pub use source::{GroupSnapshot, InMemoryLedger, LedgerSource};
