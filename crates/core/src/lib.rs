//! Core settlement logic for Divvy.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Every operation is a synchronous, deterministic function of plain values.
//!
//! # Modules
//!
//! - `split` - Dividing an expense total among participants
//! - `ledger` - Expense and payment records, group snapshots
//! - `balance` - Pairwise balances and net positions
//! - `settlement` - Greedy debt simplification

pub mod balance;
pub mod ledger;
pub mod settlement;
pub mod split;
