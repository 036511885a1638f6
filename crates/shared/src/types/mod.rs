//! Common types used across the workspace.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{
    CALCULATION_SCALE, Currency, MONETARY_SCALE, Money, MoneyError, ZERO_THRESHOLD, is_negligible,
    round_half_up, truncate,
};
