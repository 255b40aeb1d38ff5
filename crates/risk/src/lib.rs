//! LendBank Risk - Pure arithmetic for loans
//!
//! Interest accrual over logical time and collateral-ratio health checks.
//! Nothing in this crate owns state; the lending engine feeds it values.

pub mod collateral;
pub mod interest;

pub use collateral::{
    collateral_ratio, collateral_value, precise_ratio, required_collateral, HealthCheck,
};
pub use interest::{
    InterestCalculator, DEFAULT_INTEREST_RATE, DEFAULT_PERIODS_PER_DAY, MAX_INTEREST_RATE,
};
