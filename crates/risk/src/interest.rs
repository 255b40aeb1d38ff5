//! Interest Accrual Module
//!
//! Simple (non-compounding) interest on a loan's principal, measured in
//! logical periods since the last accrual height.
//!
//! ```text
//! interest = principal * rate * elapsed / (100 * periods_per_day)
//! ```
//!
//! Integer division floors the result.

use lendbank_core::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default interest rate (5% per day-equivalent period)
pub const DEFAULT_INTEREST_RATE: u32 = 5;

/// Highest accepted rate; keeps `principal * rate * elapsed` inside `u128`
pub const MAX_INTEREST_RATE: u32 = 100;

/// Logical-time units in one day (one block every ~10 minutes)
pub const DEFAULT_PERIODS_PER_DAY: u64 = 144;

/// Interest accrual calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestCalculator {
    /// Percent charged per day-equivalent
    rate_percent: u32,
    /// Logical periods per day
    periods_per_day: u64,
}

impl InterestCalculator {
    /// Create a new calculator with the default rate and period length
    pub fn new() -> Self {
        Self {
            rate_percent: DEFAULT_INTEREST_RATE,
            periods_per_day: DEFAULT_PERIODS_PER_DAY,
        }
    }

    /// Create with a custom rate and period length.
    ///
    /// Both inputs are expected to be validated already (the lending config
    /// rejects a rate above [`MAX_INTEREST_RATE`] and zero periods per day).
    /// Out-of-range values are not an error here: the rate is capped at
    /// [`MAX_INTEREST_RATE`] and zero `periods_per_day` becomes 1, so
    /// `interest_owed` never overflows or divides by zero.
    pub fn with_rate(rate_percent: u32, periods_per_day: u64) -> Self {
        Self {
            rate_percent: rate_percent.min(MAX_INTEREST_RATE),
            periods_per_day: periods_per_day.max(1),
        }
    }

    /// Interest owed on `principal` after `elapsed` periods
    ///
    /// 10^15 * 100 * u64::MAX stays below `u128::MAX`.
    pub fn interest_owed(&self, principal: Amount, elapsed: u64) -> u128 {
        principal.wide() * self.rate_percent as u128 * elapsed as u128
            / (100 * self.periods_per_day as u128)
    }

    /// Principal plus interest owed after `elapsed` periods
    pub fn total_owed(&self, principal: Amount, elapsed: u64) -> u128 {
        principal.wide() + self.interest_owed(principal, elapsed)
    }

    /// Rate in percent per day-equivalent
    pub fn rate_percent(&self) -> u32 {
        self.rate_percent
    }

    pub fn periods_per_day(&self) -> u64 {
        self.periods_per_day
    }

    /// Daily rate as a fraction (5% -> 0.05)
    pub fn daily_rate(&self) -> Decimal {
        Decimal::from(self.rate_percent) / Decimal::ONE_HUNDRED
    }

    /// Get annualized rate (APR, simple approximation)
    pub fn annual_rate(&self) -> Decimal {
        self.daily_rate() * Decimal::from(365)
    }
}

impl Default for InterestCalculator {
    fn default() -> Self {
        Self::new()
    }
}
