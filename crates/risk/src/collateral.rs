//! Collateral arithmetic
//!
//! Values and ratios are raw integers. A ratio is a percent: 150 means the
//! collateral is worth 1.5x the principal.
//!
//! ```text
//! collateral_value    = collateral * price
//! required_collateral = loan * minimum_ratio
//! ratio               = collateral * price * 100 / principal
//! ```
//!
//! Origination compares `collateral_value` with `required_collateral`
//! directly, without normalizing either side.

use lendbank_core::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Value of the collateral at `price`
pub fn collateral_value(collateral: Amount, price: u64) -> u128 {
    collateral.wide() * price as u128
}

/// Collateral required to originate `loan` at `minimum_ratio` percent
pub fn required_collateral(loan: Amount, minimum_ratio: u32) -> u128 {
    loan.wide() * minimum_ratio as u128
}

/// Current collateral ratio in whole percent (floored)
///
/// Multiplies before dividing so that fractional ratios survive:
/// 1 x 350 against 300 is 116, not 100.
pub fn collateral_ratio(collateral: Amount, price: u64, principal: Amount) -> u128 {
    let ratio = collateral_value(collateral, price) * 100 / principal.wide();
    trace!(%collateral, price, %principal, ratio, "collateral ratio");
    ratio
}

/// Collateral ratio with two decimal places, for reporting.
///
/// Returns `None` if the value exceeds `Decimal`'s range.
pub fn precise_ratio(collateral: Amount, price: u64, principal: Amount) -> Option<Decimal> {
    let value = Decimal::from(collateral.value()).checked_mul(Decimal::from(price))?;
    let ratio = value
        .checked_div(Decimal::from(principal.value()))?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    Some(ratio.round_dp(2))
}

/// Outcome of comparing a ratio with the liquidation threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCheck {
    /// Ratio above the threshold
    Healthy,
    /// Ratio at or below the threshold
    Liquidatable,
}

impl HealthCheck {
    pub fn evaluate(ratio: u128, liquidation_threshold: u32) -> Self {
        if ratio <= liquidation_threshold as u128 {
            HealthCheck::Liquidatable
        } else {
            HealthCheck::Healthy
        }
    }

    pub fn is_liquidatable(&self) -> bool {
        matches!(self, HealthCheck::Liquidatable)
    }
}
