//! Parameter Store
//!
//! Risk parameters adjustable by governance, plus the one-time
//! initialization flag. Values are overwritten in place; no history is kept.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::config::LendingConfig;
use crate::error::{LendingError, LendingResult};

/// Absolute floor for both ratio parameters (percent)
pub const RATIO_FLOOR: u32 = 110;

/// Highest accepted fee rate (percent)
pub const MAX_FEE_RATE: u32 = 100;

/// Adjustable risk parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParameters {
    /// Set once by `initialize`
    pub initialized: bool,
    /// Collateral ratio required at origination (percent)
    pub minimum_collateral_ratio: u32,
    /// Ratio at or below which a loan is liquidated (percent)
    pub liquidation_threshold: u32,
    /// Reserved; no computation reads it yet
    pub fee_rate: u32,
    /// Fixed rate stamped on new loans (percent per day)
    pub interest_rate: u32,
    /// Logical-time units per day
    pub periods_per_day: u64,
}

/// Names of the governance-adjustable parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    MinimumCollateralRatio,
    LiquidationThreshold,
    FeeRate,
}

impl ProtocolParameters {
    pub fn from_config(config: &LendingConfig) -> Self {
        Self {
            initialized: false,
            minimum_collateral_ratio: config.minimum_collateral_ratio,
            liquidation_threshold: config.liquidation_threshold,
            fee_rate: config.fee_rate,
            interest_rate: config.interest_rate,
            periods_per_day: config.periods_per_day,
        }
    }

    pub fn get(&self, parameter: Parameter) -> u32 {
        match parameter {
            Parameter::MinimumCollateralRatio => self.minimum_collateral_ratio,
            Parameter::LiquidationThreshold => self.liquidation_threshold,
            Parameter::FeeRate => self.fee_rate,
        }
    }

    /// Check that `value` may be written to `parameter` given the current values
    pub fn validate(&self, parameter: Parameter, value: u32) -> LendingResult<()> {
        let name = match parameter {
            Parameter::MinimumCollateralRatio => "minimum_collateral_ratio",
            Parameter::LiquidationThreshold => "liquidation_threshold",
            Parameter::FeeRate => "fee_rate",
        };
        let invalid = |reason| LendingError::InvalidParameter {
            name,
            value,
            reason,
        };

        match parameter {
            Parameter::MinimumCollateralRatio | Parameter::LiquidationThreshold
                if value < RATIO_FLOOR =>
            {
                Err(invalid("below the 110% floor"))
            }
            Parameter::MinimumCollateralRatio if value <= self.liquidation_threshold => {
                Err(invalid("must stay above the liquidation threshold"))
            }
            Parameter::LiquidationThreshold if value >= self.minimum_collateral_ratio => {
                Err(invalid("must stay below the minimum collateral ratio"))
            }
            Parameter::FeeRate if value > MAX_FEE_RATE => Err(invalid("above 100%")),
            _ => Ok(()),
        }
    }

    /// Validate and overwrite. Returns the previous value.
    pub fn set(&mut self, parameter: Parameter, value: u32) -> LendingResult<u32> {
        self.validate(parameter, value)?;
        let slot = match parameter {
            Parameter::MinimumCollateralRatio => &mut self.minimum_collateral_ratio,
            Parameter::LiquidationThreshold => &mut self.liquidation_threshold,
            Parameter::FeeRate => &mut self.fee_rate,
        };
        Ok(std::mem::replace(slot, value))
    }
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self::from_config(&LendingConfig::default())
    }
}
