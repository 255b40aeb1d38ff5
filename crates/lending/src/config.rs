//! Lending configuration
//!
//! Everything here can be overridden from a JSON file; missing fields fall
//! back to the defaults below. The administrator is fixed once the engine is
//! built from a config and never changes afterwards.

use lendbank_core::{Principal, PrincipalError};
use lendbank_risk::{DEFAULT_INTEREST_RATE, DEFAULT_PERIODS_PER_DAY, MAX_INTEREST_RATE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::params::{MAX_FEE_RATE, RATIO_FLOOR};

/// Errors raised while loading or validating a [`LendingConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid admin: {0}")]
    InvalidAdmin(#[from] PrincipalError),

    #[error("Invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Configuration for the Lending Engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingConfig {
    /// Administrator identity
    #[serde(default = "default_admin")]
    pub admin: String,

    /// Initial minimum collateral ratio (percent)
    #[serde(default = "default_minimum_collateral_ratio")]
    pub minimum_collateral_ratio: u32,

    /// Initial liquidation threshold (percent)
    #[serde(default = "default_liquidation_threshold")]
    pub liquidation_threshold: u32,

    /// Fee rate (percent); stored, not yet applied anywhere
    #[serde(default = "default_fee_rate")]
    pub fee_rate: u32,

    /// Fixed rate stamped on every new loan (percent per day)
    #[serde(default = "default_interest_rate")]
    pub interest_rate: u32,

    /// Logical-time units per day
    #[serde(default = "default_periods_per_day")]
    pub periods_per_day: u64,

    /// Maximum active loans per borrower
    #[serde(default = "default_portfolio_capacity")]
    pub portfolio_capacity: usize,
}

fn default_admin() -> String {
    "ADMIN".to_string()
}

fn default_minimum_collateral_ratio() -> u32 {
    150
}

fn default_liquidation_threshold() -> u32 {
    120
}

fn default_fee_rate() -> u32 {
    1
}

fn default_interest_rate() -> u32 {
    DEFAULT_INTEREST_RATE
}

fn default_periods_per_day() -> u64 {
    DEFAULT_PERIODS_PER_DAY
}

fn default_portfolio_capacity() -> usize {
    10
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            minimum_collateral_ratio: default_minimum_collateral_ratio(),
            liquidation_threshold: default_liquidation_threshold(),
            fee_rate: default_fee_rate(),
            interest_rate: default_interest_rate(),
            periods_per_day: default_periods_per_day(),
            portfolio_capacity: default_portfolio_capacity(),
        }
    }
}

impl LendingConfig {
    /// Default configuration with a specific administrator
    pub fn with_admin(admin: impl Into<String>) -> Self {
        Self {
            admin: admin.into(),
            ..Self::default()
        }
    }

    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed administrator principal
    pub fn admin_principal(&self) -> Result<Principal, ConfigError> {
        Ok(Principal::new(self.admin.as_str())?)
    }

    /// Check the same bounds governance enforces at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.admin_principal()?;

        if self.minimum_collateral_ratio < RATIO_FLOOR {
            return Err(ConfigError::Invalid {
                field: "minimum_collateral_ratio",
                reason: "below the 110% floor",
            });
        }
        if self.liquidation_threshold < RATIO_FLOOR {
            return Err(ConfigError::Invalid {
                field: "liquidation_threshold",
                reason: "below the 110% floor",
            });
        }
        if self.liquidation_threshold >= self.minimum_collateral_ratio {
            return Err(ConfigError::Invalid {
                field: "liquidation_threshold",
                reason: "must be below minimum_collateral_ratio",
            });
        }
        if self.fee_rate > MAX_FEE_RATE {
            return Err(ConfigError::Invalid {
                field: "fee_rate",
                reason: "above 100%",
            });
        }
        if self.interest_rate > MAX_INTEREST_RATE {
            return Err(ConfigError::Invalid {
                field: "interest_rate",
                reason: "above 100%",
            });
        }
        if self.periods_per_day == 0 {
            return Err(ConfigError::Invalid {
                field: "periods_per_day",
                reason: "must be positive",
            });
        }
        if self.portfolio_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "portfolio_capacity",
                reason: "must be positive",
            });
        }

        Ok(())
    }
}
