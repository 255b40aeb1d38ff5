//! Governance Interface
//!
//! Administrator-only operations over the Parameter Store and the Price
//! Oracle Registry. The admin check runs first; any failure leaves
//! parameters and prices untouched.

use lendbank_core::Asset;
use lendbank_oracle::{PriceOracle, PriceQuote};
use tracing::{info, warn};

use crate::clock::IdentityProvider;
use crate::engine::LendingEngine;
use crate::error::{LendingError, LendingResult};
use crate::events::LendingEvent;
use crate::params::Parameter;

impl LendingEngine {
    fn ensure_admin(
        &self,
        caller: &impl IdentityProvider,
        action: &'static str,
    ) -> LendingResult<()> {
        let caller = caller.caller_identity();
        if caller != self.admin {
            warn!(%caller, action, "rejected governance call from non-admin");
            return Err(LendingError::Unauthorized { caller, action });
        }
        Ok(())
    }

    /// Open the platform. Allowed exactly once.
    pub fn initialize(&mut self, caller: &impl IdentityProvider) -> LendingResult<()> {
        self.ensure_admin(caller, "initialize the platform")?;
        if self.params.initialized {
            return Err(LendingError::AlreadyInitialized);
        }

        self.params.initialized = true;

        let height = self.height();
        self.journal.record(
            height,
            LendingEvent::Initialized {
                admin: self.admin.clone(),
            },
        );
        info!(admin = %self.admin, height, "platform initialized");
        Ok(())
    }

    /// Set the collateral ratio required at origination
    pub fn set_minimum_ratio(
        &mut self,
        caller: &impl IdentityProvider,
        value: u32,
    ) -> LendingResult<()> {
        self.ensure_admin(caller, "set the minimum collateral ratio")?;
        self.update_parameter(Parameter::MinimumCollateralRatio, value)
    }

    /// Set the ratio at or below which loans are liquidated
    pub fn set_liquidation_threshold(
        &mut self,
        caller: &impl IdentityProvider,
        value: u32,
    ) -> LendingResult<()> {
        self.ensure_admin(caller, "set the liquidation threshold")?;
        self.update_parameter(Parameter::LiquidationThreshold, value)
    }

    /// Set the (reserved) fee rate
    pub fn set_fee_rate(
        &mut self,
        caller: &impl IdentityProvider,
        value: u32,
    ) -> LendingResult<()> {
        self.ensure_admin(caller, "set the fee rate")?;
        self.update_parameter(Parameter::FeeRate, value)
    }

    fn update_parameter(&mut self, parameter: Parameter, value: u32) -> LendingResult<()> {
        let old_value = self.params.set(parameter, value)?;

        let height = self.height();
        self.journal.record(
            height,
            LendingEvent::ParameterChanged {
                parameter,
                old_value,
                new_value: value,
            },
        );
        info!(%parameter, old_value, new_value = value, "parameter updated");
        Ok(())
    }

    /// Publish a price for `asset`, replacing the previous quote
    pub fn set_price(
        &mut self,
        caller: &impl IdentityProvider,
        asset: &str,
        price: u64,
    ) -> LendingResult<PriceQuote> {
        self.ensure_admin(caller, "set prices")?;
        let asset: Asset = asset.parse()?;

        let height = self.height();
        self.oracle.set_price(asset, price, height)?;
        let quote = self.oracle.require_price(asset)?;

        self.journal
            .record(height, LendingEvent::PriceUpdated { asset, price });
        info!(%asset, price, height, "price set");
        Ok(quote)
    }
}
