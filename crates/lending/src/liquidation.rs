//! Liquidation Monitor
//!
//! Anyone may ask for a loan's health to be checked. A loan whose collateral
//! ratio is at or below the liquidation threshold is closed on the spot.
//!
//! Liquidation clears the borrower's whole portfolio, not only the
//! liquidated id. Other loans of that borrower stay `active` in the ledger
//! but drop out of the Borrower Index.

use lendbank_core::{Asset, LoanId, Principal};
use lendbank_oracle::PriceOracle;
use lendbank_risk::{collateral_ratio, HealthCheck};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::IdentityProvider;
use crate::engine::LendingEngine;
use crate::error::{LendingError, LendingResult};
use crate::events::LendingEvent;
use crate::loan::LoanStatus;

/// What `check_liquidation` did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LiquidationOutcome {
    /// Ratio above the threshold; nothing changed
    Healthy { ratio: u128 },
    /// Loan closed; `cleared` lists the ids removed from the portfolio
    Liquidated { ratio: u128, cleared: Vec<LoanId> },
    /// Loan already repaid or liquidated; nothing changed
    AlreadyClosed { status: LoanStatus },
}

impl LiquidationOutcome {
    pub fn is_liquidated(&self) -> bool {
        matches!(self, LiquidationOutcome::Liquidated { .. })
    }
}

impl LendingEngine {
    /// Recompute the loan's collateral ratio and liquidate it if unsafe.
    ///
    /// Repeated calls on a closed loan are no-ops.
    pub fn check_liquidation(
        &mut self,
        caller: &impl IdentityProvider,
        loan_id: LoanId,
    ) -> LendingResult<LiquidationOutcome> {
        let liquidator = caller.caller_identity();
        let loan = self
            .loans
            .get(&loan_id)
            .ok_or(LendingError::LoanNotFound(loan_id))?;
        if loan.status.is_terminal() {
            return Ok(LiquidationOutcome::AlreadyClosed {
                status: loan.status,
            });
        }

        let quote = self.oracle.require_price(Asset::COLLATERAL)?;
        let ratio = collateral_ratio(loan.collateral_amount, quote.price, loan.principal);
        let threshold = self.params.liquidation_threshold;
        debug!(loan = %loan_id, ratio, threshold, price = quote.price, "health check");

        match HealthCheck::evaluate(ratio, threshold) {
            HealthCheck::Healthy => Ok(LiquidationOutcome::Healthy { ratio }),
            HealthCheck::Liquidatable => {
                let cleared = self.liquidate_position(loan_id, ratio, liquidator)?;
                Ok(LiquidationOutcome::Liquidated { ratio, cleared })
            }
        }
    }

    /// Close an active loan as liquidated and clear its borrower's portfolio
    fn liquidate_position(
        &mut self,
        loan_id: LoanId,
        ratio: u128,
        liquidator: Principal,
    ) -> LendingResult<Vec<LoanId>> {
        let loan = self
            .loans
            .get_mut(&loan_id)
            .ok_or(LendingError::LoanNotFound(loan_id))?;
        loan.liquidate()?;
        let borrower = loan.borrower.clone();

        let cleared = self
            .portfolios
            .get_mut(&borrower)
            .map(|portfolio| portfolio.clear())
            .unwrap_or_default();

        let height = self.height();
        self.journal.record(
            height,
            LendingEvent::LoanLiquidated {
                loan_id,
                borrower: borrower.clone(),
                liquidator: liquidator.clone(),
                ratio,
                cleared: cleared.clone(),
            },
        );
        info!(loan = %loan_id, %borrower, %liquidator, ratio, cleared = cleared.len(), "loan liquidated");
        Ok(cleared)
    }

    /// Check every active loan and return the ids that were liquidated
    pub fn sweep_liquidations(
        &mut self,
        caller: &impl IdentityProvider,
    ) -> LendingResult<Vec<LoanId>> {
        self.oracle.require_price(Asset::COLLATERAL)?;

        let active: Vec<LoanId> = self
            .loans
            .values()
            .filter(|loan| loan.is_active())
            .map(|loan| loan.id)
            .collect();

        let mut liquidated = Vec::new();
        for loan_id in active {
            if self.check_liquidation(caller, loan_id)?.is_liquidated() {
                liquidated.push(loan_id);
            }
        }
        Ok(liquidated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn principal(id: &str) -> Principal {
        Principal::new(id).unwrap()
    }

    fn setup() -> (LendingEngine, Principal) {
        let admin = principal("ADMIN");
        let mut engine = LendingEngine::with_admin(admin.clone(), Arc::new(ManualClock::new(1)));
        engine.initialize(&admin).unwrap();
        engine.set_price(&admin, "BTC", 50_000).unwrap();
        (engine, admin)
    }

    #[test]
    fn test_healthy_loan_is_noop() {
        let (mut engine, _admin) = setup();
        let alice = principal("alice");
        let id = engine.request_loan(&alice, 1, 300).unwrap();

        let outcome = engine.check_liquidation(&principal("keeper"), id).unwrap();
        assert_eq!(outcome, LiquidationOutcome::Healthy { ratio: 16_666 });
        assert!(engine.get_loan(id).unwrap().is_active());
        assert_eq!(engine.get_borrower_portfolio(&alice).unwrap().len(), 1);
    }

    #[test]
    fn test_scenario_c_price_drop_liquidates() {
        let (mut engine, admin) = setup();
        let alice = principal("alice");
        let id = engine.request_loan(&alice, 1, 300).unwrap();

        engine.set_price(&admin, "BTC", 350).unwrap();

        let outcome = engine.check_liquidation(&principal("keeper"), id).unwrap();
        assert_eq!(
            outcome,
            LiquidationOutcome::Liquidated {
                ratio: 116,
                cleared: vec![id]
            }
        );
        assert_eq!(engine.get_loan(id).unwrap().status, LoanStatus::Liquidated);
        assert!(engine.get_borrower_portfolio(&alice).unwrap().is_empty());
    }

    #[test]
    fn test_liquidation_is_idempotent() {
        let (mut engine, admin) = setup();
        let alice = principal("alice");
        let id = engine.request_loan(&alice, 1, 300).unwrap();
        engine.set_price(&admin, "BTC", 350).unwrap();

        engine.check_liquidation(&alice, id).unwrap();
        let events = engine.events().len();

        for _ in 0..3 {
            assert_eq!(
                engine.check_liquidation(&alice, id).unwrap(),
                LiquidationOutcome::AlreadyClosed {
                    status: LoanStatus::Liquidated
                }
            );
        }
        assert_eq!(engine.events().len(), events);
    }

    #[test]
    fn test_threshold_boundary_liquidates() {
        let (mut engine, admin) = setup();
        let alice = principal("alice");
        let id = engine.request_loan(&alice, 1, 100).unwrap();

        // 1 x 120 * 100 / 100 = 120, exactly the threshold
        engine.set_price(&admin, "BTC", 120).unwrap();
        assert!(engine.check_liquidation(&alice, id).unwrap().is_liquidated());
    }

    // Liquidating one loan drops every id from the borrower's portfolio,
    // including loans that are still healthy and active.
    #[test]
    fn test_liquidation_clears_entire_portfolio() {
        let (mut engine, admin) = setup();
        let alice = principal("alice");
        let risky = engine.request_loan(&alice, 1, 300).unwrap();
        let safe = engine.request_loan(&alice, 10, 300).unwrap();

        engine.set_price(&admin, "BTC", 350).unwrap();
        let outcome = engine.check_liquidation(&alice, risky).unwrap();

        assert_eq!(
            outcome,
            LiquidationOutcome::Liquidated {
                ratio: 116,
                cleared: vec![risky, safe]
            }
        );
        assert!(engine.get_borrower_portfolio(&alice).unwrap().is_empty());
        assert_eq!(engine.get_loan(safe).unwrap().status, LoanStatus::Active);

        // The untracked loan can still be repaid by its owner
        engine.repay_loan(&alice, safe, 300).unwrap();
        assert_eq!(engine.get_loan(safe).unwrap().status, LoanStatus::Repaid);
    }

    #[test]
    fn test_repaid_loan_is_not_liquidated() {
        let (mut engine, admin) = setup();
        let alice = principal("alice");
        let id = engine.request_loan(&alice, 1, 300).unwrap();
        engine.repay_loan(&alice, id, 300).unwrap();
        engine.set_price(&admin, "BTC", 1).unwrap();

        assert_eq!(
            engine.check_liquidation(&alice, id).unwrap(),
            LiquidationOutcome::AlreadyClosed {
                status: LoanStatus::Repaid
            }
        );
    }

    #[test]
    fn test_unknown_loan() {
        let (mut engine, _admin) = setup();
        assert_eq!(
            engine.check_liquidation(&principal("keeper"), LoanId(42)),
            Err(LendingError::LoanNotFound(LoanId(42)))
        );
    }

    #[test]
    fn test_sweep_liquidations() {
        let (mut engine, admin) = setup();
        let alice = principal("alice");
        let bob = principal("bob");
        let a = engine.request_loan(&alice, 1, 300).unwrap();
        let b = engine.request_loan(&bob, 2, 300).unwrap();
        let c = engine.request_loan(&bob, 1, 300).unwrap();

        // 350: alice 116, bob#2 233, bob#3 116
        engine.set_price(&admin, "BTC", 350).unwrap();
        let liquidated = engine.sweep_liquidations(&principal("keeper")).unwrap();

        assert_eq!(liquidated, vec![a, c]);
        assert_eq!(engine.get_loan(b).unwrap().status, LoanStatus::Active);
        assert!(engine.get_borrower_portfolio(&bob).unwrap().is_empty());
    }
}
