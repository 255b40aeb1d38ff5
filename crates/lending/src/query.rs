//! Query Interface
//!
//! Read-only projections. Nothing here mutates state or fails; unknown keys
//! yield `None` or an empty result.

use lendbank_core::{Asset, LoanId, Principal};
use lendbank_oracle::{PriceOracle, PriceQuote};
use lendbank_risk::{collateral_ratio, precise_ratio, HealthCheck};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::{AggregateStats, LendingEngine};
use crate::events::EventJournal;
use crate::loan::{Loan, LoanStatus};
use crate::params::ProtocolParameters;
use crate::portfolio::BorrowerPortfolio;

/// Amount needed to repay an active loan right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentQuote {
    pub loan_id: LoanId,
    pub principal: u64,
    pub elapsed: u64,
    pub interest: u128,
    pub total_owed: u128,
    /// Loan rate as a daily fraction (5% -> 0.05)
    pub daily_rate: Decimal,
    /// Simple annualized rate
    pub annual_rate: Decimal,
}

/// Collateral health of an active loan at the current price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanHealth {
    pub loan_id: LoanId,
    pub price: u64,
    /// Periods since the BTC price was last set
    pub price_age: u64,
    /// Whole-percent ratio, as used by the liquidation check
    pub ratio: u128,
    /// Two-decimal ratio for display
    pub precise_ratio: Option<Decimal>,
    pub liquidation_threshold: u32,
    pub health: HealthCheck,
}

impl LendingEngine {
    pub fn get_loan(&self, loan_id: LoanId) -> Option<&Loan> {
        self.loans.get(&loan_id)
    }

    pub fn get_borrower_portfolio(&self, borrower: &Principal) -> Option<&BorrowerPortfolio> {
        self.portfolios.get(borrower)
    }

    pub fn get_aggregate_stats(&self) -> AggregateStats {
        self.stats
    }

    pub fn get_supported_assets(&self) -> &'static [Asset] {
        self.oracle.supported_assets()
    }

    pub fn get_parameters(&self) -> &ProtocolParameters {
        &self.params
    }

    pub fn get_price(&self, asset: Asset) -> Option<PriceQuote> {
        self.oracle.get_price(asset)
    }

    /// Every quote that has been set, ordered by asset
    pub fn get_prices(&self) -> Vec<PriceQuote> {
        self.oracle.quotes()
    }

    /// The fixed administrator
    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    pub fn events(&self) -> &EventJournal {
        &self.journal
    }

    /// Loans with the given status, in id order
    pub fn loans_by_status(&self, status: LoanStatus) -> Vec<&Loan> {
        self.loans
            .values()
            .filter(|loan| loan.status == status)
            .collect()
    }

    /// Amount owed on an active loan at the current height
    pub fn repayment_quote(&self, loan_id: LoanId) -> Option<RepaymentQuote> {
        let loan = self.loans.get(&loan_id).filter(|loan| loan.is_active())?;
        let elapsed = loan.elapsed(self.height());
        let calculator = self.interest_for(loan);

        Some(RepaymentQuote {
            loan_id,
            principal: loan.principal.value(),
            elapsed,
            interest: calculator.interest_owed(loan.principal, elapsed),
            total_owed: calculator.total_owed(loan.principal, elapsed),
            daily_rate: calculator.daily_rate(),
            annual_rate: calculator.annual_rate(),
        })
    }

    /// Health of an active loan; `None` if the loan is unknown or closed, or
    /// no BTC price is set
    pub fn loan_health(&self, loan_id: LoanId) -> Option<LoanHealth> {
        let loan = self.loans.get(&loan_id).filter(|loan| loan.is_active())?;
        let quote = self.oracle.get_price(Asset::COLLATERAL)?;
        let ratio = collateral_ratio(loan.collateral_amount, quote.price, loan.principal);
        let threshold = self.params.liquidation_threshold;

        Some(LoanHealth {
            loan_id,
            price: quote.price,
            price_age: quote.age(self.height()),
            ratio,
            precise_ratio: precise_ratio(loan.collateral_amount, quote.price, loan.principal),
            liquidation_threshold: threshold,
            health: HealthCheck::evaluate(ratio, threshold),
        })
    }

    /// Active loans currently at or below the liquidation threshold
    pub fn liquidatable_loans(&self) -> Vec<LoanId> {
        self.loans
            .keys()
            .filter_map(|&id| self.loan_health(id))
            .filter(|health| health.health.is_liquidatable())
            .map(|health| health.loan_id)
            .collect()
    }
}
