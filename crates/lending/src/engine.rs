//! Lending Engine
//!
//! Owns the whole ledger: parameters, prices, loans, portfolios and the
//! aggregate counters. Mutations take `&mut self`, so one exclusive borrow is
//! the critical section for a whole operation. Each operation runs all of its
//! checks before its first write; a failed call changes nothing.

use lendbank_core::{Amount, Asset, LoanId, Principal};
use lendbank_oracle::{PriceOracle, PriceRegistry};
use lendbank_risk::{collateral_value, required_collateral, InterestCalculator};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::{IdentityProvider, TimeSource};
use crate::config::{ConfigError, LendingConfig};
use crate::error::{LendingError, LendingResult};
use crate::events::{EventJournal, LendingEvent};
use crate::loan::Loan;
use crate::params::ProtocolParameters;
use crate::portfolio::BorrowerPortfolio;

/// Derived counters, adjusted in lockstep with the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Sum of deposits less the collateral of repaid loans; never negative
    pub total_collateral_locked: u128,
    /// Loans ever originated; also the id of the newest loan
    pub total_loans_issued: u64,
}

/// Result of a successful repayment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub loan_id: LoanId,
    pub elapsed: u64,
    pub interest: u128,
    pub total_owed: u128,
    pub paid: u64,
    pub settled_at: u64,
}

/// The lending engine
pub struct LendingEngine {
    pub(crate) admin: Principal,
    pub(crate) params: ProtocolParameters,
    pub(crate) oracle: PriceRegistry,
    pub(crate) loans: BTreeMap<LoanId, Loan>,
    pub(crate) portfolios: HashMap<Principal, BorrowerPortfolio>,
    pub(crate) stats: AggregateStats,
    pub(crate) portfolio_capacity: usize,
    pub(crate) clock: Arc<dyn TimeSource>,
    pub(crate) journal: EventJournal,
}

impl LendingEngine {
    /// Build an engine from a validated configuration
    pub fn new(config: LendingConfig, clock: Arc<dyn TimeSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        let admin = config.admin_principal()?;

        Ok(Self {
            admin,
            params: ProtocolParameters::from_config(&config),
            oracle: PriceRegistry::new(),
            loans: BTreeMap::new(),
            portfolios: HashMap::new(),
            stats: AggregateStats::default(),
            portfolio_capacity: config.portfolio_capacity,
            clock,
            journal: EventJournal::new(),
        })
    }

    /// Engine with default parameters and the given administrator
    pub fn with_admin(admin: Principal, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            admin,
            params: ProtocolParameters::default(),
            oracle: PriceRegistry::new(),
            loans: BTreeMap::new(),
            portfolios: HashMap::new(),
            stats: AggregateStats::default(),
            portfolio_capacity: crate::portfolio::DEFAULT_PORTFOLIO_CAPACITY,
            clock,
            journal: EventJournal::new(),
        }
    }

    pub(crate) fn height(&self) -> u64 {
        self.clock.current_height()
    }

    pub(crate) fn ensure_initialized(&self) -> LendingResult<()> {
        if self.params.initialized {
            Ok(())
        } else {
            Err(LendingError::NotInitialized)
        }
    }

    pub(crate) fn interest_for(&self, loan: &Loan) -> InterestCalculator {
        InterestCalculator::with_rate(loan.interest_rate, self.params.periods_per_day)
    }

    /// Raise the collateral counter by `amount`.
    ///
    /// The deposit is not credited to the caller; `request_loan` takes its
    /// collateral as an argument.
    pub fn deposit_collateral(
        &mut self,
        caller: &impl IdentityProvider,
        amount: u64,
    ) -> LendingResult<()> {
        let depositor = caller.caller_identity();
        self.ensure_initialized()?;
        let amount = Amount::new(amount)?;

        self.stats.total_collateral_locked += amount.wide();

        let height = self.height();
        self.journal.record(
            height,
            LendingEvent::CollateralDeposited {
                depositor: depositor.clone(),
                amount: amount.value(),
            },
        );
        info!(%depositor, %amount, total = self.stats.total_collateral_locked, "collateral deposited");
        Ok(())
    }

    /// Originate a loan of `loan_amount` against `collateral_amount` BTC.
    ///
    /// Returns the new loan id.
    pub fn request_loan(
        &mut self,
        caller: &impl IdentityProvider,
        collateral_amount: u64,
        loan_amount: u64,
    ) -> LendingResult<LoanId> {
        let borrower = caller.caller_identity();
        self.ensure_initialized()?;
        let collateral = Amount::new(collateral_amount)?;
        let principal = Amount::new(loan_amount)?;
        let quote = self.oracle.require_price(Asset::COLLATERAL)?;

        let value = collateral_value(collateral, quote.price);
        let required = required_collateral(principal, self.params.minimum_collateral_ratio);
        if value < required {
            return Err(LendingError::InsufficientCollateral {
                collateral_value: value,
                required,
            });
        }

        if let Some(portfolio) = self.portfolios.get(&borrower) {
            portfolio.ensure_room()?;
        }

        // Checks done; commit.
        let height = self.height();
        let id = LoanId(self.stats.total_loans_issued).next();
        let loan = Loan::originate(
            id,
            borrower.clone(),
            collateral,
            principal,
            self.params.interest_rate,
            height,
        );

        let capacity = self.portfolio_capacity;
        self.portfolios
            .entry(borrower.clone())
            .or_insert_with(|| BorrowerPortfolio::new(borrower.clone(), capacity))
            .insert(id)?;
        self.loans.insert(id, loan);
        self.stats.total_loans_issued = id.value();

        self.journal.record(
            height,
            LendingEvent::LoanOriginated {
                loan_id: id,
                borrower: borrower.clone(),
                collateral: collateral.value(),
                principal: principal.value(),
                price: quote.price,
            },
        );
        info!(loan = %id, %borrower, %collateral, %principal, price = quote.price, "loan originated");
        Ok(id)
    }

    /// Repay a loan in full: principal plus interest accrued since the last
    /// accrual height. Only the borrower may repay.
    pub fn repay_loan(
        &mut self,
        caller: &impl IdentityProvider,
        loan_id: LoanId,
        amount: u64,
    ) -> LendingResult<Settlement> {
        let caller = caller.caller_identity();
        let issued = self.stats.total_loans_issued;
        if loan_id.value() == 0 || loan_id.value() > issued {
            return Err(LendingError::InvalidLoanId { id: loan_id, issued });
        }

        let height = self.height();
        let loan = self
            .loans
            .get(&loan_id)
            .ok_or(LendingError::LoanNotFound(loan_id))?;
        loan.ensure_active()?;
        if loan.borrower != caller {
            return Err(LendingError::Unauthorized {
                caller,
                action: "repay a loan owned by another borrower",
            });
        }

        let elapsed = loan.elapsed(height);
        let calculator = self.interest_for(loan);
        let interest = calculator.interest_owed(loan.principal, elapsed);
        let total_owed = calculator.total_owed(loan.principal, elapsed);
        if (amount as u128) < total_owed {
            return Err(LendingError::InsufficientRepayment {
                owed: total_owed,
                offered: amount,
            });
        }

        // Checks done; commit.
        let loan = self
            .loans
            .get_mut(&loan_id)
            .ok_or(LendingError::LoanNotFound(loan_id))?;
        loan.settle(height)?;
        let collateral = loan.collateral_amount.wide();

        let locked = self.stats.total_collateral_locked;
        if locked < collateral {
            warn!(
                loan = %loan_id,
                locked,
                collateral,
                "collateral counter below loan collateral; clamping at zero"
            );
        }
        self.stats.total_collateral_locked = locked.saturating_sub(collateral);

        if let Some(portfolio) = self.portfolios.get_mut(&caller) {
            portfolio.remove(loan_id);
        }

        self.journal.record(
            height,
            LendingEvent::LoanRepaid {
                loan_id,
                borrower: caller.clone(),
                interest,
                paid: amount,
            },
        );
        info!(loan = %loan_id, borrower = %caller, interest, paid = amount, "loan repaid");

        Ok(Settlement {
            loan_id,
            elapsed,
            interest,
            total_owed,
            paid: amount,
            settled_at: height,
        })
    }
}
