//! Loan records and their lifecycle
//!
//! ```text
//! active ──repay──▶ repaid
//!    └──liquidate──▶ liquidated
//! ```
//!
//! Both end states are terminal. Records are never deleted.

use lendbank_core::{Amount, LoanId, Principal};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{LendingError, LendingResult};

/// Lifecycle status of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Repaid,
    Liquidated,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoanStatus::Active)
    }
}

/// A single loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub borrower: Principal,
    pub collateral_amount: Amount,
    pub principal: Amount,
    /// Percent per day-equivalent, fixed at origination
    pub interest_rate: u32,
    pub origination_height: u64,
    pub last_accrual_height: u64,
    pub status: LoanStatus,
}

impl Loan {
    /// Open a new active loan at `height`
    pub fn originate(
        id: LoanId,
        borrower: Principal,
        collateral_amount: Amount,
        principal: Amount,
        interest_rate: u32,
        height: u64,
    ) -> Self {
        Self {
            id,
            borrower,
            collateral_amount,
            principal,
            interest_rate,
            origination_height: height,
            last_accrual_height: height,
            status: LoanStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Interest-bearing periods since the last accrual
    pub fn elapsed(&self, height: u64) -> u64 {
        height.saturating_sub(self.last_accrual_height)
    }

    /// Fail with `LoanNotActive` unless the loan is active
    pub fn ensure_active(&self) -> LendingResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(LendingError::LoanNotActive {
                id: self.id,
                status: self.status,
            })
        }
    }

    /// Close the loan as repaid, stamping the settlement height
    pub fn settle(&mut self, height: u64) -> LendingResult<()> {
        self.transition(LoanStatus::Repaid)?;
        self.last_accrual_height = height;
        Ok(())
    }

    /// Close the loan as liquidated
    pub fn liquidate(&mut self) -> LendingResult<()> {
        self.transition(LoanStatus::Liquidated)
    }

    fn transition(&mut self, to: LoanStatus) -> LendingResult<()> {
        self.ensure_active()?;
        self.status = to;
        Ok(())
    }
}
