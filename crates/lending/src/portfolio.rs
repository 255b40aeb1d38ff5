//! Borrower Index
//!
//! Each borrower has a bounded, insertion-ordered set of active loan ids.
//! The record is created on first loan and kept even when it empties.

use lendbank_core::{LoanId, Principal};
use serde::{Deserialize, Serialize};

use crate::error::{LendingError, LendingResult};

/// Default number of active loans a borrower may hold
pub const DEFAULT_PORTFOLIO_CAPACITY: usize = 10;

/// Active loan ids of one borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerPortfolio {
    pub borrower: Principal,
    loans: Vec<LoanId>,
    capacity: usize,
}

impl BorrowerPortfolio {
    pub fn new(borrower: Principal, capacity: usize) -> Self {
        Self {
            borrower,
            loans: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn loans(&self) -> &[LoanId] {
        &self.loans
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.loans.len() >= self.capacity
    }

    pub fn contains(&self, id: LoanId) -> bool {
        self.loans.contains(&id)
    }

    /// Fail with `PortfolioFull` if another id would not fit
    pub fn ensure_room(&self) -> LendingResult<()> {
        if self.is_full() {
            return Err(LendingError::PortfolioFull {
                borrower: self.borrower.clone(),
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Append an id. Inserting an id already present is a no-op.
    pub fn insert(&mut self, id: LoanId) -> LendingResult<()> {
        if self.contains(id) {
            return Ok(());
        }
        self.ensure_room()?;
        self.loans.push(id);
        Ok(())
    }

    /// Remove an id, keeping the order of the rest. Returns whether it was present.
    pub fn remove(&mut self, id: LoanId) -> bool {
        match self.loans.iter().position(|&l| l == id) {
            Some(index) => {
                self.loans.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every id. Returns the ids removed.
    pub fn clear(&mut self) -> Vec<LoanId> {
        std::mem::take(&mut self.loans)
    }
}
