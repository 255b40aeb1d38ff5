//! Lending errors

use lendbank_core::{AmountError, Asset, AssetError, LoanId, Principal};
use lendbank_oracle::OracleError;
use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;

use crate::loan::LoanStatus;

/// Broad error categories a caller can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Caller lacks the required role or ownership
    Authorization,
    /// Operation invalid for the current lifecycle phase
    State,
    /// Malformed or out-of-range input
    Validation,
    /// Referenced record does not exist
    Resource,
}

/// Errors from lending, liquidation and governance operations.
///
/// Every failing operation leaves the ledger exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LendingError {
    #[error("{caller} is not authorized to {action}")]
    Unauthorized {
        caller: Principal,
        action: &'static str,
    },

    #[error("Platform not initialized")]
    NotInitialized,

    #[error("Platform already initialized")]
    AlreadyInitialized,

    #[error("Loan {id} is not active (status: {status})")]
    LoanNotActive { id: LoanId, status: LoanStatus },

    #[error("Price not set for {asset}")]
    PriceNotSet { asset: Asset },

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Loan id {id} out of range (issued: {issued})")]
    InvalidLoanId { id: LoanId, issued: u64 },

    #[error("Invalid asset: {0}")]
    InvalidAsset(#[from] AssetError),

    #[error("Invalid price for {asset}: {price} (must be in 1..={ceiling})")]
    InvalidPrice { asset: Asset, price: u64, ceiling: u64 },

    #[error("Invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: u32,
        reason: &'static str,
    },

    #[error("Insufficient collateral: value {collateral_value}, required {required}")]
    InsufficientCollateral { collateral_value: u128, required: u128 },

    #[error("Insufficient repayment: owed {owed}, offered {offered}")]
    InsufficientRepayment { owed: u128, offered: u64 },

    #[error("Portfolio of {borrower} is full ({capacity} active loans)")]
    PortfolioFull { borrower: Principal, capacity: usize },

    #[error("Loan not found: {0}")]
    LoanNotFound(LoanId),
}

impl LendingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::Unauthorized { .. } => ErrorKind::Authorization,
            LendingError::NotInitialized
            | LendingError::AlreadyInitialized
            | LendingError::LoanNotActive { .. }
            | LendingError::PriceNotSet { .. } => ErrorKind::State,
            LendingError::InvalidAmount(_)
            | LendingError::InvalidLoanId { .. }
            | LendingError::InvalidAsset(_)
            | LendingError::InvalidPrice { .. }
            | LendingError::InvalidParameter { .. }
            | LendingError::InsufficientCollateral { .. }
            | LendingError::InsufficientRepayment { .. }
            | LendingError::PortfolioFull { .. } => ErrorKind::Validation,
            LendingError::LoanNotFound(_) => ErrorKind::Resource,
        }
    }
}

impl From<OracleError> for LendingError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::PriceNotSet { asset } => LendingError::PriceNotSet { asset },
            OracleError::InvalidPrice {
                asset,
                price,
                ceiling,
            } => LendingError::InvalidPrice {
                asset,
                price,
                ceiling,
            },
        }
    }
}

/// Result type for lending operations
pub type LendingResult<T> = Result<T, LendingError>;
