//! Amount - Strictly positive integer wrapper for ledger quantities
//!
//! Collateral, principal and repayment amounts in LendBank are whole units
//! and MUST be strictly positive. An upper bound keeps every product the
//! engine forms (amount x price x percent) inside `u128`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when working with amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must be greater than zero")]
    Zero,

    #[error("Amount {value} exceeds maximum of {max}")]
    TooLarge { value: u64, max: u64 },
}

/// A strictly positive, bounded amount.
///
/// # Invariant
/// `0 < value <= Amount::MAX`. This is enforced by the constructor.
///
/// # Example
/// ```
/// use lendbank_core::Amount;
///
/// let amount = Amount::new(300).unwrap();
/// assert_eq!(amount.value(), 300);
///
/// // Zero is rejected
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    /// Largest accepted amount (10^15 units)
    pub const MAX: u64 = 1_000_000_000_000_000;

    /// Create a new Amount.
    ///
    /// Returns an error if the value is zero or above [`Amount::MAX`].
    pub fn new(value: u64) -> Result<Self, AmountError> {
        if value == 0 {
            Err(AmountError::Zero)
        } else if value > Self::MAX {
            Err(AmountError::TooLarge {
                value,
                max: Self::MAX,
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Get the inner value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Widen to `u128` for intermediate arithmetic
    #[inline]
    pub const fn wide(&self) -> u128 {
        self.0 as u128
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for Amount {
    type Error = AmountError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
