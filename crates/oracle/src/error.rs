//! Oracle error types

use lendbank_core::Asset;
use thiserror::Error;

/// Oracle-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// No price has been set for the asset yet
    #[error("Price not set for {asset}")]
    PriceNotSet { asset: Asset },

    /// Price is zero or above the ceiling
    #[error("Invalid price for {asset}: {price} (must be in 1..={ceiling})")]
    InvalidPrice { asset: Asset, price: u64, ceiling: u64 },
}
