//! Core oracle types

use lendbank_core::Asset;
use serde::{Deserialize, Serialize};

use crate::OracleError;

/// Economic ceiling for any quoted price
pub const PRICE_CEILING: u64 = 1_000_000_000_000;

/// A price quote with metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// The priced asset
    pub asset: Asset,
    /// Latest price, in whole quote units
    pub price: u64,
    /// Logical height at which the quote was written
    pub updated_at: u64,
}

impl PriceQuote {
    /// Create a quote, validating `0 < price <= PRICE_CEILING`
    pub fn new(asset: Asset, price: u64, updated_at: u64) -> Result<Self, OracleError> {
        if price == 0 || price > PRICE_CEILING {
            return Err(OracleError::InvalidPrice {
                asset,
                price,
                ceiling: PRICE_CEILING,
            });
        }
        Ok(Self {
            asset,
            price,
            updated_at,
        })
    }

    /// Number of logical periods since the quote was written
    pub fn age(&self, current_height: u64) -> u64 {
        current_height.saturating_sub(self.updated_at)
    }
}

/// Price Oracle trait - read interface for price lookups
///
/// The lending engine only reads through this trait, so a registry fed by
/// governance and any other source look the same to ratio computations.
pub trait PriceOracle: Send + Sync {
    /// Get the latest quote for an asset, if one was ever set
    fn get_price(&self, asset: Asset) -> Option<PriceQuote>;

    /// Get the latest quote or fail with [`OracleError::PriceNotSet`]
    fn require_price(&self, asset: Asset) -> Result<PriceQuote, OracleError> {
        self.get_price(asset)
            .ok_or(OracleError::PriceNotSet { asset })
    }

    /// Assets the oracle can quote
    fn supported_assets(&self) -> &'static [Asset] {
        &Asset::SUPPORTED
    }

    /// Check if an asset is supported
    fn is_supported(&self, asset: Asset) -> bool {
        self.supported_assets().contains(&asset)
    }
}
