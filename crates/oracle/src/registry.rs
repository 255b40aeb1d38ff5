//! Price registry
//!
//! Owned, in-memory store of the latest quote per asset.

use lendbank_core::Asset;
use std::collections::HashMap;
use tracing::debug;

use crate::error::OracleError;
use crate::types::{PriceOracle, PriceQuote};

/// Latest-price registry
///
/// Stores one quote per asset; a new quote replaces the previous one.
#[derive(Debug, Clone, Default)]
pub struct PriceRegistry {
    /// Stored prices (asset -> quote)
    prices: HashMap<Asset, PriceQuote>,
}

impl PriceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price for an asset, overwriting any earlier quote.
    ///
    /// Returns the previous quote, if there was one.
    pub fn set_price(
        &mut self,
        asset: Asset,
        price: u64,
        height: u64,
    ) -> Result<Option<PriceQuote>, OracleError> {
        let quote = PriceQuote::new(asset, price, height)?;
        debug!(%asset, price, height, "price quote updated");
        Ok(self.prices.insert(asset, quote))
    }

    /// All quotes, ordered by asset
    pub fn quotes(&self) -> Vec<PriceQuote> {
        let mut quotes: Vec<_> = self.prices.values().copied().collect();
        quotes.sort_by_key(|q| q.asset);
        quotes
    }
}

impl PriceOracle for PriceRegistry {
    fn get_price(&self, asset: Asset) -> Option<PriceQuote> {
        self.prices.get(&asset).copied()
    }
}
