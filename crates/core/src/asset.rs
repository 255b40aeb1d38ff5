//! Asset - The fixed set of assets the price registry accepts
//!
//! Unlike a free-form currency code, only the listed symbols are valid.
//! Anything else is rejected at parse time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing assets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Empty asset symbol")]
    EmptySymbol,

    #[error("Unsupported asset: {0}")]
    Unsupported(String),
}

/// Supported asset symbols
///
/// # Examples
/// ```
/// use lendbank_core::Asset;
///
/// let btc: Asset = "btc".parse().unwrap();
/// assert_eq!(btc, Asset::Btc);
/// assert_eq!(btc.to_string(), "BTC");
///
/// assert!("DOGE".parse::<Asset>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Asset {
    /// Bitcoin - the collateral asset for every loan
    Btc,
    /// Stacks
    Stx,
    /// USD Coin
    Usdc,
}

impl Asset {
    /// All supported assets, in a stable order
    pub const SUPPORTED: [Asset; 3] = [Asset::Btc, Asset::Stx, Asset::Usdc];

    /// Asset that backs loans
    pub const COLLATERAL: Asset = Asset::Btc;

    /// Returns the symbol as a string slice
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Btc => "BTC",
            Asset::Stx => "STX",
            Asset::Usdc => "USDC",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Asset {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(AssetError::EmptySymbol);
        }

        match s.as_str() {
            "BTC" => Ok(Asset::Btc),
            "STX" => Ok(Asset::Stx),
            "USDC" => Ok(Asset::Usdc),
            _ => Err(AssetError::Unsupported(s)),
        }
    }
}

impl TryFrom<String> for Asset {
    type Error = AssetError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.symbol().to_string()
    }
}
