//! LendBank Price Oracle Registry
//!
//! Holds the latest price for each supported asset. Prices are last-write-wins
//! and no history is kept. Who may write is decided by the governance layer.

mod error;
mod registry;
mod types;

pub use error::OracleError;
pub use registry::PriceRegistry;
pub use types::{PriceOracle, PriceQuote, PRICE_CEILING};
