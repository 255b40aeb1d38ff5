//! LendBank Core - Domain types
//!
//! This crate contains the fundamental types used across LendBank:
//! - `Amount`: Strictly positive, bounded integer quantity
//! - `Asset`: The fixed set of priced assets
//! - `Principal`: Authenticated caller identity
//! - `LoanId`: Sequential loan identifier

pub mod amount;
pub mod asset;
pub mod identity;

pub use amount::{Amount, AmountError};
pub use asset::{Asset, AssetError};
pub use identity::{LoanId, Principal, PrincipalError};
