//! LendBank Lending - Collateralized loan ledger
//!
//! Borrowers lock BTC collateral and draw loans against it. The engine keeps
//! the loan ledger, a per-borrower portfolio index, admin-tunable risk
//! parameters and a price registry. Anyone may trigger a liquidation check.
//!
//! All state lives in [`LendingEngine`]. Time comes from a [`TimeSource`]
//! measured in block heights; callers are identified through
//! [`IdentityProvider`].

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod governance;
pub mod liquidation;
pub mod loan;
pub mod params;
pub mod portfolio;
pub mod query;

pub use clock::{IdentityProvider, ManualClock, TimeSource};
pub use config::{ConfigError, LendingConfig};
pub use engine::{AggregateStats, LendingEngine, Settlement};
pub use error::{ErrorKind, LendingError, LendingResult};
pub use events::{EventJournal, EventRecord, LendingEvent};
pub use liquidation::LiquidationOutcome;
pub use loan::{Loan, LoanStatus};
pub use params::{Parameter, ProtocolParameters};
pub use portfolio::BorrowerPortfolio;
pub use query::{LoanHealth, RepaymentQuote};
