//! Identifiers - principals and loan ids

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("Principal cannot be empty")]
    Empty,
}

/// An already-authenticated caller identity.
///
/// Opaque to the ledger: it is only ever compared for equality
/// (administrator checks, loan ownership, portfolio keys).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Result<Self, PrincipalError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(PrincipalError::Empty);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

/// Sequential loan identifier. The first loan is `LoanId(1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl LoanId {
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one
    pub const fn next(&self) -> LoanId {
        LoanId(self.0 + 1)
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for LoanId {
    fn from(id: u64) -> Self {
        LoanId(id)
    }
}
