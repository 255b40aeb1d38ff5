//! Collaborator seams: logical time and caller identity
//!
//! The engine never waits on either. A time source is read once per
//! operation, and callers arrive already authenticated.

use lendbank_core::Principal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current logical height.
///
/// Implementations must be monotonically non-decreasing.
pub trait TimeSource: Send + Sync {
    fn current_height(&self) -> u64;
}

/// Source of the authenticated caller for an operation
pub trait IdentityProvider {
    fn caller_identity(&self) -> Principal;
}

impl IdentityProvider for Principal {
    fn caller_identity(&self) -> Principal {
        self.clone()
    }
}

/// A clock driven by hand (tests, scripted runs)
///
/// `set` never moves the height backwards.
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            height: AtomicU64::new(start),
        }
    }

    /// Move to `height`, or stay put if it is in the past.
    ///
    /// Returns the height now in effect.
    pub fn set(&self, height: u64) -> u64 {
        let previous = self.height.fetch_max(height, Ordering::SeqCst);
        previous.max(height)
    }

    /// Advance by `periods` and return the new height.
    ///
    /// Saturates at `u64::MAX`.
    pub fn advance(&self, periods: u64) -> u64 {
        let previous = self
            .height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                Some(h.saturating_add(periods))
            })
            .unwrap_or_else(|h| h);
        previous.saturating_add(periods)
    }
}

impl TimeSource for ManualClock {
    fn current_height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.advance(144), 154);
        assert_eq!(clock.current_height(), 154);
    }

    #[test]
    fn test_manual_clock_advance_saturates() {
        let clock = ManualClock::new(u64::MAX - 1);
        assert_eq!(clock.advance(10), u64::MAX);
        assert_eq!(clock.current_height(), u64::MAX);
        assert_eq!(clock.advance(1), u64::MAX);
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.set(50), 100);
        assert_eq!(clock.current_height(), 100);
        assert_eq!(clock.set(200), 200);
    }

    #[test]
    fn test_principal_is_its_own_identity() {
        let alice = Principal::new("alice").unwrap();
        assert_eq!(alice.caller_identity(), alice);
    }
}
