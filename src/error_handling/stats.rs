//! Dispatch outcome statistics.
//!
//! Thread-safe counters of terminal outcomes, shared between the dispatcher
//! and whoever reports on a run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::OutcomeKind;

/// Thread-safe outcome statistics tracker.
///
/// Every `OutcomeKind` is initialized to zero on creation, so counters can be
/// incremented concurrently without locking.
pub struct DispatchStats {
    outcomes: HashMap<OutcomeKind, AtomicUsize>,
}

impl DispatchStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        let mut outcomes = HashMap::new();
        for kind in OutcomeKind::iter() {
            outcomes.insert(kind, AtomicUsize::new(0));
        }
        DispatchStats { outcomes }
    }

    /// Increment the counter for an outcome.
    pub fn increment(&self, kind: OutcomeKind) {
        if let Some(counter) = self.outcomes.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment outcome counter for {:?} which is not in the map",
                kind
            );
        }
    }

    /// Get the count for an outcome.
    pub fn get_count(&self, kind: OutcomeKind) -> usize {
        self.outcomes
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total number of terminal outcomes recorded.
    pub fn total(&self) -> usize {
        OutcomeKind::iter().map(|kind| self.get_count(kind)).sum()
    }

    /// Number of outcomes other than success.
    pub fn failed(&self) -> usize {
        OutcomeKind::iter()
            .filter(|kind| !kind.is_success())
            .map(|kind| self.get_count(kind))
            .sum()
    }

    /// Logs the non-zero counters, one line per outcome kind.
    pub fn log_summary(&self) {
        log::info!(
            "Dispatch statistics: total={}, succeeded={}, failed={}",
            self.total(),
            self.get_count(OutcomeKind::Succeeded),
            self.failed()
        );
        for kind in OutcomeKind::iter() {
            let count = self.get_count(kind);
            if count > 0 && !kind.is_success() {
                log::info!("   {}: {}", kind.as_str(), count);
            }
        }
    }
}

impl Default for DispatchStats {
    fn default() -> Self {
        Self::new()
    }
}
