//! Completion tracking and position persistence.

use log::warn;

use crate::persist::{KeyValueStore, SessionStore};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub index: usize,
    /// 0.0..=100.0
    pub percent: f64,
}

impl ProgressSnapshot {
    /// Rounded percentage for compact displays.
    pub fn whole_percent(self) -> u8 {
        round_half_up(self.percent).clamp(0.0, 100.0) as u8
    }
}

/// Completion for `index` words shown out of `total`. An empty text counts as done.
pub fn snapshot(index: usize, total: usize) -> ProgressSnapshot {
    let percent = if total == 0 {
        100.0
    } else {
        ((index as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
    };

    ProgressSnapshot { index, percent }
}

// `f64::round` needs std. Inputs are non-negative.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5) as u32 as f64
}

/// Computes snapshots and writes the reading position through the store.
#[derive(Debug)]
pub struct ProgressReporter<K> {
    store: SessionStore<K>,
    failed_writes: u32,
}

impl<K: KeyValueStore> ProgressReporter<K> {
    pub const fn new(store: SessionStore<K>) -> Self {
        Self {
            store,
            failed_writes: 0,
        }
    }

    pub fn snapshot(&self, index: usize, total: usize) -> ProgressSnapshot {
        snapshot(index, total)
    }

    /// Persist `index`. Write failures are logged and counted, never fatal.
    pub fn persist(&mut self, index: usize) -> bool {
        match self.store.save_progress(index) {
            Ok(()) => true,
            Err(_) => {
                self.failed_writes = self.failed_writes.saturating_add(1);
                warn!(
                    "progress: failed to persist index={} failures={}",
                    index, self.failed_writes
                );
                false
            }
        }
    }

    pub fn failed_writes(&self) -> u32 {
        self.failed_writes
    }

    pub fn store(&self) -> &SessionStore<K> {
        &self.store
    }

    pub fn into_store(self) -> SessionStore<K> {
        self.store
    }
}
