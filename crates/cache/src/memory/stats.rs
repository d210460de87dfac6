//! Lock and write counters for the in-memory store

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated by [`MemoryStore`](super::MemoryStore)
#[derive(Debug, Default)]
pub struct StoreStats {
    pub lock_attempts: AtomicU64,
    pub locks_acquired: AtomicU64,
    pub contended_acquisitions: AtomicU64,
    pub lock_timeouts: AtomicU64,
    pub leases_expired: AtomicU64,
    pub seeds_created: AtomicU64,
    pub seeds_rejected: AtomicU64,
    pub writes: AtomicU64,
    pub unlocks: AtomicU64,
}

impl StoreStats {
    pub fn record_lock_attempt(&self) {
        self.lock_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_acquired(&self, waited: bool) {
        self.locks_acquired.fetch_add(1, Ordering::Relaxed);
        if waited {
            self.contended_acquisitions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_lock_timeout(&self) {
        self.lock_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lease_expired(&self) {
        self.leases_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_seed(&self, created: bool) {
        if created {
            self.seeds_created.fetch_add(1, Ordering::Relaxed);
        } else {
            self.seeds_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unlock(&self) {
        self.unlocks.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> StoreStatsSnapshot {
        StoreStatsSnapshot {
            lock_attempts: self.lock_attempts.load(Ordering::Relaxed),
            locks_acquired: self.locks_acquired.load(Ordering::Relaxed),
            contended_acquisitions: self.contended_acquisitions.load(Ordering::Relaxed),
            lock_timeouts: self.lock_timeouts.load(Ordering::Relaxed),
            leases_expired: self.leases_expired.load(Ordering::Relaxed),
            seeds_created: self.seeds_created.load(Ordering::Relaxed),
            seeds_rejected: self.seeds_rejected.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            unlocks: self.unlocks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`StoreStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStatsSnapshot {
    pub lock_attempts: u64,
    pub locks_acquired: u64,
    pub contended_acquisitions: u64,
    pub lock_timeouts: u64,
    pub leases_expired: u64,
    pub seeds_created: u64,
    pub seeds_rejected: u64,
    pub writes: u64,
    pub unlocks: u64,
}

impl StoreStatsSnapshot {
    /// Share of acquisitions that had to wait for another holder
    pub fn contention_rate(&self) -> f64 {
        if self.locks_acquired == 0 {
            0.0
        } else {
            self.contended_acquisitions as f64 / self.locks_acquired as f64
        }
    }
}
