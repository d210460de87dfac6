//! In-process cache store with per-key leased locks
//!
//! [`MemoryStore`] implements every [`CacheStore`] capability with the
//! guarantees a distributed cache gives: a locked read is atomic, at most one
//! lock is live per key, a missing entry never blocks, and a lock whose lease
//! ran out can be taken over so a crashed holder cannot wedge a key.
//!
//! Stores can be private (`MemoryStore::new`) or shared by name
//! (`MemoryStore::named`), which mirrors several clients connecting to the
//! same named cache.

mod stats;

pub use stats::{StoreStats, StoreStatsSnapshot};

use crate::traits::CacheStore;
use async_trait::async_trait;
use cachext_core::{CreateOutcome, Error, Expiry, LockToken, LockedRead, Result};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace};
use uuid::Uuid;

/// Shortest lease granted when the caller's timeout is smaller
const MIN_LOCK_LEASE: Duration = Duration::from_secs(1);

/// Name given to stores created without one
const ANONYMOUS_STORE: &str = "memory";

static NAMED_STORES: Lazy<DashMap<String, Arc<MemoryStore>>> = Lazy::new(DashMap::new);

struct Slot {
    value: Vec<u8>,
    expires_at: Option<DateTime<Utc>>,
    lock: Option<HeldLock>,
}

struct HeldLock {
    id: Uuid,
    lease_until: Instant,
}

impl Slot {
    fn new(value: Vec<u8>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value,
            expires_at,
            lock: None,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

enum TryLock {
    Acquired(Vec<u8>, LockToken),
    NotFound,
    Held { lease_until: Instant },
}

/// Cache store kept in process memory
pub struct MemoryStore {
    name: String,
    entries: DashMap<String, Slot>,
    released: Notify,
    lock_lease: Option<Duration>,
    stats: StoreStats,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("name", &self.name)
            .field("entry_count", &self.entries.len())
            .field("lock_lease", &self.lock_lease)
            .finish()
    }
}

impl MemoryStore {
    /// Create a private, unnamed store
    pub fn new() -> Self {
        Self::with_name(ANONYMOUS_STORE)
    }

    /// Create a private store carrying `name`
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            released: Notify::new(),
            lock_lease: None,
            stats: StoreStats::default(),
        }
    }

    /// Fix the lease of every lock instead of deriving it from the caller's timeout
    pub fn with_lock_lease(mut self, lease: Duration) -> Self {
        self.lock_lease = Some(lease);
        self
    }

    /// Get the process-wide store registered under `name`, creating it on first use
    pub fn named(name: &str) -> Arc<Self> {
        NAMED_STORES
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(cache = name, "initialising named memory store");
                Arc::new(Self::with_name(name))
            })
            .value()
            .clone()
    }

    /// Drop the registry's handle on a named store
    pub fn forget_named(name: &str) -> bool {
        NAMED_STORES.remove(name).is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> StoreStatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .iter()
            .filter(|slot| !slot.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a lock with an unexpired lease is held on `key`
    pub fn is_locked(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .and_then(|slot| slot.lock.as_ref().map(|lock| lock.lease_until > now))
            .unwrap_or(false)
    }

    /// Remove every entry and wake all lock waiters
    pub fn clear(&self) {
        self.entries.clear();
        self.released.notify_waiters();
    }

    fn lease_for(&self, timeout: Duration) -> Duration {
        self.lock_lease.unwrap_or_else(|| timeout.max(MIN_LOCK_LEASE))
    }

    fn try_lock(&self, key: &str, lease: Duration) -> TryLock {
        let now = Utc::now();
        let Some(mut slot) = self.entries.get_mut(key) else {
            return TryLock::NotFound;
        };

        if slot.is_expired(now) {
            drop(slot);
            self.entries.remove_if(key, |_, slot| slot.is_expired(now));
            return TryLock::NotFound;
        }

        let instant = Instant::now();
        if let Some(lock) = &slot.lock {
            if lock.lease_until > instant {
                return TryLock::Held {
                    lease_until: lock.lease_until,
                };
            }
            self.stats.record_lease_expired();
            debug!(key, lock_id = %lock.id, "taking over lock with expired lease");
        }

        let token = LockToken::issue(key);
        slot.lock = Some(HeldLock {
            id: token.id(),
            lease_until: instant + lease,
        });
        TryLock::Acquired(slot.value.clone(), token)
    }

    fn release(&self, key: &str, token: LockToken, value: Option<Vec<u8>>) -> Result<()> {
        if token.key() != key {
            return Err(Error::lock_token_invalid(key));
        }

        {
            let Some(mut slot) = self.entries.get_mut(key) else {
                return Err(Error::lock_token_invalid(key));
            };
            match &slot.lock {
                Some(lock) if lock.id == token.id() => {}
                _ => return Err(Error::lock_token_invalid(key)),
            }

            slot.lock = None;
            match value {
                Some(value) => {
                    slot.value = value;
                    self.stats.record_write();
                }
                None => self.stats.record_unlock(),
            }
        }

        self.released.notify_waiters();
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Utc::now();
        Ok(self
            .entries
            .get(key)
            .and_then(|slot| (!slot.is_expired(now)).then(|| slot.value.clone())))
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiry: Expiry) -> Result<()> {
        let now = Utc::now();
        let expires_at = expiry.resolve(now);
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(Slot::new(value, expires_at));
                } else {
                    // A held lock survives an unlocked overwrite
                    let slot = occupied.get_mut();
                    slot.value = value;
                    slot.expires_at = expires_at;
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::new(value, expires_at));
            }
        }
        self.stats.record_write();
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let now = Utc::now();
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.released.notify_waiters();
        }
        Ok(removed.is_some_and(|(_, slot)| !slot.is_expired(now)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let now = Utc::now();
        Ok(self
            .entries
            .get(key)
            .is_some_and(|slot| !slot.is_expired(now)))
    }

    async fn locked_read(&self, key: &str, timeout: Duration) -> Result<LockedRead<Vec<u8>>> {
        self.stats.record_lock_attempt();
        let deadline = Instant::now() + timeout;
        let lease = self.lease_for(timeout);
        let mut waited = false;

        loop {
            // Register interest before looking so a release in between is not missed
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let wake_at = match self.try_lock(key, lease) {
                TryLock::Acquired(value, token) => {
                    self.stats.record_acquired(waited);
                    trace!(key, %token, "lock acquired");
                    return Ok(LockedRead::Acquired { value, token });
                }
                TryLock::NotFound => return Ok(LockedRead::NotFound),
                TryLock::Held { lease_until } => lease_until.min(deadline),
            };

            if Instant::now() >= deadline {
                self.stats.record_lock_timeout();
                return Ok(LockedRead::LockHeld);
            }

            waited = true;
            let _ = tokio::time::timeout_at(wake_at, notified).await;
        }
    }

    async fn create_if_absent(&self, key: &str, value: Vec<u8>) -> Result<CreateOutcome> {
        let now = Utc::now();
        let outcome = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(Slot::new(value, None));
                    CreateOutcome::Created
                } else {
                    CreateOutcome::AlreadyExists
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::new(value, None));
                CreateOutcome::Created
            }
        };
        self.stats.record_seed(outcome == CreateOutcome::Created);
        Ok(outcome)
    }

    async fn write_and_unlock(&self, key: &str, value: Vec<u8>, token: LockToken) -> Result<()> {
        self.release(key, token, Some(value))
    }

    async fn unlock(&self, key: &str, token: LockToken) -> Result<()> {
        self.release(key, token, None)
    }
}
