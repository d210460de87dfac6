//! Tests for the typed cache and its update loop

mod basic;

use crate::core::Cache;
use crate::memory::MemoryStore;
use crate::traits::CacheStore;
use async_trait::async_trait;
use cachext_core::{BoxError, CreateOutcome, Error, Expiry, LockToken, LockedRead, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(super) fn memory_cache() -> (Arc<MemoryStore>, Cache<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let cache = Cache::with_defaults(Arc::clone(&store));
    (store, cache)
}

/// Mutation that appends `n` to a `;`-separated list
pub(super) fn append(n: u32) -> impl FnOnce(String) -> std::result::Result<Option<String>, BoxError> {
    move |x| {
        Ok(Some(if x.is_empty() {
            n.to_string()
        } else {
            format!("{x};{n}")
        }))
    }
}

pub(super) fn empty() -> Option<String> {
    Some(String::new())
}

/// Assert `value` lists each of `1..=count` exactly once
pub(super) fn assert_all_parts(value: &str, count: u32) {
    let parts: Vec<u32> = value
        .split(';')
        .map(|p| p.parse().unwrap_or_else(|_| panic!("bad part {p:?} in {value:?}")))
        .collect();
    assert_eq!(parts.len(), count as usize, "value was {value:?}");
    let unique: HashSet<u32> = parts.into_iter().collect();
    assert_eq!(unique, (1..=count).collect::<HashSet<_>>());
}

pub(super) const LONG_TIMEOUT: Duration = Duration::from_secs(60);

/// Store whose first `failures` seed writes fail
pub(super) struct FlakySeedStore {
    inner: MemoryStore,
    failures: AtomicU32,
}

impl FlakySeedStore {
    pub(super) fn new(failures: u32) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicU32::new(failures),
        }
    }

    pub(super) fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl CacheStore for FlakySeedStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiry: Expiry) -> Result<()> {
        self.inner.set(key, value, expiry).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        self.inner.remove(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn locked_read(&self, key: &str, timeout: Duration) -> Result<LockedRead<Vec<u8>>> {
        self.inner.locked_read(key, timeout).await
    }

    async fn create_if_absent(&self, key: &str, value: Vec<u8>) -> Result<CreateOutcome> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::store("create", "connection reset"));
        }
        self.inner.create_if_absent(key, value).await
    }

    async fn write_and_unlock(&self, key: &str, value: Vec<u8>, token: LockToken) -> Result<()> {
        self.inner.write_and_unlock(key, value, token).await
    }

    async fn unlock(&self, key: &str, token: LockToken) -> Result<()> {
        self.inner.unlock(key, token).await
    }
}

/// Store whose locked write-back suspends for `delay` before landing
pub(super) struct SlowCommitStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowCommitStore {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }

    pub(super) fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl CacheStore for SlowCommitStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, expiry: Expiry) -> Result<()> {
        self.inner.set(key, value, expiry).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        self.inner.remove(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn locked_read(&self, key: &str, timeout: Duration) -> Result<LockedRead<Vec<u8>>> {
        self.inner.locked_read(key, timeout).await
    }

    async fn create_if_absent(&self, key: &str, value: Vec<u8>) -> Result<CreateOutcome> {
        self.inner.create_if_absent(key, value).await
    }

    async fn write_and_unlock(&self, key: &str, value: Vec<u8>, token: LockToken) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.write_and_unlock(key, value, token).await
    }

    async fn unlock(&self, key: &str, token: LockToken) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.unlock(key, token).await
    }
}
