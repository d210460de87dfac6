//! Trait seams between the updater, its backing store and its callers.
//!
//! [`CacheStore`] is the capability set a distributed cache product must
//! offer: plain byte reads and writes plus an atomic lock-and-read, a
//! best-effort create, and token-checked release. [`CacheWrapper`] is the
//! typed surface application code programs against; it is implemented both
//! by the real [`Cache`](crate::core::Cache) and by the no-op
//! [`NullCache`](crate::null::NullCache).

use async_trait::async_trait;
use cachext_core::{BoxError, CreateOutcome, Expiry, LockToken, LockedRead, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Storage and locking primitives of the underlying cache
///
/// Values are opaque byte payloads. Implementations must guarantee that at
/// most one [`LockToken`] is live per key at any instant and that
/// `locked_read` returns [`LockedRead::NotFound`] without waiting when the
/// entry is absent.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read without locking
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Unconditionally overwrite an entry
    async fn set(&self, key: &str, value: Vec<u8>, expiry: Expiry) -> Result<()>;

    /// Remove an entry, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Remove several entries, returning how many existed
    async fn remove_many(&self, keys: &[&str]) -> Result<u64> {
        let mut removed = 0;
        for key in keys {
            if self.remove(key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Whether a live entry exists for `key`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Acquire the entry's lock and read its value in one step
    ///
    /// Waits at most `timeout` for a competing holder to release the lock.
    async fn locked_read(&self, key: &str, timeout: Duration) -> Result<LockedRead<Vec<u8>>>;

    /// Write `value` only if no live entry exists
    async fn create_if_absent(&self, key: &str, value: Vec<u8>) -> Result<CreateOutcome>;

    /// Store `value` and release the lock held by `token` as one step
    async fn write_and_unlock(&self, key: &str, value: Vec<u8>, token: LockToken) -> Result<()>;

    /// Release the lock held by `token` without writing
    async fn unlock(&self, key: &str, token: LockToken) -> Result<()>;
}

/// Typed cache operations shared by active and disabled caches
#[async_trait]
pub trait CacheWrapper: Send + Sync {
    /// Store a value
    async fn set<T>(&self, key: &str, value: &T, expiry: Expiry) -> Result<()>
    where
        T: Serialize + Send + Sync;

    /// Read a value
    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Remove a value, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Remove several values, returning how many existed
    async fn remove_many(&self, keys: &[&str]) -> Result<u64>;

    /// Whether a value exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Update a value under the entry's lock
    ///
    /// Seeds the entry with `initial()` when it does not exist, applies
    /// `mutate` to the current value, writes the result back and releases the
    /// lock. When `mutate` returns `Ok(None)` the entry is reset to
    /// `initial()`. `initial` must always return a value; `None` fails the
    /// call with an `InvalidInput` error.
    async fn update_with_lock<T, I, M, E>(
        &self,
        key: &str,
        initial: I,
        mutate: M,
        timeout: Duration,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        I: Fn() -> Option<T> + Send + Sync,
        M: FnOnce(T) -> std::result::Result<Option<T>, E> + Send,
        E: Into<BoxError>;
}
