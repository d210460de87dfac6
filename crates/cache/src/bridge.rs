//! Blocking access to the async cache
//!
//! [`SyncCache`] lets callers on plain OS threads use a [`Cache`] by driving
//! each call to completion on a tokio runtime, either one it owns or one it
//! was handed.

use crate::core::Cache;
use crate::memory::MemoryStore;
use crate::traits::CacheStore;
use cachext_core::{BoxError, Error, Expiry, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};

/// Worker threads of a runtime created by [`SyncCache::new`]
const BRIDGE_WORKER_THREADS: usize = 2;

/// Sync wrapper for the async cache
///
/// Calls block the current thread and must not be made from inside an async
/// task. A `SyncCache` that owns its runtime must also be dropped outside of
/// one.
pub struct SyncCache<S: CacheStore + 'static = MemoryStore> {
    cache: Cache<S>,
    runtime: RuntimeHandle,
}

/// Handle to a Tokio runtime
enum RuntimeHandle {
    /// We own the runtime
    Owned(Runtime),
    /// We're using an existing runtime
    Borrowed(Handle),
}

impl<S: CacheStore + 'static> SyncCache<S> {
    /// Create a sync cache with its own runtime
    pub fn new(cache: Cache<S>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(BRIDGE_WORKER_THREADS)
            .thread_name("cachext-bridge")
            .enable_all()
            .build()
            .map_err(|e| Error::configuration(format!("failed to create runtime: {e}")))?;

        Ok(Self {
            cache,
            runtime: RuntimeHandle::Owned(runtime),
        })
    }

    /// Create a sync cache driven by an existing runtime
    ///
    /// Intended for threads started with `spawn_blocking` or outside the
    /// runtime entirely.
    pub fn with_handle(cache: Cache<S>, handle: Handle) -> Self {
        Self {
            cache,
            runtime: RuntimeHandle::Borrowed(handle),
        }
    }

    /// Create a sync cache using the current async runtime
    pub fn from_current(cache: Cache<S>) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|_| Error::configuration("no async runtime found, use SyncCache::new"))?;
        Ok(Self::with_handle(cache, handle))
    }

    pub fn cache(&self) -> &Cache<S> {
        &self.cache
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match &self.runtime {
            RuntimeHandle::Owned(runtime) => runtime.block_on(future),
            RuntimeHandle::Borrowed(handle) => handle.block_on(future),
        }
    }

    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.block_on(self.cache.get(key))
    }

    pub fn set<T>(&self, key: &str, value: &T, expiry: Expiry) -> Result<()>
    where
        T: Serialize + ?Sized + Sync,
    {
        self.block_on(self.cache.set(key, value, expiry))
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        self.block_on(self.cache.remove(key))
    }

    pub fn remove_many(&self, keys: &[&str]) -> Result<u64> {
        self.block_on(self.cache.remove_many(keys))
    }

    pub fn exists(&self, key: &str) -> Result<bool> {
        self.block_on(self.cache.exists(key))
    }

    /// Blocking [`Cache::update_with_lock`]
    pub fn update_with_lock<T, I, M, E>(
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
        E: Into<BoxError>,
    {
        self.block_on(self.cache.update_with_lock(key, initial, mutate, timeout))
    }

    /// Blocking [`Cache::update`]
    pub fn update<T, I, M, E>(&self, key: &str, initial: I, mutate: M) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        I: Fn() -> Option<T> + Send + Sync,
        M: FnOnce(T) -> std::result::Result<Option<T>, E> + Send,
        E: Into<BoxError>,
    {
        self.block_on(self.cache.update(key, initial, mutate))
    }
}

impl<S: CacheStore + 'static> fmt::Debug for SyncCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runtime = match self.runtime {
            RuntimeHandle::Owned(_) => "owned",
            RuntimeHandle::Borrowed(_) => "borrowed",
        };
        f.debug_struct("SyncCache")
            .field("cache", &self.cache)
            .field("runtime", &runtime)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn append(n: u32) -> impl FnOnce(String) -> std::result::Result<Option<String>, BoxError> {
        move |x| {
            Ok(Some(if x.is_empty() {
                n.to_string()
            } else {
                format!("{x};{n}")
            }))
        }
    }

    #[test]
    fn test_sync_cache_operations() -> Result<()> {
        let cache = SyncCache::new(Cache::with_defaults(Arc::new(MemoryStore::new())))?;

        cache.set("key1", "value1", Expiry::Never)?;
        let value: Option<String> = cache.get("key1")?;
        assert_eq!(value, Some("value1".to_string()));

        assert!(cache.exists("key1")?);
        assert!(cache.remove("key1")?);
        assert!(!cache.exists("key1")?);
        Ok(())
    }

    #[test]
    fn test_concurrent_updates_from_threads() {
        const THREADS: u32 = 16;
        let cache = Arc::new(
            SyncCache::new(Cache::with_defaults(Arc::new(MemoryStore::new()))).unwrap(),
        );
        let barrier = Arc::new(Barrier::new(THREADS as usize));

        let handles: Vec<_> = (1..=THREADS)
            .map(|n| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .update("list", || Some(String::new()), append(n))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let value: String = cache.get("list").unwrap().unwrap();
        let parts: HashSet<u32> = value.split(';').map(|p| p.parse().unwrap()).collect();
        assert_eq!(value.split(';').count(), THREADS as usize);
        assert_eq!(parts, (1..=THREADS).collect());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sync_cache_from_async_context() {
        let store = Arc::new(MemoryStore::new());
        let sync_cache = SyncCache::from_current(Cache::with_defaults(Arc::clone(&store))).unwrap();

        let value = tokio::task::spawn_blocking(move || {
            sync_cache
                .update_with_lock("k", || Some(1u32), |v| Ok::<_, BoxError>(Some(v + 1)), Duration::from_secs(1))
                .unwrap()
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
        assert!(!store.is_locked("k"));
    }

    #[test]
    fn test_from_current_requires_runtime() {
        let err = SyncCache::from_current(Cache::with_defaults(Arc::new(MemoryStore::new())))
            .unwrap_err();
        assert_eq!(err.kind(), cachext_core::ErrorKind::Configuration);
    }
}
