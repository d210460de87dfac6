//! Runtime choice between a real and a disabled cache

use crate::config::CacheConfig;
use crate::core::Cache;
use crate::memory::MemoryStore;
use crate::null::NullCache;
use crate::traits::{CacheStore, CacheWrapper};
use async_trait::async_trait;
use cachext_core::{BoxError, Expiry, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A cache that is either backed by a store or turned off
pub enum CacheHandle<S: CacheStore + 'static = MemoryStore> {
    Active(Cache<S>),
    Disabled(NullCache),
}

impl<S: CacheStore + 'static> Clone for CacheHandle<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Active(cache) => Self::Active(cache.clone()),
            Self::Disabled(null) => Self::Disabled(*null),
        }
    }
}

impl<S: CacheStore + 'static> std::fmt::Debug for CacheHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active(cache) => f.debug_tuple("Active").field(cache).finish(),
            Self::Disabled(_) => f.write_str("Disabled"),
        }
    }
}

impl CacheHandle<MemoryStore> {
    /// Open the named in-memory cache from `config`, or a disabled one
    pub fn from_config(config: &CacheConfig) -> Self {
        if !config.enabled {
            info!(cache = %config.cache_name, "caching disabled");
            return Self::Disabled(NullCache::new());
        }
        let store = MemoryStore::named(&config.cache_name);
        Self::Active(Cache::from_config(store, config))
    }
}

impl<S: CacheStore + 'static> CacheHandle<S> {
    /// Use `store` when `config` enables caching
    pub fn with_store(store: Arc<S>, config: &CacheConfig) -> Self {
        if config.enabled {
            Self::Active(Cache::from_config(store, config))
        } else {
            Self::Disabled(NullCache::new())
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The underlying cache when enabled
    pub fn active(&self) -> Option<&Cache<S>> {
        match self {
            Self::Active(cache) => Some(cache),
            Self::Disabled(_) => None,
        }
    }
}

#[async_trait]
impl<S: CacheStore + 'static> CacheWrapper for CacheHandle<S> {
    async fn set<T>(&self, key: &str, value: &T, expiry: Expiry) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        match self {
            Self::Active(cache) => cache.set(key, value, expiry).await,
            Self::Disabled(null) => CacheWrapper::set(null, key, value, expiry).await,
        }
    }

    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        match self {
            Self::Active(cache) => cache.get(key).await,
            Self::Disabled(null) => CacheWrapper::get(null, key).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        match self {
            Self::Active(cache) => cache.remove(key).await,
            Self::Disabled(null) => CacheWrapper::remove(null, key).await,
        }
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<u64> {
        match self {
            Self::Active(cache) => cache.remove_many(keys).await,
            Self::Disabled(null) => CacheWrapper::remove_many(null, keys).await,
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self {
            Self::Active(cache) => cache.exists(key).await,
            Self::Disabled(null) => CacheWrapper::exists(null, key).await,
        }
    }

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
        E: Into<BoxError>,
    {
        match self {
            Self::Active(cache) => cache.update_with_lock(key, initial, mutate, timeout).await,
            Self::Disabled(null) => null.update_with_lock(key, initial, mutate, timeout).await,
        }
    }
}
