//! Core cache types and structures

use crate::config::CacheConfig;
use crate::traits::CacheStore;
use cachext_core::DEFAULT_LOCK_TIMEOUT_SECS;
use cachext_utils::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// Typed cache over a [`CacheStore`] with lock-guarded updates
pub struct Cache<S: CacheStore + 'static> {
    pub(super) store: Arc<S>,
    pub(super) policy: RetryPolicy,
    pub(super) lock_timeout: Duration,
}

impl<S: CacheStore + 'static> Clone for Cache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
            lock_timeout: self.lock_timeout,
        }
    }
}

impl<S: CacheStore + 'static> std::fmt::Debug for Cache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy)
            .field("lock_timeout", &self.lock_timeout)
            .finish()
    }
}

impl<S: CacheStore + 'static> Cache<S> {
    /// Create a cache over `store` retrying with `policy`
    pub fn new(store: Arc<S>, policy: RetryPolicy) -> Self {
        Self {
            store,
            policy,
            lock_timeout: Duration::from_secs(DEFAULT_LOCK_TIMEOUT_SECS),
        }
    }

    /// Create a cache with the default retry policy
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, RetryPolicy::default())
    }

    /// Create a cache using the retry policy and lock timeout from `config`
    pub fn from_config(store: Arc<S>, config: &CacheConfig) -> Self {
        Self::new(store, config.retry).with_lock_timeout(config.lock_timeout)
    }

    /// Set the lock timeout used by [`Cache::update`]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}
