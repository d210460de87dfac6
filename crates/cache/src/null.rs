//! Cache that stores nothing, used when caching is turned off

use crate::traits::CacheWrapper;
use async_trait::async_trait;
use cachext_core::{BoxError, Error, Expiry, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// A [`CacheWrapper`] with no storage and no locking
///
/// Reads miss, writes are dropped, and `update_with_lock` simply returns
/// `mutate(initial())`, or `initial()` when the mutation yields nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheWrapper for NullCache {
    async fn set<T>(&self, _key: &str, _value: &T, _expiry: Expiry) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        Ok(())
    }

    async fn get<T>(&self, _key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Ok(None)
    }

    async fn remove(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn remove_many(&self, _keys: &[&str]) -> Result<u64> {
        Ok(0)
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn update_with_lock<T, I, M, E>(
        &self,
        key: &str,
        initial: I,
        mutate: M,
        _timeout: Duration,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        I: Fn() -> Option<T> + Send + Sync,
        M: FnOnce(T) -> std::result::Result<Option<T>, E> + Send,
        E: Into<BoxError>,
    {
        let missing = || Error::invalid_input(key, "initial value function returned nothing");
        let seed = initial().ok_or_else(missing)?;
        match mutate(seed) {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => initial().ok_or_else(missing),
            Err(err) => Err(Error::mutation_fault(key, err)),
        }
    }
}
