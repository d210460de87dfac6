//! CacheWrapper implementation for Cache

use crate::traits::{CacheStore, CacheWrapper};
use async_trait::async_trait;
use cachext_core::{BoxError, Expiry, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use super::types::Cache;

#[async_trait]
impl<S: CacheStore + 'static> CacheWrapper for Cache<S> {
    async fn set<T>(&self, key: &str, value: &T, expiry: Expiry) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        Cache::set(self, key, value, expiry).await
    }

    async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Cache::get(self, key).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Cache::remove(self, key).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<u64> {
        Cache::remove_many(self, keys).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Cache::exists(self, key).await
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
        Cache::update_with_lock(self, key, initial, mutate, timeout).await
    }
}
