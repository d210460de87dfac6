//! Plain reads and writes that pass straight through to the store

use crate::core::types::Cache;
use crate::serialization::{decode, encode};
use crate::traits::CacheStore;
use cachext_core::{Expiry, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use super::validate_key;

impl<S: CacheStore + 'static> Cache<S> {
    /// Store a value, replacing any existing one
    pub async fn set<T>(&self, key: &str, value: &T, expiry: Expiry) -> Result<()>
    where
        T: Serialize + ?Sized + Sync,
    {
        validate_key(key)?;
        let bytes = encode(key, value)?;
        self.store.set(key, bytes, expiry).await
    }

    /// Store a value that expires at `expires_at`
    pub async fn set_until<T>(&self, key: &str, value: &T, expires_at: DateTime<Utc>) -> Result<()>
    where
        T: Serialize + ?Sized + Sync,
    {
        self.set(key, value, Expiry::At(expires_at)).await
    }

    /// Store a value that stays valid for `valid_for`
    pub async fn set_for<T>(&self, key: &str, value: &T, valid_for: Duration) -> Result<()>
    where
        T: Serialize + ?Sized + Sync,
    {
        self.set(key, value, Expiry::After(valid_for)).await
    }

    /// Read a value
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        validate_key(key)?;
        match self.store.get(key).await? {
            Some(bytes) => decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Remove a value, returning whether it existed
    pub async fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        self.store.remove(key).await
    }

    /// Remove several values, returning how many existed
    pub async fn remove_many(&self, keys: &[&str]) -> Result<u64> {
        for key in keys {
            validate_key(key)?;
        }
        self.store.remove_many(keys).await
    }

    /// Whether a value exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        self.store.exists(key).await
    }
}
