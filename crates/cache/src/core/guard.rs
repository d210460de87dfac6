//! Scoped ownership of a key's lock
//!
//! A [`LockGuard`] is created from a successful locked read and must end in
//! exactly one of `finish` (commit the update or release on fault). If it is
//! dropped instead, because the mutation panicked or the update future was
//! cancelled, it schedules an unlock on the ambient runtime.
//!
//! Once `finish` hands the token to the store, the store call runs as its own
//! task. Cancelling the update while that call is pending does not abandon
//! the token: the commit or release still completes in the background.

use crate::serialization::encode;
use crate::traits::CacheStore;
use cachext_core::{Error, LockToken, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Result of running caller code while the lock is held
#[derive(Debug)]
pub enum MutationOutcome<T> {
    /// Write this value back
    Updated(T),
    /// Release the lock and surface this error
    Faulted(Error),
}

pub(crate) struct LockGuard<S: CacheStore + 'static> {
    store: Arc<S>,
    key: String,
    token: Option<LockToken>,
}

impl<S: CacheStore + 'static> LockGuard<S> {
    pub(crate) fn new(store: Arc<S>, key: &str, token: LockToken) -> Self {
        Self {
            store,
            key: key.to_string(),
            token: Some(token),
        }
    }

    /// Commit an update or release after a fault
    ///
    /// A fault always wins over a failure to unlock; the unlock failure is
    /// only logged.
    pub(crate) async fn finish<T>(mut self, outcome: MutationOutcome<T>) -> Result<T>
    where
        T: Serialize,
    {
        let Some(token) = self.token.take() else {
            return Err(Error::lock_token_invalid(&self.key));
        };

        match outcome {
            MutationOutcome::Updated(value) => match encode(&self.key, &value) {
                Ok(bytes) => {
                    self.settle(token, Some(bytes)).await?;
                    debug!(key = %self.key, "update committed");
                    Ok(value)
                }
                Err(err) => Err(self.release_after(token, err).await),
            },
            MutationOutcome::Faulted(err) => Err(self.release_after(token, err).await),
        }
    }

    async fn release_after(&self, token: LockToken, err: Error) -> Error {
        if let Err(unlock_err) = self.settle(token, None).await {
            warn!(
                key = %self.key,
                error = %unlock_err,
                "failed to release lock after aborted update"
            );
        }
        debug!(key = %self.key, error = %err, "update aborted, lock released");
        err
    }

    /// Write back and unlock, or only unlock when `value` is `None`
    async fn settle(&self, token: LockToken, value: Option<Vec<u8>>) -> Result<()> {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let call = async move {
            match value {
                Some(bytes) => store.write_and_unlock(&key, bytes, token).await,
                None => store.unlock(&key, token).await,
            }
        };

        match Handle::try_current() {
            Ok(handle) => handle.spawn(call).await.map_err(|e| {
                Error::store("unlock", format!("lock release task for '{}' failed: {e}", self.key))
            })?,
            Err(_) => call.await,
        }
    }
}

impl<S: CacheStore + 'static> Drop for LockGuard<S> {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };

        match Handle::try_current() {
            Ok(handle) => {
                warn!(key = %self.key, "lock guard dropped while held, releasing in background");
                let store = Arc::clone(&self.store);
                let key = std::mem::take(&mut self.key);
                handle.spawn(async move {
                    if let Err(err) = store.unlock(&key, token).await {
                        warn!(key = %key, error = %err, "background lock release failed");
                    }
                });
            }
            Err(_) => {
                warn!(
                    key = %self.key,
                    "lock guard dropped outside a runtime, lock stays held until its lease expires"
                );
            }
        }
    }
}
