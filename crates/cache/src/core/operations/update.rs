//! Lock-guarded read-modify-write

use crate::core::guard::{LockGuard, MutationOutcome};
use crate::core::types::Cache;
use crate::serialization::{decode, encode};
use crate::traits::CacheStore;
use cachext_core::{BoxError, CreateOutcome, Error, LockedRead, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::validate_key;

impl<S: CacheStore + 'static> Cache<S> {
    /// Update the value under `key` while holding its lock
    ///
    /// The entry is seeded with `initial()` when missing. `mutate` receives
    /// the current value; `Ok(Some(v))` stores `v`, `Ok(None)` resets the
    /// entry to `initial()` and `Err(e)` releases the lock and fails with a
    /// `MutationFault` carrying `e`. `timeout` bounds each individual lock
    /// acquisition, not the whole call.
    pub async fn update_with_lock<T, I, M, E>(
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
        validate_key(key)?;

        let (bytes, guard) = self.acquire(key, &initial, timeout).await?;
        let outcome = match decode::<T>(key, &bytes) {
            Ok(current) => apply_mutation(key, current, &initial, mutate),
            Err(err) => MutationOutcome::Faulted(err),
        };
        guard.finish(outcome).await
    }

    /// [`Cache::update_with_lock`] using the configured lock timeout
    pub async fn update<T, I, M, E>(&self, key: &str, initial: I, mutate: M) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        I: Fn() -> Option<T> + Send + Sync,
        M: FnOnce(T) -> std::result::Result<Option<T>, E> + Send,
        E: Into<BoxError>,
    {
        self.update_with_lock(key, initial, mutate, self.lock_timeout)
            .await
    }

    async fn acquire<T, I>(
        &self,
        key: &str,
        initial: &I,
        timeout: Duration,
    ) -> Result<(Vec<u8>, LockGuard<S>)>
    where
        T: Serialize,
        I: Fn() -> Option<T> + Send + Sync,
    {
        for attempt in self.policy.attempts() {
            match self.store.locked_read(key, timeout).await? {
                LockedRead::Acquired { value, token } => {
                    trace!(key, attempt, "lock acquired");
                    return Ok((value, LockGuard::new(self.store.clone(), key, token)));
                }
                LockedRead::NotFound => trace!(key, attempt, "entry not found"),
                LockedRead::LockHeld => debug!(key, attempt, "lock held elsewhere"),
            }

            let delay = self.policy.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if self.policy.should_seed(attempt) {
                self.seed(key, initial, attempt).await?;
            }
        }

        Err(Error::unavailable(key, self.policy.max_attempts()))
    }

    /// Best-effort write of the initial value
    ///
    /// Losing the race to another seeder is expected. Store faults are logged
    /// and the attempt counts against the retry budget.
    async fn seed<T, I>(&self, key: &str, initial: &I, attempt: u32) -> Result<()>
    where
        T: Serialize,
        I: Fn() -> Option<T> + Send + Sync,
    {
        let bytes = {
            let value = initial_value(key, initial)?;
            encode(key, &value)?
        };

        match self.store.create_if_absent(key, bytes).await {
            Ok(CreateOutcome::Created) => debug!(key, attempt, "seeded missing entry"),
            Ok(CreateOutcome::AlreadyExists) => {
                trace!(key, attempt, "entry already seeded by another caller")
            }
            Err(err) => warn!(
                key,
                attempt,
                round = self.policy.round(attempt),
                error = %err,
                "failed to seed entry, retrying"
            ),
        }
        Ok(())
    }
}

fn initial_value<T, I>(key: &str, initial: &I) -> Result<T>
where
    I: Fn() -> Option<T>,
{
    initial().ok_or_else(|| Error::invalid_input(key, "initial value function returned nothing"))
}

fn apply_mutation<T, I, M, E>(key: &str, current: T, initial: &I, mutate: M) -> MutationOutcome<T>
where
    I: Fn() -> Option<T>,
    M: FnOnce(T) -> std::result::Result<Option<T>, E>,
    E: Into<BoxError>,
{
    match mutate(current) {
        Ok(Some(updated)) => MutationOutcome::Updated(updated),
        Ok(None) => match initial_value(key, initial) {
            Ok(reset) => MutationOutcome::Updated(reset),
            Err(err) => MutationOutcome::Faulted(err),
        },
        Err(err) => MutationOutcome::Faulted(Error::mutation_fault(key, err)),
    }
}
