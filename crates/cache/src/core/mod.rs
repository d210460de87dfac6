//! Typed cache with lock-guarded updates
//!
//! [`Cache`] layers JSON encoding, key validation and the lock-guarded update
//! loop over any [`CacheStore`](crate::traits::CacheStore):
//!
//! 1. lock and read the entry, waiting up to the caller's timeout
//! 2. on a miss, back off in steps and seed the entry every Nth attempt
//! 3. run the caller's mutation while the lock is held
//! 4. write the result back and release the lock in one store call
//!
//! The lock is released on every exit path, including mutation failures.

mod guard;
mod operations;
mod trait_impl;
mod types;

pub use guard::MutationOutcome;
pub use types::Cache;

#[cfg(test)]
mod tests;
