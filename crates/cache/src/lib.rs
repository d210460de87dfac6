//! Lock-guarded cache updates for cachext
//!
//! This crate provides:
//! - [`CacheStore`], the locking and storage capabilities a cache backend offers
//! - [`Cache`], a typed cache whose `update_with_lock` performs a
//!   read-modify-write under the entry's lock, seeding missing entries
//! - [`MemoryStore`], an in-process backend with leased locks
//! - [`NullCache`] and [`CacheHandle`] for running with caching turned off
//! - [`SyncCache`] for callers without an async runtime

pub mod bridge;
pub mod config;
pub mod core;
pub mod handle;
pub mod memory;
pub mod null;
pub mod serialization;
pub mod traits;

pub use bridge::SyncCache;
pub use config::{CacheConfig, CacheConfigBuilder, CacheConfigLoader, CacheOverrides, ConfigSource};
pub use self::core::{Cache, MutationOutcome};
pub use handle::CacheHandle;
pub use memory::{MemoryStore, StoreStats, StoreStatsSnapshot};
pub use null::NullCache;
pub use traits::{CacheStore, CacheWrapper};

pub use cachext_core::{
    BoxError, CreateOutcome, Error, ErrorKind, Expiry, LockToken, LockedRead, Result,
};
pub use cachext_utils::RetryPolicy;
