//! Resilience patterns for contended cache access.
//!
//! ## Key Components
//!
//! - **`config`**: [`RetryPolicy`], the stepped backoff and seed cadence used by
//!   lock-guarded updates.

pub mod config;

pub use config::RetryPolicy;
