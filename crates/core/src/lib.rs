//! Core domain types, errors, and constants for `cachext`.
//!
//! ## Key Components
//!
//! - **`errors`**: the primary `Error` enum and `Result` alias. Every failure
//!   of a lock-guarded update maps onto a distinct [`ErrorKind`] so callers can
//!   decide whether to retry, fix their usage, or handle their own mutation
//!   failure.
//! - **`types`**: values exchanged with a cache store: [`Expiry`],
//!   the single-use [`LockToken`], and the [`LockedRead`] / [`CreateOutcome`]
//!   results.
//! - **`constants`**: defaults and environment variable names.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{BoxError, Error, ErrorKind, Result, SerializationOp},
    types::*,
};
