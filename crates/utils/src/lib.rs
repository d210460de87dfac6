//! Shared utilities for cachext
//!
//! This crate provides the retry policy that drives lock-guarded updates and
//! the tracing setup shared by binaries and tests.

pub mod resilience;
pub mod tracing;

pub use resilience::*;
