//! Cache operations module

mod basic;
mod update;

// Operations are implemented directly on the Cache type

use cachext_core::{Error, Result};

/// Reject keys the store cannot address
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::invalid_input(key, "cache key cannot be empty"));
    }
    if key.chars().any(char::is_control) {
        return Err(Error::invalid_input(
            key,
            "cache key cannot contain control characters",
        ));
    }
    Ok(())
}
