use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// When a cache entry stops being visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// The entry lives until it is removed
    #[default]
    Never,
    /// The entry expires at an absolute point in time
    At(DateTime<Utc>),
    /// The entry expires this long after it was written
    After(Duration),
}

impl Expiry {
    /// Resolve to an absolute deadline relative to `now`
    ///
    /// Relative expiries too large to represent are treated as `Never`.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Expiry::Never => None,
            Expiry::At(at) => Some(*at),
            Expiry::After(valid_for) => chrono::Duration::from_std(*valid_for)
                .ok()
                .and_then(|delta| now.checked_add_signed(delta)),
        }
    }
}

/// Proof of lock ownership for a single key
///
/// Issued by a successful locked read and consumed by exactly one locked
/// write-back or unlock. The token is deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct LockToken {
    id: Uuid,
    key: String,
}

impl LockToken {
    /// Issue a fresh token for `key`
    #[must_use]
    pub fn issue(key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
        }
    }

    /// Unique id of this lock acquisition
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Key the lock was taken on
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.key, self.id)
    }
}

/// Outcome of an atomic lock-and-read
#[derive(Debug, PartialEq, Eq)]
pub enum LockedRead<V> {
    /// The entry exists and the caller now holds its lock
    Acquired { value: V, token: LockToken },
    /// The entry does not exist; no lock was taken
    NotFound,
    /// Another holder kept the lock for the whole wait
    LockHeld,
}

/// Outcome of a create-if-absent write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}
