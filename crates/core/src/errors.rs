use std::path::PathBuf;

/// Result type alias for cachext operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by caller-supplied code
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for cachext operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller broke a precondition, e.g. an initial value function returned nothing
    #[error("invalid input for key '{key}': {message}")]
    InvalidInput { key: String, message: String },

    /// The entry or its lock never became accessible within the retry budget
    #[error("failed to access key '{key}' after {attempts} attempts")]
    Unavailable { key: String, attempts: u32 },

    /// The caller-supplied mutation failed; the lock was released before this surfaced
    #[error("update of key '{key}' failed: {source}")]
    MutationFault {
        key: String,
        #[source]
        source: BoxError,
    },

    /// A lock token was presented for a lock it no longer owns
    #[error("lock token for key '{key}' is no longer valid")]
    LockTokenInvalid { key: String },

    /// Encoding or decoding a cached value failed
    #[error("failed to {operation} cache entry '{key}': {source}")]
    Serialization {
        key: String,
        operation: SerializationOp,
        #[source]
        source: serde_json::Error,
    },

    /// The backing store reported a failure
    #[error("cache store {operation} failed: {message}")]
    Store { operation: String, message: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Direction of a failed serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationOp {
    Encode,
    Decode,
}

impl std::fmt::Display for SerializationOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializationOp::Encode => f.write_str("encode"),
            SerializationOp::Decode => f.write_str("decode"),
        }
    }
}

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Unavailable,
    MutationFault,
    LockTokenInvalid,
    Serialization,
    Store,
    Configuration,
    FileSystem,
}

// Helper methods for creating errors with context
impl Error {
    /// Create an invalid input error
    #[must_use]
    pub fn invalid_input(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidInput {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an unavailable error
    #[must_use]
    pub fn unavailable(key: impl Into<String>, attempts: u32) -> Self {
        Error::Unavailable {
            key: key.into(),
            attempts,
        }
    }

    /// Wrap a failure raised by caller-supplied mutation logic
    #[must_use]
    pub fn mutation_fault(key: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::MutationFault {
            key: key.into(),
            source: source.into(),
        }
    }

    /// Create a lock token error
    #[must_use]
    pub fn lock_token_invalid(key: impl Into<String>) -> Self {
        Error::LockTokenInvalid { key: key.into() }
    }

    /// Create a serialization error for a specific key
    #[must_use]
    pub fn serialization(
        key: impl Into<String>,
        operation: SerializationOp,
        source: serde_json::Error,
    ) -> Self {
        Error::Serialization {
            key: key.into(),
            operation,
            source,
        }
    }

    /// Create a store error
    #[must_use]
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Store {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::Unavailable { .. } => ErrorKind::Unavailable,
            Error::MutationFault { .. } => ErrorKind::MutationFault,
            Error::LockTokenInvalid { .. } => ErrorKind::LockTokenInvalid,
            Error::Serialization { .. } => ErrorKind::Serialization,
            Error::Store { .. } => ErrorKind::Store,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::FileSystem { .. } => ErrorKind::FileSystem,
        }
    }

    /// Whether retrying the whole operation later may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Unavailable { .. } | Error::LockTokenInvalid { .. } | Error::Store { .. }
        )
    }

    /// The key the error relates to, if any
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::InvalidInput { key, .. }
            | Error::Unavailable { key, .. }
            | Error::MutationFault { key, .. }
            | Error::LockTokenInvalid { key }
            | Error::Serialization { key, .. } => Some(key),
            _ => None,
        }
    }
}
