use std::fmt;
use std::time::Duration;

/// Errors that can occur during document store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The store could not be reached or the connection string was rejected.
    Connection(String),
    /// An operation did not complete within the configured limit.
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    /// A unique index rejected the write.
    DuplicateKey(String),
    /// Any other failure reported by the backend.
    Backend(String),
    /// A document could not be converted to or from BSON.
    Decode(String),
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "store connection failed: {msg}"),
            Self::Timeout { operation, after } => {
                write!(f, "store operation `{operation}` timed out after {after:?}")
            }
            Self::DuplicateKey(msg) => write!(f, "duplicate key: {msg}"),
            Self::Backend(msg) => write!(f, "store error: {msg}"),
            Self::Decode(msg) => write!(f, "document decode error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(err: bson::de::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
