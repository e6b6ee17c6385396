//! Store error types.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity '{id}' not found")]
    NotFound { id: String },

    #[error("entity '{id}' already exists")]
    AlreadyExists { id: String },

    /// Another unit of work holds the row lock
    #[error("entity '{id}' is locked by another unit of work")]
    LockContention { id: String },

    /// The lock was released or taken over before commit
    #[error("lock {token} on entity '{id}' is not held")]
    StaleLock { id: String, token: Uuid },

    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("failed to decode record: {0}")]
    Decode(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether retrying the whole unit of work may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LockContention { .. } | Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contention_and_outages_are_transient() {
        assert!(StoreError::LockContention { id: "a".into() }.is_transient());
        assert!(StoreError::Unavailable("connection reset".into()).is_transient());
        assert!(!StoreError::NotFound { id: "a".into() }.is_transient());
        assert!(!StoreError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn messages_name_the_entity() {
        let err = StoreError::LockContention { id: "xfr-1".into() };
        assert_eq!(err.to_string(), "entity 'xfr-1' is locked by another unit of work");
    }
}
