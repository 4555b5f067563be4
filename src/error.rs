use thiserror::Error;

/// Main error type for ordex operations
#[derive(Error, Debug)]
pub enum OrdexError {
    #[error("URL already indexed: {0}")]
    DuplicateUrl(String),

    #[error("no free document id at or below rank {0}")]
    RankExhausted(u32),

    #[error("key is {len} bytes, store accepts at most {max}")]
    KeyTooLong { len: usize, max: usize },

    #[error("payload is {len} bytes, node holds at most {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("hash table full while probing for a slot")]
    BucketFull,

    #[error("key never initialized: {0}")]
    KeyMissing(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ordex operations
pub type Result<T> = std::result::Result<T, OrdexError>;

impl OrdexError {
    /// Whether a failed `add` may simply be retried with the same input.
    pub fn is_retriable(&self) -> bool {
        matches!(self, OrdexError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrdexError::DuplicateUrl("https://example.org".to_string());
        assert_eq!(err.to_string(), "URL already indexed: https://example.org");

        let err = OrdexError::KeyTooLong { len: 80, max: 64 };
        assert_eq!(err.to_string(), "key is 80 bytes, store accepts at most 64");
    }

    #[test]
    fn test_retriable_errors() {
        let io = OrdexError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(io.is_retriable());
        assert!(!OrdexError::BucketFull.is_retriable());
        assert!(!OrdexError::DuplicateUrl("u".into()).is_retriable());
    }
}
