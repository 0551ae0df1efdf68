//! Storage error types
//!
//! Defines all errors that can occur in the entry repositories.

use thiserror::Error;

/// Errors that can occur in a repository backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data corruption detected (checksum mismatch, bad length)
    #[error("Corrupt data: {0}")]
    Corruption(String),

    /// SQLite backend error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record exceeds the log's frame limit
    #[error("Record too large: {len} bytes (max {max})")]
    RecordTooLarge { len: usize, max: usize },

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::Corruption("crc mismatch".to_string());
        assert_eq!(err.to_string(), "Corrupt data: crc mismatch");

        let err = StorageError::Lock("poisoned".to_string());
        assert_eq!(err.to_string(), "Lock error: poisoned");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::Io(_)));
    }
}
