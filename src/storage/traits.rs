//! Storage traits and error types
//!
//! This module defines the trait interface trails use to persist records and
//! the associated error types.

use crate::state::Classification;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record in store: {0}")]
    InvalidRecord(String),

    #[error("Store writer is closed: {0}")]
    WriterClosed(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for harvested records
///
/// Implementations must serialize appends so that ids stay unique, strictly
/// increasing and contiguous no matter how many trails call concurrently.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Persists one record and returns its assigned id
    ///
    /// The record is durable once this returns `Ok`.
    async fn append(
        &self,
        word: &str,
        sentence: &str,
        classification: Classification,
    ) -> StorageResult<u64>;
}
