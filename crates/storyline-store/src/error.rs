//! Store error types.

use storyline_core::error::DomainError;
use thiserror::Error;

/// Errors raised by the durable map.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The log file could not be read, written or synced.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A key exceeds the configured key size bound.
    #[error("key is {len} bytes, limit is {max}")]
    KeyTooLarge {
        /// Size of the rejected key.
        len: usize,
        /// Configured bound.
        max: u32,
    },

    /// A value exceeds the configured value size bound.
    #[error("value is {len} bytes, limit is {max}")]
    ValueTooLarge {
        /// Size of the rejected value.
        len: usize,
        /// Configured bound.
        max: u32,
    },

    /// Inserting a new key would exceed the configured entry capacity.
    #[error("store is full ({max} entries)")]
    CapacityExceeded {
        /// Configured capacity.
        max: u64,
    },

    /// The log contains damaged data that is not a torn final record.
    #[error("log corrupt at offset {offset}: {reason}")]
    Corrupt {
        /// Byte offset of the damaged region.
        offset: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// The log was created with different configuration constants.
    #[error("log was created with {field} = {stored}, configured {configured}")]
    ConfigMismatch {
        /// Header field that differs.
        field: &'static str,
        /// Value recorded in the log header.
        stored: u64,
        /// Value in the configuration used to open the log.
        configured: u64,
    },
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
