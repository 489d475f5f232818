//! Ordered key-value store abstraction.

use crate::error::DomainError;

/// A persistent map from string keys to opaque bytes, iterated in key order.
///
/// Reads operate on committed state only and cannot fail. Writes fail only
/// when the backing medium rejects them (bounds exceeded, I/O failure); a
/// failed write leaves the map exactly as it was.
pub trait OrderedStore: Send {
    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the write is rejected.
    fn insert(&mut self, key: &str, value: &[u8]) -> Result<Option<Vec<u8>>, DomainError>;

    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Returns whether `key` is present.
    fn contains(&self, key: &str) -> bool;

    /// Removes `key`, returning the value it held.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the removal cannot be persisted.
    fn delete(&mut self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Returns every stored value, ordered by key bytes.
    fn values(&self) -> Vec<Vec<u8>>;
}

impl<S: OrderedStore + ?Sized> OrderedStore for Box<S> {
    fn insert(&mut self, key: &str, value: &[u8]) -> Result<Option<Vec<u8>>, DomainError> {
        (**self).insert(key, value)
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }

    fn delete(&mut self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        (**self).delete(key)
    }

    fn values(&self) -> Vec<Vec<u8>> {
        (**self).values()
    }
}
