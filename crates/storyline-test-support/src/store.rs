//! Test stores — in-memory `OrderedStore` implementations for tests.

use std::collections::BTreeMap;

use storyline_core::error::DomainError;
use storyline_core::store::OrderedStore;

/// A non-durable ordered store backed by a `BTreeMap`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderedStore for MemoryStore {
    fn insert(&mut self, key: &str, value: &[u8]) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(self.entries.insert(key.to_owned(), value.to_vec()))
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn delete(&mut self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(self.entries.remove(key))
    }

    fn values(&self) -> Vec<Vec<u8>> {
        self.entries.values().cloned().collect()
    }
}

/// A store whose reads see `inner` but whose writes always fail with a
/// storage error. Useful for testing that failed writes change nothing.
#[derive(Debug, Default, Clone)]
pub struct FailingStore {
    inner: MemoryStore,
}

impl FailingStore {
    /// Wrap `inner`, freezing its current contents.
    #[must_use]
    pub fn wrapping(inner: MemoryStore) -> Self {
        Self { inner }
    }
}

impl OrderedStore for FailingStore {
    fn insert(&mut self, _key: &str, _value: &[u8]) -> Result<Option<Vec<u8>>, DomainError> {
        Err(DomainError::Storage("disk full".into()))
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key)
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    fn delete(&mut self, _key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Err(DomainError::Storage("disk full".into()))
    }

    fn values(&self) -> Vec<Vec<u8>> {
        self.inner.values()
    }
}
