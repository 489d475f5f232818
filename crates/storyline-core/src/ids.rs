//! Identifier generation for stories and messages.

use uuid::Builder;

use crate::rng::DeterministicRng;

/// Mints version 4 UUID strings from an injected randomness source.
///
/// Identifiers do not depend on the clock, so two calls within the same tick
/// still diverge.
pub struct IdGenerator {
    rng: Box<dyn DeterministicRng>,
}

impl IdGenerator {
    /// Creates a generator drawing from `rng`.
    #[must_use]
    pub fn new(rng: Box<dyn DeterministicRng>) -> Self {
        Self { rng }
    }

    /// Returns a fresh identifier in hyphenated UUID form.
    pub fn next_id(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
