//! Test RNG — deterministic `DeterministicRng` implementation for tests.

use storyline_core::rng::DeterministicRng;

/// An RNG that fills each request with an incrementing big-endian counter,
/// starting from 1. Identifiers minted from it are distinct and predictable.
#[derive(Debug, Default)]
pub struct CountingRng {
    counter: u64,
}

impl DeterministicRng for CountingRng {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.counter += 1;
        dest.fill(0);
        let bytes = self.counter.to_be_bytes();
        let n = bytes.len().min(dest.len());
        let start = dest.len() - n;
        dest[start..].copy_from_slice(&bytes[bytes.len() - n..]);
    }
}
