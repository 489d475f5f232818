//! Shared test mocks and utilities for the Storyline story service.

mod clock;
mod rng;
mod store;

pub use clock::{FixedClock, StepClock};
pub use rng::CountingRng;
pub use store::{FailingStore, MemoryStore};
