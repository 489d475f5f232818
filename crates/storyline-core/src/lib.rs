//! Storyline Core — shared domain abstractions.
//!
//! This crate defines the traits and types that the story repository and the
//! durable store agree on: time, randomness, identifiers, errors and the
//! ordered key-value store seam. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod ids;
pub mod rng;
pub mod store;
