//! Storyline — stories and the messages attached to them.
//!
//! A story is persisted as one entry of an ordered key-value store, keyed by
//! its id, with its messages embedded. Adding a message rewrites the whole
//! story entry, so every change lands in a single store write.

pub mod application;
pub mod domain;
