//! Story domain types and the pure logic around them.

pub mod codec;
pub mod payloads;
pub mod story;
pub mod validation;
