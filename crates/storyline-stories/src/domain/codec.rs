//! Byte encoding of stories for the ordered store.
//!
//! An encoded story is a one-byte format tag followed by the story as JSON.
//! Decoding ignores unknown fields and treats missing optional fields as
//! absent, so records written before a field was added still decode.

use storyline_core::error::DomainError;

use super::story::Story;

/// Format tag written in front of every encoded story.
pub const CODEC_VERSION: u8 = 1;

/// Encodes `story` for storage.
///
/// # Errors
///
/// Returns `DomainError::Storage` if serialization fails.
pub fn encode_story(story: &Story) -> Result<Vec<u8>, DomainError> {
    let mut bytes = vec![CODEC_VERSION];
    serde_json::to_writer(&mut bytes, story)
        .map_err(|e| DomainError::Storage(format!("story serialization failed: {e}")))?;
    Ok(bytes)
}

/// Decodes a story previously produced by [`encode_story`].
///
/// # Errors
///
/// Returns `DomainError::Storage` if the tag is unknown or the payload is
/// malformed.
pub fn decode_story(bytes: &[u8]) -> Result<Story, DomainError> {
    match bytes.split_first() {
        Some((&CODEC_VERSION, payload)) => serde_json::from_slice(payload)
            .map_err(|e| DomainError::Storage(format!("story deserialization failed: {e}"))),
        Some((tag, _)) => Err(DomainError::Storage(format!(
            "unknown story encoding {tag}"
        ))),
        None => Err(DomainError::Storage("empty story record".to_owned())),
    }
}
