//! Input checks applied before anything reaches the store.

use storyline_core::error::DomainError;

use super::payloads::{MessagePayload, StoryPayload};

/// Longest accepted story or message title, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Longest accepted message body, in characters.
pub const MAX_BODY_CHARS: usize = 4096;

/// Longest accepted attachment URL, in characters.
pub const MAX_ATTACHMENT_URL_CHARS: usize = 2048;

/// Rejects `value` if it is blank or longer than `max_chars` characters.
///
/// # Errors
///
/// Returns `DomainError::Validation` naming `field`.
pub fn require_text(field: &str, value: &str, max_chars: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} required")));
    }
    if value.chars().count() > max_chars {
        return Err(DomainError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

/// Checks a story title.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the title is blank or too long.
pub fn validate_story_title(title: &str) -> Result<(), DomainError> {
    require_text("title", title, MAX_TITLE_CHARS)
}

/// Checks a story update.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the title is blank or too long.
pub fn validate_story_payload(payload: &StoryPayload) -> Result<(), DomainError> {
    validate_story_title(&payload.title)
}

/// Checks every field of a message.
///
/// # Errors
///
/// Returns `DomainError::Validation` for the first blank or oversized field.
pub fn validate_message_payload(payload: &MessagePayload) -> Result<(), DomainError> {
    require_text("title", &payload.title, MAX_TITLE_CHARS)?;
    require_text("body", &payload.body, MAX_BODY_CHARS)?;
    require_text("attachmentURL", &payload.attachment_url, MAX_ATTACHMENT_URL_CHARS)
}
