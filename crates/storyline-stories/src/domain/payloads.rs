//! Caller-supplied inputs for story mutations.

use serde::Deserialize;

/// Fields of a message to append to a story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessagePayload {
    /// Message title.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Link to the message's attachment.
    #[serde(rename = "attachmentURL")]
    pub attachment_url: String,
}

/// Fields of a story that may be changed after creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoryPayload {
    /// New story title.
    pub title: String,
}
