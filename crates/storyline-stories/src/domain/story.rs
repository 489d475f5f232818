//! Story and message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payloads::MessagePayload;

/// A record attached to exactly one story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    pub id: String,
    /// Message title.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Link to the message's attachment.
    #[serde(rename = "attachmentURL")]
    pub attachment_url: String,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
    /// When the message was last edited, if ever.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Builds a new message from a validated payload.
    #[must_use]
    pub fn new(id: String, payload: MessagePayload, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: payload.title,
            body: payload.body,
            attachment_url: payload.attachment_url,
            created_at: now,
            updated_at: None,
        }
    }
}

/// A titled container of messages, stored as one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Story identifier and store key.
    pub id: String,
    /// Story title.
    pub title: String,
    /// Messages in the order they were added.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// When the story was created.
    pub created_at: DateTime<Utc>,
    /// When the story last changed, if ever.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Story {
    /// Creates a story with no messages.
    #[must_use]
    pub fn new(id: String, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            messages: Vec::new(),
            created_at: now,
            updated_at: None,
        }
    }

    /// Appends `message` after all existing messages.
    pub fn append_message(&mut self, message: Message, now: DateTime<Utc>) {
        self.messages.push(message);
        self.updated_at = Some(now);
    }

    /// Replaces the title.
    pub fn retitle(&mut self, title: String, now: DateTime<Utc>) {
        self.title = title;
        self.updated_at = Some(now);
    }
}
