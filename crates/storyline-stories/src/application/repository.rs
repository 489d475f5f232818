//! Story repository.
//!
//! The repository owns the ordered store and the identifier generator behind
//! one mutex. Each public operation holds that lock from its first read to
//! its last write, so operations never interleave and readers only see fully
//! committed stories.

use std::sync::{Arc, Mutex, MutexGuard};

use storyline_core::clock::Clock;
use storyline_core::error::DomainError;
use storyline_core::ids::IdGenerator;
use storyline_core::store::OrderedStore;
use tracing::{debug, info, instrument};

use crate::domain::codec::{decode_story, encode_story};
use crate::domain::payloads::{MessagePayload, StoryPayload};
use crate::domain::story::{Message, Story};
use crate::domain::validation::{
    validate_message_payload, validate_story_payload, validate_story_title,
};

struct Inner<S> {
    store: S,
    ids: IdGenerator,
}

/// CRUD operations over stories persisted in an [`OrderedStore`].
pub struct StoryRepository<S> {
    inner: Mutex<Inner<S>>,
    clock: Arc<dyn Clock>,
}

impl<S: OrderedStore> StoryRepository<S> {
    /// Creates a repository that takes ownership of `store`.
    #[must_use]
    pub fn new(store: S, ids: IdGenerator, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner { store, ids }),
            clock,
        }
    }

    /// Creates and persists a story with no messages.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the title is blank or too long,
    /// and `DomainError::Storage` if the store rejects the write.
    #[instrument(skip(self))]
    pub fn create_story(&self, title: &str) -> Result<Story, DomainError> {
        validate_story_title(title)?;

        let mut inner = self.lock()?;
        let id = inner.ids.next_id();
        let story = Story::new(id, title.to_owned(), self.clock.now());
        persist(&mut inner.store, &story)?;

        info!(story_id = %story.id, "created story");
        Ok(story)
    }

    /// Returns every story, ordered by id rather than by creation time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if a stored story cannot be decoded.
    #[instrument(skip(self))]
    pub fn get_stories(&self) -> Result<Vec<Story>, DomainError> {
        let inner = self.lock()?;
        let stories = inner
            .store
            .values()
            .iter()
            .map(|bytes| decode_story(bytes))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = stories.len(), "listed stories");
        Ok(stories)
    }

    /// Returns the story stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoryNotFound` if no such story exists.
    #[instrument(skip(self))]
    pub fn get_story(&self, id: &str) -> Result<Story, DomainError> {
        let inner = self.lock()?;
        load(&inner.store, id)
    }

    /// Appends a message to a story and persists the whole story.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoryNotFound` if the story does not exist,
    /// `DomainError::Validation` if a payload field is blank or too long, and
    /// `DomainError::Storage` if the store rejects the rewritten story. The
    /// stored story is unchanged on every error.
    #[instrument(skip(self, payload))]
    pub fn add_message_to_story(
        &self,
        story_id: &str,
        payload: MessagePayload,
    ) -> Result<Message, DomainError> {
        let mut inner = self.lock()?;
        let mut story = load(&inner.store, story_id)?;
        validate_message_payload(&payload)?;

        let now = self.clock.now();
        let message = Message::new(inner.ids.next_id(), payload, now);
        story.append_message(message.clone(), now);
        persist(&mut inner.store, &story)?;

        info!(
            message_id = %message.id,
            message_count = story.messages.len(),
            "added message to story"
        );
        Ok(message)
    }

    /// Replaces a story's title.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoryNotFound` if the story does not exist,
    /// `DomainError::Validation` if the new title is blank or too long, and
    /// `DomainError::Storage` if the store rejects the write.
    #[instrument(skip(self, payload))]
    pub fn update_story(&self, id: &str, payload: StoryPayload) -> Result<Story, DomainError> {
        let mut inner = self.lock()?;
        let mut story = load(&inner.store, id)?;
        validate_story_payload(&payload)?;

        story.retitle(payload.title, self.clock.now());
        persist(&mut inner.store, &story)?;

        info!("updated story");
        Ok(story)
    }

    /// Deletes a story together with its messages.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoryNotFound` if the story does not exist and
    /// `DomainError::Storage` if the removal cannot be persisted.
    #[instrument(skip(self))]
    pub fn delete_story(&self, id: &str) -> Result<String, DomainError> {
        let mut inner = self.lock()?;
        if inner.store.delete(id)?.is_none() {
            return Err(DomainError::StoryNotFound(id.to_owned()));
        }

        info!("deleted story");
        Ok(format!("story {id} deleted"))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<S>>, DomainError> {
        self.inner
            .lock()
            .map_err(|_| DomainError::Storage("story store lock poisoned".to_owned()))
    }
}

impl<S> std::fmt::Debug for StoryRepository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryRepository").finish_non_exhaustive()
    }
}

fn load<S: OrderedStore>(store: &S, id: &str) -> Result<Story, DomainError> {
    let bytes = store
        .get(id)
        .ok_or_else(|| DomainError::StoryNotFound(id.to_owned()))?;
    decode_story(&bytes)
}

fn persist<S: OrderedStore>(store: &mut S, story: &Story) -> Result<(), DomainError> {
    let bytes = encode_story(story)?;
    store.insert(&story.id, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use storyline_test_support::{CountingRng, FailingStore, FixedClock, MemoryStore, StepClock};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn repository_with<S: OrderedStore>(store: S) -> StoryRepository<S> {
        StoryRepository::new(
            store,
            IdGenerator::new(Box::new(CountingRng::default())),
            Arc::new(StepClock::new(t0(), Duration::seconds(1))),
        )
    }

    fn repository() -> StoryRepository<MemoryStore> {
        repository_with(MemoryStore::new())
    }

    fn message(title: &str, body: &str, attachment_url: &str) -> MessagePayload {
        MessagePayload {
            title: title.to_owned(),
            body: body.to_owned(),
            attachment_url: attachment_url.to_owned(),
        }
    }

    // --- create_story ---

    #[test]
    fn test_create_story_returns_empty_story_with_generated_id() {
        // Arrange
        let repo = repository();

        // Act
        let story = repo.create_story("Trip").unwrap();

        // Assert
        assert!(!story.id.is_empty());
        assert_eq!(story.title, "Trip");
        assert!(story.messages.is_empty());
        assert_eq!(story.created_at, t0());
        assert_eq!(story.updated_at, None);
        assert_eq!(repo.get_story(&story.id).unwrap(), story);
    }

    #[test]
    fn test_create_story_rejects_empty_title_without_storing() {
        // Arrange
        let repo = repository();
        repo.create_story("Existing").unwrap();

        // Act
        let result = repo.create_story("");

        // Assert
        assert_eq!(
            result,
            Err(DomainError::Validation("title required".to_owned()))
        );
        assert_eq!(repo.get_stories().unwrap().len(), 1);
    }

    #[test]
    fn test_create_story_rejects_overlong_title() {
        let repo = repository();

        let result = repo.create_story(&"x".repeat(256));

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.get_stories().unwrap().is_empty());
    }

    #[test]
    fn test_create_story_ids_are_unique() {
        let repo = repository();

        let ids: HashSet<String> = (0..50)
            .map(|i| repo.create_story(&format!("story {i}")).unwrap().id)
            .collect();

        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_create_story_surfaces_storage_failure() {
        let repo = repository_with(FailingStore::default());

        let result = repo.create_story("Trip");

        assert_eq!(result, Err(DomainError::Storage("disk full".to_owned())));
        assert!(repo.get_stories().unwrap().is_empty());
    }

    // --- get_stories / get_story ---

    #[test]
    fn test_get_stories_is_ordered_by_id() {
        // Arrange
        let repo = repository();
        for title in ["c", "a", "b"] {
            repo.create_story(title).unwrap();
        }

        // Act
        let stories = repo.get_stories().unwrap();

        // Assert
        let ids: Vec<&str> = stories.iter().map(|s| s.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(stories.len(), 3);
    }

    #[test]
    fn test_get_story_is_idempotent() {
        let repo = repository();
        let story = repo.create_story("Trip").unwrap();

        let first = repo.get_story(&story.id).unwrap();
        let second = repo.get_story(&story.id).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_get_story_returns_not_found_for_unknown_id() {
        let repo = repository();

        let result = repo.get_story("missing-id");

        match result.unwrap_err() {
            DomainError::StoryNotFound(id) => assert_eq!(id, "missing-id"),
            other => panic!("expected StoryNotFound, got {other:?}"),
        }
    }

    // --- add_message_to_story ---

    #[test]
    fn test_add_message_appends_exactly_one_matching_message() {
        // Arrange
        let repo = repository();
        let story = repo.create_story("Trip").unwrap();
        repo.add_message_to_story(&story.id, message("first", "b1", "u1"))
            .unwrap();
        let before = repo.get_story(&story.id).unwrap().messages.len();

        // Act
        let added = repo
            .add_message_to_story(&story.id, message("second", "b2", "u2"))
            .unwrap();

        // Assert
        let stored = repo.get_story(&story.id).unwrap();
        assert_eq!(stored.messages.len(), before + 1);
        let last = stored.messages.last().unwrap();
        assert_eq!(last, &added);
        assert_eq!(last.title, "second");
        assert_eq!(last.body, "b2");
        assert_eq!(last.attachment_url, "u2");
        assert_eq!(last.updated_at, None);
        assert_eq!(stored.messages[0].title, "first");
        assert_eq!(stored.updated_at, Some(added.created_at));
        assert!(added.created_at > stored.created_at);
    }

    #[test]
    fn test_add_message_to_missing_story_is_not_found() {
        let repo = repository();

        let result = repo.add_message_to_story("missing-id", message("a", "b", "c"));

        assert_eq!(
            result,
            Err(DomainError::StoryNotFound("missing-id".to_owned()))
        );
    }

    #[test]
    fn test_add_message_with_blank_title_leaves_story_unchanged() {
        // Arrange
        let repo = repository();
        let story = repo.create_story("A").unwrap();

        // Act
        let result = repo.add_message_to_story(&story.id, message("", "b", "c"));

        // Assert
        assert_eq!(
            result,
            Err(DomainError::Validation("title required".to_owned()))
        );
        assert_eq!(repo.get_story(&story.id).unwrap(), story);
    }

    #[test]
    fn test_message_ids_are_unique_across_stories() {
        let repo = repository();
        let a = repo.create_story("A").unwrap();
        let b = repo.create_story("B").unwrap();

        let mut ids = HashSet::new();
        for story_id in [&a.id, &b.id, &a.id, &b.id] {
            let added = repo
                .add_message_to_story(story_id, message("t", "b", "u"))
                .unwrap();
            ids.insert(added.id);
        }

        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_add_message_storage_failure_keeps_stored_story() {
        // Arrange
        let seeded = repository();
        let story = seeded.create_story("A").unwrap();
        let mut snapshot = MemoryStore::new();
        for bytes in seeded.lock().unwrap().store.values() {
            snapshot.insert(&story.id, &bytes).unwrap();
        }
        let repo = repository_with(FailingStore::wrapping(snapshot));

        // Act
        let result = repo.add_message_to_story(&story.id, message("a", "b", "c"));

        // Assert
        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert!(repo.get_story(&story.id).unwrap().messages.is_empty());
    }

    // --- update_story ---

    #[test]
    fn test_update_story_replaces_title_and_sets_updated_at() {
        // Arrange
        let repo = repository();
        let story = repo.create_story("A").unwrap();

        // Act
        let updated = repo
            .update_story(
                &story.id,
                StoryPayload {
                    title: "B".to_owned(),
                },
            )
            .unwrap();

        // Assert
        assert_eq!(updated.title, "B");
        assert_eq!(updated.created_at, story.created_at);
        assert!(updated.updated_at.is_some());
        assert_eq!(repo.get_story(&story.id).unwrap(), updated);
    }

    #[test]
    fn test_update_missing_story_is_not_found() {
        let repo = repository();

        let result = repo.update_story(
            "missing-id",
            StoryPayload {
                title: "B".to_owned(),
            },
        );

        assert!(matches!(result, Err(DomainError::StoryNotFound(_))));
    }

    #[test]
    fn test_update_story_rejects_blank_title() {
        let repo = repository();
        let story = repo.create_story("A").unwrap();

        let result = repo.update_story(
            &story.id,
            StoryPayload {
                title: "  ".to_owned(),
            },
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(repo.get_story(&story.id).unwrap().title, "A");
    }

    // --- delete_story ---

    #[test]
    fn test_deleted_story_is_not_found_afterwards() {
        // Arrange
        let repo = repository();
        let story = repo.create_story("A").unwrap();
        repo.add_message_to_story(&story.id, message("a", "b", "c"))
            .unwrap();

        // Act
        let confirmation = repo.delete_story(&story.id).unwrap();

        // Assert
        assert_eq!(confirmation, format!("story {} deleted", story.id));
        assert_eq!(
            repo.get_story(&story.id),
            Err(DomainError::StoryNotFound(story.id.clone()))
        );
        assert!(repo.get_stories().unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_story_is_not_found() {
        let repo = repository();

        let result = repo.delete_story("missing-id");

        assert_eq!(
            result,
            Err(DomainError::StoryNotFound("missing-id".to_owned()))
        );
    }

    #[test]
    fn test_fixed_clock_stamps_every_story_identically() {
        let repo = StoryRepository::new(
            MemoryStore::new(),
            IdGenerator::new(Box::new(CountingRng::default())),
            Arc::new(FixedClock(t0())),
        );

        let a = repo.create_story("A").unwrap();
        let b = repo.create_story("B").unwrap();

        assert_eq!(a.created_at, b.created_at);
        assert_ne!(a.id, b.id);
    }
}
