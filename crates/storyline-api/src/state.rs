//! Shared application state.

use std::sync::Arc;

use storyline_core::clock::Clock;
use storyline_core::ids::IdGenerator;
use storyline_core::rng::DeterministicRng;
use storyline_core::store::OrderedStore;
use storyline_stories::application::repository::StoryRepository;

/// Story repository over whichever store the process was started with.
pub type SharedStories = Arc<StoryRepository<Box<dyn OrderedStore>>>;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The single story repository, owning the store.
    pub stories: SharedStories,
}

impl AppState {
    /// Create new application state around `store`.
    #[must_use]
    pub fn new(
        store: Box<dyn OrderedStore>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        let repository = StoryRepository::new(store, IdGenerator::new(rng), clock);
        Self {
            stories: Arc::new(repository),
        }
    }
}
