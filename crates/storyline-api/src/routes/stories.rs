//! Routes for stories and their messages.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use storyline_core::error::DomainError;
use storyline_stories::domain::payloads::{MessagePayload, StoryPayload};
use storyline_stories::domain::story::{Message, Story};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::{AppState, SharedStories};

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    /// Title of the new story.
    pub title: String,
}

/// Response body returned after a story is deleted.
#[derive(Debug, Serialize)]
pub struct DeleteStoryResponse {
    /// Confirmation text.
    pub message: String,
}

/// Runs a repository call on the blocking pool; store writes sync to disk.
async fn with_stories<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&SharedStories) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let stories = SharedStories::clone(&state.stories);
    tokio::task::spawn_blocking(move || call(&stories))
        .await
        .map_err(|e| DomainError::Storage(format!("story task failed: {e}")))?
        .map_err(ApiError::from)
}

/// POST /
#[instrument(skip(state, request))]
async fn create_story(
    State(state): State<AppState>,
    Json(request): Json<CreateStoryRequest>,
) -> Result<(StatusCode, Json<Story>), ApiError> {
    let story = with_stories(&state, move |stories| stories.create_story(&request.title)).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

/// GET /
#[instrument(skip(state))]
async fn list_stories(State(state): State<AppState>) -> Result<Json<Vec<Story>>, ApiError> {
    let stories = with_stories(&state, |stories| stories.get_stories()).await?;
    Ok(Json(stories))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Story>, ApiError> {
    let story = with_stories(&state, move |stories| stories.get_story(&id)).await?;
    Ok(Json(story))
}

/// PUT /{id}
#[instrument(skip(state, payload))]
async fn update_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StoryPayload>,
) -> Result<Json<Story>, ApiError> {
    let story = with_stories(&state, move |stories| stories.update_story(&id, payload)).await?;
    Ok(Json(story))
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn delete_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteStoryResponse>, ApiError> {
    let message = with_stories(&state, move |stories| stories.delete_story(&id)).await?;
    Ok(Json(DeleteStoryResponse { message }))
}

/// POST /{id}/messages
#[instrument(skip(state, payload))]
async fn add_message(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
    Json(payload): Json<MessagePayload>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = with_stories(&state, move |stories| {
        stories.add_message_to_story(&story_id, payload)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Returns the router for stories.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_story).get(list_stories))
        .route(
            "/{id}",
            get(get_story).put(update_story).delete(delete_story),
        )
        .route("/{id}/messages", post(add_message))
}
