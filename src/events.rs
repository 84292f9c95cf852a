//! Event API handlers.
//!
//! Events are created, updated and deleted individually; the public listing
//! only shows rows whose status is `active`. Every successful mutation is
//! broadcast with the post-write row (or the deleted id).

use crate::error::{MinaretError, Result};
use crate::notify::UpdateMessage;
use crate::server::AppState;
use crate::store::{self, Event, NewEvent};
use axum::extract::{Json, Path, State};
use serde_json::json;
use tracing::info;
use url::Url;

fn validate(event: &NewEvent) -> Result<()> {
    if event.title.trim().is_empty() {
        return Err(MinaretError::Validation("Event title is required".to_string()));
    }
    if event.date.trim().is_empty() {
        return Err(MinaretError::Validation("Event date is required".to_string()));
    }
    if event.time.trim().is_empty() {
        return Err(MinaretError::Validation("Event time is required".to_string()));
    }
    if event.description.trim().is_empty() {
        return Err(MinaretError::Validation(
            "Event description is required".to_string(),
        ));
    }

    if let Some(image) = &event.image {
        if !image.trim().is_empty() && Url::parse(image).is_err() {
            return Err(MinaretError::Validation(format!(
                "Invalid image URL: {image}"
            )));
        }
    }

    Ok(())
}

/// `GET /api/events`. Active events only, ordered by date.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<Event>>> {
    let events = store::list_active_events(&state.pool).await?;
    Ok(Json(events))
}

/// `POST /api/events`
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewEvent>,
) -> Result<Json<serde_json::Value>> {
    validate(&payload)?;

    let event = store::create_event(&state.pool, &payload).await?;
    info!("Event created: id={}", event.id);

    state.notifier.publish(UpdateMessage::EventAdded(event.clone()));

    Ok(Json(json!({
        "message": "Event added successfully",
        "event": event,
    })))
}

/// `PUT /api/events/:id`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<NewEvent>,
) -> Result<Json<serde_json::Value>> {
    validate(&payload)?;

    let event = store::update_event(&state.pool, id, &payload).await?;
    info!("Event updated: id={id}");

    state.notifier.publish(UpdateMessage::EventUpdated(event.clone()));

    Ok(Json(json!({
        "message": "Event updated successfully",
        "event": event,
    })))
}

/// `DELETE /api/events/:id`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    store::delete_event(&state.pool, id).await?;
    info!("Event deleted: id={id}");

    state.notifier.publish(UpdateMessage::EventDeleted(id));

    Ok(Json(json!({ "message": "Event deleted successfully" })))
}
