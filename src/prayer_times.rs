//! Prayer-time API handlers.
//!
//! The collection has exactly 5 members with fixed membership; it is only
//! ever mutated by a full-collection replace, validated here before the
//! store is touched.

use crate::error::{MinaretError, Result};
use crate::notify::UpdateMessage;
use crate::schedule;
use crate::server::AppState;
use crate::store::{self, NewPrayerTime, PrayerTime};
use axum::extract::{Json, State};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use tracing::info;

/// Number of entries the prayer-time collection always holds.
pub const PRAYER_COUNT: usize = 5;

/// Request body of the bulk replace: `{"prayerTimes": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacePrayerTimesRequest {
    pub prayer_times: Vec<NewPrayerTime>,
}

impl ReplacePrayerTimesRequest {
    /// Validates the replacement collection.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless the payload has exactly 5 entries
    /// with non-empty unique names and parseable display times.
    pub fn validate(&self) -> Result<()> {
        if self.prayer_times.len() != PRAYER_COUNT {
            return Err(MinaretError::Validation(format!(
                "Prayer times array must contain exactly {PRAYER_COUNT} entries"
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.prayer_times {
            if entry.name.trim().is_empty() {
                return Err(MinaretError::Validation(
                    "Prayer name cannot be empty".to_string(),
                ));
            }
            if entry.arabic.trim().is_empty() {
                return Err(MinaretError::Validation(
                    "Prayer arabic label cannot be empty".to_string(),
                ));
            }
            if schedule::parse_prayer_time(&entry.time).is_none() {
                return Err(MinaretError::Validation(format!(
                    "Invalid prayer time format: {}",
                    entry.time
                )));
            }
            if !seen.insert(entry.name.trim().to_string()) {
                return Err(MinaretError::Validation(format!(
                    "Duplicate prayer name: {}",
                    entry.name
                )));
            }
        }

        Ok(())
    }
}

/// `GET /api/prayer-times`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PrayerTime>>> {
    let times = store::list_prayer_times(&state.pool).await?;
    Ok(Json(times))
}

/// `PUT /api/prayer-times`
///
/// Full-collection replace. On success the new canonical collection is
/// broadcast to every connected tab before the response is sent.
pub async fn replace(
    State(state): State<AppState>,
    Json(payload): Json<ReplacePrayerTimesRequest>,
) -> Result<Json<serde_json::Value>> {
    payload.validate()?;

    let times = store::replace_prayer_times(&state.pool, &payload.prayer_times).await?;
    info!("Prayer times replaced");

    state
        .notifier
        .publish(UpdateMessage::PrayerTimesUpdated(times.clone()));

    Ok(Json(json!({
        "message": "Prayer times updated successfully",
        "prayerTimes": times,
    })))
}
