//! Settings API handlers.
//!
//! Settings are key/value rows grouped by category for delivery. Writes are
//! upserts with last-write-wins semantics, applied in one transaction, and
//! the post-write grouped map is what gets broadcast and returned.

use crate::error::{MinaretError, Result};
use crate::notify::UpdateMessage;
use crate::server::AppState;
use crate::store::{self, Setting, SettingUpsert, SettingsMap};
use axum::extract::{Json, Path, State};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Request body of the bulk upsert: `{"settings": {category: {key: value}}}`.
#[derive(Debug, Deserialize)]
pub struct UpsertSettingsRequest {
    pub settings: SettingsMap,
}

impl UpsertSettingsRequest {
    /// Flatten the nested category map into upsert rows.
    pub fn flatten(&self) -> Vec<SettingUpsert> {
        let mut flat = Vec::new();
        for (category, entries) in &self.settings {
            for (key, value) in entries {
                flat.push(SettingUpsert {
                    key: key.clone(),
                    value: value.clone(),
                    category: category.clone(),
                });
            }
        }
        flat
    }
}

/// `GET /api/settings`. All settings grouped by category.
pub async fn grouped(State(state): State<AppState>) -> Result<Json<SettingsMap>> {
    let settings = store::grouped_settings(&state.pool).await?;
    Ok(Json(settings))
}

/// `PUT /api/settings`
///
/// Transactional upsert of every provided key, then a broadcast of the
/// re-read canonical map so clients mirror exactly what the store holds.
pub async fn upsert(
    State(state): State<AppState>,
    Json(payload): Json<UpsertSettingsRequest>,
) -> Result<Json<serde_json::Value>> {
    let flat = payload.flatten();
    if flat.is_empty() {
        return Err(MinaretError::Validation(
            "Settings object is required".to_string(),
        ));
    }

    store::upsert_settings(&state.pool, &flat).await?;
    info!("Settings updated: {} keys", flat.len());

    let settings = store::grouped_settings(&state.pool).await?;
    state
        .notifier
        .publish(UpdateMessage::SettingsUpdated(settings.clone()));

    Ok(Json(json!({
        "message": "Settings updated successfully",
        "settings": settings,
    })))
}

/// `GET /api/settings/:key`. A single setting row.
pub async fn get_one(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Setting>> {
    let setting = store::get_setting(&state.pool, &key).await?;
    Ok(Json(setting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_flatten_walks_every_category() {
        let raw = r#"{"settings": {
            "donation": {"donation_title": "Ehson", "donation_mfo": "00901"},
            "footer": {"footer_copyright": "© 2025"}
        }}"#;
        let request: UpsertSettingsRequest = serde_json::from_str(raw).unwrap();

        let flat = request.flatten();
        assert_eq!(flat.len(), 3);
        assert!(flat
            .iter()
            .any(|s| s.key == "donation_mfo" && s.category == "donation" && s.value == "00901"));
        assert!(flat.iter().any(|s| s.category == "footer"));
    }

    #[test]
    fn test_flatten_empty_map_is_empty() {
        let request = UpsertSettingsRequest {
            settings: BTreeMap::new(),
        };
        assert!(request.flatten().is_empty());
    }
}
