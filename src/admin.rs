//! Admin authentication handlers: login and profile update.
//!
//! Single admin account, no tokens or sessions; a successful login returns
//! the user descriptor and the client keeps it in memory. The profile update
//! re-authenticates with the current password before applying any change.
//! User-facing messages stay in Uzbek, matching what the forms display.

use crate::auth;
use crate::error::{MinaretError, Result};
use crate::server::AppState;
use crate::store;
use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public shape of the admin account, without the password hash.
#[derive(Debug, Serialize)]
pub struct UserDescriptor {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub current_email: String,
    pub current_password: String,
    pub new_email: Option<String>,
    pub new_password: Option<String>,
}

/// `POST /api/admin/login`
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(MinaretError::Validation(
            "Email va parol talab qilinadi".to_string(),
        ));
    }

    let admin = store::find_admin(&state.pool, &payload.email).await?;
    let admin = match admin {
        Some(admin) if auth::verify_password(&payload.password, &admin.password)? => admin,
        _ => {
            warn!("Failed login attempt for {}", payload.email);
            return Err(MinaretError::Unauthorized(
                "Noto'g'ri email yoki parol".to_string(),
            ));
        }
    };

    info!("Admin logged in: {}", admin.email);
    let user = UserDescriptor {
        id: admin.id.to_string(),
        email: admin.email,
        name: admin.name,
        role: admin.role,
    };

    Ok(Json(json!({
        "message": "Muvaffaqiyatli kirdingiz",
        "user": user,
    })))
}

/// `PUT /api/admin/update-profile`
///
/// Requires the current email and password; rejects with 401 when the
/// current password does not verify, even if the new values are valid.
pub async fn update_profile(
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>> {
    if payload.current_email.trim().is_empty() || payload.current_password.is_empty() {
        return Err(MinaretError::Validation(
            "Joriy email va parol talab qilinadi".to_string(),
        ));
    }

    let admin = store::find_admin(&state.pool, &payload.current_email).await?;
    let admin = match admin {
        Some(admin) if auth::verify_password(&payload.current_password, &admin.password)? => admin,
        _ => {
            warn!("Rejected profile update for {}", payload.current_email);
            return Err(MinaretError::Unauthorized(
                "Joriy parol noto'g'ri".to_string(),
            ));
        }
    };

    let new_email = payload
        .new_email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty() && *email != admin.email);

    let new_password_hash = match payload.new_password.as_deref() {
        Some(password) if !password.is_empty() => Some(auth::hash_password(password)?),
        _ => None,
    };

    store::update_admin_profile(&state.pool, admin.id, new_email, new_password_hash.as_deref())
        .await?;
    info!("Admin profile updated: id={}", admin.id);

    let mut body = json!({ "message": "Profil muvaffaqiyatli yangilandi" });
    if let Some(email) = new_email {
        body["newEmail"] = json!(email);
    }

    Ok(Json(body))
}
