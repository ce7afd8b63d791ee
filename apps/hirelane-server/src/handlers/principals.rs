//! Profile management: partial updates and account deletion.

use axum::{extract::State, Json};
use serde::Deserialize;

use hirelane_audit::{ActivityAction, ActivityEvent};
use hirelane_storage::{Store, UpdateProfileParams};

use crate::auth::AuthPrincipal;
use crate::error::{ApiError, MessageResponse};
use crate::handlers::PrincipalView;
use crate::server::AppState;

/// Partial profile update; absent fields keep their stored values.
/// Photo and resume arrive as URLs (upload happens elsewhere).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub experience_years: Option<i64>,
    pub expected_ctc: Option<f64>,
    pub position: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(name) = &req.full_name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Full name cannot be empty".into()));
        }
    }

    state
        .store
        .update_profile(
            &principal.id,
            &UpdateProfileParams {
                full_name: req.full_name,
                phone: req.phone,
                skills: req.skills,
                resume_url: req.resume_url,
                photo_url: req.photo_url,
                experience_years: req.experience_years,
                expected_ctc: req.expected_ctc,
                position: req.position,
            },
        )
        .await?;

    let updated = state.load_principal(&principal.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Profile updated",
        "principal": PrincipalView::from(&updated),
    })))
}

/// Self-deletion. The session is revoked and the principal row goes away;
/// jobs it created and applications it filed cascade with it.
pub async fn delete_account(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<MessageResponse>, ApiError> {
    let loaded = state.load_principal(&principal.id).await?;

    state.store.delete_principal(&principal.id).await?;
    state
        .store
        .revoke_token(&principal.jti, principal.expires_at)
        .await?;

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::PrincipalDelete, Some(principal.id.clone()))
                .subject(loaded.email),
        )
        .await;

    Ok(MessageResponse::ok("Account deleted"))
}
