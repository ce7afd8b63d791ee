//! Application handlers: apply (idempotent per job/applicant), listings
//! and status transitions with applicant notification.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use hirelane_audit::{ActivityAction, ActivityEvent};
use hirelane_storage::{
    ApplicationId, ApplicationStatus, CreateApplicationParams, JobId, Role, Store, StoreError,
};

use crate::auth::AuthPrincipal;
use crate::email::EmailContent;
use crate::error::ApiError;
use crate::handlers::{ApplicationView, PrincipalView};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub job_id: Uuid,
    /// Resume carried as a URL; upload happens elsewhere.
    pub resume_url: Option<String>,
}

pub async fn apply(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_role(Role::Student)?;

    let job_id = JobId(req.job_id);
    let job = match state.store.get_job(&job_id).await {
        Ok(j) => j,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Job not found".into())),
        Err(e) => return Err(e.into()),
    };
    if !job.is_active {
        return Err(ApiError::Validation(
            "This job is no longer accepting applications".into(),
        ));
    }

    // Idempotency pre-check; the unique index backs it up under races.
    match state.store.get_application_for(&job_id, &principal.id).await {
        Ok(_) => {
            return Err(ApiError::Conflict(
                "You have already applied for this job".into(),
            ))
        }
        Err(StoreError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    let result = state
        .store
        .create_application(&CreateApplicationParams {
            job_id: job_id.clone(),
            applicant_id: principal.id.clone(),
            resume_url: req.resume_url,
        })
        .await;

    let application_id = match result {
        Ok(id) => id,
        Err(StoreError::AlreadyExists) => {
            return Err(ApiError::Conflict(
                "You have already applied for this job".into(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    let application = state.store.get_application(&application_id).await?;
    state
        .record_activity(
            ActivityEvent::new(ActivityAction::ApplicationSubmit, Some(principal.id.clone()))
                .subject(job.title),
        )
        .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Application submitted",
        "application": ApplicationView::from(&application),
    })))
}

/// The caller's applications.
pub async fn my_applications(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<serde_json::Value>, ApiError> {
    let applications = state
        .store
        .list_applicant_applications(&principal.id)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "applications": applications.iter().map(ApplicationView::from).collect::<Vec<_>>(),
    })))
}

/// Applicants of one job, with their profiles (association-guarded).
pub async fn job_applicants(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job_id = JobId(id);
    let job = match state.store.get_job(&job_id).await {
        Ok(j) => j,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Job not found".into())),
        Err(e) => return Err(e.into()),
    };
    state.require_company_access(&job.company_id, &principal).await?;

    let applications = state.store.list_job_applications(&job_id).await?;
    let mut entries = Vec::with_capacity(applications.len());
    for application in &applications {
        let applicant = state.load_principal(&application.applicant_id).await?;
        entries.push(serde_json::json!({
            "application": ApplicationView::from(application),
            "applicant": PrincipalView::from(&applicant),
        }));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "applicants": entries,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Overwrite an application's status. There is no legal-transition check:
/// any status can be written over any other, exactly as the platform has
/// always behaved. Shortlist/reject outcomes notify the applicant by
/// email (single attempt, awaited).
pub async fn update_status(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status: ApplicationStatus = req
        .status
        .to_lowercase()
        .parse()
        .map_err(|_| ApiError::Validation(format!("Unknown status: {}", req.status)))?;

    let application_id = ApplicationId(id);
    let application = match state.store.get_application(&application_id).await {
        Ok(a) => a,
        Err(StoreError::NotFound) => {
            return Err(ApiError::NotFound("Application not found".into()))
        }
        Err(e) => return Err(e.into()),
    };
    let job = state.store.get_job(&application.job_id).await?;
    let company = state.require_company_access(&job.company_id, &principal).await?;

    state
        .store
        .set_application_status(&application_id, status)
        .await?;

    if matches!(
        status,
        ApplicationStatus::Shortlisted | ApplicationStatus::Rejected
    ) {
        let applicant = state.load_principal(&application.applicant_id).await?;
        state
            .send_email(
                &applicant.email,
                &EmailContent::application_status(&job.title, &company.name, status),
            )
            .await?;
    }

    state
        .record_activity(
            ActivityEvent::new(
                ActivityAction::ApplicationStatusChange,
                Some(principal.id.clone()),
            )
            .subject(job.title)
            .detail(status.to_string()),
        )
        .await;

    let updated = state.store.get_application(&application_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Application status updated",
        "application": ApplicationView::from(&updated),
    })))
}
