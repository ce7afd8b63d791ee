//! Job handlers: posting (quota-guarded), listing, updates, bookmarks and
//! per-job statistics.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use hirelane_audit::{ActivityAction, ActivityEvent};
use hirelane_storage::{
    CompanyId, CreateJobParams, JobId, PrincipalId, QuotaOutcome, Role, Store, StoreError,
    SubscriptionKind, UpdateJobParams,
};

use crate::auth::AuthPrincipal;
use crate::error::{ApiError, MessageResponse};
use crate::handlers::auth::require_field;
use crate::handlers::JobView;
use crate::server::AppState;

/// Split a comma/newline-delimited free-text field into entries.
///
/// Entries are trimmed but empty entries are NOT filtered out; consumers
/// of the stored arrays may see empty strings. Long-standing behavior the
/// frontend relies on.
fn split_list_field(input: &str) -> Vec<String> {
    input
        .split([',', '\n'])
        .map(|part| part.trim().to_string())
        .collect()
}

// ─────────────────────────────── posting ──────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PostJobRequest {
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    /// Comma/newline-delimited free text.
    pub skills: String,
    pub benefits: String,
    pub qualifications: String,
    pub responsibilities: String,
    pub salary: i64,
    pub experience: String,
    pub location: String,
}

pub async fn post_job(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<PostJobRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company_id = CompanyId(req.company_id);
    let company = state.require_company_access(&company_id, &principal).await?;

    require_field(&req.title, "Title")?;
    require_field(&req.description, "Description")?;
    require_field(&req.location, "Location")?;
    if req.salary < 0 {
        return Err(ApiError::Validation("Salary cannot be negative".into()));
    }

    // Atomic tri-state quota consumption: None never decrements, 0 blocks,
    // a positive quota is decremented here and only here.
    let outcome = state.store.consume_job_quota(&company_id).await?;
    match outcome {
        QuotaOutcome::Exhausted => {
            return Err(ApiError::Forbidden(
                "You need job plans to post more jobs".into(),
            ));
        }
        QuotaOutcome::Consumed { remaining: 0 } => {
            // The plan is used up: force-expire the paid subscription now
            // rather than waiting for its calendar expiry.
            match state
                .store
                .get_active_subscription(&company_id, SubscriptionKind::JobPosts)
                .await
            {
                Ok(sub) if !sub.plan_name.eq_ignore_ascii_case("free") => {
                    state.store.mark_subscription_expired(&sub.id).await?;
                    tracing::info!(
                        subscription = %sub.id.0,
                        company = %company_id.0,
                        "job plan exhausted, subscription expired early"
                    );
                }
                Ok(_) | Err(StoreError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        QuotaOutcome::Unlimited | QuotaOutcome::Consumed { .. } => {}
    }

    let job_id = state
        .store
        .create_job(&CreateJobParams {
            company_id: company_id.clone(),
            recruiter_id: principal.id.clone(),
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            skills: split_list_field(&req.skills),
            benefits: split_list_field(&req.benefits),
            qualifications: split_list_field(&req.qualifications),
            responsibilities: split_list_field(&req.responsibilities),
            salary: req.salary,
            experience: req.experience.trim().to_string(),
            location: req.location.trim().to_string(),
        })
        .await?;

    let job = state.store.get_job(&job_id).await?;
    state
        .record_activity(
            ActivityEvent::new(ActivityAction::JobPost, Some(principal.id.clone()))
                .subject(company.name)
                .detail(job.title.clone()),
        )
        .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Job posted",
        "job": JobView::from(&job),
    })))
}

// ─────────────────────────────── listings ─────────────────────────────

/// All active jobs, streamed as one JSON array.
pub async fn list_jobs(State(state): State<AppState>) -> Result<Response, ApiError> {
    let jobs = state.store.list_jobs(true).await?;

    let mut chunks: Vec<Result<String, std::convert::Infallible>> =
        Vec::with_capacity(jobs.len() + 2);
    chunks.push(Ok("[".to_string()));
    for (i, job) in jobs.iter().enumerate() {
        let mut item = serde_json::to_string(&JobView::from(job))
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if i + 1 < jobs.len() {
            item.push(',');
        }
        chunks.push(Ok(item));
    }
    chunks.push(Ok("]".to_string()));

    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(tokio_stream::iter(chunks)))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job = match state.store.get_job(&JobId(id)).await {
        Ok(j) => j,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Job not found".into())),
        Err(e) => return Err(e.into()),
    };
    Ok(Json(serde_json::json!({
        "success": true,
        "job": JobView::from(&job),
    })))
}

/// Jobs owned by a company (public listing).
pub async fn company_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let jobs = state.store.list_company_jobs(&CompanyId(id)).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "jobs": jobs.iter().map(JobView::from).collect::<Vec<_>>(),
    })))
}

/// Jobs created by a recruiter (self or admin).
pub async fn recruiter_jobs(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = PrincipalId(id);
    if principal.id != target && principal.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "You can only list your own jobs".into(),
        ));
    }
    let jobs = state.store.list_recruiter_jobs(&target).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "jobs": jobs.iter().map(JobView::from).collect::<Vec<_>>(),
    })))
}

// ─────────────────────────────── updates ──────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<String>,
    pub benefits: Option<String>,
    pub qualifications: Option<String>,
    pub responsibilities: Option<String>,
    pub salary: Option<i64>,
    pub experience: Option<String>,
    pub location: Option<String>,
}

pub async fn update_job(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(job_id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job_id = JobId(job_id);
    let job = match state.store.get_job(&job_id).await {
        Ok(j) => j,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Job not found".into())),
        Err(e) => return Err(e.into()),
    };
    state.require_company_access(&job.company_id, &principal).await?;

    state
        .store
        .update_job(
            &job_id,
            &UpdateJobParams {
                title: req.title,
                description: req.description,
                skills: req.skills.as_deref().map(split_list_field),
                benefits: req.benefits.as_deref().map(split_list_field),
                qualifications: req.qualifications.as_deref().map(split_list_field),
                responsibilities: req.responsibilities.as_deref().map(split_list_field),
                salary: req.salary,
                experience: req.experience,
                location: req.location,
            },
        )
        .await?;

    let updated = state.store.get_job(&job_id).await?;
    state
        .record_activity(
            ActivityEvent::new(ActivityAction::JobUpdate, Some(principal.id.clone()))
                .subject(updated.title.clone()),
        )
        .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Job updated",
        "job": JobView::from(&updated),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ToggleJobRequest {
    pub job_id: Uuid,
    pub active: bool,
}

pub async fn toggle_job_active(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<ToggleJobRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let job_id = JobId(req.job_id);
    let job = match state.store.get_job(&job_id).await {
        Ok(j) => j,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Job not found".into())),
        Err(e) => return Err(e.into()),
    };
    state.require_company_access(&job.company_id, &principal).await?;

    state.store.set_job_active(&job_id, req.active).await?;
    Ok(MessageResponse::ok(if req.active {
        "Job activated"
    } else {
        "Job deactivated"
    }))
}

/// Delete a job (associated recruiter or platform admin); applications
/// and bookmarks cascade.
pub async fn delete_job(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let job_id = JobId(id);
    let job = match state.store.get_job(&job_id).await {
        Ok(j) => j,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Job not found".into())),
        Err(e) => return Err(e.into()),
    };
    state
        .require_company_access_or_admin(&job.company_id, &principal)
        .await?;

    state.store.delete_job(&job_id).await?;
    state
        .record_activity(
            ActivityEvent::new(ActivityAction::JobDelete, Some(principal.id.clone()))
                .subject(job.title),
        )
        .await;

    Ok(MessageResponse::ok("Job deleted"))
}

// ────────────────────────────── bookmarks ─────────────────────────────

/// Toggle a bookmark on a job for the caller.
pub async fn bookmark_job(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(job_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let job_id = JobId(job_id);
    match state.store.get_job(&job_id).await {
        Ok(_) => {}
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Job not found".into())),
        Err(e) => return Err(e.into()),
    }

    let bookmarked = state.store.toggle_bookmark(&job_id, &principal.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "bookmarked": bookmarked,
    })))
}

pub async fn bookmarked_jobs(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<serde_json::Value>, ApiError> {
    let jobs = state.store.list_bookmarked_jobs(&principal.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "jobs": jobs.iter().map(JobView::from).collect::<Vec<_>>(),
    })))
}

// ───────────────────────────── statistics ─────────────────────────────

pub async fn job_statistics(
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

    let stats = state.store.job_statistics(&job_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "statistics": {
            "total_applications": stats.total_applications,
            "pending": stats.pending,
            "shortlisted": stats.shortlisted,
            "rejected": stats.rejected,
            "bookmarks": stats.bookmarks,
        },
    })))
}
