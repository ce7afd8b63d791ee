//! Company handlers: registration, association management, ownership,
//! plans, candidate credits, reporting and the admin verification cascade.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use hirelane_audit::{ActivityAction, ActivityEvent};
use hirelane_storage::{
    CompanyId, CreateCompanyParams, CreateJobReportParams, CreditOutcome, JobId, Role, Store,
    StoreError, SubscriptionKind, UpdateCompanyParams,
};

use hirelane_events::NotificationKind;

use crate::auth::AuthPrincipal;
use crate::error::{ApiError, MessageResponse};
use crate::handlers::auth::require_field;
use crate::handlers::{ApplicationView, CompanyView, PrincipalView, SubscriptionView};
use crate::server::AppState;

/// Validate the Indian corporate identification number layout:
/// listing letter, 5-digit registration, state code, incorporation year,
/// 3-letter company class, 6-digit serial (21 characters total).
fn validate_cin(cin: &str) -> Result<(), ApiError> {
    let b = cin.as_bytes();
    let ok = b.len() == 21
        && matches!(b[0], b'L' | b'U')
        && b[1..6].iter().all(u8::is_ascii_digit)
        && b[6..8].iter().all(u8::is_ascii_uppercase)
        && b[8..12].iter().all(u8::is_ascii_digit)
        && b[12..15].iter().all(u8::is_ascii_uppercase)
        && b[15..21].iter().all(u8::is_ascii_digit);
    if !ok {
        return Err(ApiError::Validation("Invalid CIN format".into()));
    }
    Ok(())
}

// ──────────────────────────── registration ────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterCompanyRequest {
    pub name: String,
    pub email: String,
    pub cin: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
}

pub async fn register_company(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<RegisterCompanyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_role(Role::Recruiter)?;
    require_field(&req.name, "Company name")?;
    require_field(&req.email, "Company email")?;
    validate_cin(&req.cin)?;

    let recruiter = state.load_principal(&principal.id).await?;

    // One company per recruiter.
    match state.store.get_company_for_recruiter(&principal.id).await {
        Ok(_) => {
            return Err(ApiError::Conflict(
                "You are already associated with a company".into(),
            ))
        }
        Err(StoreError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    if state
        .store
        .is_company_blacklisted(req.name.trim(), &req.email, &req.cin)
        .await?
    {
        return Err(ApiError::Forbidden(
            "This company has been removed from the platform and cannot re-register".into(),
        ));
    }

    let result = state
        .store
        .create_company(&CreateCompanyParams {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            admin_email: recruiter.email.clone(),
            cin: req.cin.trim().to_string(),
            description: req.description,
            website: req.website,
            logo_url: req.logo_url,
            location: req.location,
            created_by: principal.id.clone(),
        })
        .await;

    let id = match result {
        Ok(id) => id,
        Err(StoreError::AlreadyExists) => {
            return Err(ApiError::Conflict(
                "A company with this name or CIN already exists".into(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    let company = state.store.get_company(&id).await?;
    state
        .record_activity(
            ActivityEvent::new(ActivityAction::CompanyRegister, Some(principal.id.clone()))
                .subject(company.name.clone()),
        )
        .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Company registered",
        "company": CompanyView::from(&company),
    })))
}

// ─────────────────────────────── lookups ──────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompanyByIdRequest {
    pub company_id: Uuid,
}

pub async fn company_by_id(
    State(state): State<AppState>,
    _principal: AuthPrincipal,
    Json(req): Json<CompanyByIdRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company = match state.store.get_company(&CompanyId(req.company_id)).await {
        Ok(c) => c,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Company not found".into())),
        Err(e) => return Err(e.into()),
    };
    Ok(Json(serde_json::json!({
        "success": true,
        "company": CompanyView::from(&company),
    })))
}

/// The caller's own company (via its recruiter association).
pub async fn company_by_userid(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company = match state.store.get_company_for_recruiter(&principal.id).await {
        Ok(c) => c,
        Err(StoreError::NotFound) => {
            return Err(ApiError::NotFound(
                "You are not associated with any company".into(),
            ))
        }
        Err(e) => return Err(e.into()),
    };
    let recruiters = state.store.list_company_recruiters(&company.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "company": CompanyView::from(&company),
        "recruiters": recruiters.iter().map(PrincipalView::from).collect::<Vec<_>>(),
    })))
}

// ─────────────────────────────── updates ──────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
}

pub async fn update_company(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company_id = CompanyId(id);
    let (company, _) = state.require_company_owner(&company_id, &principal).await?;

    state
        .store
        .update_company(
            &company_id,
            &UpdateCompanyParams {
                name: req.name,
                email: req.email,
                description: req.description,
                website: req.website,
                logo_url: req.logo_url,
                location: req.location,
            },
        )
        .await?;

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::CompanyUpdate, Some(principal.id.clone()))
                .subject(company.name),
        )
        .await;

    let updated = state.store.get_company(&company_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Company updated",
        "company": CompanyView::from(&updated),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ChangeAdminRequest {
    pub company_id: Uuid,
    pub new_admin_email: String,
}

/// Hand ownership to another associated recruiter. The admin email must
/// always match exactly one recruiter in the association set.
pub async fn change_admin(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<ChangeAdminRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let company_id = CompanyId(req.company_id);
    let (company, _) = state.require_company_owner(&company_id, &principal).await?;

    let new_admin_email = req.new_admin_email.trim().to_lowercase();
    let recruiters = state.store.list_company_recruiters(&company_id).await?;
    if !recruiters.iter().any(|r| r.email == new_admin_email) {
        return Err(ApiError::Validation(
            "New admin must be a recruiter associated with this company".into(),
        ));
    }

    state
        .store
        .set_company_admin_email(&company_id, &new_admin_email)
        .await?;

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::CompanyAdminChange, Some(principal.id.clone()))
                .subject(company.name)
                .detail(format!("ownership moved to {}", new_admin_email)),
        )
        .await;

    Ok(MessageResponse::ok("Company admin changed"))
}

// ────────────────────────── recruiter management ──────────────────────

#[derive(Debug, Deserialize)]
pub struct AddRecruiterRequest {
    pub company_id: Uuid,
    pub email: String,
}

/// Associate an existing recruiter account with the company.
pub async fn add_recruiter(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<AddRecruiterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let company_id = CompanyId(req.company_id);
    let (company, _) = state.require_company_owner(&company_id, &principal).await?;

    let recruiter = match state.store.get_principal_by_email(&req.email).await {
        Ok(p) if p.role == Role::Recruiter => p,
        Ok(_) => {
            return Err(ApiError::Validation(
                "That account is not a recruiter".into(),
            ))
        }
        Err(StoreError::NotFound) => {
            return Err(ApiError::NotFound("No recruiter with that email".into()))
        }
        Err(e) => return Err(e.into()),
    };

    match state
        .store
        .add_company_recruiter(&company_id, &recruiter.id)
        .await
    {
        Ok(()) => {}
        Err(StoreError::AlreadyExists) => {
            return Err(ApiError::Conflict(
                "Recruiter is already associated with this company".into(),
            ))
        }
        Err(e) => return Err(e.into()),
    }

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::RecruiterAdd, Some(principal.id.clone()))
                .subject(company.name)
                .detail(recruiter.email),
        )
        .await;

    Ok(MessageResponse::ok("Recruiter added to company"))
}

#[derive(Debug, Deserialize)]
pub struct RemoveRecruiterRequest {
    pub company_id: Uuid,
    pub recruiter_id: Uuid,
}

pub async fn remove_recruiter(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<RemoveRecruiterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let company_id = CompanyId(req.company_id);
    let (company, owner) = state.require_company_owner(&company_id, &principal).await?;

    let target = hirelane_storage::PrincipalId(req.recruiter_id);
    if target == owner.id {
        return Err(ApiError::Validation(
            "The company admin cannot be removed; transfer ownership first".into(),
        ));
    }

    match state
        .store
        .remove_company_recruiter(&company_id, &target)
        .await
    {
        Ok(()) => {}
        Err(StoreError::NotFound) => {
            return Err(ApiError::NotFound(
                "Recruiter is not associated with this company".into(),
            ))
        }
        Err(e) => return Err(e.into()),
    }

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::RecruiterRemove, Some(principal.id.clone()))
                .subject(company.name),
        )
        .await;

    Ok(MessageResponse::ok("Recruiter removed from company"))
}

#[derive(Debug, Deserialize)]
pub struct ToggleRecruiterRequest {
    pub recruiter_id: Uuid,
    pub active: bool,
}

/// Flip a recruiter's active flag (company owner or platform admin).
pub async fn toggle_recruiter_active(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<ToggleRecruiterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = hirelane_storage::PrincipalId(req.recruiter_id);

    if principal.role != Role::Admin {
        // The caller must own the company the target belongs to.
        let company = match state.store.get_company_for_recruiter(&target).await {
            Ok(c) => c,
            Err(StoreError::NotFound) => {
                return Err(ApiError::NotFound(
                    "Recruiter is not associated with any company".into(),
                ))
            }
            Err(e) => return Err(e.into()),
        };
        state.require_company_owner(&company.id, &principal).await?;
    }

    state.store.set_principal_active(&target, req.active).await?;
    Ok(MessageResponse::ok(if req.active {
        "Recruiter activated"
    } else {
        "Recruiter deactivated"
    }))
}

// ───────────────────────── plans & credits ────────────────────────────

pub async fn current_plan(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company_id = CompanyId(id);
    let company = state.require_company_access(&company_id, &principal).await?;

    let job_plan = match state
        .store
        .get_active_subscription(&company_id, SubscriptionKind::JobPosts)
        .await
    {
        Ok(sub) => Some(SubscriptionView::from(&sub)),
        Err(StoreError::NotFound) => None,
        Err(e) => return Err(e.into()),
    };
    let candidate_plan = match state
        .store
        .get_active_subscription(&company_id, SubscriptionKind::CandidateCredits)
        .await
    {
        Ok(sub) => Some(SubscriptionView::from(&sub)),
        Err(StoreError::NotFound) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "max_job_posts": company.max_job_posts,
        "candidate_credits": company.candidate_credits,
        "job_plan": job_plan,
        "candidate_plan": candidate_plan,
    })))
}

/// Browse the candidate pool. Gated on a positive credit balance; each
/// resume view is billed separately through `decrease_credit`.
pub async fn candidate_list(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company = match state.store.get_company_for_recruiter(&principal.id).await {
        Ok(c) => c,
        Err(StoreError::NotFound) => {
            return Err(ApiError::Forbidden(
                "You are not associated with any company".into(),
            ))
        }
        Err(e) => return Err(e.into()),
    };
    state.require_company_access(&company.id, &principal).await?;

    if company.candidate_credits <= 0 {
        return Err(ApiError::Forbidden(
            "You need a candidate plan to browse candidates".into(),
        ));
    }

    let students = state.store.list_principals(Role::Student).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "candidates": students.iter().map(PrincipalView::from).collect::<Vec<_>>(),
    })))
}

/// Spend one candidate credit (one resume view). Floors at zero.
pub async fn decrease_credit(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company_id = CompanyId(id);
    state.require_company_access(&company_id, &principal).await?;

    match state.store.consume_candidate_credit(&company_id).await? {
        CreditOutcome::Consumed { remaining } => Ok(Json(serde_json::json!({
            "success": true,
            "candidate_credits": remaining,
        }))),
        CreditOutcome::Empty => Err(ApiError::Validation(
            "No candidate credits remaining".into(),
        )),
    }
}

pub async fn company_applicants(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(company_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company_id = CompanyId(company_id);
    state.require_company_access(&company_id, &principal).await?;

    let applications = state.store.list_company_applications(&company_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "applications": applications.iter().map(ApplicationView::from).collect::<Vec<_>>(),
    })))
}

// ─────────────────────────────── reports ──────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReportJobRequest {
    pub job_id: Uuid,
    pub reason: String,
}

pub async fn report_job(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<ReportJobRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_field(&req.reason, "Reason")?;

    let job_id = JobId(req.job_id);
    let job = match state.store.get_job(&job_id).await {
        Ok(j) => j,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Job not found".into())),
        Err(e) => return Err(e.into()),
    };

    state
        .store
        .create_job_report(&CreateJobReportParams {
            job_id,
            reporter_id: principal.id.clone(),
            reason: req.reason.trim().to_string(),
        })
        .await?;

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::JobReportFile, Some(principal.id.clone()))
                .subject(job.title),
        )
        .await;
    state.publish_notification(NotificationKind::JobReport).await;

    Ok(MessageResponse::ok("Report submitted"))
}

// ───────────────────────── admin & lifecycle ──────────────────────────

#[derive(Debug, Deserialize)]
pub struct ToggleCompanyRequest {
    pub active: bool,
}

/// Admin verification toggle. Deactivating a company deactivates every
/// associated recruiter and every job it owns; re-activating restores
/// both.
pub async fn toggle_company_active(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleCompanyRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    principal.require_admin()?;

    let company_id = CompanyId(id);
    let company = match state.store.get_company(&company_id).await {
        Ok(c) => c,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Company not found".into())),
        Err(e) => return Err(e.into()),
    };

    state.store.set_company_active(&company_id, req.active).await?;
    state
        .store
        .set_company_jobs_active(&company_id, req.active)
        .await?;
    for recruiter in state.store.list_company_recruiters(&company_id).await? {
        state
            .store
            .set_principal_active(&recruiter.id, req.active)
            .await?;
    }

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::CompanyVerifyToggle, Some(principal.id.clone()))
                .subject(company.name)
                .detail(if req.active { "activated" } else { "deactivated" }),
        )
        .await;

    Ok(MessageResponse::ok(if req.active {
        "Company activated"
    } else {
        "Company deactivated"
    }))
}

/// Delete a company (owner or platform admin). The identifying fields are
/// blacklisted so the same entity cannot re-register; jobs, applications,
/// subscriptions and associations cascade.
pub async fn delete_company(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let company_id = CompanyId(id);

    let company = if principal.role == Role::Admin {
        state
            .require_company_access_or_admin(&company_id, &principal)
            .await?
    } else {
        let (company, _) = state.require_company_owner(&company_id, &principal).await?;
        company
    };

    state.store.delete_company(&company_id).await?;

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::CompanyDelete, Some(principal.id.clone()))
                .subject(company.name),
        )
        .await;

    Ok(MessageResponse::ok("Company deleted"))
}
