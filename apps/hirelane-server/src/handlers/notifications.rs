//! Notification sources and the live admin counter stream.
//!
//! Job reports and contact messages carry a seen/unseen flag; inserts
//! publish an event on the bus, and connected admin dashboards follow the
//! unseen counters over server-sent events (fire-and-forget broadcast, no
//! delivery guarantee — a reconnecting client re-reads the counters).

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use hirelane_audit::{ActivityAction, ActivityEvent};
use hirelane_events::{EventBus, NotificationKind};
use hirelane_storage::{
    ContactMessage, ContactMessageId, CreateContactMessageParams, JobReport, JobReportId, Store,
    StoreError,
};

use crate::auth::AuthPrincipal;
use crate::error::{ApiError, MessageResponse};
use crate::handlers::auth::require_field;
use crate::server::AppState;

// ──────────────────────────── contact form ────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Public contact form; no authentication.
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_field(&req.name, "Name")?;
    require_field(&req.email, "Email")?;
    require_field(&req.message, "Message")?;

    state
        .store
        .create_contact_message(&CreateContactMessageParams {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            subject: req.subject.trim().to_string(),
            message: req.message.trim().to_string(),
        })
        .await?;

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::ContactMessageReceive, None)
                .subject(req.email.trim().to_lowercase()),
        )
        .await;
    state
        .publish_notification(NotificationKind::ContactMessage)
        .await;

    Ok(MessageResponse::ok("Message received"))
}

// ──────────────────────────── admin feeds ─────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// When true, only unseen entries are returned.
    #[serde(default)]
    pub unseen: bool,
}

fn report_json(report: &JobReport) -> serde_json::Value {
    serde_json::json!({
        "id": report.id.0.to_string(),
        "job_id": report.job_id.0.to_string(),
        "reporter_id": report.reporter_id.0.to_string(),
        "reason": report.reason,
        "seen": report.seen,
        "created_at": report.created_at,
    })
}

fn contact_json(message: &ContactMessage) -> serde_json::Value {
    serde_json::json!({
        "id": message.id.0.to_string(),
        "name": message.name,
        "email": message.email,
        "subject": message.subject,
        "message": message.message,
        "seen": message.seen,
        "created_at": message.created_at,
    })
}

pub async fn list_reports(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Query(query): Query<FeedQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let reports = state.store.list_job_reports(query.unseen).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "reports": reports.iter().map(report_json).collect::<Vec<_>>(),
    })))
}

pub async fn mark_report_seen(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    principal.require_admin()?;
    match state.store.mark_report_seen(&JobReportId(id)).await {
        Ok(()) => Ok(MessageResponse::ok("Report marked as seen")),
        Err(StoreError::NotFound) => Err(ApiError::NotFound("Report not found".into())),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_contacts(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Query(query): Query<FeedQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let messages = state.store.list_contact_messages(query.unseen).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "contacts": messages.iter().map(contact_json).collect::<Vec<_>>(),
    })))
}

pub async fn mark_contact_seen(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    principal.require_admin()?;
    match state.store.mark_contact_seen(&ContactMessageId(id)).await {
        Ok(()) => Ok(MessageResponse::ok("Message marked as seen")),
        Err(StoreError::NotFound) => Err(ApiError::NotFound("Message not found".into())),
        Err(e) => Err(e.into()),
    }
}

pub async fn unseen_counts(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let reports = state.store.count_unseen_reports().await?;
    let contacts = state.store.count_unseen_contacts().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "reports": reports,
        "contacts": contacts,
    })))
}

/// Live unseen-counter stream for admin dashboards.
pub async fn stream(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    principal.require_admin()?;

    let events = state
        .events
        .subscribe()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let stream = events.map(|event| Event::default().json_data(&event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
