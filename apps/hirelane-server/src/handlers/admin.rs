//! Admin analytics: entity counts, time-ranged trends and the
//! recent-activity feed.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use hirelane_audit::AuditLog;
use hirelane_storage::{Store, TrendEntity};

use crate::auth::AuthPrincipal;
use crate::error::ApiError;
use crate::server::AppState;

pub async fn stats_counts(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;

    let counts = state.store.entity_counts().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "counts": {
            "students": counts.students,
            "recruiters": counts.recruiters,
            "admins": counts.admins,
            "companies": counts.companies,
            "jobs": counts.jobs,
            "applications": counts.applications,
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub entity: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

pub async fn stats_trend(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Query(query): Query<TrendQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;

    let entity: TrendEntity = query
        .entity
        .parse()
        .map_err(|_| ApiError::Validation(format!("Unknown entity: {}", query.entity)))?;
    if query.from > query.to {
        return Err(ApiError::Validation(
            "'from' must not be after 'to'".into(),
        ));
    }

    let trend = state
        .store
        .creation_trend(entity, query.from, query.to)
        .await?;
    let points: Vec<_> = trend
        .iter()
        .map(|p| serde_json::json!({ "day": p.day, "count": p.count }))
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "entity": query.entity,
        "trend": points,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentActivityQuery {
    pub limit: Option<u32>,
}

pub async fn recent_activity(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Query(query): Query<RecentActivityQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;

    let limit = query.limit.unwrap_or(20).min(100);
    let events = state
        .audit
        .recent(limit)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let entries: Vec<_> = events
        .iter()
        .map(|e| {
            serde_json::json!({
                "id": e.id.to_string(),
                "action": e.action.to_string(),
                "actor": e.actor.as_ref().map(|a| a.0.to_string()),
                "subject": e.subject,
                "detail": e.detail,
                "created_at": e.created_at,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "activity": entries,
    })))
}
