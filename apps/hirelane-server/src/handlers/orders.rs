//! Payment-order creation for job-post and candidate-credit plans.
//!
//! Both plan kinds run the same lifecycle; these handlers only pick the
//! catalog. A purchase replaces any prior Hold/Expired subscription of the
//! same kind, opens a gateway order and parks the subscription in Hold
//! until the payment signature is verified. Zero-price plans skip the
//! gateway and activate on the spot.

use axum::{extract::State, Json};
use chrono::{Months, Utc};
use serde::Deserialize;
use uuid::Uuid;

use hirelane_audit::{ActivityAction, ActivityEvent};
use hirelane_billing::find_plan;
use hirelane_storage::{CompanyId, CreateSubscriptionParams, Store, SubscriptionKind};

use crate::auth::AuthPrincipal;
use crate::error::ApiError;
use crate::handlers::SubscriptionView;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub company_id: Uuid,
    pub plan: String,
}

async fn create_order(
    state: &AppState,
    principal: &AuthPrincipal,
    req: CreateOrderRequest,
    kind: SubscriptionKind,
) -> Result<Json<serde_json::Value>, ApiError> {
    let company_id = CompanyId(req.company_id);
    let company = state.require_company_access(&company_id, principal).await?;

    let plan = find_plan(kind, &req.plan)?;
    let expires_at = Utc::now()
        .checked_add_months(Months::new(1))
        .ok_or_else(|| ApiError::Internal("failed to compute expiry date".into()))?;

    if plan.is_free() {
        // No payment to verify: activate immediately.
        let subscription_id = state
            .store
            .create_subscription(&CreateSubscriptionParams {
                company_id: company_id.clone(),
                kind,
                plan_name: plan.name.to_string(),
                boost: plan.boost,
                price: plan.price,
                order_id: None,
                expires_at,
            })
            .await?;
        state
            .store
            .activate_subscription(&subscription_id, None)
            .await?;

        state
            .record_activity(
                ActivityEvent::new(ActivityAction::SubscriptionActivate, Some(principal.id.clone()))
                    .subject(company.name)
                    .detail(format!("{} ({})", plan.name, kind)),
            )
            .await;

        let subscription = state.store.get_subscription(&subscription_id).await?;
        return Ok(Json(serde_json::json!({
            "success": true,
            "message": "Free plan activated",
            "subscription": SubscriptionView::from(&subscription),
        })));
    }

    let receipt = format!("{}-{}", kind, company_id.0.simple());
    let order = state
        .gateway
        .create_order(plan.price, &state.billing.currency, &receipt)
        .await?;

    let subscription_id = state
        .store
        .create_subscription(&CreateSubscriptionParams {
            company_id: company_id.clone(),
            kind,
            plan_name: plan.name.to_string(),
            boost: plan.boost,
            price: plan.price,
            order_id: Some(order.order_id.clone()),
            expires_at,
        })
        .await?;

    state
        .record_activity(
            ActivityEvent::new(ActivityAction::SubscriptionCreate, Some(principal.id.clone()))
                .subject(company.name)
                .detail(format!("{} ({})", plan.name, kind)),
        )
        .await;

    let subscription = state.store.get_subscription(&subscription_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Order created",
        "order_id": order.order_id,
        "amount": order.amount,
        "currency": order.currency,
        "key_id": state.billing.key_id,
        "subscription": SubscriptionView::from(&subscription),
    })))
}

pub async fn create_order_for_jobplan(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    create_order(&state, &principal, req, SubscriptionKind::JobPosts).await
}

pub async fn create_order_for_candidateplan(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    create_order(&state, &principal, req, SubscriptionKind::CandidateCredits).await
}
