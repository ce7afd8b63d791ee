//! Payment verification: the gateway callback carries a signature over
//! `order_id|payment_id`; a matching signature activates the subscription
//! and applies the plan boost, a mismatch changes nothing. Re-verifying an
//! already-active subscription is a no-op, never a second boost.

use axum::{extract::State, Json};
use serde::Deserialize;

use hirelane_audit::{ActivityAction, ActivityEvent};
use hirelane_billing::verify_payment_signature;
use hirelane_storage::{Store, StoreError, SubscriptionKind};

use crate::auth::AuthPrincipal;
use crate::error::ApiError;
use crate::handlers::SubscriptionView;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

async fn verify_payment(
    state: &AppState,
    principal: &AuthPrincipal,
    req: VerifyPaymentRequest,
    kind: SubscriptionKind,
) -> Result<Json<serde_json::Value>, ApiError> {
    let subscription = match state.store.get_subscription_by_order(&req.order_id).await {
        Ok(s) => s,
        Err(StoreError::NotFound) => {
            return Err(ApiError::NotFound("No order with that id".into()))
        }
        Err(e) => return Err(e.into()),
    };
    if subscription.kind != kind {
        return Err(ApiError::Validation(
            "Order does not belong to this plan type".into(),
        ));
    }

    let company = state
        .require_company_access(&subscription.company_id, principal)
        .await?;

    if !verify_payment_signature(
        &req.order_id,
        &req.payment_id,
        &req.signature,
        &state.billing.key_secret,
    ) {
        tracing::warn!(order_id = %req.order_id, "payment signature mismatch");
        return Err(ApiError::Validation("Invalid payment signature".into()));
    }

    let activated = state
        .store
        .activate_subscription(&subscription.id, Some(&req.payment_id))
        .await?;

    if activated {
        state
            .record_activity(
                ActivityEvent::new(ActivityAction::SubscriptionActivate, Some(principal.id.clone()))
                    .subject(company.name)
                    .detail(format!("{} ({})", subscription.plan_name, kind)),
            )
            .await;
    }

    let updated = state.store.get_subscription(&subscription.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": if activated {
            "Payment verified, plan activated"
        } else {
            "Payment already verified"
        },
        "subscription": SubscriptionView::from(&updated),
    })))
}

pub async fn verify_payment_for_jobplan(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    verify_payment(&state, &principal, req, SubscriptionKind::JobPosts).await
}

pub async fn verify_payment_for_candidateplan(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    verify_payment(&state, &principal, req, SubscriptionKind::CandidateCredits).await
}
