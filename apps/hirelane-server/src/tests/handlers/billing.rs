//! Order and payment-verification tests across the subscription
//! lifecycle.

use axum::extract::{Json, State};

use hirelane_billing::payment_signature;
use hirelane_storage::{Store, SubscriptionKind, SubscriptionStatus};

use crate::error::ApiError;
use crate::handlers::orders::*;
use crate::handlers::verification::*;
use crate::tests::common::*;

async fn order_id_for_job_plan(
    state: &crate::server::AppState,
    owner: &crate::auth::AuthPrincipal,
    company_id: &hirelane_storage::CompanyId,
    plan: &str,
) -> String {
    let response = create_order_for_jobplan(
        State(state.clone()),
        owner.clone(),
        Json(CreateOrderRequest {
            company_id: company_id.0,
            plan: plan.into(),
        }),
    )
    .await
    .unwrap();
    response.0["order_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn order_creation_parks_subscription_in_hold() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let order_id = order_id_for_job_plan(&state, &owner, &company_id, "Basic").await;

    let sub = state
        .store
        .get_subscription_by_order(&order_id)
        .await
        .unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Hold);
    assert_eq!(sub.boost, 5);

    // Nothing boosted before verification.
    let company = state.store.get_company(&company_id).await.unwrap();
    assert_eq!(company.max_job_posts, None);
}

#[tokio::test]
async fn valid_signature_activates_and_boosts_once() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    state.store.reset_job_quota(&company_id).await.unwrap();

    let order_id = order_id_for_job_plan(&state, &owner, &company_id, "Basic").await;
    let signature = payment_signature(&order_id, "pay_123", &state.billing.key_secret);

    let response = verify_payment_for_jobplan(
        State(state.clone()),
        owner.clone(),
        Json(VerifyPaymentRequest {
            order_id: order_id.clone(),
            payment_id: "pay_123".into(),
            signature: signature.clone(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.0["subscription"]["status"], "active");
    assert_eq!(
        state.store.get_company(&company_id).await.unwrap().max_job_posts,
        Some(5)
    );

    // Verifying the same payment again must not double-boost.
    let response = verify_payment_for_jobplan(
        State(state.clone()),
        owner,
        Json(VerifyPaymentRequest {
            order_id,
            payment_id: "pay_123".into(),
            signature,
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.0["message"], "Payment already verified");
    assert_eq!(
        state.store.get_company(&company_id).await.unwrap().max_job_posts,
        Some(5)
    );
}

#[tokio::test]
async fn bad_signature_changes_nothing() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let order_id = order_id_for_job_plan(&state, &owner, &company_id, "Basic").await;

    let err = verify_payment_for_jobplan(
        State(state.clone()),
        owner,
        Json(VerifyPaymentRequest {
            order_id: order_id.clone(),
            payment_id: "pay_123".into(),
            signature: "f".repeat(64),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let sub = state
        .store
        .get_subscription_by_order(&order_id)
        .await
        .unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Hold);
    assert_eq!(
        state.store.get_company(&company_id).await.unwrap().max_job_posts,
        None
    );
}

#[tokio::test]
async fn free_plan_activates_without_payment() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    state.store.reset_job_quota(&company_id).await.unwrap();

    let response = create_order_for_jobplan(
        State(state.clone()),
        owner,
        Json(CreateOrderRequest {
            company_id: company_id.0,
            plan: "Free".into(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.0["subscription"]["status"], "active");
    assert!(response.0.get("order_id").is_none());

    assert_eq!(
        state.store.get_company(&company_id).await.unwrap().max_job_posts,
        Some(1)
    );
}

#[tokio::test]
async fn candidate_plan_boosts_credits() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let response = create_order_for_candidateplan(
        State(state.clone()),
        owner.clone(),
        Json(CreateOrderRequest {
            company_id: company_id.0,
            plan: "Starter".into(),
        }),
    )
    .await
    .unwrap();
    let order_id = response.0["order_id"].as_str().unwrap().to_string();
    let signature = payment_signature(&order_id, "pay_c1", &state.billing.key_secret);

    verify_payment_for_candidateplan(
        State(state.clone()),
        owner,
        Json(VerifyPaymentRequest {
            order_id,
            payment_id: "pay_c1".into(),
            signature,
        }),
    )
    .await
    .unwrap();

    let company = state.store.get_company(&company_id).await.unwrap();
    assert_eq!(company.candidate_credits, 25);
    // Job quota untouched by the candidate plan.
    assert_eq!(company.max_job_posts, None);
}

#[tokio::test]
async fn wrong_kind_endpoint_rejects_order() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let order_id = order_id_for_job_plan(&state, &owner, &company_id, "Basic").await;
    let signature = payment_signature(&order_id, "pay_1", &state.billing.key_secret);

    let err = verify_payment_for_candidateplan(
        State(state.clone()),
        owner,
        Json(VerifyPaymentRequest {
            order_id,
            payment_id: "pay_1".into(),
            signature,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn unknown_plan_is_rejected() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let err = create_order_for_jobplan(
        State(state.clone()),
        owner,
        Json(CreateOrderRequest {
            company_id: company_id.0,
            plan: "Platinum".into(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn buying_again_replaces_the_held_order() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let first = order_id_for_job_plan(&state, &owner, &company_id, "Basic").await;
    let second = order_id_for_job_plan(&state, &owner, &company_id, "Standard").await;

    // The first order is gone; only the newest Hold remains.
    assert!(state
        .store
        .get_subscription_by_order(&first)
        .await
        .is_err());
    let sub = state.store.get_subscription_by_order(&second).await.unwrap();
    assert_eq!(sub.kind, SubscriptionKind::JobPosts);
    assert_eq!(sub.boost, 15);
}
