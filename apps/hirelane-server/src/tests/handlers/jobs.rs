//! Job handler tests: quota semantics and guards.

use axum::extract::{Json, Path, State};
use chrono::{Duration, Utc};

use hirelane_storage::{
    CreateSubscriptionParams, Store, StoreError, SubscriptionKind, SubscriptionStatus,
};

use crate::error::ApiError;
use crate::handlers::jobs::*;
use crate::tests::common::*;

#[tokio::test]
async fn unlimited_quota_never_decrements() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    // Fresh companies have no quota set: unlimited posting.
    for _ in 0..3 {
        post_test_job(&state, &owner, &company_id).await;
    }
    assert_eq!(
        state.store.get_company(&company_id).await.unwrap().max_job_posts,
        None
    );
}

#[tokio::test]
async fn finite_quota_counts_down_and_blocks() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    state.store.reset_job_quota(&company_id).await.unwrap();
    state.store.add_job_quota(&company_id, 5).await.unwrap();

    // Five posts succeed...
    for _ in 0..5 {
        post_test_job(&state, &owner, &company_id).await;
    }
    assert_eq!(
        state.store.get_company(&company_id).await.unwrap().max_job_posts,
        Some(0)
    );

    // ...and the sixth is turned away with no job created.
    let jobs_before = state.store.list_company_jobs(&company_id).await.unwrap().len();
    let err = post_job(
        State(state.clone()),
        owner.clone(),
        Json(job_request(&company_id)),
    )
    .await
    .unwrap_err();
    match err {
        ApiError::Forbidden(msg) => assert!(msg.contains("need job plans"), "{}", msg),
        other => panic!("expected forbidden, got {:?}", other),
    }
    assert_eq!(
        state.store.list_company_jobs(&company_id).await.unwrap().len(),
        jobs_before
    );
}

#[tokio::test]
async fn exhausting_quota_expires_paid_subscription_early() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    state.store.reset_job_quota(&company_id).await.unwrap();

    // An Active paid plan with a single remaining post.
    let sub_id = state
        .store
        .create_subscription(&CreateSubscriptionParams {
            company_id: company_id.clone(),
            kind: SubscriptionKind::JobPosts,
            plan_name: "Basic".into(),
            boost: 1,
            price: 99_900,
            order_id: Some("order_exhaust".into()),
            expires_at: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap();
    state
        .store
        .activate_subscription(&sub_id, Some("pay_1"))
        .await
        .unwrap();

    post_test_job(&state, &owner, &company_id).await;

    // The calendar expiry is a month out, but the quota hit zero: the
    // subscription expires now.
    let sub = state.store.get_subscription(&sub_id).await.unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Expired);
}

#[tokio::test]
async fn exhausting_quota_leaves_free_plan_alone() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    state.store.reset_job_quota(&company_id).await.unwrap();

    let sub_id = state
        .store
        .create_subscription(&CreateSubscriptionParams {
            company_id: company_id.clone(),
            kind: SubscriptionKind::JobPosts,
            plan_name: "Free".into(),
            boost: 1,
            price: 0,
            order_id: None,
            expires_at: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap();
    state.store.activate_subscription(&sub_id, None).await.unwrap();

    post_test_job(&state, &owner, &company_id).await;

    let sub = state.store.get_subscription(&sub_id).await.unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn posting_requires_association() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let outsider = create_recruiter(&state, "other@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let err = post_job(
        State(state.clone()),
        outsider,
        Json(job_request(&company_id)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn free_text_fields_are_split_with_empties_preserved() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let mut request = job_request(&company_id);
    request.skills = "rust, sql,,go,".into();
    let response = post_job(State(state.clone()), owner, Json(request))
        .await
        .unwrap();

    let skills: Vec<String> = response.0["job"]["skills"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(skills, vec!["rust", "sql", "", "go", ""]);
}

#[tokio::test]
async fn delete_job_cascades_and_respects_guard() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let student = create_student(&state, "s@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    // A student cannot delete a job.
    let err = delete_job(State(state.clone()), student, Path(job_id.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    // An admin can.
    let admin = create_admin(&state, "root@example.com").await;
    delete_job(State(state.clone()), admin, Path(job_id.0))
        .await
        .unwrap();
    assert!(matches!(
        state.store.get_job(&job_id).await.unwrap_err(),
        StoreError::NotFound
    ));
}

#[tokio::test]
async fn bookmark_toggles() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let student = create_student(&state, "s@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    let on = bookmark_job(State(state.clone()), student.clone(), Path(job_id.0))
        .await
        .unwrap();
    assert_eq!(on.0["bookmarked"], true);

    let listed = bookmarked_jobs(State(state.clone()), student.clone())
        .await
        .unwrap();
    assert_eq!(listed.0["jobs"].as_array().unwrap().len(), 1);

    let off = bookmark_job(State(state.clone()), student, Path(job_id.0))
        .await
        .unwrap();
    assert_eq!(off.0["bookmarked"], false);
}

#[tokio::test]
async fn statistics_are_association_guarded() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let outsider = create_recruiter(&state, "other@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    assert!(matches!(
        job_statistics(State(state.clone()), outsider, Path(job_id.0))
            .await
            .unwrap_err(),
        ApiError::Forbidden(_)
    ));

    let stats = job_statistics(State(state.clone()), owner, Path(job_id.0))
        .await
        .unwrap();
    assert_eq!(stats.0["statistics"]["total_applications"], 0);
}
