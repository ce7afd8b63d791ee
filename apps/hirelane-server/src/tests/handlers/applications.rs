//! Application handler tests: idempotent apply and status transitions.

use axum::extract::{Json, Path, State};

use hirelane_storage::{ApplicationStatus, Store};

use crate::error::ApiError;
use crate::handlers::applications::*;
use crate::tests::common::*;

#[tokio::test]
async fn applying_twice_keeps_one_application() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let student = create_student(&state, "s@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    apply(
        State(state.clone()),
        student.clone(),
        Json(ApplyRequest {
            job_id: job_id.0,
            resume_url: Some("https://cdn.example/resume.pdf".into()),
        }),
    )
    .await
    .unwrap();

    let err = apply(
        State(state.clone()),
        student.clone(),
        Json(ApplyRequest {
            job_id: job_id.0,
            resume_url: None,
        }),
    )
    .await
    .unwrap_err();
    match err {
        ApiError::Conflict(msg) => {
            assert_eq!(msg, "You have already applied for this job")
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    assert_eq!(
        state.store.list_job_applications(&job_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn inactive_jobs_reject_applications() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let student = create_student(&state, "s@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;
    state.store.set_job_active(&job_id, false).await.unwrap();

    let err = apply(
        State(state.clone()),
        student,
        Json(ApplyRequest {
            job_id: job_id.0,
            resume_url: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(state.store.list_job_applications(&job_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn recruiters_cannot_apply() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    let err = apply(
        State(state.clone()),
        owner,
        Json(ApplyRequest {
            job_id: job_id.0,
            resume_url: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn status_update_is_unvalidated_overwrite() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let student = create_student(&state, "s@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    let response = apply(
        State(state.clone()),
        student.clone(),
        Json(ApplyRequest {
            job_id: job_id.0,
            resume_url: None,
        }),
    )
    .await
    .unwrap();
    let application_id =
        uuid::Uuid::parse_str(response.0["application"]["id"].as_str().unwrap()).unwrap();

    update_status(
        State(state.clone()),
        owner.clone(),
        Path(application_id),
        Json(UpdateStatusRequest {
            status: "Shortlisted".into(),
        }),
    )
    .await
    .unwrap();

    // No transition guard: straight back to pending is accepted.
    let response = update_status(
        State(state.clone()),
        owner.clone(),
        Path(application_id),
        Json(UpdateStatusRequest {
            status: "pending".into(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(response.0["application"]["status"], "pending");

    let err = update_status(
        State(state.clone()),
        owner,
        Path(application_id),
        Json(UpdateStatusRequest {
            status: "hired".into(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn status_update_requires_association() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let outsider = create_recruiter(&state, "other@example.com").await;
    let student = create_student(&state, "s@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    let response = apply(
        State(state.clone()),
        student,
        Json(ApplyRequest {
            job_id: job_id.0,
            resume_url: None,
        }),
    )
    .await
    .unwrap();
    let application_id =
        uuid::Uuid::parse_str(response.0["application"]["id"].as_str().unwrap()).unwrap();

    let err = update_status(
        State(state.clone()),
        outsider,
        Path(application_id),
        Json(UpdateStatusRequest {
            status: "rejected".into(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn applicants_listing_includes_profiles() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let student = create_student(&state, "s@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let job_id = post_test_job(&state, &owner, &company_id).await;

    apply(
        State(state.clone()),
        student.clone(),
        Json(ApplyRequest {
            job_id: job_id.0,
            resume_url: None,
        }),
    )
    .await
    .unwrap();

    let response = job_applicants(State(state.clone()), owner, Path(job_id.0))
        .await
        .unwrap();
    let applicants = response.0["applicants"].as_array().unwrap();
    assert_eq!(applicants.len(), 1);
    assert_eq!(applicants[0]["applicant"]["email"], "s@example.com");
    assert_eq!(
        applicants[0]["application"]["status"],
        ApplicationStatus::Pending.to_string()
    );
}
