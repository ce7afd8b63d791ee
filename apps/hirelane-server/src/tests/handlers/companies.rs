//! Company handler tests: registration, guards, cascade, credits.

use axum::extract::{Json, Path, State};

use hirelane_storage::{Role, Store};

use crate::error::ApiError;
use crate::handlers::companies::*;
use crate::tests::common::*;

#[tokio::test]
async fn students_cannot_register_companies() {
    let state = create_test_state().await;
    let student = create_student(&state, "s@example.com").await;

    let err = register_company(
        State(state.clone()),
        student,
        Json(RegisterCompanyRequest {
            name: "Acme".into(),
            email: "contact@acme.example".into(),
            cin: "U12345MH2020PTC123456".into(),
            description: None,
            website: None,
            logo_url: None,
            location: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn cin_format_is_validated() {
    let state = create_test_state().await;
    let recruiter = create_recruiter(&state, "r@example.com").await;

    for bad in ["", "X12345MH2020PTC123456", "U1234MH2020PTC123456", "U12345mh2020PTC123456"] {
        let err = register_company(
            State(state.clone()),
            recruiter.clone(),
            Json(RegisterCompanyRequest {
                name: "Acme".into(),
                email: "contact@acme.example".into(),
                cin: bad.into(),
                description: None,
                website: None,
                logo_url: None,
                location: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)), "cin {:?}", bad);
    }
}

#[tokio::test]
async fn registration_makes_creator_the_admin() {
    let state = create_test_state().await;
    let recruiter = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &recruiter, "Acme").await;

    let company = state.store.get_company(&company_id).await.unwrap();
    assert_eq!(company.admin_email, "owner@example.com");
    assert!(state
        .store
        .is_company_recruiter(&company_id, &recruiter.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn association_guard_rejects_outsiders_and_inactive() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let outsider = create_recruiter(&state, "other@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    // Not associated: forbidden.
    let err = state
        .require_company_access(&company_id, &outsider)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    // Associated but deactivated: forbidden too.
    state
        .store
        .set_principal_active(&owner.id, false)
        .await
        .unwrap();
    let err = state
        .require_company_access(&company_id, &owner)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    state
        .store
        .set_principal_active(&owner.id, true)
        .await
        .unwrap();
    assert!(state
        .require_company_access(&company_id, &owner)
        .await
        .is_ok());
}

#[tokio::test]
async fn change_admin_requires_associated_recruiter() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let _colleague = create_recruiter(&state, "colleague@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    // Not associated yet: rejected.
    let err = change_admin(
        State(state.clone()),
        owner.clone(),
        Json(ChangeAdminRequest {
            company_id: company_id.0,
            new_admin_email: "colleague@example.com".into(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    add_recruiter(
        State(state.clone()),
        owner.clone(),
        Json(AddRecruiterRequest {
            company_id: company_id.0,
            email: "colleague@example.com".into(),
        }),
    )
    .await
    .unwrap();

    change_admin(
        State(state.clone()),
        owner.clone(),
        Json(ChangeAdminRequest {
            company_id: company_id.0,
            new_admin_email: "colleague@example.com".into(),
        }),
    )
    .await
    .unwrap();

    let company = state.store.get_company(&company_id).await.unwrap();
    assert_eq!(company.admin_email, "colleague@example.com");

    // The old owner no longer passes the owner guard.
    let err = state
        .require_company_owner(&company_id, &owner)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn verification_toggle_cascades_to_recruiters_and_jobs() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let colleague = create_recruiter(&state, "colleague@example.com").await;
    let admin = create_admin(&state, "root@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    add_recruiter(
        State(state.clone()),
        owner.clone(),
        Json(AddRecruiterRequest {
            company_id: company_id.0,
            email: "colleague@example.com".into(),
        }),
    )
    .await
    .unwrap();
    let job_id = post_test_job(&state, &owner, &company_id).await;

    toggle_company_active(
        State(state.clone()),
        admin.clone(),
        Path(company_id.0),
        Json(ToggleCompanyRequest { active: false }),
    )
    .await
    .unwrap();

    assert!(!state.store.get_company(&company_id).await.unwrap().is_active);
    assert!(!state.store.get_job(&job_id).await.unwrap().is_active);
    for recruiter in state
        .store
        .list_company_recruiters(&company_id)
        .await
        .unwrap()
    {
        assert!(!recruiter.is_active, "{} still active", recruiter.email);
    }

    // Re-activation restores everything.
    toggle_company_active(
        State(state.clone()),
        admin,
        Path(company_id.0),
        Json(ToggleCompanyRequest { active: true }),
    )
    .await
    .unwrap();
    assert!(state.store.get_job(&job_id).await.unwrap().is_active);
    assert!(state
        .store
        .get_principal(&colleague.id)
        .await
        .unwrap()
        .is_active);
}

#[tokio::test]
async fn verification_toggle_requires_admin() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    let err = toggle_company_active(
        State(state.clone()),
        owner,
        Path(company_id.0),
        Json(ToggleCompanyRequest { active: false }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn deleted_company_is_blacklisted_from_reregistering() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    let company = state.store.get_company(&company_id).await.unwrap();

    delete_company(State(state.clone()), owner.clone(), Path(company_id.0))
        .await
        .unwrap();

    // Same name or CIN can never come back.
    let err = register_company(
        State(state.clone()),
        owner.clone(),
        Json(RegisterCompanyRequest {
            name: "Acme".into(),
            email: "fresh@acme.example".into(),
            cin: "U99999DL2021PTC654321".into(),
            description: None,
            website: None,
            logo_url: None,
            location: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let err = register_company(
        State(state.clone()),
        owner,
        Json(RegisterCompanyRequest {
            name: "Totally New".into(),
            email: "fresh@acme.example".into(),
            cin: company.cin,
            description: None,
            website: None,
            logo_url: None,
            location: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn delete_requires_owner_or_admin() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let colleague = create_recruiter(&state, "colleague@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;

    add_recruiter(
        State(state.clone()),
        owner.clone(),
        Json(AddRecruiterRequest {
            company_id: company_id.0,
            email: "colleague@example.com".into(),
        }),
    )
    .await
    .unwrap();

    // Associated non-owner cannot delete.
    let err = delete_company(State(state.clone()), colleague, Path(company_id.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    // A platform admin can.
    let admin = create_admin(&state, "root@example.com").await;
    delete_company(State(state.clone()), admin, Path(company_id.0))
        .await
        .unwrap();
}

#[tokio::test]
async fn decrease_credit_floors_at_zero() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    state
        .store
        .add_candidate_credits(&company_id, 1)
        .await
        .unwrap();

    let response = decrease_credit(State(state.clone()), owner.clone(), Path(company_id.0))
        .await
        .unwrap();
    assert_eq!(response.0["candidate_credits"], 0);

    let err = decrease_credit(State(state.clone()), owner, Path(company_id.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(
        state
            .store
            .get_company(&company_id)
            .await
            .unwrap()
            .candidate_credits,
        0
    );
}

#[tokio::test]
async fn candidate_list_requires_credits() {
    let state = create_test_state().await;
    let owner = create_recruiter(&state, "owner@example.com").await;
    let company_id = create_company_for(&state, &owner, "Acme").await;
    create_student(&state, "candidate@example.com").await;

    let err = candidate_list(State(state.clone()), owner.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    state
        .store
        .add_candidate_credits(&company_id, 5)
        .await
        .unwrap();

    let response = candidate_list(State(state.clone()), owner).await.unwrap();
    let candidates = response.0["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["role"], Role::Student.to_string());
}
