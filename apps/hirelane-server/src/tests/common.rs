//! Common test helpers.
//!
//! Tests call handler functions directly with constructed extractor
//! values; no HTTP server is spun up. The state runs on an in-memory
//! SQLite store, the mock payment gateway and no email provider.

use std::sync::Arc;

use axum::extract::{Json, State};
use chrono::{Duration, Utc};
use uuid::Uuid;

use hirelane_billing::{BillingConfig, MockPaymentGateway};
use hirelane_events_memory::MemoryEventBus;
use hirelane_storage::{CompanyId, CreatePrincipalParams, JobId, PrincipalId, Role, Store};
use hirelane_store_sqlite::SqliteStore;

use crate::auth::{hash_password, AuthPrincipal};
use crate::config::ServerConfig;
use crate::handlers::jobs::{post_job, PostJobRequest};
use crate::server::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub async fn create_test_state() -> AppState {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    AppState::new_sqlite(
        store,
        Arc::new(MemoryEventBus::new()),
        ServerConfig::test(),
        BillingConfig::test(),
        Arc::new(MockPaymentGateway),
        None,
    )
}

/// An AuthPrincipal as the extractor would produce it for a live session.
pub fn session_for(id: &PrincipalId, role: Role) -> AuthPrincipal {
    AuthPrincipal {
        id: id.clone(),
        role,
        jti: Uuid::new_v4().to_string(),
        expires_at: Utc::now() + Duration::days(1),
    }
}

async fn create_principal(state: &AppState, role: Role, email: &str) -> AuthPrincipal {
    let id = state
        .store
        .create_principal(&CreatePrincipalParams {
            role,
            full_name: format!("{} {}", role, email),
            email: email.into(),
            phone: None,
            password_hash: Some(hash_password(TEST_PASSWORD).unwrap()),
            is_verified: true,
        })
        .await
        .unwrap();
    session_for(&id, role)
}

pub async fn create_student(state: &AppState, email: &str) -> AuthPrincipal {
    create_principal(state, Role::Student, email).await
}

pub async fn create_recruiter(state: &AppState, email: &str) -> AuthPrincipal {
    create_principal(state, Role::Recruiter, email).await
}

pub async fn create_admin(state: &AppState, email: &str) -> AuthPrincipal {
    create_principal(state, Role::Admin, email).await
}

/// Register a company owned by the given recruiter through the handler,
/// so the creator association and admin email behave like production.
pub async fn create_company_for(
    state: &AppState,
    owner: &AuthPrincipal,
    name: &str,
) -> CompanyId {
    let response = crate::handlers::companies::register_company(
        State(state.clone()),
        owner.clone(),
        Json(crate::handlers::companies::RegisterCompanyRequest {
            name: name.into(),
            email: format!("contact@{}.example", name.to_lowercase()),
            cin: format!(
                "U12345MH2020PTC{:06}",
                name.bytes().map(usize::from).sum::<usize>() % 1_000_000
            ),
            description: None,
            website: None,
            logo_url: None,
            location: Some("Remote".into()),
        }),
    )
    .await
    .unwrap();

    let id = response.0["company"]["id"].as_str().unwrap().to_string();
    CompanyId(Uuid::parse_str(&id).unwrap())
}

pub fn job_request(company_id: &CompanyId) -> PostJobRequest {
    PostJobRequest {
        company_id: company_id.0,
        title: "Backend Engineer".into(),
        description: "Own the API surface".into(),
        skills: "rust, sql".into(),
        benefits: "health insurance\nremote work".into(),
        qualifications: "bachelor's degree".into(),
        responsibilities: "ship features, review code".into(),
        salary: 1_200_000,
        experience: "2-4 years".into(),
        location: "Remote".into(),
    }
}

/// Post one job through the handler and return its id.
pub async fn post_test_job(
    state: &AppState,
    recruiter: &AuthPrincipal,
    company_id: &CompanyId,
) -> JobId {
    let response = post_job(
        State(state.clone()),
        recruiter.clone(),
        Json(job_request(company_id)),
    )
    .await
    .unwrap();
    let id = response.0["job"]["id"].as_str().unwrap().to_string();
    JobId(Uuid::parse_str(&id).unwrap())
}
