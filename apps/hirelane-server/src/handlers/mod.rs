//! Handler modules for the REST API
//!
//! This module contains handler functions organized by domain:
//! - auth: register, login (password/Google/admin), logout, password
//!   reset, OTP, token verification
//! - principals: profile updates, account deletion
//! - companies: registration, association management, verification
//!   cascade, credits, reporting
//! - jobs: posting (quota-guarded), listing, bookmarks, statistics
//! - applications: apply (idempotent), listing, status transitions
//! - orders: payment-order creation for job/candidate plans
//! - verification: payment-signature verification and plan activation
//! - notifications: contact form + admin report/contact feeds and the
//!   live counter stream
//! - admin: analytics (counts, trends, recent activity)
//!
//! It also defines the serialized views shared by the response envelopes.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod companies;
pub mod jobs;
pub mod notifications;
pub mod orders;
pub mod principals;
pub mod verification;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use hirelane_storage::{Application, Company, Job, Principal, Subscription};

use crate::metrics::track_metrics;
use crate::server::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest(
            "/user",
            Router::new()
                .route("/register", post(auth::register_student))
                .route("/login", post(auth::login))
                .route("/googleLogin", post(auth::google_login_student))
                .route("/logout", post(auth::logout))
                .route("/forgot-password", post(auth::forgot_password))
                .route("/reset-password", post(auth::reset_password))
                .route("/profile/update", put(principals::update_profile))
                .route("/delete", delete(principals::delete_account)),
        )
        .nest(
            "/recruiter",
            Router::new()
                .route("/register", post(auth::register_recruiter))
                .route("/googleLogin", post(auth::google_login_recruiter))
                .route("/add-recruiter", post(companies::add_recruiter))
                .route("/remove-recruiter", post(companies::remove_recruiter))
                .route("/profile/update", put(principals::update_profile))
                .route("/delete", delete(principals::delete_account))
                .route("/toggle-active", put(companies::toggle_recruiter_active)),
        )
        .nest(
            "/auth",
            Router::new()
                .route("/verify-token", get(auth::verify_token))
                .route("/request-otp", post(auth::request_otp))
                .route("/verify-otp", post(auth::verify_otp)),
        )
        .nest(
            "/company",
            Router::new()
                .route("/register", post(companies::register_company))
                .route("/company-by-id", post(companies::company_by_id))
                .route("/company-by-userid", post(companies::company_by_userid))
                .route("/update/:id", put(companies::update_company))
                .route("/change-admin", put(companies::change_admin))
                .route("/current-plan/:id", get(companies::current_plan))
                .route("/candidate-list", get(companies::candidate_list))
                .route("/applicants/:company_id", get(companies::company_applicants))
                .route("/decrease-credit/:id", post(companies::decrease_credit))
                .route("/report-job", post(companies::report_job))
                .route("/delete/:id", delete(companies::delete_company)),
        )
        .nest(
            "/job",
            Router::new()
                .route("/post-job", post(jobs::post_job))
                .route("/get", get(jobs::list_jobs))
                .route("/get/:id", get(jobs::get_job))
                .route("/jobs/:id", get(jobs::company_jobs))
                .route("/jobs-list/:id", get(jobs::recruiter_jobs))
                .route("/delete/:id", delete(jobs::delete_job))
                .route("/update/:job_id", put(jobs::update_job))
                .route("/toggle-active", put(jobs::toggle_job_active))
                .route("/bookmark-job/:job_id", get(jobs::bookmark_job))
                .route("/bookmarks", get(jobs::bookmarked_jobs))
                .route("/job-statistics/:id", get(jobs::job_statistics)),
        )
        .nest(
            "/application",
            Router::new()
                .route("/apply", post(applications::apply))
                .route("/get", get(applications::my_applications))
                .route("/:id/applicants", get(applications::job_applicants))
                .route("/status/:id/update", post(applications::update_status)),
        )
        .nest(
            "/order",
            Router::new()
                .route(
                    "/create-order-for-jobplan",
                    post(orders::create_order_for_jobplan),
                )
                .route(
                    "/create-order-for-candidateplan",
                    post(orders::create_order_for_candidateplan),
                ),
        )
        .nest(
            "/verification",
            Router::new()
                .route(
                    "/verify-payment-for-jobplan",
                    post(verification::verify_payment_for_jobplan),
                )
                .route(
                    "/verify-payment-for-candidateplan",
                    post(verification::verify_payment_for_candidateplan),
                ),
        )
        .nest(
            "/admin",
            Router::new()
                .route("/login", post(auth::admin_login))
                .route(
                    "/company/toggle-active/:id",
                    put(companies::toggle_company_active),
                )
                .route("/company/:id", delete(companies::delete_company))
                .route("/stats/counts", get(admin::stats_counts))
                .route("/stats/trend", get(admin::stats_trend))
                .route("/stats/recent-activity", get(admin::recent_activity))
                .route("/notifications/counts", get(notifications::unseen_counts))
                .route("/notifications/stream", get(notifications::stream))
                .route("/reports", get(notifications::list_reports))
                .route("/reports/:id/seen", post(notifications::mark_report_seen))
                .route("/contacts", get(notifications::list_contacts))
                .route("/contacts/:id/seen", post(notifications::mark_contact_seen)),
        )
        .route("/contact", post(notifications::submit_contact))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

// ─────────────────────────── serialized views ──────────────────────────

#[derive(Debug, Serialize)]
pub struct PrincipalView {
    pub id: String,
    pub role: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub experience_years: Option<i64>,
    pub expected_ctc: Option<f64>,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for PrincipalView {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id.0.to_string(),
            role: p.role.to_string(),
            full_name: p.full_name.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            is_active: p.is_active,
            is_verified: p.is_verified,
            skills: p.profile.skills.clone(),
            resume_url: p.profile.resume_url.clone(),
            photo_url: p.profile.photo_url.clone(),
            experience_years: p.profile.experience_years,
            expected_ctc: p.profile.expected_ctc,
            position: p.profile.position.clone(),
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub admin_email: String,
    pub cin: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
    pub max_job_posts: Option<i64>,
    pub candidate_credits: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Company> for CompanyView {
    fn from(c: &Company) -> Self {
        Self {
            id: c.id.0.to_string(),
            name: c.name.clone(),
            email: c.email.clone(),
            admin_email: c.admin_email.clone(),
            cin: c.cin.clone(),
            description: c.description.clone(),
            website: c.website.clone(),
            logo_url: c.logo_url.clone(),
            location: c.location.clone(),
            max_job_posts: c.max_job_posts,
            candidate_credits: c.candidate_credits,
            is_active: c.is_active,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: String,
    pub company_id: String,
    pub recruiter_id: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub qualifications: Vec<String>,
    pub responsibilities: Vec<String>,
    pub salary: i64,
    pub experience: String,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Job> for JobView {
    fn from(j: &Job) -> Self {
        Self {
            id: j.id.0.to_string(),
            company_id: j.company_id.0.to_string(),
            recruiter_id: j.recruiter_id.0.to_string(),
            title: j.title.clone(),
            description: j.description.clone(),
            skills: j.skills.clone(),
            benefits: j.benefits.clone(),
            qualifications: j.qualifications.clone(),
            responsibilities: j.responsibilities.clone(),
            salary: j.salary,
            experience: j.experience.clone(),
            location: j.location.clone(),
            is_active: j.is_active,
            created_at: j.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationView {
    pub id: String,
    pub job_id: String,
    pub applicant_id: String,
    pub resume_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Application> for ApplicationView {
    fn from(a: &Application) -> Self {
        Self {
            id: a.id.0.to_string(),
            job_id: a.job_id.0.to_string(),
            applicant_id: a.applicant_id.0.to_string(),
            resume_url: a.resume_url.clone(),
            status: a.status.to_string(),
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub id: String,
    pub kind: String,
    pub plan_name: String,
    pub boost: i64,
    pub price: i64,
    pub status: String,
    pub payment_status: String,
    pub order_id: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Subscription> for SubscriptionView {
    fn from(s: &Subscription) -> Self {
        Self {
            id: s.id.0.to_string(),
            kind: s.kind.to_string(),
            plan_name: s.plan_name.clone(),
            boost: s.boost,
            price: s.price,
            status: s.status.to_string(),
            payment_status: s.payment_status.to_string(),
            order_id: s.order_id.clone(),
            purchased_at: s.purchased_at,
            expires_at: s.expires_at,
        }
    }
}
