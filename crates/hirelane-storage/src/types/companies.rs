//! Company types.

use chrono::{DateTime, Utc};

use super::CompanyId;

/// Company record.
///
/// `max_job_posts` is tri-state and the distinction is load-bearing:
/// `None` = unlimited posting, `Some(0)` = blocked, `Some(n)` = hard quota.
#[derive(Clone, Debug)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub email: String,
    /// The recruiter whose email matches is the de-facto company owner.
    pub admin_email: String,
    /// Government corporate identification number (format-validated upstream).
    pub cin: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
    pub max_job_posts: Option<i64>,
    pub candidate_credits: i64,
    /// Platform verification flag; toggled by admins, cascades to
    /// associated recruiters and jobs.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for registering a company.
#[derive(Clone, Debug)]
pub struct CreateCompanyParams {
    pub name: String,
    pub email: String,
    pub admin_email: String,
    pub cin: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
    /// The creating recruiter, associated atomically with the new company.
    pub created_by: super::PrincipalId,
}

/// Partial company update; `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateCompanyParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
}

/// Outcome of an atomic job-quota consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuotaOutcome {
    /// Quota is `None`; nothing was decremented and posting is allowed.
    Unlimited,
    /// Quota was a positive number and has been decremented.
    Consumed { remaining: i64 },
    /// Quota is 0; posting is blocked and nothing changed.
    Exhausted,
}

/// Outcome of an atomic candidate-credit consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreditOutcome {
    /// A credit was spent.
    Consumed { remaining: i64 },
    /// Balance was already 0; floored, nothing changed.
    Empty,
}

/// Snapshot of a deleted company's identifying fields, kept to refuse
/// re-registration of the same entity.
#[derive(Clone, Debug)]
pub struct BlacklistedCompany {
    pub name: String,
    pub email: String,
    pub admin_email: String,
    pub cin: String,
    pub blacklisted_at: DateTime<Utc>,
}
