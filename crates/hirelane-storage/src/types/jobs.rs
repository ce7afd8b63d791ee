//! Job types.

use chrono::{DateTime, Utc};

use super::{CompanyId, JobId, PrincipalId};

/// Job record.
#[derive(Clone, Debug)]
pub struct Job {
    pub id: JobId,
    pub company_id: CompanyId,
    /// The recruiter who created the posting.
    pub recruiter_id: PrincipalId,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub qualifications: Vec<String>,
    pub responsibilities: Vec<String>,
    /// Annual salary in minor units of the platform currency.
    pub salary: i64,
    /// Free-text experience requirement (e.g. "2-4 years").
    pub experience: String,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a job.
#[derive(Clone, Debug)]
pub struct CreateJobParams {
    pub company_id: CompanyId,
    pub recruiter_id: PrincipalId,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub qualifications: Vec<String>,
    pub responsibilities: Vec<String>,
    pub salary: i64,
    pub experience: String,
    pub location: String,
}

/// Partial job update; `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateJobParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub qualifications: Option<Vec<String>>,
    pub responsibilities: Option<Vec<String>>,
    pub salary: Option<i64>,
    pub experience: Option<String>,
    pub location: Option<String>,
}

/// Per-job aggregate counters for the recruiter dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JobStatistics {
    pub total_applications: i64,
    pub pending: i64,
    pub shortlisted: i64,
    pub rejected: i64,
    pub bookmarks: i64,
}
