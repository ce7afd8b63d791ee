//! Job reports, contact messages and admin analytics types.

use chrono::{DateTime, NaiveDate, Utc};

use super::{ContactMessageId, JobId, JobReportId, PrincipalId};

/// A user-submitted report against a job posting.
#[derive(Clone, Debug)]
pub struct JobReport {
    pub id: JobReportId,
    pub job_id: JobId,
    pub reporter_id: PrincipalId,
    pub reason: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

/// Parameters for filing a job report.
#[derive(Clone, Debug)]
pub struct CreateJobReportParams {
    pub job_id: JobId,
    pub reporter_id: PrincipalId,
    pub reason: String,
}

/// A message submitted through the public contact form.
#[derive(Clone, Debug)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

/// Parameters for submitting a contact message.
#[derive(Clone, Debug)]
pub struct CreateContactMessageParams {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Platform-wide entity counts for the admin dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub students: i64,
    pub recruiters: i64,
    pub admins: i64,
    pub companies: i64,
    pub jobs: i64,
    pub applications: i64,
}

/// Which creation series a trend query aggregates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendEntity {
    Students,
    Recruiters,
    Companies,
    Jobs,
    Applications,
}

impl std::str::FromStr for TrendEntity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "students" => Ok(Self::Students),
            "recruiters" => Ok(Self::Recruiters),
            "companies" => Ok(Self::Companies),
            "jobs" => Ok(Self::Jobs),
            "applications" => Ok(Self::Applications),
            other => Err(format!("unknown trend entity: {}", other)),
        }
    }
}

/// One day of a trend series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendPoint {
    pub day: NaiveDate,
    pub count: i64,
}
