//! Application types.

use chrono::{DateTime, Utc};

use super::{ApplicationId, JobId, PrincipalId};

/// Review status of an application.
///
/// Transitions are a plain field update; any status can be written over any
/// other (the platform never promised a stricter rule).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Shortlisted => write!(f, "shortlisted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "shortlisted" => Ok(Self::Shortlisted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

/// Application record. At most one per (job, applicant) pair.
#[derive(Clone, Debug)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: PrincipalId,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for submitting an application.
#[derive(Clone, Debug)]
pub struct CreateApplicationParams {
    pub job_id: JobId,
    pub applicant_id: PrincipalId,
    pub resume_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(
                status.to_string().parse::<ApplicationStatus>().unwrap(),
                status
            );
        }
    }
}
