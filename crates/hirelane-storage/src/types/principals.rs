//! Principal types.
//!
//! Students, recruiters and admins share one identity namespace: a single
//! table keyed by email with a role discriminator. The unique index on the
//! email column is what enforces "an email belongs to at most one principal
//! across all roles".

use chrono::{DateTime, Utc};

use super::PrincipalId;

/// Role discriminator for a principal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Recruiter,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Recruiter => write!(f, "recruiter"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "recruiter" => Ok(Self::Recruiter),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Profile fields carried alongside the identity record.
///
/// Students use skills/resume/experience/CTC; recruiters use position.
/// Unused fields stay empty rather than living in a separate table.
#[derive(Clone, Debug, Default)]
pub struct Profile {
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub experience_years: Option<i64>,
    pub expected_ctc: Option<f64>,
    pub position: Option<String>,
}

/// Principal record.
#[derive(Clone, Debug)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// None for OAuth-only accounts (no password login possible).
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a principal.
#[derive(Clone, Debug)]
pub struct CreatePrincipalParams {
    pub role: Role,
    pub full_name: String,
    /// Stored lowercased; uniqueness is enforced across every role.
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub is_verified: bool,
}

/// Partial profile update; `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateProfileParams {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<Vec<String>>,
    pub resume_url: Option<String>,
    pub photo_url: Option<String>,
    pub experience_years: Option<i64>,
    pub expected_ctc: Option<f64>,
    pub position: Option<String>,
}
