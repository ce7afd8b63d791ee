//! Activity logging abstraction for hirelane.
//!
//! This crate defines the `AuditLog` trait for persisting activity events
//! and the types representing the actions surfaced in the admin
//! recent-activity feed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use hirelane_storage::PrincipalId;

/// Unique identifier for an activity log entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub Uuid);

impl ActivityId {
    /// Generate a new activity ID using UUID v7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ActivityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Categories of recorded platform activity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    // Identity
    StudentRegister,
    RecruiterRegister,
    PrincipalDelete,

    // Companies
    CompanyRegister,
    CompanyUpdate,
    CompanyAdminChange,
    CompanyVerifyToggle,
    CompanyDelete,
    RecruiterAdd,
    RecruiterRemove,

    // Jobs
    JobPost,
    JobUpdate,
    JobDelete,

    // Applications
    ApplicationSubmit,
    ApplicationStatusChange,

    // Billing
    SubscriptionCreate,
    SubscriptionActivate,
    SubscriptionExpire,

    // Notifications
    JobReportFile,
    ContactMessageReceive,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityAction::StudentRegister => "student.register",
            ActivityAction::RecruiterRegister => "recruiter.register",
            ActivityAction::PrincipalDelete => "principal.delete",
            ActivityAction::CompanyRegister => "company.register",
            ActivityAction::CompanyUpdate => "company.update",
            ActivityAction::CompanyAdminChange => "company.admin_change",
            ActivityAction::CompanyVerifyToggle => "company.verify_toggle",
            ActivityAction::CompanyDelete => "company.delete",
            ActivityAction::RecruiterAdd => "company.recruiter_add",
            ActivityAction::RecruiterRemove => "company.recruiter_remove",
            ActivityAction::JobPost => "job.post",
            ActivityAction::JobUpdate => "job.update",
            ActivityAction::JobDelete => "job.delete",
            ActivityAction::ApplicationSubmit => "application.submit",
            ActivityAction::ApplicationStatusChange => "application.status_change",
            ActivityAction::SubscriptionCreate => "subscription.create",
            ActivityAction::SubscriptionActivate => "subscription.activate",
            ActivityAction::SubscriptionExpire => "subscription.expire",
            ActivityAction::JobReportFile => "report.file",
            ActivityAction::ContactMessageReceive => "contact.receive",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student.register" => Ok(Self::StudentRegister),
            "recruiter.register" => Ok(Self::RecruiterRegister),
            "principal.delete" => Ok(Self::PrincipalDelete),
            "company.register" => Ok(Self::CompanyRegister),
            "company.update" => Ok(Self::CompanyUpdate),
            "company.admin_change" => Ok(Self::CompanyAdminChange),
            "company.verify_toggle" => Ok(Self::CompanyVerifyToggle),
            "company.delete" => Ok(Self::CompanyDelete),
            "company.recruiter_add" => Ok(Self::RecruiterAdd),
            "company.recruiter_remove" => Ok(Self::RecruiterRemove),
            "job.post" => Ok(Self::JobPost),
            "job.update" => Ok(Self::JobUpdate),
            "job.delete" => Ok(Self::JobDelete),
            "application.submit" => Ok(Self::ApplicationSubmit),
            "application.status_change" => Ok(Self::ApplicationStatusChange),
            "subscription.create" => Ok(Self::SubscriptionCreate),
            "subscription.activate" => Ok(Self::SubscriptionActivate),
            "subscription.expire" => Ok(Self::SubscriptionExpire),
            "report.file" => Ok(Self::JobReportFile),
            "contact.receive" => Ok(Self::ContactMessageReceive),
            other => Err(format!("unknown activity action: {}", other)),
        }
    }
}

/// One recorded activity event
#[derive(Clone, Debug)]
pub struct ActivityEvent {
    pub id: ActivityId,
    pub action: ActivityAction,
    /// The principal who caused the event; None for anonymous sources
    /// (e.g. the public contact form).
    pub actor: Option<PrincipalId>,
    /// Human-readable subject, e.g. a company or job name.
    pub subject: Option<String>,
    /// Free-form detail line for the feed.
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// Build an event stamped now.
    pub fn new(action: ActivityAction, actor: Option<PrincipalId>) -> Self {
        Self {
            id: ActivityId::new(),
            action,
            actor,
            subject: None,
            detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Error type for audit log operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Trait for persisting and querying activity events.
///
/// Recording is best-effort from the caller's perspective: handlers log a
/// warning on failure rather than failing the request.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Persist one activity event.
    async fn record(&self, event: &ActivityEvent) -> Result<(), AuditError>;

    /// Latest events, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<ActivityEvent>, AuditError>;
}
