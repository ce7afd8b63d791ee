//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// Principal (student/recruiter/admin) identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrincipalId(pub Uuid);

/// Company identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompanyId(pub Uuid);

/// Job identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobId(pub Uuid);

/// Application identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApplicationId(pub Uuid);

/// Subscription identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub Uuid);

/// Job report identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobReportId(pub Uuid);

/// Contact message identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContactMessageId(pub Uuid);

/// Verification code identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VerificationCodeId(pub Uuid);
