//! The Store trait that backends implement.

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::*;
use crate::StoreError;

/// The storage trait the server depends on.
///
/// Counter mutations (`consume_job_quota`, `consume_candidate_credit`,
/// `activate_subscription`, `expire_subscription`) are single atomic
/// statements or transactions inside the backend; callers never
/// read-modify-write those fields.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Principals ─────────────────────────────────────

    /// Create a principal. Fails with `AlreadyExists` when the email is
    /// taken by any role.
    async fn create_principal(
        &self,
        params: &CreatePrincipalParams,
    ) -> Result<PrincipalId, StoreError>;

    /// Get principal by ID.
    async fn get_principal(&self, id: &PrincipalId) -> Result<Principal, StoreError>;

    /// Get principal by (lowercased) email, whatever its role.
    async fn get_principal_by_email(&self, email: &str) -> Result<Principal, StoreError>;

    /// Apply a partial profile update.
    async fn update_profile(
        &self,
        id: &PrincipalId,
        params: &UpdateProfileParams,
    ) -> Result<(), StoreError>;

    /// Replace the stored password hash.
    async fn set_password(&self, id: &PrincipalId, password_hash: &str) -> Result<(), StoreError>;

    /// Flip the active flag (recruiters/admins).
    async fn set_principal_active(&self, id: &PrincipalId, active: bool) -> Result<(), StoreError>;

    /// Mark a principal as verified (email/OTP ownership confirmed).
    async fn mark_principal_verified(&self, id: &PrincipalId) -> Result<(), StoreError>;

    /// Delete a principal; company associations, bookmarks and
    /// applications go with it, and jobs it created cascade too.
    async fn delete_principal(&self, id: &PrincipalId) -> Result<(), StoreError>;

    /// List principals of a role (newest first).
    async fn list_principals(&self, role: Role) -> Result<Vec<Principal>, StoreError>;

    /// Count principals of a role.
    async fn count_principals(&self, role: Role) -> Result<i64, StoreError>;

    // ───────────────────────────────────── Companies ──────────────────────────────────────

    /// Register a company and associate the creating recruiter, atomically.
    /// Fails with `AlreadyExists` on a name or CIN collision.
    async fn create_company(&self, params: &CreateCompanyParams) -> Result<CompanyId, StoreError>;

    /// Get company by ID.
    async fn get_company(&self, id: &CompanyId) -> Result<Company, StoreError>;

    /// Get the company a recruiter is associated with.
    async fn get_company_for_recruiter(
        &self,
        recruiter_id: &PrincipalId,
    ) -> Result<Company, StoreError>;

    /// Apply a partial company update.
    async fn update_company(
        &self,
        id: &CompanyId,
        params: &UpdateCompanyParams,
    ) -> Result<(), StoreError>;

    /// Hand company ownership to a different associated recruiter's email.
    async fn set_company_admin_email(
        &self,
        id: &CompanyId,
        admin_email: &str,
    ) -> Result<(), StoreError>;

    /// Flip the platform verification flag (no cascade; see
    /// `set_company_jobs_active` / `set_principal_active` for the cascade
    /// steps driven by the caller).
    async fn set_company_active(&self, id: &CompanyId, active: bool) -> Result<(), StoreError>;

    /// Associate a recruiter with a company.
    async fn add_company_recruiter(
        &self,
        company_id: &CompanyId,
        recruiter_id: &PrincipalId,
    ) -> Result<(), StoreError>;

    /// Remove a recruiter from a company.
    async fn remove_company_recruiter(
        &self,
        company_id: &CompanyId,
        recruiter_id: &PrincipalId,
    ) -> Result<(), StoreError>;

    /// List the recruiters associated with a company.
    async fn list_company_recruiters(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Principal>, StoreError>;

    /// Whether a recruiter appears in a company's association set.
    async fn is_company_recruiter(
        &self,
        company_id: &CompanyId,
        recruiter_id: &PrincipalId,
    ) -> Result<bool, StoreError>;

    /// Delete a company; cascades to its jobs, their applications, its
    /// subscriptions and recruiter associations, and writes the blacklist
    /// snapshot — all in one transaction.
    async fn delete_company(&self, id: &CompanyId) -> Result<(), StoreError>;

    /// List all companies (newest first).
    async fn list_companies(&self) -> Result<Vec<Company>, StoreError>;

    /// Count all companies.
    async fn count_companies(&self) -> Result<i64, StoreError>;

    /// Whether any blacklist snapshot matches the given identifying fields.
    async fn is_company_blacklisted(
        &self,
        name: &str,
        email: &str,
        cin: &str,
    ) -> Result<bool, StoreError>;

    // ─────────────────────────────────── Quota & credits ──────────────────────────────────

    /// Atomically consume one job post from the company quota.
    /// Tri-state semantics: `None` never decrements and allows posting,
    /// `0` blocks, `n > 0` decrements by one.
    async fn consume_job_quota(&self, id: &CompanyId) -> Result<QuotaOutcome, StoreError>;

    /// Atomically add posts to the company quota (plan activation).
    /// An unlimited (`None`) quota becomes `boost`.
    async fn add_job_quota(&self, id: &CompanyId, boost: i64) -> Result<(), StoreError>;

    /// Reset the job quota to 0 (subscription expiry).
    async fn reset_job_quota(&self, id: &CompanyId) -> Result<(), StoreError>;

    /// Atomically consume one candidate credit, flooring at 0.
    async fn consume_candidate_credit(&self, id: &CompanyId) -> Result<CreditOutcome, StoreError>;

    /// Atomically add candidate credits (plan activation).
    async fn add_candidate_credits(&self, id: &CompanyId, boost: i64) -> Result<(), StoreError>;

    /// Reset the candidate credits to 0 (subscription expiry).
    async fn reset_candidate_credits(&self, id: &CompanyId) -> Result<(), StoreError>;

    // ───────────────────────────────────── Jobs ───────────────────────────────────────────

    /// Create a job posting.
    async fn create_job(&self, params: &CreateJobParams) -> Result<JobId, StoreError>;

    /// Get job by ID.
    async fn get_job(&self, id: &JobId) -> Result<Job, StoreError>;

    /// List jobs, optionally only active ones (newest first).
    async fn list_jobs(&self, only_active: bool) -> Result<Vec<Job>, StoreError>;

    /// List a company's jobs.
    async fn list_company_jobs(&self, company_id: &CompanyId) -> Result<Vec<Job>, StoreError>;

    /// List jobs created by a recruiter.
    async fn list_recruiter_jobs(
        &self,
        recruiter_id: &PrincipalId,
    ) -> Result<Vec<Job>, StoreError>;

    /// Apply a partial job update.
    async fn update_job(&self, id: &JobId, params: &UpdateJobParams) -> Result<(), StoreError>;

    /// Flip a single job's active flag.
    async fn set_job_active(&self, id: &JobId, active: bool) -> Result<(), StoreError>;

    /// Flip the active flag of every job a company owns (verification
    /// cascade).
    async fn set_company_jobs_active(
        &self,
        company_id: &CompanyId,
        active: bool,
    ) -> Result<(), StoreError>;

    /// Delete a job and its applications and bookmarks.
    async fn delete_job(&self, id: &JobId) -> Result<(), StoreError>;

    /// Count all jobs.
    async fn count_jobs(&self) -> Result<i64, StoreError>;

    /// Toggle a bookmark; returns true when the bookmark now exists.
    async fn toggle_bookmark(
        &self,
        job_id: &JobId,
        principal_id: &PrincipalId,
    ) -> Result<bool, StoreError>;

    /// List the jobs a principal has bookmarked.
    async fn list_bookmarked_jobs(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Job>, StoreError>;

    /// Aggregate application/bookmark counters for a job.
    async fn job_statistics(&self, id: &JobId) -> Result<JobStatistics, StoreError>;

    // ──────────────────────────────────── Applications ────────────────────────────────────

    /// Submit an application. Fails with `AlreadyExists` when the
    /// (job, applicant) pair already applied; insert and job linkage are
    /// one transaction (no orphan window).
    async fn create_application(
        &self,
        params: &CreateApplicationParams,
    ) -> Result<ApplicationId, StoreError>;

    /// Get application by ID.
    async fn get_application(&self, id: &ApplicationId) -> Result<Application, StoreError>;

    /// Get the application a principal filed against a job, if any.
    async fn get_application_for(
        &self,
        job_id: &JobId,
        applicant_id: &PrincipalId,
    ) -> Result<Application, StoreError>;

    /// List applications against a job.
    async fn list_job_applications(&self, job_id: &JobId) -> Result<Vec<Application>, StoreError>;

    /// List a principal's applications.
    async fn list_applicant_applications(
        &self,
        applicant_id: &PrincipalId,
    ) -> Result<Vec<Application>, StoreError>;

    /// List every application against any job of a company.
    async fn list_company_applications(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Application>, StoreError>;

    /// Overwrite an application's status (no legal-transition check).
    async fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), StoreError>;

    /// Count all applications.
    async fn count_applications(&self) -> Result<i64, StoreError>;

    // ──────────────────────────────────── Subscriptions ───────────────────────────────────

    /// Create a subscription in Hold/Created. Any prior Hold or Expired
    /// subscription of the same (company, kind) is deleted in the same
    /// transaction — at most one live subscription per company and kind.
    async fn create_subscription(
        &self,
        params: &CreateSubscriptionParams,
    ) -> Result<SubscriptionId, StoreError>;

    /// Get subscription by ID.
    async fn get_subscription(&self, id: &SubscriptionId) -> Result<Subscription, StoreError>;

    /// Get subscription by its payment-order id.
    async fn get_subscription_by_order(&self, order_id: &str)
        -> Result<Subscription, StoreError>;

    /// Get the Active subscription of a (company, kind), if any.
    async fn get_active_subscription(
        &self,
        company_id: &CompanyId,
        kind: SubscriptionKind,
    ) -> Result<Subscription, StoreError>;

    /// Flip Hold→Active and Created→Paid, record the payment id, and add
    /// the plan boost to the company counter — one transaction. Returns
    /// false (and changes nothing) when the subscription is not in Hold,
    /// which is what makes repeated payment verification a no-op.
    async fn activate_subscription(
        &self,
        id: &SubscriptionId,
        payment_id: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Flip Active→Expired and reset the owning company's counter to 0 in
    /// one transaction. A vanished company is a silent no-op.
    async fn expire_subscription(&self, id: &SubscriptionId) -> Result<(), StoreError>;

    /// Mark an Active subscription Expired WITHOUT touching the company
    /// counter (quota exhaustion: the counter is already 0).
    async fn mark_subscription_expired(&self, id: &SubscriptionId) -> Result<(), StoreError>;

    /// List Active subscriptions (both kinds) whose expiry has passed.
    async fn list_due_subscriptions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>, StoreError>;

    // ─────────────────────────────── Verification codes ───────────────────────────────────

    /// Create or replace the code for (email, purpose).
    async fn upsert_verification_code(
        &self,
        params: &CreateVerificationCodeParams,
    ) -> Result<VerificationCode, StoreError>;

    /// Get the pending code for (email, purpose).
    async fn get_verification_code(
        &self,
        email: &str,
        purpose: CodePurpose,
    ) -> Result<VerificationCode, StoreError>;

    /// Bump the failed-attempt counter; returns the new count.
    async fn increment_code_attempts(&self, id: &VerificationCodeId) -> Result<i64, StoreError>;

    /// Delete a code (after success or too many failures).
    async fn delete_verification_code(&self, id: &VerificationCodeId) -> Result<(), StoreError>;

    /// Delete all expired codes. Returns the number deleted.
    async fn cleanup_expired_codes(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    // ─────────────────────────────────── Token denylist ───────────────────────────────────

    /// Revoke a session token by jti (logout).
    async fn revoke_token(
        &self,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Whether a jti has been revoked.
    async fn is_token_revoked(&self, jti: &str) -> Result<bool, StoreError>;

    /// Drop denylist rows whose tokens have expired anyway.
    async fn cleanup_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    // ────────────────────────────── Reports & contact messages ────────────────────────────

    /// File a report against a job.
    async fn create_job_report(
        &self,
        params: &CreateJobReportParams,
    ) -> Result<JobReportId, StoreError>;

    /// List reports, optionally only unseen ones (newest first).
    async fn list_job_reports(&self, unseen_only: bool) -> Result<Vec<JobReport>, StoreError>;

    /// Mark a report as seen.
    async fn mark_report_seen(&self, id: &JobReportId) -> Result<(), StoreError>;

    /// Count unseen reports.
    async fn count_unseen_reports(&self) -> Result<i64, StoreError>;

    /// Store a contact-form message.
    async fn create_contact_message(
        &self,
        params: &CreateContactMessageParams,
    ) -> Result<ContactMessageId, StoreError>;

    /// List contact messages, optionally only unseen ones (newest first).
    async fn list_contact_messages(
        &self,
        unseen_only: bool,
    ) -> Result<Vec<ContactMessage>, StoreError>;

    /// Mark a contact message as seen.
    async fn mark_contact_seen(&self, id: &ContactMessageId) -> Result<(), StoreError>;

    /// Count unseen contact messages.
    async fn count_unseen_contacts(&self) -> Result<i64, StoreError>;

    // ───────────────────────────────────── Analytics ──────────────────────────────────────

    /// Platform-wide entity counts.
    async fn entity_counts(&self) -> Result<EntityCounts, StoreError>;

    /// Per-day creation counts for an entity over a closed date range.
    /// Days with no rows are absent from the result.
    async fn creation_trend(
        &self,
        entity: TrendEntity,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, StoreError>;
}
