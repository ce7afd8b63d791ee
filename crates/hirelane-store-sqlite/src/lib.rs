//! SQLite storage backend for hirelane.
//!
//! Implements [`hirelane_storage::Store`] and [`hirelane_audit::AuditLog`]
//! over a single-connection sqlx pool with embedded migrations. Ids are
//! stored as UUID strings, timestamps as unix seconds, string lists as JSON
//! arrays.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use hirelane_audit::{ActivityAction, ActivityEvent, ActivityId, AuditError, AuditLog};
use hirelane_storage::{
    Application, ApplicationId, ApplicationStatus, CodePurpose, Company, CompanyId,
    ContactMessage, ContactMessageId, CreateApplicationParams, CreateCompanyParams,
    CreateContactMessageParams, CreateJobParams, CreateJobReportParams, CreatePrincipalParams,
    CreateSubscriptionParams, CreateVerificationCodeParams, CreditOutcome, EntityCounts, Job,
    JobId, JobReport, JobReportId, JobStatistics, Principal, PrincipalId, Profile, QuotaOutcome,
    Role, Store, StoreError, Subscription, SubscriptionId, SubscriptionKind, SubscriptionStatus,
    TrendEntity, TrendPoint, UpdateCompanyParams, UpdateJobParams, UpdateProfileParams,
    VerificationCode, VerificationCodeId,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        // A single connection: SQLite has one writer anyway, and this keeps
        // in-memory databases coherent across the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

// ───────────────────────────── row mapping ─────────────────────────────

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Map insert errors, translating UNIQUE violations.
fn insert_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

fn parse_ts(ts: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| StoreError::Backend(format!("invalid timestamp: {}", ts)))
}

fn parse_list(json: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Backend(e.to_string()))
}

fn list_json(list: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(list).map_err(|e| StoreError::Backend(e.to_string()))
}

fn parse_enum<T: FromStr<Err = String>>(s: &str) -> Result<T, StoreError> {
    s.parse().map_err(StoreError::Backend)
}

const PRINCIPAL_COLS: &str = "id, role, full_name, email, phone, password_hash, is_active, \
     is_verified, skills, resume_url, photo_url, experience_years, expected_ctc, position, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: String,
    role: String,
    full_name: String,
    email: String,
    phone: Option<String>,
    password_hash: Option<String>,
    is_active: bool,
    is_verified: bool,
    skills: String,
    resume_url: Option<String>,
    photo_url: Option<String>,
    experience_years: Option<i64>,
    expected_ctc: Option<f64>,
    position: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = StoreError;

    fn try_from(row: PrincipalRow) -> Result<Self, StoreError> {
        Ok(Principal {
            id: PrincipalId(parse_uuid(&row.id)?),
            role: parse_enum(&row.role)?,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_verified: row.is_verified,
            profile: Profile {
                skills: parse_list(&row.skills)?,
                resume_url: row.resume_url,
                photo_url: row.photo_url,
                experience_years: row.experience_years,
                expected_ctc: row.expected_ctc,
                position: row.position,
            },
            created_at: parse_ts(row.created_at)?,
            updated_at: parse_ts(row.updated_at)?,
        })
    }
}

const COMPANY_COLS: &str = "id, name, email, admin_email, cin, description, website, logo_url, \
     location, max_job_posts, candidate_credits, is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: String,
    name: String,
    email: String,
    admin_email: String,
    cin: String,
    description: Option<String>,
    website: Option<String>,
    logo_url: Option<String>,
    location: Option<String>,
    max_job_posts: Option<i64>,
    candidate_credits: i64,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CompanyRow> for Company {
    type Error = StoreError;

    fn try_from(row: CompanyRow) -> Result<Self, StoreError> {
        Ok(Company {
            id: CompanyId(parse_uuid(&row.id)?),
            name: row.name,
            email: row.email,
            admin_email: row.admin_email,
            cin: row.cin,
            description: row.description,
            website: row.website,
            logo_url: row.logo_url,
            location: row.location,
            max_job_posts: row.max_job_posts,
            candidate_credits: row.candidate_credits,
            is_active: row.is_active,
            created_at: parse_ts(row.created_at)?,
            updated_at: parse_ts(row.updated_at)?,
        })
    }
}

const JOB_COLS: &str = "id, company_id, recruiter_id, title, description, skills, benefits, \
     qualifications, responsibilities, salary, experience, location, is_active, created_at, \
     updated_at";

#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    company_id: String,
    recruiter_id: String,
    title: String,
    description: String,
    skills: String,
    benefits: String,
    qualifications: String,
    responsibilities: String,
    salary: i64,
    experience: String,
    location: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, StoreError> {
        Ok(Job {
            id: JobId(parse_uuid(&row.id)?),
            company_id: CompanyId(parse_uuid(&row.company_id)?),
            recruiter_id: PrincipalId(parse_uuid(&row.recruiter_id)?),
            title: row.title,
            description: row.description,
            skills: parse_list(&row.skills)?,
            benefits: parse_list(&row.benefits)?,
            qualifications: parse_list(&row.qualifications)?,
            responsibilities: parse_list(&row.responsibilities)?,
            salary: row.salary,
            experience: row.experience,
            location: row.location,
            is_active: row.is_active,
            created_at: parse_ts(row.created_at)?,
            updated_at: parse_ts(row.updated_at)?,
        })
    }
}

const APPLICATION_COLS: &str =
    "id, job_id, applicant_id, resume_url, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: String,
    job_id: String,
    applicant_id: String,
    resume_url: Option<String>,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, StoreError> {
        Ok(Application {
            id: ApplicationId(parse_uuid(&row.id)?),
            job_id: JobId(parse_uuid(&row.job_id)?),
            applicant_id: PrincipalId(parse_uuid(&row.applicant_id)?),
            resume_url: row.resume_url,
            status: parse_enum(&row.status)?,
            created_at: parse_ts(row.created_at)?,
            updated_at: parse_ts(row.updated_at)?,
        })
    }
}

const SUBSCRIPTION_COLS: &str = "id, company_id, kind, plan_name, boost, price, status, \
     payment_status, order_id, payment_id, purchased_at, expires_at";

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    company_id: String,
    kind: String,
    plan_name: String,
    boost: i64,
    price: i64,
    status: String,
    payment_status: String,
    order_id: Option<String>,
    payment_id: Option<String>,
    purchased_at: i64,
    expires_at: i64,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = StoreError;

    fn try_from(row: SubscriptionRow) -> Result<Self, StoreError> {
        Ok(Subscription {
            id: SubscriptionId(parse_uuid(&row.id)?),
            company_id: CompanyId(parse_uuid(&row.company_id)?),
            kind: parse_enum(&row.kind)?,
            plan_name: row.plan_name,
            boost: row.boost,
            price: row.price,
            status: parse_enum(&row.status)?,
            payment_status: parse_enum(&row.payment_status)?,
            order_id: row.order_id,
            payment_id: row.payment_id,
            purchased_at: parse_ts(row.purchased_at)?,
            expires_at: parse_ts(row.expires_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct JobReportRow {
    id: String,
    job_id: String,
    reporter_id: String,
    reason: String,
    seen: bool,
    created_at: i64,
}

impl TryFrom<JobReportRow> for JobReport {
    type Error = StoreError;

    fn try_from(row: JobReportRow) -> Result<Self, StoreError> {
        Ok(JobReport {
            id: JobReportId(parse_uuid(&row.id)?),
            job_id: JobId(parse_uuid(&row.job_id)?),
            reporter_id: PrincipalId(parse_uuid(&row.reporter_id)?),
            reason: row.reason,
            seen: row.seen,
            created_at: parse_ts(row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ContactMessageRow {
    id: String,
    name: String,
    email: String,
    subject: String,
    message: String,
    seen: bool,
    created_at: i64,
}

impl TryFrom<ContactMessageRow> for ContactMessage {
    type Error = StoreError;

    fn try_from(row: ContactMessageRow) -> Result<Self, StoreError> {
        Ok(ContactMessage {
            id: ContactMessageId(parse_uuid(&row.id)?),
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            seen: row.seen,
            created_at: parse_ts(row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VerificationCodeRow {
    id: String,
    email: String,
    purpose: String,
    code_hash: String,
    attempts: i64,
    created_at: i64,
    expires_at: i64,
}

impl TryFrom<VerificationCodeRow> for VerificationCode {
    type Error = StoreError;

    fn try_from(row: VerificationCodeRow) -> Result<Self, StoreError> {
        Ok(VerificationCode {
            id: VerificationCodeId(parse_uuid(&row.id)?),
            email: row.email,
            purpose: parse_enum(&row.purpose)?,
            code_hash: row.code_hash,
            attempts: row.attempts,
            created_at: parse_ts(row.created_at)?,
            expires_at: parse_ts(row.expires_at)?,
        })
    }
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────── Principals ─────────────────────────────

    async fn create_principal(
        &self,
        params: &CreatePrincipalParams,
    ) -> Result<PrincipalId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO principals(id, role, full_name, email, phone, password_hash, \
             is_verified, created_at, updated_at) VALUES(?,?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.role.to_string())
        .bind(&params.full_name)
        .bind(params.email.to_lowercase())
        .bind(&params.phone)
        .bind(&params.password_hash)
        .bind(params.is_verified)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;
        Ok(PrincipalId(id))
    }

    async fn get_principal(&self, id: &PrincipalId) -> Result<Principal, StoreError> {
        let sql = format!("SELECT {} FROM principals WHERE id=?", PRINCIPAL_COLS);
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn get_principal_by_email(&self, email: &str) -> Result<Principal, StoreError> {
        let sql = format!("SELECT {} FROM principals WHERE email=?", PRINCIPAL_COLS);
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn update_profile(
        &self,
        id: &PrincipalId,
        params: &UpdateProfileParams,
    ) -> Result<(), StoreError> {
        let skills = match &params.skills {
            Some(list) => Some(list_json(list)?),
            None => None,
        };
        let res = sqlx::query(
            "UPDATE principals SET \
               full_name = COALESCE(?, full_name), \
               phone = COALESCE(?, phone), \
               skills = COALESCE(?, skills), \
               resume_url = COALESCE(?, resume_url), \
               photo_url = COALESCE(?, photo_url), \
               experience_years = COALESCE(?, experience_years), \
               expected_ctc = COALESCE(?, expected_ctc), \
               position = COALESCE(?, position), \
               updated_at = ? \
             WHERE id = ?",
        )
        .bind(&params.full_name)
        .bind(&params.phone)
        .bind(skills)
        .bind(&params.resume_url)
        .bind(&params.photo_url)
        .bind(params.experience_years)
        .bind(params.expected_ctc)
        .bind(&params.position)
        .bind(Utc::now().timestamp())
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_password(&self, id: &PrincipalId, password_hash: &str) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE principals SET password_hash=?, updated_at=? WHERE id=?")
            .bind(password_hash)
            .bind(Utc::now().timestamp())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_principal_active(&self, id: &PrincipalId, active: bool) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE principals SET is_active=?, updated_at=? WHERE id=?")
            .bind(active)
            .bind(Utc::now().timestamp())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn mark_principal_verified(&self, id: &PrincipalId) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE principals SET is_verified=1, updated_at=? WHERE id=?")
            .bind(Utc::now().timestamp())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_principal(&self, id: &PrincipalId) -> Result<(), StoreError> {
        // Associations, bookmarks, applications and created jobs cascade
        // through the schema's foreign keys.
        let res = sqlx::query("DELETE FROM principals WHERE id=?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_principals(&self, role: Role) -> Result<Vec<Principal>, StoreError> {
        let sql = format!(
            "SELECT {} FROM principals WHERE role=? ORDER BY created_at DESC, id DESC",
            PRINCIPAL_COLS
        );
        let rows = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(role.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_principals(&self, role: Role) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM principals WHERE role=?")
                .bind(role.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(count)
    }

    // ───────────────────────────── Companies ──────────────────────────────

    async fn create_company(&self, params: &CreateCompanyParams) -> Result<CompanyId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();

        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query(
            "INSERT INTO companies(id, name, email, admin_email, cin, description, website, \
             logo_url, location, candidate_credits, created_at, updated_at) \
             VALUES(?,?,?,?,?,?,?,?,?,0,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.name)
        .bind(params.email.to_lowercase())
        .bind(params.admin_email.to_lowercase())
        .bind(&params.cin)
        .bind(&params.description)
        .bind(&params.website)
        .bind(&params.logo_url)
        .bind(&params.location)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(insert_err)?;

        sqlx::query("INSERT INTO company_recruiters(company_id, recruiter_id, added_at) VALUES(?,?,?)")
            .bind(id.to_string())
            .bind(params.created_by.0.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(insert_err)?;

        tx.commit().await.map_err(backend)?;
        Ok(CompanyId(id))
    }

    async fn get_company(&self, id: &CompanyId) -> Result<Company, StoreError> {
        let sql = format!("SELECT {} FROM companies WHERE id=?", COMPANY_COLS);
        let row = sqlx::query_as::<_, CompanyRow>(&sql)
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn get_company_for_recruiter(
        &self,
        recruiter_id: &PrincipalId,
    ) -> Result<Company, StoreError> {
        let sql = "SELECT c.id, c.name, c.email, c.admin_email, c.cin, c.description, c.website, \
             c.logo_url, c.location, c.max_job_posts, c.candidate_credits, c.is_active, \
             c.created_at, c.updated_at \
             FROM companies c \
             JOIN company_recruiters cr ON cr.company_id = c.id \
             WHERE cr.recruiter_id = ?";
        let row = sqlx::query_as::<_, CompanyRow>(sql)
            .bind(recruiter_id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn update_company(
        &self,
        id: &CompanyId,
        params: &UpdateCompanyParams,
    ) -> Result<(), StoreError> {
        let res = sqlx::query(
            "UPDATE companies SET \
               name = COALESCE(?, name), \
               email = COALESCE(?, email), \
               description = COALESCE(?, description), \
               website = COALESCE(?, website), \
               logo_url = COALESCE(?, logo_url), \
               location = COALESCE(?, location), \
               updated_at = ? \
             WHERE id = ?",
        )
        .bind(&params.name)
        .bind(&params.email)
        .bind(&params.description)
        .bind(&params.website)
        .bind(&params.logo_url)
        .bind(&params.location)
        .bind(Utc::now().timestamp())
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_company_admin_email(
        &self,
        id: &CompanyId,
        admin_email: &str,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE companies SET admin_email=?, updated_at=? WHERE id=?")
            .bind(admin_email.to_lowercase())
            .bind(Utc::now().timestamp())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_company_active(&self, id: &CompanyId, active: bool) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE companies SET is_active=?, updated_at=? WHERE id=?")
            .bind(active)
            .bind(Utc::now().timestamp())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn add_company_recruiter(
        &self,
        company_id: &CompanyId,
        recruiter_id: &PrincipalId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO company_recruiters(company_id, recruiter_id, added_at) VALUES(?,?,?)",
        )
        .bind(company_id.0.to_string())
        .bind(recruiter_id.0.to_string())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("UNIQUE") {
                StoreError::AlreadyExists
            } else if s.contains("FOREIGN KEY") {
                StoreError::NotFound
            } else {
                StoreError::Backend(s)
            }
        })?;
        Ok(())
    }

    async fn remove_company_recruiter(
        &self,
        company_id: &CompanyId,
        recruiter_id: &PrincipalId,
    ) -> Result<(), StoreError> {
        let res =
            sqlx::query("DELETE FROM company_recruiters WHERE company_id=? AND recruiter_id=?")
                .bind(company_id.0.to_string())
                .bind(recruiter_id.0.to_string())
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_company_recruiters(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Principal>, StoreError> {
        let sql = "SELECT p.id, p.role, p.full_name, p.email, p.phone, p.password_hash, \
             p.is_active, p.is_verified, p.skills, p.resume_url, p.photo_url, \
             p.experience_years, p.expected_ctc, p.position, p.created_at, p.updated_at \
             FROM principals p \
             JOIN company_recruiters cr ON cr.recruiter_id = p.id \
             WHERE cr.company_id = ? \
             ORDER BY cr.added_at";
        let rows = sqlx::query_as::<_, PrincipalRow>(sql)
            .bind(company_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn is_company_recruiter(
        &self,
        company_id: &CompanyId,
        recruiter_id: &PrincipalId,
    ) -> Result<bool, StoreError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM company_recruiters WHERE company_id=? AND recruiter_id=?)",
        )
        .bind(company_id.0.to_string())
        .bind(recruiter_id.0.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(exists)
    }

    async fn delete_company(&self, id: &CompanyId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row: Option<(String, String, String, String)> = sqlx::query_as(
            "SELECT name, email, admin_email, cin FROM companies WHERE id=?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?;

        let (name, email, admin_email, cin) = row.ok_or(StoreError::NotFound)?;

        // Snapshot the identifying fields so the same entity cannot
        // re-register, then let the foreign keys cascade the rest.
        sqlx::query(
            "INSERT INTO blacklisted_companies(id, name, email, admin_email, cin, blacklisted_at) \
             VALUES(?,?,?,?,?,?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(&name)
        .bind(&email)
        .bind(&admin_email)
        .bind(&cin)
        .bind(Utc::now().timestamp())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        sqlx::query("DELETE FROM companies WHERE id=?")
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        let sql = format!(
            "SELECT {} FROM companies ORDER BY created_at DESC, id DESC",
            COMPANY_COLS
        );
        let rows = sqlx::query_as::<_, CompanyRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_companies(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(count)
    }

    async fn is_company_blacklisted(
        &self,
        name: &str,
        email: &str,
        cin: &str,
    ) -> Result<bool, StoreError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM blacklisted_companies \
             WHERE name=? OR email=? OR admin_email=? OR cin=?)",
        )
        .bind(name)
        .bind(email.to_lowercase())
        .bind(email.to_lowercase())
        .bind(cin)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;
        Ok(exists)
    }

    // ─────────────────────────── Quota & credits ──────────────────────────

    async fn consume_job_quota(&self, id: &CompanyId) -> Result<QuotaOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let res = sqlx::query(
            "UPDATE companies SET max_job_posts = max_job_posts - 1, updated_at=? \
             WHERE id=? AND max_job_posts IS NOT NULL AND max_job_posts > 0",
        )
        .bind(Utc::now().timestamp())
        .bind(id.0.to_string())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        let row: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT max_job_posts FROM companies WHERE id=?")
                .bind(id.0.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;

        let outcome = match row {
            None => {
                return Err(StoreError::NotFound);
            }
            Some((quota,)) => {
                if res.rows_affected() == 1 {
                    QuotaOutcome::Consumed {
                        remaining: quota.unwrap_or(0),
                    }
                } else {
                    match quota {
                        None => QuotaOutcome::Unlimited,
                        Some(_) => QuotaOutcome::Exhausted,
                    }
                }
            }
        };

        tx.commit().await.map_err(backend)?;
        Ok(outcome)
    }

    async fn add_job_quota(&self, id: &CompanyId, boost: i64) -> Result<(), StoreError> {
        let res = sqlx::query(
            "UPDATE companies SET max_job_posts = COALESCE(max_job_posts, 0) + ?, updated_at=? \
             WHERE id=?",
        )
        .bind(boost)
        .bind(Utc::now().timestamp())
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn reset_job_quota(&self, id: &CompanyId) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE companies SET max_job_posts = 0, updated_at=? WHERE id=?")
            .bind(Utc::now().timestamp())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn consume_candidate_credit(&self, id: &CompanyId) -> Result<CreditOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let res = sqlx::query(
            "UPDATE companies SET candidate_credits = candidate_credits - 1, updated_at=? \
             WHERE id=? AND candidate_credits > 0",
        )
        .bind(Utc::now().timestamp())
        .bind(id.0.to_string())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        let row: Option<(i64,)> =
            sqlx::query_as("SELECT candidate_credits FROM companies WHERE id=?")
                .bind(id.0.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;

        let outcome = match row {
            None => return Err(StoreError::NotFound),
            Some((remaining,)) => {
                if res.rows_affected() == 1 {
                    CreditOutcome::Consumed { remaining }
                } else {
                    CreditOutcome::Empty
                }
            }
        };

        tx.commit().await.map_err(backend)?;
        Ok(outcome)
    }

    async fn add_candidate_credits(&self, id: &CompanyId, boost: i64) -> Result<(), StoreError> {
        let res = sqlx::query(
            "UPDATE companies SET candidate_credits = candidate_credits + ?, updated_at=? \
             WHERE id=?",
        )
        .bind(boost)
        .bind(Utc::now().timestamp())
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn reset_candidate_credits(&self, id: &CompanyId) -> Result<(), StoreError> {
        let res =
            sqlx::query("UPDATE companies SET candidate_credits = 0, updated_at=? WHERE id=?")
                .bind(Utc::now().timestamp())
                .bind(id.0.to_string())
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ──────────────────────────────── Jobs ────────────────────────────────

    async fn create_job(&self, params: &CreateJobParams) -> Result<JobId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO jobs(id, company_id, recruiter_id, title, description, skills, \
             benefits, qualifications, responsibilities, salary, experience, location, \
             created_at, updated_at) VALUES(?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.company_id.0.to_string())
        .bind(params.recruiter_id.0.to_string())
        .bind(&params.title)
        .bind(&params.description)
        .bind(list_json(&params.skills)?)
        .bind(list_json(&params.benefits)?)
        .bind(list_json(&params.qualifications)?)
        .bind(list_json(&params.responsibilities)?)
        .bind(params.salary)
        .bind(&params.experience)
        .bind(&params.location)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("FOREIGN KEY") {
                StoreError::NotFound
            } else {
                StoreError::Backend(s)
            }
        })?;
        Ok(JobId(id))
    }

    async fn get_job(&self, id: &JobId) -> Result<Job, StoreError> {
        let sql = format!("SELECT {} FROM jobs WHERE id=?", JOB_COLS);
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn list_jobs(&self, only_active: bool) -> Result<Vec<Job>, StoreError> {
        let sql = if only_active {
            format!(
                "SELECT {} FROM jobs WHERE is_active=1 ORDER BY created_at DESC, id DESC",
                JOB_COLS
            )
        } else {
            format!("SELECT {} FROM jobs ORDER BY created_at DESC, id DESC", JOB_COLS)
        };
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_company_jobs(&self, company_id: &CompanyId) -> Result<Vec<Job>, StoreError> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE company_id=? ORDER BY created_at DESC, id DESC",
            JOB_COLS
        );
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(company_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_recruiter_jobs(
        &self,
        recruiter_id: &PrincipalId,
    ) -> Result<Vec<Job>, StoreError> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE recruiter_id=? ORDER BY created_at DESC, id DESC",
            JOB_COLS
        );
        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(recruiter_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_job(&self, id: &JobId, params: &UpdateJobParams) -> Result<(), StoreError> {
        let skills = match &params.skills {
            Some(list) => Some(list_json(list)?),
            None => None,
        };
        let benefits = match &params.benefits {
            Some(list) => Some(list_json(list)?),
            None => None,
        };
        let qualifications = match &params.qualifications {
            Some(list) => Some(list_json(list)?),
            None => None,
        };
        let responsibilities = match &params.responsibilities {
            Some(list) => Some(list_json(list)?),
            None => None,
        };
        let res = sqlx::query(
            "UPDATE jobs SET \
               title = COALESCE(?, title), \
               description = COALESCE(?, description), \
               skills = COALESCE(?, skills), \
               benefits = COALESCE(?, benefits), \
               qualifications = COALESCE(?, qualifications), \
               responsibilities = COALESCE(?, responsibilities), \
               salary = COALESCE(?, salary), \
               experience = COALESCE(?, experience), \
               location = COALESCE(?, location), \
               updated_at = ? \
             WHERE id = ?",
        )
        .bind(&params.title)
        .bind(&params.description)
        .bind(skills)
        .bind(benefits)
        .bind(qualifications)
        .bind(responsibilities)
        .bind(params.salary)
        .bind(&params.experience)
        .bind(&params.location)
        .bind(Utc::now().timestamp())
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_job_active(&self, id: &JobId, active: bool) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE jobs SET is_active=?, updated_at=? WHERE id=?")
            .bind(active)
            .bind(Utc::now().timestamp())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_company_jobs_active(
        &self,
        company_id: &CompanyId,
        active: bool,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE jobs SET is_active=?, updated_at=? WHERE company_id=?")
            .bind(active)
            .bind(Utc::now().timestamp())
            .bind(company_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete_job(&self, id: &JobId) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM jobs WHERE id=?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_jobs(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(count)
    }

    async fn toggle_bookmark(
        &self,
        job_id: &JobId,
        principal_id: &PrincipalId,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let removed = sqlx::query("DELETE FROM job_bookmarks WHERE job_id=? AND principal_id=?")
            .bind(job_id.0.to_string())
            .bind(principal_id.0.to_string())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        let bookmarked = if removed.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO job_bookmarks(job_id, principal_id, created_at) VALUES(?,?,?)",
            )
            .bind(job_id.0.to_string())
            .bind(principal_id.0.to_string())
            .bind(Utc::now().timestamp())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                let s = e.to_string();
                if s.contains("FOREIGN KEY") {
                    StoreError::NotFound
                } else {
                    StoreError::Backend(s)
                }
            })?;
            true
        } else {
            false
        };

        tx.commit().await.map_err(backend)?;
        Ok(bookmarked)
    }

    async fn list_bookmarked_jobs(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Job>, StoreError> {
        let sql = "SELECT j.id, j.company_id, j.recruiter_id, j.title, j.description, j.skills, \
             j.benefits, j.qualifications, j.responsibilities, j.salary, j.experience, \
             j.location, j.is_active, j.created_at, j.updated_at \
             FROM jobs j \
             JOIN job_bookmarks b ON b.job_id = j.id \
             WHERE b.principal_id = ? \
             ORDER BY b.created_at DESC";
        let rows = sqlx::query_as::<_, JobRow>(sql)
            .bind(principal_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn job_statistics(&self, id: &JobId) -> Result<JobStatistics, StoreError> {
        // Existence check first so a bad id is NotFound, not all-zeroes.
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM jobs WHERE id=?)")
            .bind(id.0.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        if !exists {
            return Err(StoreError::NotFound);
        }

        let (total, pending, shortlisted, rejected): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(CASE WHEN status='pending' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN status='shortlisted' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN status='rejected' THEN 1 ELSE 0 END), 0) \
             FROM applications WHERE job_id=?",
        )
        .bind(id.0.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        let (bookmarks,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM job_bookmarks WHERE job_id=?")
                .bind(id.0.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;

        Ok(JobStatistics {
            total_applications: total,
            pending,
            shortlisted,
            rejected,
            bookmarks,
        })
    }

    // ──────────────────────────── Applications ────────────────────────────

    async fn create_application(
        &self,
        params: &CreateApplicationParams,
    ) -> Result<ApplicationId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();

        let mut tx = self.pool.begin().await.map_err(backend)?;

        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM jobs WHERE id=?)")
            .bind(params.job_id.0.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(backend)?;
        if !exists {
            return Err(StoreError::NotFound);
        }

        sqlx::query(
            "INSERT INTO applications(id, job_id, applicant_id, resume_url, created_at, \
             updated_at) VALUES(?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.job_id.0.to_string())
        .bind(params.applicant_id.0.to_string())
        .bind(&params.resume_url)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(insert_err)?;

        tx.commit().await.map_err(backend)?;
        Ok(ApplicationId(id))
    }

    async fn get_application(&self, id: &ApplicationId) -> Result<Application, StoreError> {
        let sql = format!("SELECT {} FROM applications WHERE id=?", APPLICATION_COLS);
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn get_application_for(
        &self,
        job_id: &JobId,
        applicant_id: &PrincipalId,
    ) -> Result<Application, StoreError> {
        let sql = format!(
            "SELECT {} FROM applications WHERE job_id=? AND applicant_id=?",
            APPLICATION_COLS
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(job_id.0.to_string())
            .bind(applicant_id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn list_job_applications(&self, job_id: &JobId) -> Result<Vec<Application>, StoreError> {
        let sql = format!(
            "SELECT {} FROM applications WHERE job_id=? ORDER BY created_at DESC, id DESC",
            APPLICATION_COLS
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(job_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_applicant_applications(
        &self,
        applicant_id: &PrincipalId,
    ) -> Result<Vec<Application>, StoreError> {
        let sql = format!(
            "SELECT {} FROM applications WHERE applicant_id=? ORDER BY created_at DESC, id DESC",
            APPLICATION_COLS
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(applicant_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_company_applications(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Application>, StoreError> {
        let sql = "SELECT a.id, a.job_id, a.applicant_id, a.resume_url, a.status, a.created_at, \
             a.updated_at \
             FROM applications a \
             JOIN jobs j ON j.id = a.job_id \
             WHERE j.company_id = ? \
             ORDER BY a.created_at DESC, a.id DESC";
        let rows = sqlx::query_as::<_, ApplicationRow>(sql)
            .bind(company_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE applications SET status=?, updated_at=? WHERE id=?")
            .bind(status.to_string())
            .bind(Utc::now().timestamp())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_applications(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM applications")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(count)
    }

    // ─────────────────────────── Subscriptions ────────────────────────────

    async fn create_subscription(
        &self,
        params: &CreateSubscriptionParams,
    ) -> Result<SubscriptionId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(backend)?;

        // Single live subscription per (company, kind): clear out anything
        // that never activated or has already run its course.
        sqlx::query(
            "DELETE FROM subscriptions WHERE company_id=? AND kind=? AND status IN ('hold','expired')",
        )
        .bind(params.company_id.0.to_string())
        .bind(params.kind.to_string())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        sqlx::query(
            "INSERT INTO subscriptions(id, company_id, kind, plan_name, boost, price, \
             order_id, purchased_at, expires_at) VALUES(?,?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.company_id.0.to_string())
        .bind(params.kind.to_string())
        .bind(&params.plan_name)
        .bind(params.boost)
        .bind(params.price)
        .bind(&params.order_id)
        .bind(now.timestamp())
        .bind(params.expires_at.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("FOREIGN KEY") {
                StoreError::NotFound
            } else if s.contains("UNIQUE") {
                StoreError::AlreadyExists
            } else {
                StoreError::Backend(s)
            }
        })?;

        tx.commit().await.map_err(backend)?;
        Ok(SubscriptionId(id))
    }

    async fn get_subscription(&self, id: &SubscriptionId) -> Result<Subscription, StoreError> {
        let sql = format!("SELECT {} FROM subscriptions WHERE id=?", SUBSCRIPTION_COLS);
        let row = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn get_subscription_by_order(
        &self,
        order_id: &str,
    ) -> Result<Subscription, StoreError> {
        let sql = format!(
            "SELECT {} FROM subscriptions WHERE order_id=?",
            SUBSCRIPTION_COLS
        );
        let row = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn get_active_subscription(
        &self,
        company_id: &CompanyId,
        kind: SubscriptionKind,
    ) -> Result<Subscription, StoreError> {
        let sql = format!(
            "SELECT {} FROM subscriptions WHERE company_id=? AND kind=? AND status='active'",
            SUBSCRIPTION_COLS
        );
        let row = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(company_id.0.to_string())
            .bind(kind.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn activate_subscription(
        &self,
        id: &SubscriptionId,
        payment_id: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row: Option<(String, String, i64, String)> = sqlx::query_as(
            "SELECT company_id, kind, boost, status FROM subscriptions WHERE id=?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?;

        let (company_id, kind, boost, status) = row.ok_or(StoreError::NotFound)?;

        // Already Active (or Expired): the boost was applied once; a repeat
        // verification must not apply it again.
        if status != SubscriptionStatus::Hold.to_string() {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE subscriptions SET status='active', payment_status='paid', payment_id=? \
             WHERE id=?",
        )
        .bind(payment_id)
        .bind(id.0.to_string())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        let kind: SubscriptionKind = parse_enum(&kind)?;
        let counter_sql = match kind {
            SubscriptionKind::JobPosts => {
                "UPDATE companies SET max_job_posts = COALESCE(max_job_posts, 0) + ?, \
                 updated_at=? WHERE id=?"
            }
            SubscriptionKind::CandidateCredits => {
                "UPDATE companies SET candidate_credits = candidate_credits + ?, \
                 updated_at=? WHERE id=?"
            }
        };
        sqlx::query(counter_sql)
            .bind(boost)
            .bind(Utc::now().timestamp())
            .bind(&company_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(true)
    }

    async fn expire_subscription(&self, id: &SubscriptionId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row: Option<(String, String)> =
            sqlx::query_as("SELECT company_id, kind FROM subscriptions WHERE id=?")
                .bind(id.0.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;

        let (company_id, kind) = row.ok_or(StoreError::NotFound)?;

        sqlx::query("UPDATE subscriptions SET status='expired' WHERE id=?")
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        let kind: SubscriptionKind = parse_enum(&kind)?;
        let counter_sql = match kind {
            SubscriptionKind::JobPosts => {
                "UPDATE companies SET max_job_posts = 0, updated_at=? WHERE id=?"
            }
            SubscriptionKind::CandidateCredits => {
                "UPDATE companies SET candidate_credits = 0, updated_at=? WHERE id=?"
            }
        };
        // rows_affected 0 means the company vanished meanwhile; that's an
        // acceptable no-op.
        sqlx::query(counter_sql)
            .bind(Utc::now().timestamp())
            .bind(&company_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn mark_subscription_expired(&self, id: &SubscriptionId) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE subscriptions SET status='expired' WHERE id=?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_due_subscriptions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>, StoreError> {
        let sql = format!(
            "SELECT {} FROM subscriptions WHERE status='active' AND expires_at < ? \
             ORDER BY expires_at",
            SUBSCRIPTION_COLS
        );
        let rows = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(now.timestamp())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    // ───────────────────────── Verification codes ─────────────────────────

    async fn upsert_verification_code(
        &self,
        params: &CreateVerificationCodeParams,
    ) -> Result<VerificationCode, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO verification_codes(id, email, purpose, code_hash, attempts, \
             created_at, expires_at) VALUES(?,?,?,?,0,?,?) \
             ON CONFLICT(email, purpose) \
             DO UPDATE SET code_hash=excluded.code_hash, \
                           attempts=0, \
                           created_at=excluded.created_at, \
                           expires_at=excluded.expires_at",
        )
        .bind(id.to_string())
        .bind(params.email.to_lowercase())
        .bind(params.purpose.to_string())
        .bind(&params.code_hash)
        .bind(now)
        .bind(params.expires_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        self.get_verification_code(&params.email, params.purpose).await
    }

    async fn get_verification_code(
        &self,
        email: &str,
        purpose: CodePurpose,
    ) -> Result<VerificationCode, StoreError> {
        let row = sqlx::query_as::<_, VerificationCodeRow>(
            "SELECT id, email, purpose, code_hash, attempts, created_at, expires_at \
             FROM verification_codes WHERE email=? AND purpose=?",
        )
        .bind(email.to_lowercase())
        .bind(purpose.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn increment_code_attempts(&self, id: &VerificationCodeId) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let res = sqlx::query("UPDATE verification_codes SET attempts = attempts + 1 WHERE id=?")
            .bind(id.0.to_string())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        let (attempts,): (i64,) =
            sqlx::query_as("SELECT attempts FROM verification_codes WHERE id=?")
                .bind(id.0.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(attempts)
    }

    async fn delete_verification_code(&self, id: &VerificationCodeId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM verification_codes WHERE id=?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn cleanup_expired_codes(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM verification_codes WHERE expires_at < ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(res.rows_affected())
    }

    // ─────────────────────────── Token denylist ───────────────────────────

    async fn revoke_token(
        &self,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR IGNORE INTO revoked_tokens(jti, expires_at, revoked_at) VALUES(?,?,?)",
        )
        .bind(jti)
        .bind(expires_at.timestamp())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str) -> Result<bool, StoreError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti=?)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(exists)
    }

    async fn cleanup_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(res.rows_affected())
    }

    // ─────────────────── Reports & contact messages ───────────────────────

    async fn create_job_report(
        &self,
        params: &CreateJobReportParams,
    ) -> Result<JobReportId, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO job_reports(id, job_id, reporter_id, reason, created_at) \
             VALUES(?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.job_id.0.to_string())
        .bind(params.reporter_id.0.to_string())
        .bind(&params.reason)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("FOREIGN KEY") {
                StoreError::NotFound
            } else {
                StoreError::Backend(s)
            }
        })?;
        Ok(JobReportId(id))
    }

    async fn list_job_reports(&self, unseen_only: bool) -> Result<Vec<JobReport>, StoreError> {
        let sql = if unseen_only {
            "SELECT id, job_id, reporter_id, reason, seen, created_at FROM job_reports \
             WHERE seen=0 ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT id, job_id, reporter_id, reason, seen, created_at FROM job_reports \
             ORDER BY created_at DESC, id DESC"
        };
        let rows = sqlx::query_as::<_, JobReportRow>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn mark_report_seen(&self, id: &JobReportId) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE job_reports SET seen=1 WHERE id=?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_unseen_reports(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM job_reports WHERE seen=0")
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(count)
    }

    async fn create_contact_message(
        &self,
        params: &CreateContactMessageParams,
    ) -> Result<ContactMessageId, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO contact_messages(id, name, email, subject, message, created_at) \
             VALUES(?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.name)
        .bind(params.email.to_lowercase())
        .bind(&params.subject)
        .bind(&params.message)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(ContactMessageId(id))
    }

    async fn list_contact_messages(
        &self,
        unseen_only: bool,
    ) -> Result<Vec<ContactMessage>, StoreError> {
        let sql = if unseen_only {
            "SELECT id, name, email, subject, message, seen, created_at FROM contact_messages \
             WHERE seen=0 ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT id, name, email, subject, message, seen, created_at FROM contact_messages \
             ORDER BY created_at DESC, id DESC"
        };
        let rows = sqlx::query_as::<_, ContactMessageRow>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn mark_contact_seen(&self, id: &ContactMessageId) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE contact_messages SET seen=1 WHERE id=?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_unseen_contacts(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contact_messages WHERE seen=0")
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(count)
    }

    // ───────────────────────────── Analytics ──────────────────────────────

    async fn entity_counts(&self) -> Result<EntityCounts, StoreError> {
        let (students, recruiters, admins): (i64, i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(CASE WHEN role='student' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN role='recruiter' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN role='admin' THEN 1 ELSE 0 END), 0) \
             FROM principals",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        let companies = self.count_companies().await?;
        let jobs = self.count_jobs().await?;
        let applications = self.count_applications().await?;

        Ok(EntityCounts {
            students,
            recruiters,
            admins,
            companies,
            jobs,
            applications,
        })
    }

    async fn creation_trend(
        &self,
        entity: TrendEntity,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, StoreError> {
        let (table, filter) = match entity {
            TrendEntity::Students => ("principals", Some("student")),
            TrendEntity::Recruiters => ("principals", Some("recruiter")),
            TrendEntity::Companies => ("companies", None),
            TrendEntity::Jobs => ("jobs", None),
            TrendEntity::Applications => ("applications", None),
        };

        let from_ts = from
            .and_hms_opt(0, 0, 0)
            .map(|dt: NaiveDateTime| dt.and_utc().timestamp())
            .ok_or_else(|| StoreError::Backend("invalid from date".into()))?;
        let to_excl = to
            .succ_opt()
            .ok_or_else(|| StoreError::Backend("invalid to date".into()))?;
        let to_ts = to_excl
            .and_hms_opt(0, 0, 0)
            .map(|dt: NaiveDateTime| dt.and_utc().timestamp())
            .ok_or_else(|| StoreError::Backend("invalid to date".into()))?;

        let sql = match filter {
            Some(_) => format!(
                "SELECT date(created_at, 'unixepoch') AS day, COUNT(*) FROM {} \
                 WHERE role=? AND created_at >= ? AND created_at < ? \
                 GROUP BY day ORDER BY day",
                table
            ),
            None => format!(
                "SELECT date(created_at, 'unixepoch') AS day, COUNT(*) FROM {} \
                 WHERE created_at >= ? AND created_at < ? \
                 GROUP BY day ORDER BY day",
                table
            ),
        };

        let mut query = sqlx::query_as::<_, (String, i64)>(&sql);
        if let Some(role) = filter {
            query = query.bind(role);
        }
        let rows = query
            .bind(from_ts)
            .bind(to_ts)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.into_iter()
            .map(|(day, count)| {
                let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                Ok(TrendPoint { day, count })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl AuditLog for SqliteStore {
    async fn record(&self, event: &ActivityEvent) -> Result<(), AuditError> {
        sqlx::query(
            "INSERT INTO activity_log(id, action, actor_id, subject, detail, created_at) \
             VALUES(?,?,?,?,?,?)",
        )
        .bind(event.id.0.to_string())
        .bind(event.action.to_string())
        .bind(event.actor.as_ref().map(|a| a.0.to_string()))
        .bind(&event.subject)
        .bind(&event.detail)
        .bind(event.created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ActivityEvent>, AuditError> {
        let rows = sqlx::query_as::<_, (String, String, Option<String>, Option<String>, Option<String>, i64)>(
            "SELECT id, action, actor_id, subject, detail, created_at FROM activity_log \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuditError::Backend(e.to_string()))?;

        rows.into_iter()
            .map(|(id, action, actor, subject, detail, created_at)| {
                let id: ActivityId =
                    id.parse().map_err(|e: uuid::Error| AuditError::Backend(e.to_string()))?;
                let action: ActivityAction =
                    action.parse().map_err(AuditError::Backend)?;
                let actor = actor
                    .map(|a| Uuid::try_parse(&a).map(PrincipalId))
                    .transpose()
                    .map_err(|e| AuditError::Backend(e.to_string()))?;
                let created_at = DateTime::from_timestamp(created_at, 0)
                    .ok_or_else(|| AuditError::Backend("invalid timestamp".into()))?;
                Ok(ActivityEvent {
                    id,
                    action,
                    actor,
                    subject,
                    detail,
                    created_at,
                })
            })
            .collect()
    }
}
