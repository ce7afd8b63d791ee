//! Shared application state and authorization guards.

use std::sync::Arc;

use chrono::Utc;

use hirelane_audit::{ActivityEvent, AuditLog};
use hirelane_billing::{BillingConfig, PaymentGateway};
use hirelane_events::{EventBus, NotificationEvent, NotificationKind};
use hirelane_storage::{Company, CompanyId, Principal, Role, Store, StoreError};
use hirelane_store_sqlite::SqliteStore;

use crate::auth::AuthPrincipal;
use crate::config::ServerConfig;
use crate::email::{EmailContent, EmailProvider};
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub audit: Arc<dyn AuditLog>,
    pub events: Arc<dyn EventBus>,
    pub email: Option<Arc<dyn EmailProvider>>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub billing: BillingConfig,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new_sqlite(
        store: Arc<SqliteStore>,
        events: Arc<dyn EventBus>,
        config: ServerConfig,
        billing: BillingConfig,
        gateway: Arc<dyn PaymentGateway>,
        email: Option<Arc<dyn EmailProvider>>,
    ) -> Self {
        Self {
            store: store.clone(),
            audit: store,
            events,
            email,
            gateway,
            billing,
            config: Arc::new(config),
        }
    }

    /// Load a principal, translating a miss to a 404 with a stable message.
    pub async fn load_principal(
        &self,
        id: &hirelane_storage::PrincipalId,
    ) -> Result<Principal, ApiError> {
        match self.store.get_principal(id).await {
            Ok(p) => Ok(p),
            Err(StoreError::NotFound) => Err(ApiError::NotFound("Account not found".into())),
            Err(e) => Err(e.into()),
        }
    }

    /// The association guard: the caller must appear in the company's
    /// recruiter set AND be an active recruiter. Association alone is not
    /// enough. Returns the company so callers don't re-load it.
    pub async fn require_company_access(
        &self,
        company_id: &CompanyId,
        principal: &AuthPrincipal,
    ) -> Result<Company, ApiError> {
        let company = match self.store.get_company(company_id).await {
            Ok(c) => c,
            Err(StoreError::NotFound) => {
                return Err(ApiError::NotFound("Company not found".into()))
            }
            Err(e) => return Err(e.into()),
        };

        let associated = self
            .store
            .is_company_recruiter(company_id, &principal.id)
            .await?;
        if !associated {
            return Err(ApiError::Forbidden(
                "You are not associated with this company".into(),
            ));
        }

        let recruiter = self.load_principal(&principal.id).await?;
        if !recruiter.is_active {
            return Err(ApiError::Forbidden(
                "Your recruiter account is deactivated".into(),
            ));
        }

        Ok(company)
    }

    /// Association guard with platform-admin bypass, used by delete and
    /// deactivate operations.
    pub async fn require_company_access_or_admin(
        &self,
        company_id: &CompanyId,
        principal: &AuthPrincipal,
    ) -> Result<Company, ApiError> {
        if principal.role == Role::Admin {
            return match self.store.get_company(company_id).await {
                Ok(c) => Ok(c),
                Err(StoreError::NotFound) => {
                    Err(ApiError::NotFound("Company not found".into()))
                }
                Err(e) => Err(e.into()),
            };
        }
        self.require_company_access(company_id, principal).await
    }

    /// Owner guard: association plus the company's admin email matching
    /// the caller's email.
    pub async fn require_company_owner(
        &self,
        company_id: &CompanyId,
        principal: &AuthPrincipal,
    ) -> Result<(Company, Principal), ApiError> {
        let company = self.require_company_access(company_id, principal).await?;
        let recruiter = self.load_principal(&principal.id).await?;
        if company.admin_email != recruiter.email {
            return Err(ApiError::Forbidden(
                "Only the company admin can perform this action".into(),
            ));
        }
        Ok((company, recruiter))
    }

    /// Best-effort activity recording; a failed write is a warning, never
    /// a failed request.
    pub async fn record_activity(&self, event: ActivityEvent) {
        if let Err(e) = self.audit.record(&event).await {
            tracing::warn!(error = %e, action = %event.action, "failed to record activity");
        }
    }

    /// Publish a live notification with the current unseen counter.
    /// Fire-and-forget: failures are logged, not surfaced.
    pub async fn publish_notification(&self, kind: NotificationKind) {
        let unseen = match kind {
            NotificationKind::JobReport => self.store.count_unseen_reports().await,
            NotificationKind::ContactMessage => self.store.count_unseen_contacts().await,
        };
        let unseen = match unseen {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "failed to count unseen notifications");
                return;
            }
        };
        let event = NotificationEvent {
            kind,
            unseen,
            timestamp: Utc::now().timestamp(),
        };
        if let Err(e) = self.events.publish(event).await {
            tracing::warn!(error = %e, "failed to publish notification event");
        }
    }

    /// Send an email through the configured provider; a missing provider
    /// skips the send (useful in development and tests). A configured but
    /// failing provider fails the request: sends are awaited and
    /// single-attempt.
    pub async fn send_email(&self, to: &str, content: &EmailContent) -> Result<(), ApiError> {
        let Some(provider) = &self.email else {
            tracing::debug!(to, subject = %content.subject, "no email provider configured, skipping send");
            return Ok(());
        };
        let email_config = self
            .config
            .email
            .as_ref()
            .ok_or_else(|| ApiError::Internal("email provider without email config".into()))?;
        provider
            .send(
                to,
                content,
                &email_config.from_address,
                email_config.from_name.as_deref(),
            )
            .await
            .map_err(Into::into)
    }
}
