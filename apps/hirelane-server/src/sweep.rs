//! The hourly expiry sweep.
//!
//! The only autonomous background activity in the system: subscriptions
//! whose expiry date has passed flip to Expired and the owning company's
//! counter resets to zero. The same tick also drops expired verification
//! codes and stale denylist rows. The clock is a parameter so tests can
//! drive the sweep with a simulated time.

use chrono::{DateTime, Utc};
use std::time::Duration;

use hirelane_audit::{ActivityAction, ActivityEvent, AuditLog};
use hirelane_storage::{Store, StoreError};

use crate::server::AppState;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// One sweep pass. Returns how many subscriptions were expired.
pub async fn run_expiry_sweep(
    store: &dyn Store,
    audit: &dyn AuditLog,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let due = store.list_due_subscriptions(now).await?;
    let expired = due.len();

    for sub in due {
        store.expire_subscription(&sub.id).await?;
        tracing::info!(
            subscription = %sub.id.0,
            company = %sub.company_id.0,
            kind = %sub.kind,
            plan = %sub.plan_name,
            "subscription expired, company counter reset"
        );
        let event = ActivityEvent::new(ActivityAction::SubscriptionExpire, None)
            .subject(sub.plan_name.clone())
            .detail(format!("{} subscription ran out", sub.kind));
        if let Err(e) = audit.record(&event).await {
            tracing::warn!(error = %e, "failed to record expiry activity");
        }
    }

    let codes = store.cleanup_expired_codes(now).await?;
    let tokens = store.cleanup_expired_tokens(now).await?;
    if codes + tokens > 0 {
        tracing::debug!(codes, tokens, "swept expired codes and denylist rows");
    }

    Ok(expired)
}

/// Spawn the hourly sweep task.
pub fn spawn(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match run_expiry_sweep(state.store.as_ref(), state.audit.as_ref(), Utc::now()).await {
                Ok(expired) if expired > 0 => {
                    tracing::info!(expired, "expiry sweep finished");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "expiry sweep failed");
                }
            }
        }
    })
}
