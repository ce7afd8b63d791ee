//! Subscription types.
//!
//! Job-post subscriptions and candidate-credit subscriptions are two
//! instances of the same lifecycle, parameterized by [`SubscriptionKind`].

use chrono::{DateTime, Utc};

use super::{CompanyId, SubscriptionId};

/// Which company counter a subscription boosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    JobPosts,
    CandidateCredits,
}

impl std::fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JobPosts => write!(f, "job_posts"),
            Self::CandidateCredits => write!(f, "candidate_credits"),
        }
    }
}

impl std::str::FromStr for SubscriptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_posts" => Ok(Self::JobPosts),
            "candidate_credits" => Ok(Self::CandidateCredits),
            other => Err(format!("unknown subscription kind: {}", other)),
        }
    }
}

/// Lifecycle state: `Hold → Active → Expired`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Created, payment order opened, not yet verified.
    Hold,
    /// Payment verified; the plan boost has been applied.
    Active,
    /// Past its expiry date (or quota-exhausted); counter reset to zero.
    Expired,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "hold"),
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hold" => Ok(Self::Hold),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown subscription status: {}", other)),
        }
    }
}

/// Payment state reported by the gateway flow: `Created → Paid` (or Failed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentStatus {
    Created,
    Paid,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// Subscription record.
#[derive(Clone, Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub company_id: CompanyId,
    pub kind: SubscriptionKind,
    pub plan_name: String,
    /// Quantity added to the company counter on activation.
    pub boost: i64,
    /// Plan price in minor currency units.
    pub price: i64,
    pub status: SubscriptionStatus,
    pub payment_status: PaymentStatus,
    /// External payment-order id; None for zero-price plans.
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Parameters for creating a subscription.
#[derive(Clone, Debug)]
pub struct CreateSubscriptionParams {
    pub company_id: CompanyId,
    pub kind: SubscriptionKind,
    pub plan_name: String,
    pub boost: i64,
    pub price: i64,
    pub order_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}
