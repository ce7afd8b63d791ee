//! hirelane-billing - Payment integration for the hirelane platform
//!
//! This crate provides:
//! - The plan catalog (job-post plans and candidate-credit plans)
//! - Payment order creation via the [`PaymentGateway`] trait
//! - Payment-signature verification for the gateway callback
//!
//! # Architecture
//!
//! A company buys a plan; an external payment order is opened and the
//! subscription sits in Hold until the gateway's callback signature
//! (`HMAC-SHA256(order_id|payment_id)` under the shared key secret) is
//! verified. Zero-price plans skip the gateway entirely.

use async_trait::async_trait;
use thiserror::Error;

use hirelane_storage::{StoreError, SubscriptionKind};

mod signature;
pub use signature::{payment_signature, verify_payment_signature};

/// Billing errors
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Invalid payment signature")]
    InvalidSignature,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for the payment gateway
#[derive(Clone)]
pub struct BillingConfig {
    /// Public key id sent to the frontend checkout widget
    pub key_id: String,

    /// Shared secret used to verify payment signatures
    pub key_secret: String,

    /// ISO currency code orders are denominated in
    pub currency: String,
}

impl BillingConfig {
    /// Create a billing configuration from environment variables
    pub fn from_env() -> Result<Self, BillingError> {
        Ok(Self {
            key_id: std::env::var("HIRELANE_PAYMENT_KEY_ID")
                .or_else(|_| std::env::var("RAZORPAY_KEY_ID"))
                .map_err(|_| {
                    BillingError::Config("HIRELANE_PAYMENT_KEY_ID or RAZORPAY_KEY_ID not set".into())
                })?,
            key_secret: std::env::var("HIRELANE_PAYMENT_KEY_SECRET")
                .or_else(|_| std::env::var("RAZORPAY_KEY_SECRET"))
                .map_err(|_| {
                    BillingError::Config(
                        "HIRELANE_PAYMENT_KEY_SECRET or RAZORPAY_KEY_SECRET not set".into(),
                    )
                })?,
            currency: std::env::var("HIRELANE_PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".into()),
        })
    }

    /// Create a test configuration (for development/testing)
    pub fn test() -> Self {
        Self {
            key_id: "test_key_id".into(),
            key_secret: "test_key_secret".into(),
            currency: "INR".into(),
        }
    }
}

/// One purchasable plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plan {
    pub name: &'static str,
    /// Quantity added to the company counter on activation
    /// (job posts or candidate credits, depending on the catalog).
    pub boost: i64,
    /// Price in minor currency units; 0 activates without payment.
    pub price: i64,
}

impl Plan {
    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

/// Job-post plans
pub const JOB_PLANS: &[Plan] = &[
    Plan { name: "Free", boost: 1, price: 0 },
    Plan { name: "Basic", boost: 5, price: 99_900 },
    Plan { name: "Standard", boost: 15, price: 249_900 },
    Plan { name: "Premium", boost: 40, price: 499_900 },
];

/// Candidate-credit plans
pub const CANDIDATE_PLANS: &[Plan] = &[
    Plan { name: "Free", boost: 5, price: 0 },
    Plan { name: "Starter", boost: 25, price: 79_900 },
    Plan { name: "Growth", boost: 100, price: 199_900 },
    Plan { name: "Scale", boost: 250, price: 399_900 },
];

/// Look a plan up by kind and name
pub fn find_plan(kind: SubscriptionKind, name: &str) -> Result<&'static Plan, BillingError> {
    let catalog = match kind {
        SubscriptionKind::JobPosts => JOB_PLANS,
        SubscriptionKind::CandidateCredits => CANDIDATE_PLANS,
    };
    catalog
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| BillingError::UnknownPlan(name.to_string()))
}

/// An opened payment order
#[derive(Debug, Clone)]
pub struct PaymentOrder {
    /// Gateway order id, echoed back by the payment callback
    pub order_id: String,

    /// Amount in minor currency units
    pub amount: i64,

    pub currency: String,
}

/// Payment gateway trait for dependency injection
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payment order for the given amount.
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<PaymentOrder, BillingError>;
}

/// Mock payment gateway for development and testing
pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<PaymentOrder, BillingError> {
        let order_id = format!("order_{}", uuid::Uuid::new_v4().simple());

        tracing::info!(
            %order_id,
            amount,
            currency,
            receipt,
            "Mock payment order created"
        );

        Ok(PaymentOrder {
            order_id,
            amount,
            currency: currency.to_string(),
        })
    }
}
