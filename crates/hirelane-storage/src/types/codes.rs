//! Verification codes and the session-token denylist.

use chrono::{DateTime, Utc};

use super::VerificationCodeId;

/// What a verification code is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodePurpose {
    PasswordReset,
    EmailOtp,
}

impl std::fmt::Display for CodePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PasswordReset => write!(f, "password_reset"),
            Self::EmailOtp => write!(f, "email_otp"),
        }
    }
}

impl std::str::FromStr for CodePurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password_reset" => Ok(Self::PasswordReset),
            "email_otp" => Ok(Self::EmailOtp),
            other => Err(format!("unknown code purpose: {}", other)),
        }
    }
}

/// Verification code record. Only the Argon2id hash of the code is stored.
#[derive(Clone, Debug)]
pub struct VerificationCode {
    pub id: VerificationCodeId,
    /// Email the code was sent to (lowercased; unique per purpose).
    pub email: String,
    pub purpose: CodePurpose,
    pub code_hash: String,
    /// Failed verification attempts; record is deleted after the limit.
    pub attempts: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Parameters for creating/replacing a verification code.
#[derive(Clone, Debug)]
pub struct CreateVerificationCodeParams {
    pub email: String,
    pub purpose: CodePurpose,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// A revoked session token (stateful logout over stateless tokens).
#[derive(Clone, Debug)]
pub struct RevokedToken {
    /// The token's unique `jti` claim.
    pub jti: String,
    /// When the underlying token itself expires; rows past this are swept.
    pub expires_at: DateTime<Utc>,
    pub revoked_at: DateTime<Utc>,
}
