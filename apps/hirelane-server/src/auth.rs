//! Session tokens and password hashing.
//!
//! Sessions are short-lived signed tokens (HS256, 1 day by default) carried
//! in an httpOnly cookie or a bearer header. Logout is stateful: the
//! token's `jti` lands in the storage denylist, which the extractor checks
//! on every request. The principal's role rides in the token, so role
//! dispatch happens once at authentication time.

use axum::http::{header, request::Parts};
use axum::{async_trait, extract::FromRequestParts};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use hirelane_storage::{PrincipalId, Role, Store};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::server::AppState;

/// Name of the httpOnly session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Signed session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id
    pub sub: String,
    /// Principal role, resolved once at login
    pub role: String,
    /// Unique token id, denylisted on logout
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a session token for a principal.
pub fn issue_session_token(
    config: &ServerConfig,
    id: &PrincipalId,
    role: Role,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: id.0.to_string(),
        role: role.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(config.session_ttl_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign session token: {}", e)))
}

/// Decode and validate a session token (signature + expiry).
pub fn decode_session_token(config: &ServerConfig, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Invalid or expired session".into()))
}

/// The authenticated caller, resolved by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub id: PrincipalId,
    pub role: Role,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthPrincipal {
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Insufficient privileges".into()))
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        self.require_role(Role::Admin)
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .map(str::trim)
        .find_map(|kv| kv.strip_prefix("session="))
        .map(|v| v.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))?;

        let claims = decode_session_token(&state.config, &token)?;

        if state.store.is_token_revoked(&claims.jti).await? {
            return Err(ApiError::Unauthorized("Session has been logged out".into()));
        }

        let id = Uuid::try_parse(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid session subject".into()))?;
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| ApiError::Unauthorized("Invalid session role".into()))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| ApiError::Unauthorized("Invalid session expiry".into()))?;

        Ok(AuthPrincipal {
            id: PrincipalId(id),
            role,
            jti: claims.jti,
            expires_at,
        })
    }
}

// ───────────────────────────── Passwords ──────────────────────────────

/// Hash a password (or a verification code) with Argon2id.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password (or verification code) against a stored hash.
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password(&hash, "hunter2!"));
        assert!(!verify_password(&hash, "hunter3!"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "hunter2!"));
    }

    #[test]
    fn token_roundtrip_carries_role_and_jti() {
        let config = ServerConfig::test();
        let id = PrincipalId(Uuid::new_v4());
        let token = issue_session_token(&config, &id, Role::Recruiter).unwrap();

        let claims = decode_session_token(&config, &token).unwrap();
        assert_eq!(claims.sub, id.0.to_string());
        assert_eq!(claims.role, "recruiter");
        assert!(!claims.jti.is_empty());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = ServerConfig::test();
        let mut other = ServerConfig::test();
        other.session_secret = "different-secret".into();

        let id = PrincipalId(Uuid::new_v4());
        let token = issue_session_token(&other, &id, Role::Student).unwrap();
        assert!(decode_session_token(&config, &token).is_err());
    }

    #[test]
    fn tokens_get_distinct_jtis() {
        let config = ServerConfig::test();
        let id = PrincipalId(Uuid::new_v4());
        let a = decode_session_token(
            &config,
            &issue_session_token(&config, &id, Role::Student).unwrap(),
        )
        .unwrap();
        let b = decode_session_token(
            &config,
            &issue_session_token(&config, &id, Role::Student).unwrap(),
        )
        .unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
