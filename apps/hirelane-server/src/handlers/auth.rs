//! Authentication handlers: register, login, OAuth, logout, password
//! reset, OTP and token verification.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use hirelane_audit::{ActivityAction, ActivityEvent};
use hirelane_storage::{
    CodePurpose, CreatePrincipalParams, CreateVerificationCodeParams, Principal, Role, Store,
    StoreError,
};

use crate::auth::{
    hash_password, issue_session_token, verify_password, AuthPrincipal, SESSION_COOKIE,
};
use crate::email::{generate_verification_code, EmailContent};
use crate::error::{ApiError, MessageResponse};
use crate::google::verify_google_id_token;
use crate::handlers::PrincipalView;
use crate::server::AppState;

const CODE_TTL_MINUTES: i64 = 15;
const MAX_CODE_ATTEMPTS: i64 = 5;

// ──────────────────────────── validation ──────────────────────────────

pub(crate) fn require_field(value: &str, name: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} is required", name)));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let trimmed = email.trim();
    let valid = trimmed.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !valid {
        return Err(ApiError::Validation("A valid email is required".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

// ───────────────────────────── responses ──────────────────────────────

/// Successful login: the token rides both in the JSON body (for bearer
/// use) and in an httpOnly session cookie.
#[derive(Debug)]
pub struct AuthResponse {
    pub token: String,
    pub principal: PrincipalView,
    pub max_age_secs: i64,
}

impl IntoResponse for AuthResponse {
    fn into_response(self) -> Response {
        let cookie = format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
            SESSION_COOKIE, self.token, self.max_age_secs
        );
        let body = Json(serde_json::json!({
            "success": true,
            "token": self.token,
            "principal": self.principal,
        }));
        ([(header::SET_COOKIE, cookie)], body).into_response()
    }
}

fn auth_success(state: &AppState, principal: &Principal) -> Result<AuthResponse, ApiError> {
    let token = issue_session_token(&state.config, &principal.id, principal.role)?;
    Ok(AuthResponse {
        token,
        principal: PrincipalView::from(principal),
        max_age_secs: state.config.session_ttl_hours * 3600,
    })
}

// ──────────────────────────── registration ────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

async fn register(
    state: &AppState,
    req: RegisterRequest,
    role: Role,
) -> Result<Json<MessageResponse>, ApiError> {
    require_field(&req.full_name, "Full name")?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    let result = state
        .store
        .create_principal(&CreatePrincipalParams {
            role,
            full_name: req.full_name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.phone,
            password_hash: Some(password_hash),
            is_verified: false,
        })
        .await;

    let id = match result {
        Ok(id) => id,
        // The unified principal table makes this one uniqueness check
        // across every role; a taken email is a normal negative response.
        Err(StoreError::AlreadyExists) => {
            return Err(ApiError::Conflict("Account already exists".into()))
        }
        Err(e) => return Err(e.into()),
    };

    let action = match role {
        Role::Student => ActivityAction::StudentRegister,
        _ => ActivityAction::RecruiterRegister,
    };
    state
        .record_activity(ActivityEvent::new(action, Some(id)).subject(req.email.trim().to_lowercase()))
        .await;

    Ok(MessageResponse::ok("Account created successfully"))
}

pub async fn register_student(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    register(&state, req, Role::Student).await
}

pub async fn register_recruiter(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    register(&state, req, Role::Recruiter).await
}

// ─────────────────────────────── login ────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Unified student/recruiter login.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<AuthResponse, ApiError> {
    let principal = match state.store.get_principal_by_email(&req.email).await {
        Ok(p) => p,
        Err(StoreError::NotFound) => {
            return Err(ApiError::Unauthorized("Invalid email or password".into()))
        }
        Err(e) => return Err(e.into()),
    };

    if principal.role == Role::Admin {
        return Err(ApiError::Forbidden("Use the admin login".into()));
    }

    check_password(&principal, &req.password)?;
    auth_success(&state, &principal)
}

/// Admin-only login.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<AuthResponse, ApiError> {
    let principal = match state.store.get_principal_by_email(&req.email).await {
        Ok(p) if p.role == Role::Admin => p,
        Ok(_) | Err(StoreError::NotFound) => {
            return Err(ApiError::Unauthorized("Invalid email or password".into()))
        }
        Err(e) => return Err(e.into()),
    };

    check_password(&principal, &req.password)?;
    auth_success(&state, &principal)
}

fn check_password(principal: &Principal, password: &str) -> Result<(), ApiError> {
    let Some(hash) = &principal.password_hash else {
        return Err(ApiError::Unauthorized(
            "This account uses Google sign-in".into(),
        ));
    };
    if !verify_password(hash, password) {
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }
    Ok(())
}

// ──────────────────────────── Google OAuth ────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

async fn google_login(
    state: &AppState,
    req: GoogleLoginRequest,
    new_account_role: Role,
) -> Result<AuthResponse, ApiError> {
    let profile =
        verify_google_id_token(&req.id_token, state.config.google_client_id.as_deref()).await?;

    // Whatever role owns this email wins; the calling route only decides
    // what a brand-new account becomes.
    match state.store.get_principal_by_email(&profile.email).await {
        Ok(existing) => auth_success(state, &existing),
        Err(StoreError::NotFound) => {
            let id = state
                .store
                .create_principal(&CreatePrincipalParams {
                    role: new_account_role,
                    full_name: profile.name.clone(),
                    email: profile.email.clone(),
                    phone: None,
                    password_hash: None,
                    is_verified: profile.email_verified,
                })
                .await?;
            let action = match new_account_role {
                Role::Student => ActivityAction::StudentRegister,
                _ => ActivityAction::RecruiterRegister,
            };
            state
                .record_activity(
                    ActivityEvent::new(action, Some(id.clone())).subject(profile.email.clone()),
                )
                .await;
            let principal = state.load_principal(&id).await?;
            auth_success(state, &principal)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn google_login_student(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<AuthResponse, ApiError> {
    google_login(&state, req, Role::Student).await
}

pub async fn google_login_recruiter(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<AuthResponse, ApiError> {
    google_login(&state, req, Role::Recruiter).await
}

// ─────────────────────────────── logout ───────────────────────────────

/// Stateful logout: the token's jti goes on the denylist until the token
/// would have expired anyway.
pub async fn logout(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .revoke_token(&principal.jti, principal.expires_at)
        .await?;

    let clear = format!(
        "{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax",
        SESSION_COOKIE
    );
    Ok((
        [(header::SET_COOKIE, clear)],
        MessageResponse::ok("Logged out successfully"),
    ))
}

/// Echo the authenticated principal for a valid, non-revoked token.
pub async fn verify_token(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<serde_json::Value>, ApiError> {
    let loaded = state.load_principal(&principal.id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "principal": PrincipalView::from(&loaded),
    })))
}

// ──────────────────────────── password reset ──────────────────────────

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_email(&req.email)?;

    let principal = match state.store.get_principal_by_email(&req.email).await {
        Ok(p) => p,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Account not found".into())),
        Err(e) => return Err(e.into()),
    };

    let code = generate_verification_code();
    let code_hash = hash_password(&code)?;
    state
        .store
        .upsert_verification_code(&CreateVerificationCodeParams {
            email: principal.email.clone(),
            purpose: CodePurpose::PasswordReset,
            code_hash,
            expires_at: Utc::now() + Duration::minutes(CODE_TTL_MINUTES),
        })
        .await?;

    state
        .send_email(&principal.email, &EmailContent::password_reset(&code))
        .await?;

    Ok(MessageResponse::ok("Password reset code sent"))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validate_password(&req.new_password)?;

    let principal = match state.store.get_principal_by_email(&req.email).await {
        Ok(p) => p,
        Err(StoreError::NotFound) => return Err(ApiError::NotFound("Account not found".into())),
        Err(e) => return Err(e.into()),
    };

    let record = consume_code(&state, &principal.email, CodePurpose::PasswordReset, &req.code)
        .await?;

    let password_hash = hash_password(&req.new_password)?;
    state.store.set_password(&principal.id, &password_hash).await?;
    state.store.delete_verification_code(&record).await?;

    Ok(MessageResponse::ok("Password has been reset"))
}

// ────────────────────────────── email OTP ─────────────────────────────

pub async fn request_otp(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> Result<Json<MessageResponse>, ApiError> {
    let loaded = state.load_principal(&principal.id).await?;

    let code = generate_verification_code();
    let code_hash = hash_password(&code)?;
    state
        .store
        .upsert_verification_code(&CreateVerificationCodeParams {
            email: loaded.email.clone(),
            purpose: CodePurpose::EmailOtp,
            code_hash,
            expires_at: Utc::now() + Duration::minutes(CODE_TTL_MINUTES),
        })
        .await?;

    state
        .send_email(&loaded.email, &EmailContent::email_otp(&code))
        .await?;

    Ok(MessageResponse::ok("Verification code sent"))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub code: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let loaded = state.load_principal(&principal.id).await?;

    let record = consume_code(&state, &loaded.email, CodePurpose::EmailOtp, &req.code).await?;

    state.store.mark_principal_verified(&principal.id).await?;
    state.store.delete_verification_code(&record).await?;

    Ok(MessageResponse::ok("Account verified"))
}

/// Check a submitted code against the stored hash, enforcing expiry and
/// the attempt limit. Returns the record id for deletion on success.
async fn consume_code(
    state: &AppState,
    email: &str,
    purpose: CodePurpose,
    submitted: &str,
) -> Result<hirelane_storage::VerificationCodeId, ApiError> {
    let record = match state.store.get_verification_code(email, purpose).await {
        Ok(r) => r,
        Err(StoreError::NotFound) => {
            return Err(ApiError::Validation("No verification code found".into()))
        }
        Err(e) => return Err(e.into()),
    };

    if record.expires_at < Utc::now() {
        state.store.delete_verification_code(&record.id).await?;
        return Err(ApiError::Validation("Code has expired".into()));
    }

    if !verify_password(&record.code_hash, submitted) {
        let attempts = state.store.increment_code_attempts(&record.id).await?;
        if attempts >= MAX_CODE_ATTEMPTS {
            state.store.delete_verification_code(&record.id).await?;
            return Err(ApiError::Validation(
                "Too many attempts; request a new code".into(),
            ));
        }
        return Err(ApiError::Validation("Invalid code".into()));
    }

    Ok(record.id)
}
