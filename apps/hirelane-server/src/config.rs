//! Server configuration module.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # Core settings
//! HIRELANE_SESSION_SECRET=...           # required: signs session tokens
//! HIRELANE_SESSION_TTL_HOURS=24         # optional, default 24
//! HIRELANE_FRONTEND_ORIGIN=https://app.hirelane.dev   # optional, enables CORS
//! HIRELANE_GOOGLE_CLIENT_ID=...         # optional, audience check for OAuth login
//!
//! # Provider: Resend
//! HIRELANE_EMAIL_PROVIDER=resend
//! RESEND_API_KEY=re_...
//!
//! # Provider: SMTP
//! HIRELANE_EMAIL_PROVIDER=smtp
//! SMTP_HOST=smtp.gmail.com
//! SMTP_PORT=587
//! SMTP_USERNAME=user@example.com
//! SMTP_PASSWORD=app_password
//! SMTP_USE_TLS=true
//!
//! # Sender config
//! HIRELANE_EMAIL_FROM=noreply@hirelane.dev
//! HIRELANE_EMAIL_FROM_NAME="Hirelane"
//! ```

use std::env;
use thiserror::Error;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Secret signing session tokens (HS256).
    pub session_secret: String,
    /// Session token lifetime in hours.
    pub session_ttl_hours: i64,
    /// Frontend origin allowed by CORS; None disables the CORS layer.
    pub frontend_origin: Option<String>,
    /// Expected audience of Google ID tokens; None skips the check.
    pub google_client_id: Option<String>,
    pub email: Option<EmailConfig>,
}

/// Email configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email provider configuration
    pub provider: EmailProviderConfig,
    /// From email address
    pub from_address: String,
    /// Optional from name
    pub from_name: Option<String>,
}

/// Email provider configuration
#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    /// Resend email provider
    Resend {
        /// Resend API key
        api_key: String,
    },
    /// SMTP email provider
    Smtp {
        /// SMTP host
        host: String,
        /// SMTP port
        port: u16,
        /// Optional username
        username: Option<String>,
        /// Optional password
        password: Option<String>,
        /// Whether to use TLS
        use_tls: bool,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid email provider: {0}. Expected 'resend' or 'smtp'")]
    InvalidProvider(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("Invalid session TTL: {0}")]
    InvalidTtl(String),

    #[error("Missing from address: HIRELANE_EMAIL_FROM is required when email is configured")]
    MissingFromAddress,

    #[error("SMTP provider requires SMTP_HOST")]
    SmtpMissingHost,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_secret = env::var("HIRELANE_SESSION_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("HIRELANE_SESSION_SECRET".to_string()))?;

        let session_ttl_hours = match env::var("HIRELANE_SESSION_TTL_HOURS") {
            Ok(v) => v
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidTtl(v.clone()))?,
            Err(_) => 24,
        };

        let frontend_origin = env::var("HIRELANE_FRONTEND_ORIGIN").ok();
        let google_client_id = env::var("HIRELANE_GOOGLE_CLIENT_ID").ok();

        Ok(Self {
            session_secret,
            session_ttl_hours,
            frontend_origin,
            google_client_id,
            email: load_email_config()?,
        })
    }

    /// Create a test configuration (no email, fixed secret)
    pub fn test() -> Self {
        Self {
            session_secret: "test-session-secret".into(),
            session_ttl_hours: 24,
            frontend_origin: None,
            google_client_id: None,
            email: None,
        }
    }
}

fn load_email_config() -> Result<Option<EmailConfig>, ConfigError> {
    let provider_type = match env::var("HIRELANE_EMAIL_PROVIDER") {
        Ok(v) => v,
        Err(_) => return Ok(None),
    };

    let provider = match provider_type.to_lowercase().as_str() {
        "resend" => {
            let api_key = env::var("RESEND_API_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("RESEND_API_KEY".to_string()))?;
            EmailProviderConfig::Resend { api_key }
        }
        "smtp" => {
            let host = env::var("SMTP_HOST").map_err(|_| ConfigError::SmtpMissingHost)?;
            let port = env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse::<u16>()
                .map_err(|_| {
                    ConfigError::InvalidPort(
                        env::var("SMTP_PORT").unwrap_or_else(|_| "invalid".to_string()),
                    )
                })?;
            let username = env::var("SMTP_USERNAME").ok();
            let password = env::var("SMTP_PASSWORD").ok();
            let use_tls = env::var("SMTP_USE_TLS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(true); // TLS by default

            EmailProviderConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            }
        }
        other => return Err(ConfigError::InvalidProvider(other.to_string())),
    };

    let from_address =
        env::var("HIRELANE_EMAIL_FROM").map_err(|_| ConfigError::MissingFromAddress)?;
    let from_name = env::var("HIRELANE_EMAIL_FROM_NAME").ok();

    Ok(Some(EmailConfig {
        provider,
        from_address,
        from_name,
    }))
}
