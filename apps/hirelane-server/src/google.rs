//! Google ID-token verification for OAuth login.
//!
//! The frontend obtains an ID token from Google's sign-in widget; the
//! server validates it against Google's tokeninfo endpoint and extracts the
//! profile. When a client id is configured, the token's audience must
//! match it.

use serde::Deserialize;

use crate::error::ApiError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Profile extracted from a valid Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    pub email: String,
    pub name: String,
    pub email_verified: bool,
}

#[derive(Deserialize)]
struct TokenInfo {
    email: String,
    #[serde(default)]
    name: Option<String>,
    // Google returns this as the string "true"/"false".
    #[serde(default)]
    email_verified: Option<String>,
    #[serde(default)]
    aud: Option<String>,
}

/// Validate a Google ID token and return the profile it asserts.
pub async fn verify_google_id_token(
    id_token: &str,
    expected_audience: Option<&str>,
) -> Result<GoogleProfile, ApiError> {
    let response = reqwest::Client::new()
        .get(TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| ApiError::Internal(format!("Google tokeninfo request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(ApiError::Unauthorized("Invalid Google token".into()));
    }

    let info: TokenInfo = response
        .json()
        .await
        .map_err(|e| ApiError::Internal(format!("Google tokeninfo parse failed: {}", e)))?;

    if let Some(expected) = expected_audience {
        if info.aud.as_deref() != Some(expected) {
            return Err(ApiError::Unauthorized(
                "Google token issued for a different application".into(),
            ));
        }
    }

    let email = info.email.to_lowercase();
    let name = info
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    Ok(GoogleProfile {
        email,
        name,
        email_verified: info.email_verified.as_deref() == Some("true"),
    })
}
