//! Google ID-token verification.
//!
//! Wraps Google's `tokeninfo` endpoint. The endpoint reports all numeric
//! and boolean fields as JSON strings, hence the string-typed payload.
//! Docs: <https://developers.google.com/identity/sign-in/web/backend-auth>

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ApiError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Upper bound on a verification round-trip; a slow upstream becomes a
/// typed failure, never a hung request.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures while verifying a Google ID token.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Google examined the token and said no.
    #[error("id token rejected: {0}")]
    Rejected(String),

    #[error("token payload missing {0}")]
    MissingField(&'static str),

    #[error("email not verified by google")]
    UnverifiedEmail,

    #[error("token verification timed out")]
    Timeout,

    #[error("token verification service unavailable: {0}")]
    Unavailable(String),
}

impl From<GoogleError> for ApiError {
    fn from(e: GoogleError) -> Self {
        match e {
            GoogleError::Rejected(_) | GoogleError::MissingField(_) | GoogleError::UnverifiedEmail => {
                ApiError::Auth(e.to_string())
            }
            GoogleError::Timeout | GoogleError::Unavailable(_) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Identity attested by Google after a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedGoogleUser {
    /// Lowercased, verified email address.
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Raw tokeninfo payload.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    email: Option<String>,
    sub: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    aud: Option<String>,
    email_verified: Option<String>,
    exp: Option<String>,
}

/// Validates Google ID tokens against the tokeninfo endpoint.
#[derive(Clone)]
pub struct GoogleVerifier {
    http: Client,
    endpoint: String,
    client_id: Option<String>,
}

impl GoogleVerifier {
    /// Build a verifier. When `client_id` is set, the token audience must
    /// match it.
    pub fn new(client_id: Option<String>) -> Result<Self, GoogleError> {
        let http = Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .map_err(|e| GoogleError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: TOKENINFO_URL.to_string(),
            client_id,
        })
    }

    /// Override the tokeninfo endpoint (tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Verify an ID token and extract the attested identity.
    pub async fn verify(&self, id_token: &str) -> Result<VerifiedGoogleUser, GoogleError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GoogleError::Timeout
                } else {
                    GoogleError::Unavailable(e.to_string())
                }
            })?;

        let status = resp.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            warn!(%status, "tokeninfo rejected id token");
            return Err(GoogleError::Rejected(format!("tokeninfo returned {status}")));
        }
        if !status.is_success() {
            return Err(GoogleError::Unavailable(format!(
                "tokeninfo returned {status}"
            )));
        }

        let info: TokenInfo = resp
            .json()
            .await
            .map_err(|e| GoogleError::Rejected(format!("malformed tokeninfo payload: {e}")))?;

        let email = info.email.ok_or(GoogleError::MissingField("email"))?;
        if info.sub.as_deref().is_none_or(str::is_empty) {
            return Err(GoogleError::MissingField("sub"));
        }
        if info.email_verified.as_deref() != Some("true") {
            return Err(GoogleError::UnverifiedEmail);
        }

        if let Some(exp) = info.exp.as_deref().and_then(|v| v.parse::<i64>().ok())
            && exp < chrono::Utc::now().timestamp()
        {
            return Err(GoogleError::Rejected("token expired".into()));
        }

        if let Some(client_id) = &self.client_id {
            match info.aud.as_deref() {
                Some(aud) if aud == client_id => {}
                Some(_) => return Err(GoogleError::Rejected("audience mismatch".into())),
                None => return Err(GoogleError::MissingField("aud")),
            }
        }

        debug!(email = %email, "google id token verified");
        Ok(VerifiedGoogleUser {
            email: email.to_lowercase(),
            name: info.name,
            avatar: info.picture,
        })
    }
}
