//! # tienda_client
//!
//! Session-aware HTTP client for the Tienda auth API. Caches the issued
//! token, attaches it as a Bearer credential, checks expiry before every
//! authenticated call, and clears the session exactly once when the
//! server stops accepting it, so a UI layer driven by the expiry hook
//! never loops through its login redirect.

use std::sync::Mutex;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Upper bound on any single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client-side failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The cached session expired locally or the server rejected it.
    #[error("session expired")]
    SessionExpired,

    /// An authenticated call was made with no cached session.
    #[error("not signed in")]
    NotSignedIn,

    /// The server answered with its error envelope.
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The account view the API returns alongside tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// A cached session: the bearer token plus its decoded expiry.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    expires_at: i64,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: SessionUser,
}

type ExpiryHook = Box<dyn Fn() + Send + Sync>;

/// HTTP client with a cached session.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    session: Mutex<Option<Session>>,
    on_session_expired: Option<ExpiryHook>,
}

impl SessionClient {
    /// Build a client against the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: Mutex::new(None),
            on_session_expired: None,
        })
    }

    /// Install a hook fired exactly once each time a session dies; the
    /// natural place to kick off a login redirect.
    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Box::new(hook));
        self
    }

    /// The cached session, if any.
    pub fn session(&self) -> Option<Session> {
        self.lock_session().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session().is_some()
    }

    /// `POST /auth/register`.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ClientError> {
        self.sign_in(
            "/auth/register",
            json!({"name": name, "email": email, "password": password}),
        )
        .await
    }

    /// `POST /auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        self.sign_in("/auth/login", json!({"email": email, "password": password}))
            .await
    }

    /// `POST /auth/google-login`.
    pub async fn google_login(&self, id_token: &str) -> Result<SessionUser, ClientError> {
        self.sign_in("/auth/google-login", json!({"id_token": id_token}))
            .await
    }

    /// `GET /auth/profile` — authenticated.
    pub async fn profile(&self) -> Result<SessionUser, ClientError> {
        let token = self.current_token()?;
        let resp = self
            .http
            .get(format!("{}/auth/profile", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            self.invalidate_session();
            return Err(ClientError::SessionExpired);
        }
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        resp.json::<SessionUser>()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    /// `POST /auth/logout` — authenticated. The local session is dropped
    /// whether or not the server call succeeds.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let token = self.current_token()?;
        let result = self
            .http
            .post(format!("{}/auth/logout", self.base_url))
            .bearer_auth(&token)
            .send()
            .await;
        // Deliberate sign-out: drop the session without firing the hook.
        *self.lock_session() = None;
        result?;
        Ok(())
    }

    async fn sign_in(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<SessionUser, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }

        let auth: AuthResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;
        let expires_at = token_expiry(&auth.token)
            .ok_or_else(|| ClientError::Malformed("token missing exp claim".into()))?;

        let user = auth.user.clone();
        *self.lock_session() = Some(Session {
            token: auth.token,
            user: auth.user,
            expires_at,
        });
        Ok(user)
    }

    /// A token that is still inside its expiry window, or a typed
    /// failure. A locally-expired session dies the same way a
    /// server-rejected one does.
    fn current_token(&self) -> Result<String, ClientError> {
        let now = chrono::Utc::now().timestamp();
        let expired = {
            let mut guard = self.lock_session();
            match guard.as_ref() {
                None => return Err(ClientError::NotSignedIn),
                Some(s) if s.expires_at <= now => {
                    *guard = None;
                    true
                }
                Some(s) => return Ok(s.token.clone()),
            }
        };
        if expired {
            self.notify_expired();
        }
        Err(ClientError::SessionExpired)
    }

    /// Drop the cached session; the hook fires only when there was a
    /// session to drop, which is what keeps it at once per failure.
    fn invalidate_session(&self) {
        let had_session = self.lock_session().take().is_some();
        if had_session {
            self.notify_expired();
        }
    }

    fn notify_expired(&self) {
        if let Some(hook) = &self.on_session_expired {
            hook();
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Read the `exp` claim out of a JWT without verifying it; the client
/// holds no key and only needs the timestamp.
fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("exp")?.as_i64()
}

async fn error_from(resp: reqwest::Response) -> ClientError {
    let status = resp.status().as_u16();
    let message = resp
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "request failed".to_string());
    ClientError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_expiry_reads_the_exp_claim() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"1","exp":1234567890}"#);
        let token = format!("{header}.{payload}.sig");
        assert_eq!(token_expiry(&token), Some(1234567890));
    }

    #[test]
    fn token_expiry_tolerates_garbage() {
        assert_eq!(token_expiry("garbage"), None);
        assert_eq!(token_expiry("a.b.c"), None);
    }
}
