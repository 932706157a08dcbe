//! Auth service — registration, login, Google sign-in, password reset,
//! and profile retrieval.
//!
//! The one place flow decisions live; handlers stay thin and queries stay
//! dumb. Unknown email and wrong password collapse into the same failure
//! so responses cannot be used to enumerate accounts.

use sqlx::PgPool;
use tracing::info;

use tienda_core::auth::{AuthError, jwt, password, queries};
use tienda_core::models::{Provider, PublicUser, User};

use crate::error::{ApiError, ApiResult};
use crate::models::AuthResponse;
use crate::services::google::GoogleVerifier;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Lowercase + trim; email comparison is case-insensitive everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> ApiResult<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ApiError::Validation("a valid email address is required".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> ApiResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn issue_response(user: User, jwt_secret: &[u8]) -> ApiResult<AuthResponse> {
    let token = jwt::issue_session_token(user.id, user.role, jwt_secret)?;
    Ok(AuthResponse {
        token,
        user: PublicUser::from(user),
    })
}

/// Create a password-backed account and sign it in.
pub async fn register(
    pool: &PgPool,
    name: &str,
    email: &str,
    pass: &str,
    jwt_secret: &[u8],
) -> ApiResult<AuthResponse> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    let email = normalize_email(email);
    validate_email(&email)?;
    validate_password(pass)?;

    let pw_hash = password::hash_password(pass)?;
    // Single INSERT; the unique index on email settles concurrent
    // duplicates in favor of exactly one request.
    let user = queries::create_local_user(pool, name, &email, &pw_hash).await?;
    info!(user_id = user.id, "registered new local account");
    issue_response(user, jwt_secret)
}

/// Authenticate with email + password.
pub async fn login(
    pool: &PgPool,
    email: &str,
    pass: &str,
    jwt_secret: &[u8],
) -> ApiResult<AuthResponse> {
    if email.trim().is_empty() || pass.is_empty() {
        return Err(ApiError::Validation("email and password are required".into()));
    }
    let email = normalize_email(email);

    let Some(user) = queries::find_user_by_email(pool, &email).await? else {
        return Err(AuthError::InvalidCredentials.into());
    };
    if user.provider != Provider::Local {
        return Err(AuthError::WrongProvider(user.provider).into());
    }
    // The OAuth sentinel hash never verifies.
    if !user.has_password() || !password::verify_password(pass, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    info!(user_id = user.id, "local login");
    issue_response(user, jwt_secret)
}

/// Authenticate with a Google ID token, creating the account on first
/// sight. An email already bound to another provider is a hard failure,
/// never a link or merge.
pub async fn google_login(
    pool: &PgPool,
    verifier: &GoogleVerifier,
    id_token: &str,
    jwt_secret: &[u8],
) -> ApiResult<AuthResponse> {
    if id_token.trim().is_empty() {
        return Err(ApiError::Validation("id_token is required".into()));
    }
    let profile = verifier.verify(id_token).await?;
    let email = normalize_email(&profile.email);

    let user = match queries::find_user_by_email(pool, &email).await? {
        None => {
            let user = queries::create_google_user(
                pool,
                profile.name.as_deref().unwrap_or(""),
                &email,
                profile.avatar.as_deref(),
            )
            .await?;
            info!(user_id = user.id, "created account via google sign-in");
            user
        }
        Some(user) if user.provider != Provider::Google => {
            return Err(AuthError::ProviderConflict(user.provider).into());
        }
        Some(user) => {
            queries::refresh_google_profile(
                pool,
                user.id,
                profile.name.as_deref(),
                profile.avatar.as_deref(),
            )
            .await?
        }
    };

    issue_response(user, jwt_secret)
}

/// Overwrite the password of a local account. Missing accounts and
/// accounts bound to another provider produce the same 404.
pub async fn reset_password(pool: &PgPool, email: &str, new_password: &str) -> ApiResult<()> {
    let email = normalize_email(email);
    validate_password(new_password)?;

    let user = match queries::find_user_by_email(pool, &email).await? {
        Some(u) if u.provider == Provider::Local => u,
        _ => return Err(AuthError::NotFound.into()),
    };

    let pw_hash = password::hash_password(new_password)?;
    queries::update_password(pool, user.id, &pw_hash).await?;
    info!(user_id = user.id, "password reset");
    Ok(())
}

/// Public view of an account by ID. Tolerates ids that no longer resolve.
pub async fn profile(pool: &PgPool, user_id: i64) -> ApiResult<PublicUser> {
    let user = queries::find_user_by_id(pool, user_id)
        .await?
        .ok_or(AuthError::NotFound)?;
    Ok(PublicUser::from(user))
}

/// Public views of every account (admin listing).
pub async fn list_users(pool: &PgPool) -> ApiResult<Vec<PublicUser>> {
    let users = queries::list_users(pool).await?;
    Ok(users.into_iter().map(PublicUser::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ana@X.Com "), "ana@x.com");
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("ana@x.com").is_ok());
        assert!(validate_email("a@sub.domain.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("ana@nodot").is_err());
    }

    #[test]
    fn password_validation() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
    }
}
