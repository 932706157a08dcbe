//! Credential-store queries.
//!
//! All writes are single statements so a dropped request can never leave
//! a record half-applied. Emails are passed in pre-normalized.

use sqlx::PgPool;

use super::AuthError;
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, provider, avatar_url, \
                            email_verified, created_at, updated_at";

/// Fetch a user by (normalized) email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Fetch a user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AuthError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Create a password-backed account. A concurrent duplicate registration
/// loses the race at the unique index and maps to `EmailAlreadyExists`.
pub async fn create_local_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash, role, provider) \
         VALUES ($1, $2, $3, 'USER', 'LOCAL') \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(map_unique_violation)?;
    Ok(user)
}

/// Create an account from a verified Google profile. The password hash
/// stays the empty sentinel and the email counts as verified.
pub async fn create_google_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    avatar_url: Option<&str>,
) -> Result<User, AuthError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash, role, provider, avatar_url, email_verified) \
         VALUES ($1, $2, '', 'USER', 'GOOGLE', $3, TRUE) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(email)
    .bind(avatar_url)
    .fetch_one(pool)
    .await
    .map_err(map_unique_violation)?;
    Ok(user)
}

/// Touch `updated_at` for a returning Google login and backfill the name
/// and avatar only where currently empty. A user-edited value always wins.
pub async fn refresh_google_profile(
    pool: &PgPool,
    id: i64,
    name: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<User, AuthError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET \
             name = CASE WHEN name = '' THEN COALESCE($2, name) ELSE name END, \
             avatar_url = COALESCE(avatar_url, $3), \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(avatar_url)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

/// Overwrite the stored password hash.
pub async fn update_password(
    pool: &PgPool,
    id: i64,
    password_hash: &str,
) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// List every account, oldest first.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, AuthError> {
    let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(users)
}

fn map_unique_violation(e: sqlx::Error) -> AuthError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailAlreadyExists,
        _ => AuthError::Db(e),
    }
}
