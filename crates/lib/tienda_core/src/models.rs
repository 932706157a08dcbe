//! Domain models shared across the workspace.
//!
//! `User` mirrors the `users` table; `PublicUser` is the projection safe
//! to return to clients and never carries the password hash.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, stored as the Postgres enum `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

/// Authentication method an account is bound to, stored as the Postgres
/// enum `auth_provider`. Exactly one per account; the auth service never
/// switches or merges providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    Local,
    Google,
    Facebook,
    Apple,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Local => "email and password",
            Provider::Google => "Google",
            Provider::Facebook => "Facebook",
            Provider::Apple => "Apple",
        };
        f.write_str(name)
    }
}

/// A row of the `users` table. Internal only; hand out [`PublicUser`]
/// instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Stored lowercased; the sole external lookup key.
    pub email: String,
    /// bcrypt hash, or the empty-string sentinel for OAuth-only accounts.
    pub password_hash: String,
    pub role: Role,
    pub provider: Provider,
    pub avatar_url: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account has a local password set.
    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

/// The subset of a user record safe to return to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub provider: Provider,
    pub avatar_url: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            provider: user.provider,
            avatar_url: user.avatar_url,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

/// Claims embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — user ID as a string (standard JWT `sub` claim).
    pub sub: String,
    /// Account role at issuance time.
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp), always `iat` plus the fixed session TTL.
    pub exp: i64,
}

impl SessionClaims {
    /// Parse the subject back into a user ID.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_uppercase() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn provider_serializes_uppercase() {
        let json = serde_json::to_string(&Provider::Google).unwrap();
        assert_eq!(json, "\"GOOGLE\"");
    }

    #[test]
    fn public_user_has_no_password_hash() {
        let user = User {
            id: 1,
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password_hash: "$2b$10$secret".into(),
            role: Role::User,
            provider: Provider::Local,
            avatar_url: None,
            email_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let public = PublicUser::from(user);
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ana@x.com");
        assert_eq!(json["role"], "USER");
    }

    #[test]
    fn session_claims_subject_round_trips() {
        let claims = SessionClaims {
            sub: "42".into(),
            role: Role::User,
            iat: 0,
            exp: 1,
        };
        assert_eq!(claims.user_id(), Some(42));

        let claims = SessionClaims {
            sub: "not-a-number".into(),
            ..claims
        };
        assert_eq!(claims.user_id(), None);
    }
}
