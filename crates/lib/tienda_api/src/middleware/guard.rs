//! Page route guard — redirect semantics for browser navigation.
//!
//! API routes pass through untouched; page paths are classified public or
//! protected and navigation is redirected based on session state. The
//! callback URL survives the round trip so login can return the visitor
//! to where they were headed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use tienda_core::auth::jwt::verify_session_token;

use crate::AppState;
use crate::middleware::auth::extract_token;

/// Page prefixes that require a session.
const PROTECTED_PAGES: &[&str] = &["/account", "/checkout", "/orders"];

/// Auth entry pages; a signed-in visitor is sent back to the storefront.
const AUTH_PAGES: &[&str] = &["/login", "/register"];

fn starts_with_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn is_protected_page(path: &str) -> bool {
    PROTECTED_PAGES.iter().any(|p| starts_with_prefix(path, p))
}

/// Axum middleware implementing the page-level route guard.
pub async fn page_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let has_session = extract_token(&request)
        .is_some_and(|t| verify_session_token(&t, state.config.jwt_secret.as_bytes()).is_ok());

    if is_protected_page(&path) && !has_session {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("callbackUrl", &path)
            .finish();
        return Redirect::to(&format!("/login?{query}")).into_response();
    }

    if AUTH_PAGES.contains(&path.as_str()) && has_session {
        return Redirect::to("/").into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_classification() {
        assert!(is_protected_page("/account"));
        assert!(is_protected_page("/account/addresses"));
        assert!(is_protected_page("/checkout"));
        assert!(!is_protected_page("/accounting"));
        assert!(!is_protected_page("/"));
        assert!(!is_protected_page("/auth/login"));
    }
}
