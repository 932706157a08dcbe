//! HTTP-surface tests that need no database: the error envelope, session
//! middleware, page guard, and cookie behavior, driven through the router
//! with `tower::ServiceExt::oneshot` over a lazy (unconnected) pool.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use tienda_api::config::ApiConfig;
use tienda_api::services::google::GoogleVerifier;
use tienda_api::{AppState, router};
use tienda_core::auth::jwt::issue_session_token;
use tienda_core::models::{Role, SessionClaims};

const SECRET: &str = "test-secret";

fn test_app() -> Router {
    // Lazy pool pointing nowhere: requests that reach the store fail
    // fast, everything before it behaves normally.
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy("postgres://localhost:1/unreachable")
        .expect("lazy pool");

    let state = AppState {
        pool,
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: "postgres://localhost:1/unreachable".into(),
            jwt_secret: SECRET.into(),
            google_client_id: None,
            frontend_origin: "http://localhost:3000".into(),
            production: false,
        },
        google: GoogleVerifier::new(None).expect("verifier"),
    };
    router(state)
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn bearer(mut req: Request<Body>, token: &str) -> Request<Body> {
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().expect("header"),
    );
    req
}

#[tokio::test]
async fn missing_credentials_are_401_on_the_envelope() {
    let resp = test_app().oneshot(get("/auth/profile")).await.expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["type"], "unauthorized");
    assert_eq!(json["error"]["message"], "missing credentials");
}

#[tokio::test]
async fn expired_session_reports_differently_from_forged_token() {
    let app = test_app();

    // A token whose expiry is a week in the past.
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: "1".into(),
        role: Role::User,
        iat: now - 14 * 24 * 3600,
        exp: now - 7 * 24 * 3600,
    };
    let expired = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode");

    let resp = app
        .clone()
        .oneshot(bearer(get("/auth/profile"), &expired))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"]["message"], "session expired");

    // Same claims signed with the wrong key.
    let forged = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"other-secret"),
    )
    .expect("encode");

    let resp = app
        .oneshot(bearer(get("/auth/profile"), &forged))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"]["message"], "invalid token");
}

#[tokio::test]
async fn register_input_is_validated_before_the_store() {
    let app = test_app();

    let cases = [
        serde_json::json!({"name": "Ana", "email": "not-an-email", "password": "Passw0rd!"}),
        serde_json::json!({"name": "Ana", "email": "ana@x.com", "password": "short"}),
        serde_json::json!({"name": "  ", "email": "ana@x.com", "password": "Passw0rd!"}),
    ];
    for body in cases {
        let resp = app
            .clone()
            .oneshot(post_json("/auth/register", body))
            .await
            .expect("request");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["type"], "validation_error");
    }
}

#[tokio::test]
async fn missing_json_fields_use_the_envelope_not_axum_defaults() {
    let resp = test_app()
        .oneshot(post_json("/auth/login", serde_json::json!({"email": "a@b.co"})))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["type"], "validation_error");
}

#[tokio::test]
async fn protected_page_redirects_to_login_with_callback() {
    let resp = test_app()
        .oneshot(get("/account/addresses"))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers()[header::LOCATION],
        "/login?callbackUrl=%2Faccount%2Faddresses"
    );
}

#[tokio::test]
async fn signed_in_visitor_is_bounced_off_auth_pages() {
    let token = issue_session_token(1, Role::User, SECRET.as_bytes()).expect("token");

    let mut req = get("/login");
    req.headers_mut().insert(
        header::COOKIE,
        format!("token={token}").parse().expect("header"),
    );
    let resp = test_app().oneshot(req).await.expect("request");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn non_admin_session_is_forbidden_from_admin_routes() {
    let token = issue_session_token(1, Role::User, SECRET.as_bytes()).expect("token");
    let resp = test_app()
        .oneshot(bearer(get("/admin/users"), &token))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["error"]["type"], "forbidden");
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let token = issue_session_token(1, Role::User, SECRET.as_bytes()).expect("token");
    let resp = test_app()
        .oneshot(bearer(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .expect("request"),
            &token,
        ))
        .await
        .expect("request");
    assert_eq!(resp.status(), StatusCode::OK);

    let set_cookie = resp.headers()[header::SET_COOKIE]
        .to_str()
        .expect("header")
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn unknown_routes_get_the_json_404() {
    let resp = test_app().oneshot(get("/no/such/route")).await.expect("request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"]["type"], "not_found");
}

#[tokio::test]
async fn health_reports_a_disconnected_store() {
    let resp = test_app().oneshot(get("/api/health")).await.expect("request");
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_connected"], false);
}
