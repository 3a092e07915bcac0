//! Integration tests for the authentication endpoints and the gates

mod common;

use axum::http::{header, StatusCode};
use fake::{faker::internet::en::SafeEmail, Fake};
use serde_json::json;

fn random_email() -> String {
    SafeEmail().fake()
}

async fn signed_up(app: &common::TestApp, email: &str, password: &str) -> common::TestResponse {
    let body = json!({ "email": email, "password": password, "name": "Test Admin" });
    app.post("/api/v1/auth/sign-up", &body.to_string()).await
}

#[tokio::test]
async fn test_sign_up_success() {
    let app = common::TestApp::new();
    let email = random_email();

    let response = signed_up(&app, &email, "SecurePassword123!").await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], email.to_lowercase());
    assert_eq!(body["user"]["name"], "Test Admin");

    let token = body["token"].as_str().unwrap();
    assert_eq!(token.split('.').count(), 3);
    assert_eq!(response.session_cookie().as_deref(), Some(token));
}

#[tokio::test]
async fn test_sign_up_sets_site_wide_http_only_cookie() {
    let app = common::TestApp::new();

    let response = signed_up(&app, &random_email(), "SecurePassword123!").await;

    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("auth-token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=259200"));
}

#[tokio::test]
async fn test_sign_up_duplicate_email() {
    let app = common::TestApp::new();
    let email = random_email();

    assert_eq!(signed_up(&app, &email, "SecurePassword123!").await.status, StatusCode::CREATED);
    let second = signed_up(&app, &email, "SecurePassword123!").await;

    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.json()["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_sign_up_invalid_email() {
    let app = common::TestApp::new();

    let response = signed_up(&app, "not-an-email", "SecurePassword123!").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "email");
}

#[tokio::test]
async fn test_sign_up_weak_password() {
    let app = common::TestApp::new();

    let response = signed_up(&app, &random_email(), "123").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["field"], "password");
}

#[tokio::test]
async fn test_sign_in_success() {
    let app = common::TestApp::new();
    let email = random_email();
    let registered = signed_up(&app, &email, "SecurePassword123!").await.json();

    let body = json!({ "email": email, "password": "SecurePassword123!" });
    let response = app.post("/api/v1/auth/sign-in", &body.to_string()).await;

    assert_eq!(response.status, StatusCode::OK);
    let session = response.json();
    assert_eq!(session["user"]["id"], registered["user"]["id"]);
    assert!(response.session_cookie().is_some());
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let app = common::TestApp::new();
    let email = random_email();
    signed_up(&app, &email, "CorrectPassword123!").await;

    let body = json!({ "email": email, "password": "WrongPassword123!" });
    let response = app.post("/api/v1/auth/sign-in", &body.to_string()).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"]["message"], "Invalid credentials");
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_sign_in_unknown_user() {
    let app = common::TestApp::new();

    let body = json!({ "email": "nobody@example.com", "password": "SomePassword123!" });
    let response = app.post("/api/v1/auth/sign-in", &body.to_string()).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_issued_token_opens_api() {
    let app = common::TestApp::new();
    let email = random_email();
    let session = signed_up(&app, &email, "SecurePassword123!").await.json();
    let token = session["token"].as_str().unwrap();

    let me = app.get_auth("/api/v1/auth/me", token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["sub"], session["user"]["id"]);
    assert_eq!(me.json()["email"], email.to_lowercase());

    let profile = app.get_auth("/api/v1/auth/profile", token).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.json()["id"], session["user"]["id"]);
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = common::TestApp::new();

    let response = app.get("/api/v1/auth/profile").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"]["message"], "Token not provided");
}

#[tokio::test]
async fn test_protected_endpoint_with_forged_token() {
    let app = common::TestApp::new();

    // Well-formed, but signed with some other key and long expired
    let forged = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0NTY3ODkwIiwiZXhwIjoxfQ.invalid";
    let response = app.get_auth("/api/v1/auth/me", forged).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"]["message"], "Token invalid");
}

#[tokio::test]
async fn test_sign_out_drops_cookie() {
    let app = common::TestApp::new();

    let response = app.post("/api/v1/auth/sign-out", "").await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("auth-token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_signed_out_token_still_verifies_until_expiry() {
    // Sign-out is client-side disposal only; no server-side revocation
    let app = common::TestApp::new();
    let session = signed_up(&app, &random_email(), "SecurePassword123!").await.json();
    let token = session["token"].as_str().unwrap();

    app.post("/api/v1/auth/sign-out", "").await;
    let me = app.get_auth("/api/v1/auth/me", token).await;

    assert_eq!(me.status, StatusCode::OK);
}
