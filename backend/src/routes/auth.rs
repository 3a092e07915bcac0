//! Authentication routes
//!
//! Sign-up and sign-in return the credential in the body and also set it
//! as the `auth-token` cookie for page navigation. Sign-out only tells the
//! browser to drop the cookie; credentials are never revoked server-side.

use crate::auth::{expired_session_cookie, session_cookie, AuthUser};
use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use admin_panel_shared::{IdentityResponse, SessionResponse, SignInRequest, SignUpRequest, UserProfile};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", post(sign_out))
        .route("/me", get(me))
        .route("/profile", get(profile))
}

/// Register a new account
///
/// POST /api/v1/auth/sign-up
async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let session = AuthService::sign_up(state.users(), state.tokens(), req).await?;
    let jar = jar.add(session_cookie(session.token.clone(), state.config().auth.secure_cookie));
    Ok((StatusCode::CREATED, jar, Json(session)))
}

/// Sign in with email and password
///
/// POST /api/v1/auth/sign-in
async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignInRequest>,
) -> ApiResult<(CookieJar, Json<SessionResponse>)> {
    let session = AuthService::sign_in(state.users(), state.tokens(), req).await?;
    let jar = jar.add(session_cookie(session.token.clone(), state.config().auth.secure_cookie));
    Ok((jar, Json(session)))
}

/// Drop the session cookie
///
/// POST /api/v1/auth/sign-out
async fn sign_out(jar: CookieJar) -> (StatusCode, CookieJar) {
    (StatusCode::NO_CONTENT, jar.add(expired_session_cookie()))
}

/// Identity carried by the caller's credential
///
/// GET /api/v1/auth/me
async fn me(auth_user: AuthUser) -> Json<IdentityResponse> {
    let claims = auth_user.claims;
    Json(IdentityResponse {
        sub: claims.sub,
        email: claims.email,
        exp: claims.exp,
    })
}

/// Stored profile of the caller
///
/// GET /api/v1/auth/profile
async fn profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = AuthService::profile(state.users(), auth_user.subject()).await?;
    Ok(Json(profile))
}
