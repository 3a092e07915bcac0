//! Authentication middleware
//!
//! Axum adapters over the gate decisions:
//! - [`AuthUser`] extracts the verified identity from `Authorization` on
//!   API routes and rejects with a JSON 401.
//! - [`require_session`] guards page routes with the session cookie and
//!   redirects to the sign-in page.
//!
//! Both use the `TokenService` held in `AppState`.

use super::gate::{self, PageDecision, SESSION_COOKIE};
use super::token::{Claims, TOKEN_TTL_SECS};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Identity of the caller, taken from a verified credential
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A header that is present but not visible ASCII counts as present.
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default());

        let claims = gate::authorize_api(app_state.tokens(), authorization)?;
        Ok(AuthUser { claims })
    }
}

/// Page gate: lets the request through with a valid session cookie,
/// otherwise redirects to the configured sign-in path.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value());

    match gate::authorize_page(state.tokens(), cookie) {
        PageDecision::Allow => next.run(request).await,
        PageDecision::SignIn => {
            Redirect::temporary(&state.config().auth.sign_in_path).into_response()
        }
    }
}

/// Site-wide session cookie holding `token`
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(TOKEN_TTL_SECS))
        .build()
}

/// Cookie that makes the browser drop the session
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}
